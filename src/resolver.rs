// src/resolver.rs

use std::collections::HashMap;

use crate::page::Page;

/// Result of looking up a wiki-link token.
///
/// `slug` is the winning page's slug (first match in scan order when the
/// token is ambiguous); `ambiguous` tells the renderer to record a warning.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Resolution {
    pub slug: Option<String>,
    pub ambiguous: bool,
}

#[derive(Debug, Clone)]
struct Slot {
    slug: String,
    /// Identity of the winning page, to tell a slug collision (two files,
    /// one slug) apart from one page registering on several key levels.
    source: std::path::PathBuf,
    ambiguous: bool,
}

/// Maps wiki-link tokens to pages.
///
/// Four key levels are indexed, consulted in order: exact slug, lowercased
/// slug, lowercased title, lowercased basename of the slug. The resolver is
/// pure and cheap to build, so it is rebuilt from the current pageset on
/// every incremental step rather than patched; stale entries cannot survive
/// a pageset mutation.
#[derive(Debug, Default)]
pub(crate) struct Resolver {
    exact: HashMap<String, Slot>,
    lower: HashMap<String, Slot>,
    title: HashMap<String, Slot>,
    basename: HashMap<String, Slot>,
}

impl Resolver {
    /// Builds the resolver over the pageset in scan order. First page wins
    /// on collision; later entries flip the slot to ambiguous.
    pub(crate) fn build(pages: &[Page]) -> Self {
        let mut resolver = Resolver::default();
        for page in pages {
            insert(&mut resolver.exact, page.slug.clone(), page);
            insert(&mut resolver.lower, page.slug.to_lowercase(), page);
            insert(&mut resolver.title, page.title.to_lowercase(), page);
            let basename = page.slug.rsplit('/').next().unwrap_or(&page.slug);
            insert(&mut resolver.basename, basename.to_lowercase(), page);
        }
        resolver
    }

    /// Resolves a wiki-link token. Pure; no I/O.
    pub(crate) fn resolve(&self, token: &str) -> Resolution {
        let token = token.trim();
        let lowered = token.to_lowercase();

        let slot = self
            .exact
            .get(token)
            .or_else(|| self.lower.get(&lowered))
            .or_else(|| self.title.get(&lowered))
            .or_else(|| self.basename.get(&lowered));

        match slot {
            Some(slot) => Resolution {
                slug: Some(slot.slug.clone()),
                ambiguous: slot.ambiguous,
            },
            None => Resolution {
                slug: None,
                ambiguous: false,
            },
        }
    }
}

fn insert(map: &mut HashMap<String, Slot>, key: String, page: &Page) {
    if key.is_empty() {
        return;
    }
    match map.get_mut(&key) {
        None => {
            map.insert(
                key,
                Slot {
                    slug: page.slug.clone(),
                    source: page.source_path.clone(),
                    ambiguous: false,
                },
            );
        }
        Some(slot) if slot.source != page.source_path => slot.ambiguous = true,
        Some(_) => {}
    }
}
