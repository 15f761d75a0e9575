// src/indexes.rs

use std::collections::HashMap;
use std::path::PathBuf;

use crate::page::Page;

/// Pages carrying one tag. The storage key is the lowercased tag; `display`
/// keeps the first spelling seen in scan order.
#[derive(Debug, Clone, Default)]
pub(crate) struct TagEntry {
    pub display: String,
    pub pages: Vec<PathBuf>,
}

/// Section and tag membership, rebuilt from the pageset whenever it changes.
#[derive(Debug, Default)]
pub(crate) struct SiteIndexes {
    /// directory prefix of slug → member pages in scan order (no `_index`)
    pub sections: HashMap<String, Vec<PathBuf>>,
    /// directory prefix of slug → the authored `_index` page, if any
    pub section_index: HashMap<String, PathBuf>,
    /// lowercased tag → entry
    pub tags: HashMap<String, TagEntry>,
}

impl SiteIndexes {
    pub(crate) fn build(pages: &[Page]) -> Self {
        let mut indexes = SiteIndexes::default();

        for page in pages {
            if page.is_index {
                indexes
                    .section_index
                    .insert(page.slug.clone(), page.source_path.clone());
            } else {
                indexes
                    .sections
                    .entry(page.section().to_string())
                    .or_default()
                    .push(page.source_path.clone());
            }

            for tag in page.display_tags() {
                let entry = indexes
                    .tags
                    .entry(tag.to_lowercase())
                    .or_insert_with(|| TagEntry {
                        display: tag.to_string(),
                        pages: Vec::new(),
                    });
                entry.pages.push(page.source_path.clone());
            }
        }

        indexes
    }

    /// Directories that hold pages but no authored `_index.md`; these get a
    /// synthesized listing page at the same permalink.
    pub(crate) fn auto_index_sections(&self) -> Vec<String> {
        let mut sections: Vec<String> = self
            .sections
            .keys()
            .filter(|s| !self.section_index.contains_key(*s))
            .cloned()
            .collect();
        sections.sort();
        sections
    }

    /// Tag names (lowercased keys) in sorted order, for the tag cloud.
    pub(crate) fn sorted_tag_keys(&self) -> Vec<String> {
        let mut keys: Vec<String> = self.tags.keys().cloned().collect();
        keys.sort();
        keys
    }
}
