// src/incremental.rs
//
// Single-file rebuilds against the warm SiteCache. The orchestrator is
// single-threaded and owns every cache mutation; the invariant it protects
// is that after any step, backlinks equal what a full build of the current
// tree would compute.

use std::collections::HashSet;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

use crate::build::{SiteCache, render_all_markdown};
use crate::config::{CONFIG_FILE, Config};
use crate::frontmatter::parse_page;
use crate::graph::build_backlinks;
use crate::indexes::SiteIndexes;
use crate::output::{copy_static_tree, remove_page_output, static_image_names, write_css_bundle};
use crate::resolver::Resolver;
use crate::scan::PageSource;
use crate::error::RunError;

/// What a watched filesystem change means for the build.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ChangeKind {
    /// `leafpress.json` changed: the whole build restarts from scratch.
    Config,
    /// Something under `static/`: re-mirror the tree, nothing else.
    Static,
    /// `style.css`: regenerate the CSS bundle only.
    Stylesheet,
    /// A Markdown source: the incremental path.
    Markdown,
    /// Anything else (editor droppings, output dir, non-content files).
    Irrelevant,
}

/// Classifies an absolute changed path against the site layout.
pub(crate) fn classify_change(site_root: &Path, config: &Config, path: &Path) -> ChangeKind {
    let Ok(rel) = path.strip_prefix(site_root) else {
        return ChangeKind::Irrelevant;
    };

    if rel == Path::new(CONFIG_FILE) {
        return ChangeKind::Config;
    }
    if rel.starts_with("static") {
        return ChangeKind::Static;
    }
    if rel == Path::new("style.css") {
        return ChangeKind::Stylesheet;
    }

    let output_dir = config.output_dir_path();
    if rel.starts_with(&output_dir) {
        return ChangeKind::Irrelevant;
    }
    if rel
        .components()
        .filter_map(|c| c.as_os_str().to_str())
        .any(|name| name.starts_with('.'))
    {
        return ChangeKind::Irrelevant;
    }
    if rel.extension().is_some_and(|ext| ext == "md") {
        return ChangeKind::Markdown;
    }
    ChangeKind::Irrelevant
}

/// Result of routing one change through the cache.
#[derive(Debug, PartialEq, Eq)]
pub(crate) enum RebuildOutcome {
    /// Outputs were refreshed in place.
    Done,
    /// The config file itself changed; the caller must reload and full-build.
    ConfigChanged,
    /// Nothing to do.
    Ignored,
}

impl SiteCache {
    /// Routes a single changed path to the right refresh. The main entry
    /// point for watch mode.
    pub(crate) fn rebuild_path(&mut self, path: &Path) -> Result<RebuildOutcome, RunError> {
        match classify_change(&self.opts.site_root, &self.config, path) {
            ChangeKind::Config => Ok(RebuildOutcome::ConfigChanged),
            ChangeKind::Irrelevant => Ok(RebuildOutcome::Ignored),
            ChangeKind::Static => {
                info!("incremental::static {:?}", path);
                copy_static_tree(&self.opts.site_root, &self.output_dir)?;
                self.static_images = static_image_names(&self.opts.site_root);
                Ok(RebuildOutcome::Done)
            }
            ChangeKind::Stylesheet => {
                info!("incremental::css {:?}", path);
                write_css_bundle(&self.opts.site_root, &self.output_dir, &self.config)?;
                Ok(RebuildOutcome::Done)
            }
            ChangeKind::Markdown => {
                let rel = path
                    .strip_prefix(&self.opts.site_root)
                    .unwrap_or(path)
                    .to_path_buf();
                if self.config.is_ignored(&rel) {
                    return Ok(RebuildOutcome::Ignored);
                }
                if path.exists() {
                    self.upsert_markdown(&rel, path)
                } else {
                    self.delete_markdown(&rel)
                }
            }
        }
    }

    /// Modify/create path: parse first (a parse failure must leave the cache
    /// untouched), then swap the page in and recompute everything derived.
    fn upsert_markdown(&mut self, rel: &Path, abs: &Path) -> Result<RebuildOutcome, RunError> {
        info!("incremental::page {:?}", rel);

        let raw = std::fs::read_to_string(abs).map_err(|e| {
            RunError::IoError(format!("reading changed file {:?}: {}", abs, e))
        })?;
        let source = PageSource {
            rel_path: rel.to_path_buf(),
            raw,
        };
        // Nothing below may run unless the parse succeeded.
        let parsed = parse_page(&source)?;
        let mut new_page = parsed.page;
        self.warnings.extend(parsed.warnings);

        if new_page.draft && !self.opts.include_drafts {
            // a page edited into draft state disappears from the site
            return if self.by_path.contains_key(rel) {
                self.delete_markdown(rel)
            } else {
                Ok(RebuildOutcome::Ignored)
            };
        }

        // Remember what the old version touched before replacing it.
        let old = self.by_path.get(rel).map(|&i| &self.pages[i]);
        let old_tags: HashSet<String> = old
            .map(|p| p.tags.iter().map(|t| t.to_lowercase()).collect())
            .unwrap_or_default();
        let old_backlink_sources: Vec<PathBuf> =
            old.map(|p| p.backlinks.clone()).unwrap_or_default();
        let old_outlink_targets = old
            .map(|p| self.resolve_targets(&p.out_links))
            .unwrap_or_default();

        // Replace in place, or insert at the scan-order position so a later
        // full build produces identical artifact ordering.
        match self.by_path.get(rel).copied() {
            Some(i) => {
                // keep rendered state empty; it is recomputed below
                self.pages[i] = new_page.clone();
            }
            None => {
                let at = self
                    .pages
                    .partition_point(|p| p.source_path < new_page.source_path);
                self.pages.insert(at, new_page.clone());
            }
        }

        // Resolver before backlinks, always: it indexes the pageset that the
        // backlink pass is about to walk.
        self.refresh_derived_state();

        // Render the changed page first so its outlinks are current.
        let mut changed_set = HashSet::from([rel.to_path_buf()]);
        render_all_markdown(
            &mut self.pages,
            &self.resolver,
            &self.config,
            &self.static_images,
            Some(&changed_set),
            &mut self.warnings,
        )?;

        // Global backlink pass over fresh outlinks.
        build_backlinks(&mut self.pages, &self.resolver);

        // The rebuild closure: the page itself, pages that linked to it
        // before or do now, and pages it linked to before or does now.
        new_page = self.pages[self.by_path[rel]].clone();
        changed_set.extend(old_backlink_sources);
        changed_set.extend(new_page.backlinks.iter().cloned());
        changed_set.extend(old_outlink_targets);
        changed_set.extend(self.resolve_targets(&new_page.out_links));

        let others: HashSet<PathBuf> = changed_set
            .iter()
            .filter(|p| p.as_path() != rel)
            .cloned()
            .collect();
        render_all_markdown(
            &mut self.pages,
            &self.resolver,
            &self.config,
            &self.static_images,
            Some(&others),
            &mut self.warnings,
        )?;

        self.write_rebuild_set(&changed_set)?;

        // Affected tags: the symmetric difference gains/loses listing
        // entries, the intersection may show a changed title or date, so
        // the union of old and new tags is rebuilt, plus the cloud.
        let new_tags: HashSet<String> =
            new_page.tags.iter().map(|t| t.to_lowercase()).collect();
        let affected_tags: Vec<String> = old_tags.union(&new_tags).cloned().collect();
        self.refresh_tags(&affected_tags)?;

        self.refresh_section(new_page.section(), &new_page.slug, new_page.is_index)?;
        self.write_feeds()?;
        self.write_data_artifacts()?;

        debug!(
            "incremental::done {:?} ({} pages re-rendered)",
            rel,
            changed_set.len()
        );
        Ok(RebuildOutcome::Done)
    }

    /// Delete path: drop the page, its output, and every artifact that
    /// referenced it.
    fn delete_markdown(&mut self, rel: &Path) -> Result<RebuildOutcome, RunError> {
        let Some(&index) = self.by_path.get(rel) else {
            return Ok(RebuildOutcome::Ignored);
        };
        info!("incremental::delete {:?}", rel);

        let old = self.pages[index].clone();
        remove_page_output(&self.output_dir, &old.output_path)?;

        let old_outlink_targets = self.resolve_targets(&old.out_links);

        self.pages.remove(index);
        self.refresh_derived_state();
        build_backlinks(&mut self.pages, &self.resolver);

        // Pages that linked to it now hold broken links; pages it linked to
        // just lost a backlink. Both need fresh HTML.
        let mut rebuild: HashSet<PathBuf> = old.backlinks.iter().cloned().collect();
        rebuild.extend(old_outlink_targets);
        rebuild.remove(rel);

        render_all_markdown(
            &mut self.pages,
            &self.resolver,
            &self.config,
            &self.static_images,
            Some(&rebuild),
            &mut self.warnings,
        )?;
        self.write_rebuild_set(&rebuild)?;

        let old_tags: Vec<String> = old.tags.iter().map(|t| t.to_lowercase()).collect();
        self.refresh_tags(&old_tags)?;

        self.refresh_section(old.section(), &old.slug, old.is_index)?;
        self.write_feeds()?;
        self.write_data_artifacts()?;

        Ok(RebuildOutcome::Done)
    }

    /// Rebuild lookup maps, the resolver, and the section/tag indexes from
    /// the current pageset. Order matters only in that everything here is
    /// derived state and must be refreshed together.
    fn refresh_derived_state(&mut self) {
        self.reindex();
        self.resolver = Resolver::build(&self.pages);
        self.indexes = SiteIndexes::build(&self.pages);
    }

    /// Maps outlink tokens to the source paths of their target pages under
    /// the current resolver.
    fn resolve_targets(&self, tokens: &[String]) -> Vec<PathBuf> {
        tokens
            .iter()
            .filter_map(|t| self.resolver.resolve(t).slug)
            .filter_map(|slug| self.by_slug.get(&slug))
            .map(|&i| self.pages[i].source_path.clone())
            .collect()
    }

    fn write_rebuild_set(&self, set: &HashSet<PathBuf>) -> Result<(), RunError> {
        for path in set {
            if let Some(page) = self.page_by_path(path) {
                self.write_page(page)?;
            }
        }
        Ok(())
    }

    fn refresh_tags(&self, delta: &[String]) -> Result<(), RunError> {
        self.write_tag_pages(delta)?;
        self.write_tag_cloud()
    }

    /// Keeps a section's index page in step with its membership: rewrite
    /// the auto-index when the directory has pages but no `_index.md`,
    /// rewrite the authored index when it has one, drop a stale auto-index
    /// when the section emptied out.
    fn refresh_section(&self, section: &str, own_slug: &str, is_index: bool) -> Result<(), RunError> {
        // An `_index.md` lists its own directory, not its parent's.
        let section = if is_index { own_slug } else { section };

        if let Some(index_path) = self.indexes.section_index.get(section) {
            if let Some(page) = self.page_by_path(&index_path.clone()) {
                self.write_page(page)?;
            }
            return Ok(());
        }

        let has_members = self
            .indexes
            .sections
            .get(section)
            .is_some_and(|m| !m.is_empty());
        if has_members || section.is_empty() {
            // the homepage listing is rewritten even when it empties out
            self.write_auto_indexes(&[section.to_string()])?;
        } else {
            remove_page_output(
                &self.output_dir,
                &crate::utils::output_path_for_slug(section),
            )?;
        }
        Ok(())
    }
}
