// src/build.rs

use rayon::prelude::*;
use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};
use std::time::Instant;
use tracing::{debug, info};

use crate::config::Config;
use crate::error::RunError;
use crate::frontmatter::{ParsedPage, parse_page};
use crate::graph::{build_backlinks, build_graph};
use crate::indexes::SiteIndexes;
use crate::markdown::{RenderOptions, extract_toc, render_markdown};
use crate::output::{
    clean_output_dir, copy_static_tree, static_image_names, write_css_bundle, write_favicons,
    write_output_file, write_robots,
};
use crate::page::{Page, SectionSort};
use crate::resolver::Resolver;
use crate::scan::scan_content;
use crate::search::build_search_index;
use crate::templates::{
    LinkRef, SiteData, TagCloudItem, TemplateEngine, listing_item, page_view, sort_section_pages,
    toc_enabled,
};
use crate::utils::humanize;
use crate::{rss, sitemap};

/// Knobs for one build run.
#[derive(Debug, Clone)]
pub(crate) struct BuildOptions {
    /// Directory holding `leafpress.json` and the content tree.
    pub site_root: PathBuf,
    /// `--drafts`: include pages marked `draft: true`.
    pub include_drafts: bool,
}

/// Everything a build produces and an incremental rebuild reuses: the page
/// store, its lookup maps, the resolver, site data and parsed templates.
///
/// The orchestrator (single-threaded) owns all mutation; render workers only
/// ever see `&SiteCache`.
pub(crate) struct SiteCache {
    pub config: Config,
    pub opts: BuildOptions,
    pub output_dir: PathBuf,
    pub site: SiteData,
    pub engine: TemplateEngine,
    pub pages: Vec<Page>,
    pub by_path: HashMap<PathBuf, usize>,
    pub by_slug: HashMap<String, usize>,
    pub indexes: SiteIndexes,
    pub resolver: Resolver,
    pub static_images: HashSet<String>,
    pub warnings: Vec<String>,
}

/// Runs a full build from scratch and returns the warm cache.
pub(crate) fn full_build(config: Config, opts: BuildOptions) -> Result<SiteCache, RunError> {
    let start = Instant::now();
    let output_dir = resolve_output_dir(&opts.site_root, &config);
    let mut warnings = Vec::new();

    // 0. Start from an empty output directory
    //
    clean_output_dir(&output_dir)?;

    // 1. Scan the content tree
    //
    let sources = scan_content(&opts.site_root, &config)?;
    debug!("content::scan found {} files", sources.len());

    // 2. Parse every file (parallel); drafts drop out here
    //
    let parsed: Vec<ParsedPage> = sources
        .par_iter()
        .map(parse_page)
        .collect::<Result<Vec<_>, _>>()?;

    let mut pages: Vec<Page> = Vec::with_capacity(parsed.len());
    for item in parsed {
        warnings.extend(item.warnings);
        if item.page.draft && !opts.include_drafts {
            debug!("content::skip draft {:?}", item.page.source_path);
            continue;
        }
        pages.push(item.page);
    }
    warn_on_slug_collisions(&pages, &mut warnings);
    info!("content::load {} pages in {:.2?}", pages.len(), start.elapsed());

    // 3. Resolver over the pageset, then Markdown for every page (parallel).
    //    Pages are frozen during the fan-out; results are applied after.
    //
    let resolver = Resolver::build(&pages);
    let static_images = static_image_names(&opts.site_root);
    render_all_markdown(
        &mut pages,
        &resolver,
        &config,
        &static_images,
        None,
        &mut warnings,
    )?;

    // 4. Backlinks and derived indexes
    //
    build_backlinks(&mut pages, &resolver);
    let indexes = SiteIndexes::build(&pages);

    // 5. Site chrome: favicons, CSS bundle, static mirror, robots.txt
    //
    let favicon = write_favicons(&opts.site_root, &output_dir)?;
    copy_static_tree(&opts.site_root, &output_dir)?;
    write_css_bundle(&opts.site_root, &output_dir, &config)?;
    write_robots(&output_dir, &config)?;

    let site = SiteData::from_config(&config, favicon);
    let engine = TemplateEngine::new()?;

    let mut cache = SiteCache {
        config,
        opts,
        output_dir,
        site,
        engine,
        pages,
        by_path: HashMap::new(),
        by_slug: HashMap::new(),
        indexes,
        resolver,
        static_images,
        warnings,
    };
    cache.reindex();

    // 6. Render pages, auto-indexes and tag pages (parallel fan-outs)
    //
    cache.write_all_pages()?;
    cache.write_auto_indexes(&cache.indexes.auto_index_sections())?;
    cache.write_tag_cloud()?;
    cache.write_tag_pages(&cache.indexes.sorted_tag_keys())?;
    cache.write_not_found()?;

    // 7. Feeds and data artifacts
    //
    cache.write_feeds()?;
    cache.write_data_artifacts()?;

    info!(
        "build::complete ✓ {} pages in {:.2?}",
        cache.pages.len(),
        start.elapsed()
    );
    Ok(cache)
}

/// The output directory, anchored at the site root unless configured
/// absolute.
pub(crate) fn resolve_output_dir(site_root: &Path, config: &Config) -> PathBuf {
    let configured = config.output_dir_path();
    if configured.is_absolute() {
        configured
    } else {
        site_root.join(configured)
    }
}

/// Renders Markdown for pages (all of them, or just the subset named in
/// `only`), in parallel, then applies html/outlinks/warnings sequentially.
pub(crate) fn render_all_markdown(
    pages: &mut [Page],
    resolver: &Resolver,
    config: &Config,
    static_images: &HashSet<String>,
    only: Option<&HashSet<PathBuf>>,
    warnings: &mut Vec<String>,
) -> Result<(), RunError> {
    let titles: HashMap<String, String> = pages
        .iter()
        .map(|p| (p.slug.clone(), p.title.clone()))
        .collect();
    let base_path = config.base_path();
    let opts = RenderOptions {
        base_path: &base_path,
        wikilinks: config.wikilinks,
        static_images,
        titles: &titles,
    };

    let selected: Vec<usize> = pages
        .iter()
        .enumerate()
        .filter(|(_, p)| only.is_none_or(|set| set.contains(&p.source_path)))
        .map(|(i, _)| i)
        .collect();

    // Freeze the pageset for the duration of the fan-out; results are
    // applied sequentially afterwards.
    let frozen: &[Page] = pages;
    let rendered = selected
        .par_iter()
        .map(|&i| {
            let page = &frozen[i];
            debug!("content::render {:?}", page.source_path);
            render_markdown(
                &page.source_path.display().to_string(),
                &page.body,
                resolver,
                &opts,
            )
        })
        .collect::<Result<Vec<_>, _>>()?;

    for (&i, body) in selected.iter().zip(rendered) {
        pages[i].html_content = body.html;
        pages[i].out_links = body.out_links;
        warnings.extend(body.warnings);
    }
    Ok(())
}

fn warn_on_slug_collisions(pages: &[Page], warnings: &mut Vec<String>) {
    let mut by_slug: HashMap<&str, Vec<&Path>> = HashMap::new();
    for page in pages {
        by_slug
            .entry(page.slug.as_str())
            .or_default()
            .push(&page.source_path);
    }
    let mut collisions: Vec<_> = by_slug.iter().filter(|(_, v)| v.len() > 1).collect();
    collisions.sort_by_key(|(slug, _)| *slug);
    for (slug, sources) in collisions {
        warnings.push(format!(
            "slug collision: {:?} produced by {}",
            slug,
            sources
                .iter()
                .map(|p| p.display().to_string())
                .collect::<Vec<_>>()
                .join(", ")
        ));
    }
}

impl SiteCache {
    /// Rebuilds the path and slug lookup maps from the page store. Cheap;
    /// called after every pageset mutation.
    pub(crate) fn reindex(&mut self) {
        self.by_path = self
            .pages
            .iter()
            .enumerate()
            .map(|(i, p)| (p.source_path.clone(), i))
            .collect();
        self.by_slug = self
            .pages
            .iter()
            .enumerate()
            .map(|(i, p)| (p.slug.clone(), i))
            .collect();
    }

    pub(crate) fn page_by_path(&self, path: &Path) -> Option<&Page> {
        self.by_path.get(path).map(|&i| &self.pages[i])
    }

    /// Renders one page through the page template and writes its HTML.
    pub(crate) fn write_page(&self, page: &Page) -> Result<(), RunError> {
        let view = page_view(page, &self.site);

        let toc = if toc_enabled(self.config.toc, page.toc) {
            extract_toc(&page.html_content)
        } else {
            Vec::new()
        };

        let backlinks: Vec<LinkRef> = if self.config.backlinks {
            page.backlinks
                .iter()
                .filter_map(|src| self.page_by_path(src))
                .map(|p| LinkRef {
                    title: p.title.clone(),
                    url: format!("{}{}", self.site.base_path, p.permalink),
                })
                .collect()
        } else {
            Vec::new()
        };

        let listing = if page.is_index && page.show_list {
            self.section_listing(&page.slug, page.section_sort)
        } else {
            Vec::new()
        };

        let html = self
            .engine
            .render_page(&self.site, &view, &toc, &backlinks, &listing)?;
        write_output_file(&self.output_dir.join(&page.output_path), &html)?;
        Ok(())
    }

    /// Fan out one worker per page, error aborts the build.
    pub(crate) fn write_all_pages(&self) -> Result<(), RunError> {
        info!("render::pages {} files", self.pages.len());
        self.pages.par_iter().try_for_each(|p| self.write_page(p))
    }

    fn section_listing(
        &self,
        section: &str,
        sort: SectionSort,
    ) -> Vec<crate::templates::ListingItem> {
        let mut members: Vec<&Page> = self
            .indexes
            .sections
            .get(section)
            .into_iter()
            .flatten()
            .filter_map(|src| self.page_by_path(src))
            .collect();
        sort_section_pages(&mut members, sort);
        members
            .iter()
            .map(|p| listing_item(p, &self.site.base_path))
            .collect()
    }

    /// Synthesized listing pages for `_index`-less directories.
    pub(crate) fn write_auto_indexes(&self, sections: &[String]) -> Result<(), RunError> {
        sections.par_iter().try_for_each(|section| -> Result<(), RunError> {
            let title = if section.is_empty() {
                self.config.title.clone()
            } else {
                humanize(section.rsplit('/').next().unwrap_or(section))
            };
            let permalink = crate::utils::permalink_for_slug(section);
            let listing = self.section_listing(section, SectionSort::Date);

            debug!("render::auto-index {:?}", section);
            let html = self
                .engine
                .render_section(&self.site, &title, &permalink, &listing)?;
            let out = self
                .output_dir
                .join(crate::utils::output_path_for_slug(section));
            write_output_file(&out, &html)?;
            Ok(())
        })
    }

    pub(crate) fn write_tag_cloud(&self) -> Result<(), RunError> {
        let tags: Vec<TagCloudItem> = self
            .indexes
            .sorted_tag_keys()
            .into_iter()
            .map(|key| {
                let entry = &self.indexes.tags[&key];
                TagCloudItem {
                    name: entry.display.clone(),
                    url: format!("{}/tags/{}/", self.site.base_path, key),
                    count: entry.pages.len(),
                }
            })
            .collect();

        let html = self.engine.render_tag_cloud(&self.site, &tags)?;
        write_output_file(&self.output_dir.join("tags").join("index.html"), &html)?;
        Ok(())
    }

    /// One listing page per tag, date-descending, parallel across tags.
    pub(crate) fn write_tag_pages(&self, keys: &[String]) -> Result<(), RunError> {
        keys.par_iter().try_for_each(|key| -> Result<(), RunError> {
            let Some(entry) = self.indexes.tags.get(key) else {
                // tag vanished: clear its page
                let dir = self.output_dir.join("tags").join(key);
                if dir.exists() {
                    std::fs::remove_dir_all(&dir).ok();
                }
                return Ok(());
            };

            let mut members: Vec<&Page> = entry
                .pages
                .iter()
                .filter_map(|src| self.page_by_path(src))
                .collect();
            sort_section_pages(&mut members, SectionSort::Date);
            let listing: Vec<_> = members
                .iter()
                .map(|p| listing_item(p, &self.site.base_path))
                .collect();

            let html = self
                .engine
                .render_tag_page(&self.site, &entry.display, &listing)?;
            write_output_file(
                &self.output_dir.join("tags").join(key).join("index.html"),
                &html,
            )?;
            Ok(())
        })
    }

    pub(crate) fn write_not_found(&self) -> Result<(), RunError> {
        let html = self.engine.render_not_found(&self.site)?;
        write_output_file(&self.output_dir.join("404.html"), &html)?;
        Ok(())
    }

    pub(crate) fn write_feeds(&self) -> Result<(), RunError> {
        let sitemap_xml = sitemap::generate_sitemap(&self.config, &self.pages);
        write_output_file(&self.output_dir.join("sitemap.xml"), &sitemap_xml)?;
        info!("sitemap::write → sitemap.xml");

        let rss_xml = rss::generate_rss(&self.config, &self.pages);
        write_output_file(&self.output_dir.join("feed.xml"), &rss_xml)?;
        info!("rss::write → feed.xml");
        Ok(())
    }

    /// graph.json and search-index.json, each behind its feature toggle.
    pub(crate) fn write_data_artifacts(&self) -> Result<(), RunError> {
        if self.config.graph {
            let graph = build_graph(&self.pages, &self.resolver, &self.site.base_path);
            let json = serde_json::to_string(&graph).map_err(RunError::Serialize)?;
            write_output_file(&self.output_dir.join("graph.json"), &json)?;
            info!("graph::write → graph.json");
        }

        if self.config.search {
            let index = build_search_index(&self.pages, &self.site.base_path);
            let json = serde_json::to_string(&index).map_err(RunError::Serialize)?;
            write_output_file(&self.output_dir.join("search-index.json"), &json)?;
            info!("search::write → search-index.json");
        }
        Ok(())
    }
}
