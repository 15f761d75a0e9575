// src/templates.rs

use minijinja::{Environment, Value, context};
use minijinja_contrib::add_to_environment;
use serde::Serialize;
use time::OffsetDateTime;
use time::macros::format_description;

use crate::assets;
use crate::config::Config;
use crate::markdown::TocEntry;
use crate::page::{Page, SectionSort, TocSetting};

/// Format a date as "Month Day, Year" (e.g., "January 15, 2024")
fn format_date_long(date: &OffsetDateTime) -> String {
    // Format validated at compile time via macro
    const FORMAT: &[time::format_description::FormatItem<'static>] =
        format_description!("[month repr:long] [day padding:none], [year]");
    date.format(&FORMAT)
        .unwrap_or_else(|_| "Invalid date".to_string())
}

/// Filter to mark URL paths as safe for HTML rendering.
///
/// Minijinja's auto-escaping mangles forward slashes in href attributes;
/// this filter marks already-trusted site paths as safe.
fn url_filter(value: &str) -> Value {
    Value::from_safe_string(value.to_string())
}

/// Read-only site-wide data handed to every template.
#[derive(Debug, Clone, Serialize)]
pub(crate) struct SiteData {
    pub title: String,
    pub description: String,
    pub author: String,
    pub image: String,
    pub base_url: String,
    pub base_path: String,
    pub nav: Vec<NavItem>,
    pub nav_style: String,
    pub nav_active_style: String,
    pub head_extra: String,
    pub favicon: String,
    pub font_href: Option<String>,
    pub graph: bool,
    pub search: bool,
}

#[derive(Debug, Clone, Serialize)]
pub(crate) struct NavItem {
    pub label: String,
    pub path: String,
    pub url: String,
}

impl SiteData {
    pub(crate) fn from_config(config: &Config, favicon: String) -> Self {
        let base_path = config.base_path();
        SiteData {
            title: config.title.clone(),
            description: config.description.clone(),
            author: config.author.clone(),
            image: config.image.clone(),
            base_url: config.base_url_trimmed().to_string(),
            base_path: base_path.clone(),
            nav: config
                .nav
                .iter()
                .map(|entry| NavItem {
                    label: entry.label.clone(),
                    path: entry.path.clone(),
                    url: format!("{}{}", base_path, entry.path),
                })
                .collect(),
            nav_style: config.theme.nav_style.clone(),
            nav_active_style: config.theme.nav_active_style.clone(),
            head_extra: config.head_extra.clone(),
            favicon,
            font_href: assets::google_fonts_href(&config.theme),
            graph: config.graph,
            search: config.search,
        }
    }
}

/// Per-page data as the page template sees it.
#[derive(Debug, Serialize)]
pub(crate) struct PageView {
    pub title: String,
    pub description: Option<String>,
    pub image: Option<String>,
    pub author: Option<String>,
    pub permalink: String,
    pub url: String,
    pub date: Option<String>,
    pub modified: Option<String>,
    pub growth: Option<&'static str>,
    pub tags: Vec<TagRef>,
    pub reading_time: u32,
    pub content: String,
}

#[derive(Debug, Serialize)]
pub(crate) struct TagRef {
    pub name: String,
    pub url: String,
}

#[derive(Debug, Serialize)]
pub(crate) struct LinkRef {
    pub title: String,
    pub url: String,
}

#[derive(Debug, Serialize)]
pub(crate) struct ListingItem {
    pub title: String,
    pub url: String,
    pub date: Option<String>,
    pub growth: Option<&'static str>,
}

#[derive(Debug, Serialize)]
pub(crate) struct TagCloudItem {
    pub name: String,
    pub url: String,
    pub count: usize,
}

pub(crate) fn page_view(page: &Page, site: &SiteData) -> PageView {
    PageView {
        title: page.title.clone(),
        description: page.description.clone(),
        image: page.image.clone(),
        author: page.author.clone(),
        permalink: page.permalink.clone(),
        url: format!("{}{}", site.base_path, page.permalink),
        date: page.date.as_ref().map(format_date_long),
        modified: page.modified.as_ref().map(format_date_long),
        growth: page.growth.map(|g| g.as_str()),
        tags: page
            .display_tags()
            .iter()
            .map(|tag| TagRef {
                name: tag.to_string(),
                url: format!("{}/tags/{}/", site.base_path, tag.to_lowercase()),
            })
            .collect(),
        reading_time: page.reading_time,
        content: page.html_content.clone(),
    }
}

pub(crate) fn listing_item(page: &Page, base_path: &str) -> ListingItem {
    ListingItem {
        title: page.title.clone(),
        url: format!("{}{}", base_path, page.permalink),
        date: page.effective_date().as_ref().map(format_date_long),
        growth: page.growth.map(|g| g.as_str()),
    }
}

/// Orders a section listing. Ties at every level break on slug so two
/// builds of the same pageset emit byte-identical indexes.
pub(crate) fn sort_section_pages(pages: &mut Vec<&Page>, sort: SectionSort) {
    match sort {
        SectionSort::Date => pages.sort_by(|a, b| {
            b.effective_date()
                .cmp(&a.effective_date())
                .then_with(|| a.slug.cmp(&b.slug))
        }),
        SectionSort::Title => pages.sort_by(|a, b| {
            a.title
                .to_lowercase()
                .cmp(&b.title.to_lowercase())
                .then_with(|| a.slug.cmp(&b.slug))
        }),
        SectionSort::Growth => pages.sort_by(|a, b| {
            // seedling < budding < evergreen < unset
            let rank = |p: &Page| p.growth.map(|g| g as u8).unwrap_or(u8::MAX);
            rank(a).cmp(&rank(b)).then_with(|| a.slug.cmp(&b.slug))
        }),
    }
}

/// The template engine: embedded templates on a reentrant environment,
/// parsed once and shared by every render worker.
pub(crate) struct TemplateEngine {
    env: Environment<'static>,
}

impl TemplateEngine {
    pub(crate) fn new() -> Result<Self, minijinja::Error> {
        let mut env = Environment::new();
        add_to_environment(&mut env);
        env.add_filter("url", url_filter);

        env.add_template("head.html", assets::HEAD_PARTIAL)?;
        env.add_template("nav.html", assets::NAV_PARTIAL)?;
        env.add_template("page.html", assets::PAGE_TEMPLATE)?;
        env.add_template("section.html", assets::SECTION_TEMPLATE)?;
        env.add_template("tags.html", assets::TAG_CLOUD_TEMPLATE)?;
        env.add_template("tag.html", assets::TAG_PAGE_TEMPLATE)?;
        env.add_template("404.html", assets::NOT_FOUND_TEMPLATE)?;

        Ok(TemplateEngine { env })
    }

    pub(crate) fn render_page(
        &self,
        site: &SiteData,
        page: &PageView,
        toc: &[TocEntry],
        backlinks: &[LinkRef],
        listing: &[ListingItem],
    ) -> Result<String, minijinja::Error> {
        let tmpl = self.env.get_template("page.html")?;
        tmpl.render(context! {
            site => site,
            page => page,
            toc => toc,
            backlinks => backlinks,
            listing => listing,
        })
    }

    pub(crate) fn render_section(
        &self,
        site: &SiteData,
        title: &str,
        permalink: &str,
        listing: &[ListingItem],
    ) -> Result<String, minijinja::Error> {
        let tmpl = self.env.get_template("section.html")?;
        tmpl.render(context! {
            site => site,
            section => context! { title => title, permalink => permalink },
            listing => listing,
        })
    }

    pub(crate) fn render_tag_cloud(
        &self,
        site: &SiteData,
        tags: &[TagCloudItem],
    ) -> Result<String, minijinja::Error> {
        let tmpl = self.env.get_template("tags.html")?;
        tmpl.render(context! { site => site, tags => tags })
    }

    pub(crate) fn render_tag_page(
        &self,
        site: &SiteData,
        name: &str,
        listing: &[ListingItem],
    ) -> Result<String, minijinja::Error> {
        let tmpl = self.env.get_template("tag.html")?;
        tmpl.render(context! {
            site => site,
            tag => context! { name => name },
            listing => listing,
        })
    }

    pub(crate) fn render_not_found(&self, site: &SiteData) -> Result<String, minijinja::Error> {
        let tmpl = self.env.get_template("404.html")?;
        tmpl.render(context! { site => site })
    }
}

/// Whether a page shows its table of contents: the frontmatter tri-state
/// wins, the site toggle decides otherwise.
pub(crate) fn toc_enabled(site_toggle: bool, page_setting: TocSetting) -> bool {
    match page_setting {
        TocSetting::On => true,
        TocSetting::Off => false,
        TocSetting::Unset => site_toggle,
    }
}
