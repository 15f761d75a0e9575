// src/page.rs

use std::path::PathBuf;
use time::OffsetDateTime;

/// Maturity marker for a note in the garden.
///
/// Any frontmatter value outside this set is rejected at parse time.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub(crate) enum Growth {
    Seedling,
    Budding,
    Evergreen,
}

impl Growth {
    pub(crate) fn parse(value: &str) -> Option<Self> {
        match value.to_lowercase().as_str() {
            "seedling" => Some(Growth::Seedling),
            "budding" => Some(Growth::Budding),
            "evergreen" => Some(Growth::Evergreen),
            _ => None,
        }
    }

    pub(crate) fn as_str(&self) -> &'static str {
        match self {
            Growth::Seedling => "seedling",
            Growth::Budding => "budding",
            Growth::Evergreen => "evergreen",
        }
    }
}

/// Per-page table-of-contents override: follow the site default, force on,
/// or force off.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub(crate) enum TocSetting {
    #[default]
    Unset,
    On,
    Off,
}

/// Listing order for a section index page.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub(crate) enum SectionSort {
    /// Newest first by modified-if-present-else-created.
    #[default]
    Date,
    /// Title A→Z.
    Title,
    /// seedling < budding < evergreen < unset.
    Growth,
}

impl SectionSort {
    pub(crate) fn parse(value: &str) -> Option<Self> {
        match value.to_lowercase().as_str() {
            "date" => Some(SectionSort::Date),
            "title" => Some(SectionSort::Title),
            "growth" => Some(SectionSort::Growth),
            _ => None,
        }
    }
}

/// A single Markdown note, from source file to rendered HTML.
///
/// Pages are owned by the page store (the build's `Vec<Page>`); everything
/// else refers to them by source path or slug. Backlinks hold source paths
/// rather than references so the store can mutate freely between builds.
#[derive(Clone, Debug, Default)]
pub(crate) struct Page {
    /// Content-root-relative path of the source file. Identity key.
    pub source_path: PathBuf,
    /// URL path component, lowercased, `_index` folded to the folder name.
    pub slug: String,
    /// Where the rendered HTML lands, relative to the output root.
    pub output_path: PathBuf,
    /// Absolute site path: `/` + slug + `/`, or `/` for the homepage.
    pub permalink: String,

    pub title: String,
    pub description: Option<String>,
    pub image: Option<String>,
    pub author: Option<String>,

    pub date: Option<OffsetDateTime>,
    pub modified: Option<OffsetDateTime>,

    /// Display strings in frontmatter order; may repeat, deduplicated at render.
    pub tags: Vec<String>,
    pub growth: Option<Growth>,
    pub draft: bool,
    pub toc: TocSetting,

    /// Only meaningful when `is_index`.
    pub show_list: bool,
    pub section_sort: SectionSort,

    pub reading_time: u32,
    pub is_index: bool,

    /// Raw Markdown after frontmatter removal.
    pub body: String,
    /// Filled by the Markdown renderer.
    pub html_content: String,
    /// Wiki-link target tokens seen during rendering, resolved or not.
    pub out_links: Vec<String>,
    /// Source paths of pages whose out-links resolve here. Recomputed from
    /// scratch on every backlink pass, never accumulated.
    pub backlinks: Vec<PathBuf>,
}

impl Page {
    /// The date used for feed ordering and `<lastmod>`: modified if present,
    /// else created.
    pub(crate) fn effective_date(&self) -> Option<OffsetDateTime> {
        self.modified.or(self.date)
    }

    /// Directory prefix of the slug ("" for root-level pages). Section
    /// membership for listings and auto-indexes.
    pub(crate) fn section(&self) -> &str {
        match self.slug.rsplit_once('/') {
            Some((dir, _)) => dir,
            None => "",
        }
    }

    /// Tags with duplicates removed case-insensitively, first spelling wins.
    pub(crate) fn display_tags(&self) -> Vec<&str> {
        let mut seen = std::collections::HashSet::new();
        self.tags
            .iter()
            .filter(|t| seen.insert(t.to_lowercase()))
            .map(String::as_str)
            .collect()
    }
}
