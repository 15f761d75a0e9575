// src/search.rs

use serde::Serialize;

use crate::page::Page;
use crate::utils::strip_html;

/// Per-entry cap on indexed text. Large notes are truncated so the on-disk
/// index stays small enough to fetch eagerly on page load.
const CONTENT_CAP_CHARS: usize = 4096;

/// One search-index entry.
#[derive(Debug, Serialize)]
pub(crate) struct SearchItem {
    pub title: String,
    pub url: String,
    pub content: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<String>,
}

/// Builds the client-side search index: every non-index page with its
/// HTML-stripped text, in scan order.
pub(crate) fn build_search_index(pages: &[Page], base_path: &str) -> Vec<SearchItem> {
    pages
        .iter()
        .filter(|p| !p.is_index)
        .map(|page| {
            let mut content = strip_html(&page.html_content);
            if let Some((cut, _)) = content.char_indices().nth(CONTENT_CAP_CHARS) {
                content.truncate(cut);
            }
            SearchItem {
                title: page.title.clone(),
                url: format!("{}{}", base_path, page.permalink),
                content,
                tags: page.display_tags().iter().map(|t| t.to_string()).collect(),
            }
        })
        .collect()
}
