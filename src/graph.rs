// src/graph.rs

use serde::Serialize;
use std::collections::{HashMap, HashSet};
use std::path::PathBuf;

use crate::page::Page;
use crate::resolver::Resolver;

/// Recomputes every page's backlinks from the current pageset.
///
/// Backlinks are a pure function of (pages, resolver): each page's list is
/// cleared first, then refilled, so calling this any number of times on the
/// same pageset yields the same result. Patching lists in place on change
/// is exactly the approach that breeds duplicate backlinks; never do it.
///
/// The caller must rebuild the resolver before every pass: it indexes the
/// pageset by slug and title, and a stale one would route links to pages
/// that no longer exist.
pub(crate) fn build_backlinks(pages: &mut [Page], resolver: &Resolver) {
    // target slug → source paths, deduplicated, in scan order
    let mut incoming: HashMap<String, Vec<PathBuf>> = HashMap::new();
    let mut seen: HashSet<(PathBuf, String)> = HashSet::new();

    for page in pages.iter() {
        for token in &page.out_links {
            let Some(target) = resolver.resolve(token).slug else {
                continue;
            };
            // One backlink per source, however many links it holds.
            if seen.insert((page.source_path.clone(), target.clone())) {
                incoming
                    .entry(target)
                    .or_default()
                    .push(page.source_path.clone());
            }
        }
    }

    for page in pages.iter_mut() {
        page.backlinks = incoming.remove(&page.slug).unwrap_or_default();
    }
}

#[derive(Debug, Serialize)]
pub(crate) struct GraphNode {
    pub id: String,
    pub title: String,
    pub url: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub growth: Option<&'static str>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<String>,
}

#[derive(Debug, Serialize)]
pub(crate) struct GraphEdge {
    pub source: String,
    pub target: String,
}

#[derive(Debug, Serialize)]
pub(crate) struct Graph {
    pub nodes: Vec<GraphNode>,
    pub edges: Vec<GraphEdge>,
}

/// Builds the knowledge-graph artifact: one node per page (keyed by slug),
/// one edge per resolved outlink pair. Unresolved links produce no edge.
pub(crate) fn build_graph(pages: &[Page], resolver: &Resolver, base_path: &str) -> Graph {
    let nodes = pages
        .iter()
        .map(|page| GraphNode {
            id: page.slug.clone(),
            title: page.title.clone(),
            url: format!("{}{}", base_path, page.permalink),
            growth: page.growth.map(|g| g.as_str()),
            tags: page.display_tags().iter().map(|t| t.to_string()).collect(),
        })
        .collect();

    let mut edges = Vec::new();
    let mut seen = HashSet::new();
    for page in pages {
        for token in &page.out_links {
            let Some(target) = resolver.resolve(token).slug else {
                continue;
            };
            if seen.insert((page.slug.clone(), target.clone())) {
                edges.push(GraphEdge {
                    source: page.slug.clone(),
                    target,
                });
            }
        }
    }

    Graph { nodes, edges }
}
