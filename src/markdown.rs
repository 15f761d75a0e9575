// src/markdown.rs

use regex::{Captures, Regex};
use std::collections::{HashMap, HashSet};
use std::sync::LazyLock;
use thiserror::Error;

use crate::resolver::Resolver;
use crate::syntax::{self, SyntaxError};
use crate::utils::{heading_slug, html_escape};

// Captures: 1: optional embed bang, 2: target, 3: label (optional).
// The embed form ![[file]] shares the pattern so one scan handles both.
static WIKILINK_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(!?)\[\[([^\[\]\|]+)(?:\|([^\[\]]+))?\]\]").unwrap()
});

// First line of a callout blockquote: [!type] optional title
static CALLOUT_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\[!([A-Za-z]+)\]\s*(.*)$").unwrap());

/// Callout types with dedicated styling; anything else degrades to `note`.
const CALLOUT_TYPES: &[&str] = &[
    "note", "tip", "info", "todo", "warning", "danger", "caution", "important", "question",
    "example", "quote", "abstract", "success", "failure", "bug",
];

const IMAGE_EXTENSIONS: &[&str] = &[".png", ".jpg", ".jpeg", ".gif", ".svg", ".webp"];

#[derive(Error, Debug)]
pub(crate) enum RenderError {
    #[error("Markdown rendering failed for {path}: {message}")]
    Markdown { path: String, message: String },

    #[error("Syntax highlighting failed for {path}")]
    Syntax {
        path: String,
        #[source]
        source: SyntaxError,
    },
}

/// Inputs the renderer needs beyond the body itself.
pub(crate) struct RenderOptions<'a> {
    /// Path component of `baseURL`, prepended to every absolute link.
    pub base_path: &'a str,
    /// When false, wiki-link tokens render as their display text, unlinked.
    pub wikilinks: bool,
    /// Lowercased filenames available under `static/images/`.
    pub static_images: &'a HashSet<String>,
    /// slug → title, for link text when a wiki-link has no label.
    pub titles: &'a HashMap<String, String>,
}

/// What one body render produces.
#[derive(Debug)]
pub(crate) struct RenderedBody {
    pub html: String,
    /// Every wiki-link target token seen, resolved or not, in order.
    pub out_links: Vec<String>,
    pub warnings: Vec<String>,
}

/// An entry extracted from the rendered HTML for the table of contents.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub(crate) struct TocEntry {
    pub level: u8,
    pub id: String,
    pub text: String,
}

/// Creates markdown parsing options. Dangerous HTML stays on because the
/// wiki-link pass injects anchors before the engine runs.
fn markdown_options() -> markdown::Options {
    markdown::Options {
        compile: markdown::CompileOptions {
            allow_dangerous_html: true,
            gfm_tagfilter: false,
            ..markdown::CompileOptions::gfm()
        },
        ..markdown::Options::gfm()
    }
}

/// Renders a page body to HTML.
///
/// Passes, in order: wiki-link and embed substitution outside code spans,
/// the CommonMark engine, callout blockquote rewriting, heading IDs, and
/// fence highlighting. Warnings (broken links, ambiguous links) accumulate
/// in the result rather than failing the render.
pub(crate) fn render_markdown(
    source_label: &str,
    body: &str,
    resolver: &Resolver,
    opts: &RenderOptions,
) -> Result<RenderedBody, RenderError> {
    let mut out_links = Vec::new();
    let mut warnings = Vec::new();

    let substituted = substitute_wikilinks(body, resolver, opts, &mut out_links, &mut warnings);

    let html = markdown::to_html_with_options(&substituted, &markdown_options()).map_err(|e| {
        RenderError::Markdown {
            path: source_label.to_string(),
            message: e.to_string(),
        }
    })?;

    let html = rewrite_callouts(&html);
    let html = add_heading_ids(&html);
    let html = syntax::highlight_html(&html).map_err(|e| RenderError::Syntax {
        path: source_label.to_string(),
        source: e,
    })?;

    Ok(RenderedBody {
        html,
        out_links,
        warnings,
    })
}

/// Replaces `[[token]]`, `[[token|label]]` and `![[file]]` outside code
/// spans, recording out-links and warnings as it goes.
fn substitute_wikilinks(
    body: &str,
    resolver: &Resolver,
    opts: &RenderOptions,
    out_links: &mut Vec<String>,
    warnings: &mut Vec<String>,
) -> String {
    let code = code_regions(body);
    let mut result = String::with_capacity(body.len());
    let mut last_end = 0;

    for caps in WIKILINK_RE.captures_iter(body) {
        let m = caps.get(0).unwrap();
        result.push_str(&body[last_end..m.start()]);
        last_end = m.end();

        // Tokens inside fenced, indented or inline code stay literal.
        if in_code_region(&code, m.start()) {
            result.push_str(m.as_str());
            continue;
        }

        if !caps[1].is_empty() {
            result.push_str(&render_embed(&caps, opts));
            continue;
        }

        let token = caps[2].trim().to_string();
        let label = caps.get(3).map(|l| l.as_str().trim());
        out_links.push(token.clone());

        if !opts.wikilinks {
            result.push_str(&html_escape(label.unwrap_or(&token)));
            continue;
        }

        let resolution = resolver.resolve(&token);
        match resolution.slug {
            Some(slug) => {
                if resolution.ambiguous {
                    warnings.push(format!(
                        "ambiguous wiki-link [[{}]]: multiple pages match; using /{}/",
                        token, slug
                    ));
                }
                let text = label
                    .map(String::from)
                    .or_else(|| opts.titles.get(&slug).cloned())
                    .unwrap_or_else(|| token.clone());
                let permalink = crate::utils::permalink_for_slug(&slug);
                result.push_str(&format!(
                    r#"<a href="{}{}" class="wikilink">{}</a>"#,
                    opts.base_path,
                    permalink,
                    html_escape(&text)
                ));
            }
            None => {
                warnings.push(format!("broken wiki-link [[{}]]", token));
                result.push_str(&format!(
                    r#"<span class="broken-link">{}</span>"#,
                    html_escape(label.unwrap_or(&token))
                ));
            }
        }
    }

    result.push_str(&body[last_end..]);
    result
}

/// `![[file]]` / `![[file|alt]]` — images under `static/images/` become
/// `<img>` tags; anything else stays literal.
fn render_embed(caps: &Captures, opts: &RenderOptions) -> String {
    let file = caps[2].trim();
    let label = caps.get(3).map(|l| l.as_str().trim());
    let lower = file.to_lowercase();

    let is_image = IMAGE_EXTENSIONS.iter().any(|ext| lower.ends_with(ext));
    if !is_image || !opts.static_images.contains(&lower) {
        return caps[0].to_string();
    }

    let alt = label.unwrap_or_else(|| {
        file.rsplit_once('.').map(|(stem, _)| stem).unwrap_or(file)
    });
    format!(
        r#"<img src="{}/static/images/{}" alt="{}">"#,
        opts.base_path,
        file,
        html_escape(alt)
    )
}

/// Byte ranges of fenced code blocks, indented code blocks, and inline code
/// spans. Wiki-link substitution skips matches starting inside any of them.
fn code_regions(body: &str) -> Vec<(usize, usize)> {
    let mut regions = Vec::new();
    let mut offset = 0;

    // fence state: (fence char, fence length, region start)
    let mut fence: Option<(char, usize, usize)> = None;
    let mut indented_start: Option<usize> = None;
    let mut prev_blank = true;

    for line in body.split_inclusive('\n') {
        let trimmed = line.trim_start();
        let indent = line.len() - trimmed.len();
        let blank = trimmed.trim_end().is_empty();

        match fence {
            Some((ch, len, start)) => {
                let run = trimmed.chars().take_while(|c| *c == ch).count();
                if indent <= 3 && run >= len && trimmed[run..].trim().is_empty() {
                    regions.push((start, offset + line.len()));
                    fence = None;
                }
            }
            None => {
                let is_fence_open = indent <= 3
                    && (trimmed.starts_with("```") || trimmed.starts_with("~~~"));
                if is_fence_open {
                    if let Some(start) = indented_start.take() {
                        regions.push((start, offset));
                    }
                    let ch = trimmed.chars().next().unwrap_or('`');
                    let len = trimmed.chars().take_while(|c| *c == ch).count();
                    fence = Some((ch, len, offset));
                } else if (line.starts_with("    ") || line.starts_with('\t'))
                    && (prev_blank || indented_start.is_some())
                {
                    indented_start.get_or_insert(offset);
                } else if blank {
                    // blank lines keep an indented block open
                } else if let Some(start) = indented_start.take() {
                    regions.push((start, offset));
                }
            }
        }

        prev_blank = blank;
        offset += line.len();
    }

    if let Some((_, _, start)) = fence {
        regions.push((start, body.len()));
    }
    if let Some(start) = indented_start {
        regions.push((start, body.len()));
    }

    // Inline code spans live in the gaps between block regions.
    let mut inline = Vec::new();
    let mut cursor = 0;
    for &(start, end) in &regions {
        inline_code_spans(&body[cursor..start], cursor, &mut inline);
        cursor = end;
    }
    inline_code_spans(&body[cursor..], cursor, &mut inline);

    regions.extend(inline);
    regions.sort_unstable();
    regions
}

/// Backtick code spans: a run of N backticks closed by the next run of
/// exactly N. Unclosed runs are not code.
fn inline_code_spans(text: &str, base: usize, regions: &mut Vec<(usize, usize)>) {
    let bytes = text.as_bytes();
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i] != b'`' {
            i += 1;
            continue;
        }
        let run_start = i;
        while i < bytes.len() && bytes[i] == b'`' {
            i += 1;
        }
        let run_len = i - run_start;

        let mut j = i;
        let mut close = None;
        while j < bytes.len() {
            if bytes[j] == b'`' {
                let close_start = j;
                while j < bytes.len() && bytes[j] == b'`' {
                    j += 1;
                }
                if j - close_start == run_len {
                    close = Some(j);
                    break;
                }
            } else {
                j += 1;
            }
        }

        if let Some(end) = close {
            regions.push((base + run_start, base + end));
            i = end;
        }
    }
}

fn in_code_region(regions: &[(usize, usize)], pos: usize) -> bool {
    regions.iter().any(|&(start, end)| pos >= start && pos < end)
}

/// Rewrites blockquotes whose first line is `[!type] title` into callout
/// divs. Unknown types degrade to `note`.
fn rewrite_callouts(html: &str) -> String {
    let mut result = String::with_capacity(html.len());
    let mut remaining = html;

    while let Some(bq_start) = remaining.find("<blockquote>") {
        let after_tag = bq_start + "<blockquote>".len();
        let inner = &remaining[after_tag..];

        // The engine emits <blockquote>\n<p>first line…
        let p_offset = inner
            .char_indices()
            .find(|(_, c)| !c.is_whitespace())
            .map(|(i, _)| i);
        let Some(p_offset) = p_offset.filter(|&i| inner[i..].starts_with("<p>")) else {
            result.push_str(&remaining[..after_tag]);
            remaining = inner;
            continue;
        };
        let text_start = p_offset + "<p>".len();
        // first line ends at a newline or at the paragraph close, whichever
        // comes first (marker-only callouts have no newline)
        let line_break = inner[text_start..].find('\n');
        let p_close = inner[text_start..].find("</p>");
        let first_line_end = text_start
            + match (line_break, p_close) {
                (Some(a), Some(b)) => a.min(b),
                (Some(a), None) => a,
                (None, Some(b)) => b,
                (None, None) => inner.len() - text_start,
            };
        let first_line = &inner[text_start..first_line_end];

        let Some(caps) = CALLOUT_RE.captures(first_line) else {
            result.push_str(&remaining[..after_tag]);
            remaining = inner;
            continue;
        };

        let Some(close) = find_blockquote_close(inner) else {
            result.push_str(&remaining[..after_tag]);
            remaining = inner;
            continue;
        };

        let kind = caps[1].to_lowercase();
        let kind = if CALLOUT_TYPES.contains(&kind.as_str()) {
            kind
        } else {
            "note".to_string()
        };
        let title = caps[2].trim();

        result.push_str(&remaining[..bq_start]);
        result.push_str(&format!(r#"<div class="callout callout-{}">"#, kind));
        if !title.is_empty() {
            result.push_str(&format!(r#"<div class="callout-title">{}</div>"#, title));
        }

        // Quote body: everything after the marker line, keeping the <p> open
        // unless the marker was the whole paragraph.
        let rest = &inner[first_line_end..close];
        if let Some(stripped) = rest.strip_prefix('\n') {
            result.push_str(&inner[p_offset..text_start]);
            result.push_str(stripped);
        } else {
            // marker-only paragraph: drop the empty <p>…</p>
            let after_p = rest.strip_prefix("</p>").unwrap_or(rest);
            result.push_str(after_p.trim_start_matches('\n'));
        }
        result.push_str("</div>");

        remaining = &inner[close + "</blockquote>".len()..];
    }

    result.push_str(remaining);
    result
}

/// Byte offset of the `</blockquote>` matching an already-consumed opening
/// tag, honoring nesting.
fn find_blockquote_close(inner: &str) -> Option<usize> {
    let mut depth = 1;
    let mut pos = 0;
    while depth > 0 {
        let open = inner[pos..].find("<blockquote>");
        let close = inner[pos..].find("</blockquote>")?;
        match open {
            Some(o) if o < close => {
                depth += 1;
                pos += o + "<blockquote>".len();
            }
            _ => {
                depth -= 1;
                if depth == 0 {
                    return Some(pos + close);
                }
                pos += close + "</blockquote>".len();
            }
        }
    }
    None
}

/// Gives every `<h2>`/`<h3>` a slug ID. Duplicate slugs get `-1`, `-2`, …
/// suffixes in document order.
fn add_heading_ids(html: &str) -> String {
    let mut seen: HashMap<String, usize> = HashMap::new();
    let mut result = String::with_capacity(html.len());
    let mut remaining = html;

    loop {
        let h2 = remaining.find("<h2>");
        let h3 = remaining.find("<h3>");
        let (start, tag) = match (h2, h3) {
            (Some(a), Some(b)) if a < b => (a, "h2"),
            (Some(a), None) => (a, "h2"),
            (_, Some(b)) => (b, "h3"),
            (None, None) => break,
        };

        let open_len = 4; // "<h2>"
        let close_tag = if tag == "h2" { "</h2>" } else { "</h3>" };
        let Some(inner_end) = remaining[start + open_len..].find(close_tag) else {
            break;
        };
        let inner = &remaining[start + open_len..start + open_len + inner_end];

        let base = heading_slug(&crate::utils::strip_html(inner));
        let count = seen.entry(base.clone()).or_insert(0);
        let id = if *count == 0 {
            base.clone()
        } else {
            format!("{}-{}", base, count)
        };
        *count += 1;

        result.push_str(&remaining[..start]);
        result.push_str(&format!(r#"<{} id="{}">"#, tag, id));
        remaining = &remaining[start + open_len..];
    }

    result.push_str(remaining);
    result
}

/// Pulls the h2/h3 outline back out of rendered HTML for the TOC block.
pub(crate) fn extract_toc(html: &str) -> Vec<TocEntry> {
    static HEADING_RE: LazyLock<Regex> =
        LazyLock::new(|| Regex::new(r#"<h([23]) id="([^"]*)">(.*?)</h[23]>"#).unwrap());

    HEADING_RE
        .captures_iter(html)
        .map(|caps| TocEntry {
            level: caps[1].parse().unwrap_or(2),
            id: caps[2].to_string(),
            text: crate::utils::strip_html(&caps[3]),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::page::Page;
    use std::path::PathBuf;

    fn garden() -> (Resolver, HashMap<String, String>) {
        let pages = vec![
            test_page("b.md", "Beta Note"),
            test_page("notes/deep.md", "Deep Note"),
        ];
        let titles = pages
            .iter()
            .map(|p| (p.slug.clone(), p.title.clone()))
            .collect();
        (Resolver::build(&pages), titles)
    }

    fn test_page(rel: &str, title: &str) -> Page {
        let slug = crate::utils::slug_from_source(std::path::Path::new(rel));
        Page {
            source_path: PathBuf::from(rel),
            permalink: crate::utils::permalink_for_slug(&slug),
            slug,
            title: title.to_string(),
            ..Page::default()
        }
    }

    fn render(body: &str) -> RenderedBody {
        let (resolver, titles) = garden();
        let images = HashSet::from(["chart.png".to_string()]);
        let opts = RenderOptions {
            base_path: "",
            wikilinks: true,
            static_images: &images,
            titles: &titles,
        };
        render_markdown("test.md", body, &resolver, &opts).unwrap()
    }

    #[test]
    fn test_resolved_wikilink_becomes_anchor() {
        let rendered = render("Link to [[b]].");
        assert!(rendered.html.contains(r#"<a href="/b/" class="wikilink">Beta Note</a>"#));
        assert_eq!(rendered.out_links, vec!["b"]);
        assert!(rendered.warnings.is_empty());
    }

    #[test]
    fn test_wikilink_with_label() {
        let rendered = render("See [[b|this note]].");
        assert!(rendered.html.contains(r#"class="wikilink">this note</a>"#));
    }

    #[test]
    fn test_broken_wikilink_becomes_span_and_warning() {
        let rendered = render("See [[missing]].");
        assert!(rendered
            .html
            .contains(r#"<span class="broken-link">missing</span>"#));
        assert_eq!(rendered.warnings.len(), 1);
        assert_eq!(rendered.out_links, vec!["missing"]);
    }

    #[test]
    fn test_wikilink_inside_inline_code_is_literal() {
        let rendered = render("Use `[[foo]]` inline");
        assert!(rendered.html.contains("[[foo]]"));
        assert!(!rendered.html.contains("<a "));
        assert!(rendered.out_links.is_empty());
    }

    #[test]
    fn test_wikilink_inside_fenced_code_is_literal() {
        let rendered = render("```\n[[foo]]\n```\n");
        assert!(rendered.html.contains("[[foo]]"));
        assert!(!rendered.html.contains("<a "));
        assert!(rendered.out_links.is_empty());
    }

    #[test]
    fn test_wikilink_inside_indented_code_is_literal() {
        let rendered = render("paragraph\n\n    [[foo]] in code\n\nafter\n");
        assert!(rendered.html.contains("[[foo]]"));
        assert!(!rendered.html.contains("broken-link"));
    }

    #[test]
    fn test_wikilink_outside_code_still_resolves_when_code_present() {
        let rendered = render("`code` then [[b]]");
        assert!(rendered.html.contains(r#"class="wikilink""#));
        assert_eq!(rendered.out_links, vec!["b"]);
    }

    #[test]
    fn test_image_embed() {
        let rendered = render("![[chart.png]]");
        assert!(rendered
            .html
            .contains(r#"<img src="/static/images/chart.png" alt="chart">"#));
    }

    #[test]
    fn test_image_embed_with_alt() {
        let rendered = render("![[chart.png|Monthly numbers]]");
        assert!(rendered.html.contains(r#"alt="Monthly numbers""#));
    }

    #[test]
    fn test_embed_of_unknown_file_stays_literal() {
        let rendered = render("![[missing.png]]");
        assert!(rendered.html.contains("![[missing.png]]"));
    }

    #[test]
    fn test_embeds_are_not_outlinks() {
        let rendered = render("![[chart.png]] and [[b]]");
        assert_eq!(rendered.out_links, vec!["b"]);
    }

    #[test]
    fn test_callout_basic() {
        let rendered = render("> [!tip] Pro tip\n> Water the plants.\n");
        assert!(rendered.html.contains(r#"<div class="callout callout-tip">"#));
        assert!(rendered.html.contains(r#"<div class="callout-title">Pro tip</div>"#));
        assert!(rendered.html.contains("Water the plants."));
        assert!(!rendered.html.contains("<blockquote>"));
    }

    #[test]
    fn test_callout_marker_only_paragraph() {
        let rendered = render("> [!note] Just a title\n");
        assert!(rendered
            .html
            .contains(r#"<div class="callout-title">Just a title</div>"#));
        assert!(!rendered.html.contains("<p></p>"));
    }

    #[test]
    fn test_callout_unknown_type_degrades_to_note() {
        let rendered = render("> [!zebra]\n> stripes\n");
        assert!(rendered.html.contains("callout-note"));
    }

    #[test]
    fn test_callout_type_is_lowercased() {
        let rendered = render("> [!WARNING] Careful\n> hot\n");
        assert!(rendered.html.contains("callout-warning"));
    }

    #[test]
    fn test_plain_blockquote_untouched() {
        let rendered = render("> just a quote\n");
        assert!(rendered.html.contains("<blockquote>"));
        assert!(!rendered.html.contains("callout"));
    }

    #[test]
    fn test_heading_ids_assigned() {
        let rendered = render("## First Section\n\n### Sub Section\n");
        assert!(rendered.html.contains(r#"<h2 id="first-section">"#));
        assert!(rendered.html.contains(r#"<h3 id="sub-section">"#));
    }

    #[test]
    fn test_duplicate_heading_ids_get_suffixes() {
        let rendered = render("## Setup\n\ntext\n\n## Setup\n\nmore\n\n## Setup\n");
        assert!(rendered.html.contains(r#"<h2 id="setup">"#));
        assert!(rendered.html.contains(r#"<h2 id="setup-1">"#));
        assert!(rendered.html.contains(r#"<h2 id="setup-2">"#));
    }

    #[test]
    fn test_code_fence_highlighted_with_chroma_class() {
        let rendered = render("```rust\nfn main() {}\n```\n");
        assert!(rendered.html.contains("chroma"));
    }

    #[test]
    fn test_wikilinks_disabled_renders_plain_text() {
        let (resolver, titles) = garden();
        let images = HashSet::new();
        let opts = RenderOptions {
            base_path: "",
            wikilinks: false,
            static_images: &images,
            titles: &titles,
        };
        let rendered = render_markdown("t.md", "see [[b|beta]]", &resolver, &opts).unwrap();
        assert!(rendered.html.contains("beta"));
        assert!(!rendered.html.contains("<a "));
        // still recorded as an outlink for the graph
        assert_eq!(rendered.out_links, vec!["b"]);
    }

    #[test]
    fn test_base_path_prefixes_links() {
        let (resolver, titles) = garden();
        let images = HashSet::new();
        let opts = RenderOptions {
            base_path: "/garden",
            wikilinks: true,
            static_images: &images,
            titles: &titles,
        };
        let rendered = render_markdown("t.md", "[[b]]", &resolver, &opts).unwrap();
        assert!(rendered.html.contains(r#"href="/garden/b/""#));
    }

    #[test]
    fn test_code_regions_inline() {
        let regions = code_regions("a `code` b");
        assert_eq!(regions, vec![(2, 8)]);
    }

    #[test]
    fn test_code_regions_unclosed_backtick_is_not_code() {
        let regions = code_regions("a ` b");
        assert!(regions.is_empty());
    }

    #[test]
    fn test_code_regions_fence() {
        let body = "before\n```\ncode\n```\nafter\n";
        let regions = code_regions(body);
        assert_eq!(regions.len(), 1);
        let (start, end) = regions[0];
        assert!(&body[start..end].contains("code"));
        assert!(!&body[start..end].contains("before"));
        assert!(!&body[start..end].contains("after"));
    }

    #[test]
    fn test_code_regions_unclosed_fence_runs_to_eof() {
        let body = "```\ncode forever";
        let regions = code_regions(body);
        assert_eq!(regions, vec![(0, body.len())]);
    }

    #[test]
    fn test_extract_toc() {
        let rendered = render("## Alpha\n\n### Beta\n\n## Gamma\n");
        let toc = extract_toc(&rendered.html);
        assert_eq!(toc.len(), 3);
        assert_eq!(toc[0], TocEntry {
            level: 2,
            id: "alpha".to_string(),
            text: "Alpha".to_string()
        });
        assert_eq!(toc[1].level, 3);
        assert_eq!(toc[2].id, "gamma");
    }

    #[test]
    fn test_ambiguous_wikilink_warns_and_uses_first_match() {
        let pages = vec![
            test_page("folder1/same.md", "Same One"),
            test_page("folder2/same.md", "Same Two"),
        ];
        let titles: HashMap<String, String> = pages
            .iter()
            .map(|p| (p.slug.clone(), p.title.clone()))
            .collect();
        let resolver = Resolver::build(&pages);
        let images = HashSet::new();
        let opts = RenderOptions {
            base_path: "",
            wikilinks: true,
            static_images: &images,
            titles: &titles,
        };
        let rendered = render_markdown("c.md", "[[same]]", &resolver, &opts).unwrap();
        assert!(rendered.html.contains(r#"href="/folder1/same/""#));
        assert_eq!(rendered.warnings.len(), 1);
        assert!(rendered.warnings[0].contains("ambiguous"));
    }
}
