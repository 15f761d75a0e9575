// src/utils.rs

use std::path::Path;

/// Derives the URL slug for a source file path.
///
/// The path is taken relative to the content root. The extension is dropped,
/// every segment is lowercased with runs of non-alphanumeric characters
/// collapsed to `-`, and a trailing `_index` segment folds into its parent
/// directory. The root `_index.md` yields the empty slug (the homepage).
///
/// # Examples
/// ```ignore
/// assert_eq!(slug_from_source(Path::new("Notes/My First Note.md")), "notes/my-first-note");
/// assert_eq!(slug_from_source(Path::new("notes/_index.md")), "notes");
/// assert_eq!(slug_from_source(Path::new("_index.md")), "");
/// ```
pub(crate) fn slug_from_source(path: &Path) -> String {
    let stem = path.with_extension("");
    let mut segments: Vec<&str> = stem
        .components()
        .filter_map(|c| c.as_os_str().to_str())
        .collect();

    // `_index` folds into the parent folder; the root `_index` becomes "".
    if segments.last() == Some(&"_index") {
        segments.pop();
    }

    let mut slugged: Vec<String> = segments.iter().map(|s| slugify_segment(s)).collect();
    slugged.retain(|s| !s.is_empty());
    slugged.join("/")
}

/// Lowercases a path segment and collapses runs of characters outside
/// `[a-z0-9]` into single dashes, trimming dashes at both ends.
pub(crate) fn slugify_segment(segment: &str) -> String {
    let mut out = String::with_capacity(segment.len());
    let mut pending_dash = false;
    for c in segment.chars() {
        let c = c.to_ascii_lowercase();
        if c.is_ascii_alphanumeric() {
            if pending_dash && !out.is_empty() {
                out.push('-');
            }
            pending_dash = false;
            out.push(c);
        } else {
            pending_dash = true;
        }
    }
    out
}

/// Turns a slug segment into a display title: dashes and underscores become
/// spaces and each word is capitalized ("my-first-note" → "My First Note").
pub(crate) fn humanize(segment: &str) -> String {
    segment
        .split(['-', '_', ' '])
        .filter(|w| !w.is_empty())
        .map(|w| {
            let mut chars = w.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

/// Slug for a heading ID: ASCII only, lowercased, non-alphanumeric runs
/// collapsed to `-`, trimmed. Uniqueness is the caller's concern.
pub(crate) fn heading_slug(text: &str) -> String {
    let ascii: String = text.chars().filter(char::is_ascii).collect();
    slugify_segment(&ascii)
}

/// The URL path a page slug maps to: `"/"` for the homepage, `"/{slug}/"`
/// otherwise.
pub(crate) fn permalink_for_slug(slug: &str) -> String {
    if slug.is_empty() {
        "/".to_string()
    } else {
        format!("/{}/", slug)
    }
}

/// The output file a page slug maps to, relative to the output root.
/// Pretty URLs: every page becomes a directory with an `index.html`.
pub(crate) fn output_path_for_slug(slug: &str) -> std::path::PathBuf {
    if slug.is_empty() {
        std::path::PathBuf::from("index.html")
    } else {
        std::path::PathBuf::from(slug).join("index.html")
    }
}

/// Strips HTML tags and resolves the handful of entities our renderer emits,
/// producing plain text for the search index and feed descriptions.
pub(crate) fn strip_html(html: &str) -> String {
    let mut out = String::with_capacity(html.len());
    let mut in_tag = false;
    for c in html.chars() {
        match c {
            '<' => in_tag = true,
            '>' => in_tag = false,
            c if !in_tag => out.push(c),
            _ => {}
        }
    }
    let out = out
        .replace("&amp;", "&")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&#39;", "'");
    // Collapse whitespace so stripped block elements don't leave gaps.
    out.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Escapes text for interpolation into HTML element content or attributes.
pub(crate) fn html_escape(s: &str) -> String {
    let mut result = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => result.push_str("&amp;"),
            '<' => result.push_str("&lt;"),
            '>' => result.push_str("&gt;"),
            '"' => result.push_str("&quot;"),
            '\'' => result.push_str("&#39;"),
            _ => result.push(c),
        }
    }
    result
}

/// Estimated reading time in minutes at ~200 words per minute, never zero.
pub(crate) fn reading_time(markdown: &str) -> u32 {
    let words = markdown.split_whitespace().count();
    (words as u32).div_ceil(200).max(1)
}

/// Converts a file path to a URL path with forward slashes on every platform.
pub(crate) fn path_to_url(path: &Path) -> String {
    path.to_string_lossy().replace('\\', "/")
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::{Path, PathBuf};

    #[test]
    fn test_slug_from_source_basic() {
        assert_eq!(slug_from_source(Path::new("notes/hello.md")), "notes/hello");
    }

    #[test]
    fn test_slug_from_source_lowercases_and_dashes() {
        assert_eq!(
            slug_from_source(Path::new("Notes/My First Note.md")),
            "notes/my-first-note"
        );
    }

    #[test]
    fn test_slug_from_source_collapses_symbol_runs() {
        assert_eq!(slug_from_source(Path::new("a b -- c!!.md")), "a-b-c");
    }

    #[test]
    fn test_slug_from_source_index_folds_to_parent() {
        assert_eq!(slug_from_source(Path::new("garden/_index.md")), "garden");
    }

    #[test]
    fn test_slug_from_source_root_index_is_empty() {
        assert_eq!(slug_from_source(Path::new("_index.md")), "");
    }

    #[test]
    fn test_slug_from_source_is_deterministic() {
        let a = slug_from_source(Path::new("Projects/Rust & Go.md"));
        let b = slug_from_source(Path::new("Projects/Rust & Go.md"));
        assert_eq!(a, b);
        assert_eq!(a, "projects/rust-go");
    }

    #[test]
    fn test_humanize() {
        assert_eq!(humanize("my-first-note"), "My First Note");
        assert_eq!(humanize("reading_list"), "Reading List");
        assert_eq!(humanize("notes"), "Notes");
    }

    #[test]
    fn test_heading_slug_strips_non_ascii() {
        assert_eq!(heading_slug("Héllo Wörld"), "hllo-wrld");
        assert_eq!(heading_slug("What's New?"), "what-s-new");
    }

    #[test]
    fn test_permalink_for_slug() {
        assert_eq!(permalink_for_slug(""), "/");
        assert_eq!(permalink_for_slug("notes/hello"), "/notes/hello/");
    }

    #[test]
    fn test_output_path_for_slug() {
        assert_eq!(output_path_for_slug(""), PathBuf::from("index.html"));
        assert_eq!(
            output_path_for_slug("notes/hello"),
            PathBuf::from("notes/hello/index.html")
        );
    }

    #[test]
    fn test_strip_html() {
        assert_eq!(
            strip_html("<p>Hello <strong>world</strong></p>"),
            "Hello world"
        );
        assert_eq!(strip_html("a &amp; b"), "a & b");
    }

    #[test]
    fn test_strip_html_collapses_whitespace() {
        assert_eq!(strip_html("<p>one</p>\n<p>two</p>"), "one two");
    }

    #[test]
    fn test_html_escape() {
        assert_eq!(
            html_escape(r#"<a href="x">&'"#),
            "&lt;a href=&quot;x&quot;&gt;&amp;&#39;"
        );
    }

    #[test]
    fn test_reading_time_minimum_one_minute() {
        assert_eq!(reading_time("just a few words"), 1);
    }

    #[test]
    fn test_reading_time_rounds_up() {
        let words = vec!["word"; 401].join(" ");
        assert_eq!(reading_time(&words), 3);
    }

    #[test]
    fn test_path_to_url() {
        assert_eq!(
            path_to_url(Path::new("notes/hello/index.html")),
            "notes/hello/index.html"
        );
    }
}
