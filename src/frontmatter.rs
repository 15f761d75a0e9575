// src/frontmatter.rs

use serde_json::Value;
use std::path::PathBuf;
use thiserror::Error;
use time::format_description::well_known::{Iso8601, Rfc3339};
use time::macros::format_description;
use time::{Date, OffsetDateTime, Time};

use crate::page::{Growth, Page, SectionSort, TocSetting};
use crate::scan::PageSource;
use crate::utils::{
    humanize, output_path_for_slug, permalink_for_slug, reading_time, slug_from_source,
};

#[derive(Error, Debug)]
pub(crate) enum ParseError {
    /// The one frontmatter mistake that stops a build: a growth stage
    /// outside the allowed set.
    #[error("invalid growth {value:?} in {path:?}: expected seedling, budding or evergreen")]
    InvalidGrowth { path: PathBuf, value: String },
}

/// A parsed page plus any non-fatal issues found along the way.
#[derive(Debug)]
pub(crate) struct ParsedPage {
    pub page: Page,
    pub warnings: Vec<String>,
}

/// Parses one source file into a `Page`.
///
/// Frontmatter problems are warnings (the whole file becomes the body);
/// only an unknown growth value is a hard error.
pub(crate) fn parse_page(source: &PageSource) -> Result<ParsedPage, ParseError> {
    let mut warnings = Vec::new();

    let (frontmatter_str, body) = match split_frontmatter(&source.raw) {
        FrontmatterSplit::None => (None, source.raw.as_str()),
        FrontmatterSplit::Found { frontmatter, body } => (Some(frontmatter), body),
        FrontmatterSplit::Unclosed => {
            warnings.push(format!(
                "{}: frontmatter delimiter never closed; treating whole file as content",
                source.rel_path.display()
            ));
            (None, source.raw.as_str())
        }
    };

    let (meta, body) = match frontmatter_str {
        None => (Value::Null, body),
        Some(fm) => match serde_yaml::from_str::<Value>(fm) {
            Ok(value) => (value, body),
            Err(e) => {
                warnings.push(format!(
                    "{}: malformed frontmatter ({}); treating whole file as content",
                    source.rel_path.display(),
                    e
                ));
                (Value::Null, source.raw.as_str())
            }
        },
    };

    let slug = slug_from_source(&source.rel_path);
    let is_index = source
        .rel_path
        .file_stem()
        .and_then(|s| s.to_str())
        .is_some_and(|s| s == "_index");

    let title = string_field(&meta, "title").unwrap_or_else(|| fallback_title(&slug));

    let growth = match string_field(&meta, "growth") {
        None => None,
        Some(raw) => match Growth::parse(&raw) {
            Some(g) => Some(g),
            None => {
                return Err(ParseError::InvalidGrowth {
                    path: source.rel_path.clone(),
                    value: raw,
                });
            }
        },
    };

    let date = date_field(&meta, &["date", "created"], &source.rel_path, &mut warnings);
    let modified = date_field(&meta, &["updated", "modified"], &source.rel_path, &mut warnings);

    let toc = match meta.get("toc").and_then(Value::as_bool) {
        Some(true) => TocSetting::On,
        Some(false) => TocSetting::Off,
        None => TocSetting::Unset,
    };

    let section_sort = match string_field(&meta, "sort") {
        None => SectionSort::default(),
        Some(raw) => match SectionSort::parse(&raw) {
            Some(sort) => sort,
            None => {
                warnings.push(format!(
                    "{}: unknown sort {:?}; using date",
                    source.rel_path.display(),
                    raw
                ));
                SectionSort::default()
            }
        },
    };

    let reading_minutes = meta
        .get("readingTime")
        .and_then(Value::as_u64)
        .map(|m| m as u32)
        .unwrap_or_else(|| reading_time(body));

    let page = Page {
        source_path: source.rel_path.clone(),
        output_path: output_path_for_slug(&slug),
        permalink: permalink_for_slug(&slug),
        slug,
        title,
        description: string_field(&meta, "description"),
        image: string_field(&meta, "image"),
        author: string_field(&meta, "author"),
        date,
        modified,
        tags: tags_field(&meta),
        growth,
        draft: meta.get("draft").and_then(Value::as_bool).unwrap_or(false),
        toc,
        show_list: meta
            .get("showList")
            .and_then(Value::as_bool)
            .unwrap_or(true),
        section_sort,
        reading_time: reading_minutes,
        is_index,
        body: body.to_string(),
        html_content: String::new(),
        out_links: Vec::new(),
        backlinks: Vec::new(),
    };

    Ok(ParsedPage { page, warnings })
}

enum FrontmatterSplit<'a> {
    None,
    Unclosed,
    Found { frontmatter: &'a str, body: &'a str },
}

/// Splits `---`-fenced frontmatter from the body. The opening fence must be
/// the very first line.
fn split_frontmatter(content: &str) -> FrontmatterSplit<'_> {
    let Some(after_opening) = content.strip_prefix("---\n").or_else(|| {
        content.strip_prefix("---\r\n")
    }) else {
        return FrontmatterSplit::None;
    };

    let Some(closing_pos) = after_opening.find("\n---") else {
        return FrontmatterSplit::Unclosed;
    };

    let frontmatter = &after_opening[..closing_pos];
    let rest = &after_opening[closing_pos + "\n---".len()..];

    // The closing fence must stand alone on its line.
    if !(rest.is_empty() || rest.starts_with('\n') || rest.starts_with("\r\n")) {
        return FrontmatterSplit::Unclosed;
    }
    let body = rest
        .strip_prefix("\r\n")
        .or_else(|| rest.strip_prefix('\n'))
        .unwrap_or(rest);

    FrontmatterSplit::Found { frontmatter, body }
}

fn string_field(meta: &Value, key: &str) -> Option<String> {
    match meta.get(key)? {
        Value::String(s) if !s.trim().is_empty() => Some(s.trim().to_string()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

/// Tags come as a YAML list or a single comma-separated scalar. Display case
/// is preserved; deduplication happens at render time.
fn tags_field(meta: &Value) -> Vec<String> {
    match meta.get("tags") {
        Some(Value::Array(items)) => items
            .iter()
            .filter_map(|v| match v {
                Value::String(s) => Some(s.trim().to_string()),
                Value::Number(n) => Some(n.to_string()),
                _ => None,
            })
            .filter(|s| !s.is_empty())
            .collect(),
        Some(Value::String(s)) => s
            .split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(String::from)
            .collect(),
        _ => Vec::new(),
    }
}

fn date_field(
    meta: &Value,
    keys: &[&str],
    path: &std::path::Path,
    warnings: &mut Vec<String>,
) -> Option<OffsetDateTime> {
    for key in keys {
        if let Some(raw) = string_field(meta, key) {
            match parse_date(&raw) {
                Some(date) => return Some(date),
                None => warnings.push(format!(
                    "{}: unrecognized {} {:?}",
                    path.display(),
                    key,
                    raw
                )),
            }
        }
    }
    None
}

/// Parses the date grammars the frontmatter accepts: RFC-3339 / ISO-8601,
/// plain `YYYY-MM-DD`, and long-form English ("January 2, 2006").
pub(crate) fn parse_date(raw: &str) -> Option<OffsetDateTime> {
    let raw = raw.trim();

    if let Ok(dt) = OffsetDateTime::parse(raw, &Rfc3339) {
        return Some(dt);
    }
    if let Ok(dt) = OffsetDateTime::parse(raw, &Iso8601::DEFAULT) {
        return Some(dt);
    }

    const DATE_ONLY: &[time::format_description::FormatItem<'static>] =
        format_description!("[year]-[month]-[day]");
    if let Ok(date) = Date::parse(raw, &DATE_ONLY) {
        return Some(date.with_time(Time::MIDNIGHT).assume_utc());
    }

    const LONG_ENGLISH: &[time::format_description::FormatItem<'static>] = format_description!(
        "[month repr:long case_sensitive:false] [day padding:none], [year]"
    );
    if let Ok(date) = Date::parse(raw, &LONG_ENGLISH) {
        return Some(date.with_time(Time::MIDNIGHT).assume_utc());
    }

    None
}

fn fallback_title(slug: &str) -> String {
    let basename = slug.rsplit('/').next().unwrap_or(slug);
    if basename.is_empty() {
        "Home".to_string()
    } else {
        humanize(basename)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::macros::datetime;

    fn source(rel_path: &str, raw: &str) -> PageSource {
        PageSource {
            rel_path: PathBuf::from(rel_path),
            raw: raw.to_string(),
        }
    }

    #[test]
    fn test_parse_page_with_full_frontmatter() {
        let raw = "---\ntitle: Hello World\ndate: 2024-01-15\ntags:\n  - rust\n  - Gardening\ngrowth: evergreen\ndraft: false\n---\n# Body\n";
        let parsed = parse_page(&source("notes/hello.md", raw)).unwrap();
        let page = parsed.page;

        assert!(parsed.warnings.is_empty());
        assert_eq!(page.title, "Hello World");
        assert_eq!(page.slug, "notes/hello");
        assert_eq!(page.permalink, "/notes/hello/");
        assert_eq!(page.tags, vec!["rust", "Gardening"]);
        assert_eq!(page.growth, Some(Growth::Evergreen));
        assert_eq!(page.date, Some(datetime!(2024-01-15 0:00 UTC)));
        assert_eq!(page.body, "# Body\n");
        assert!(!page.is_index);
    }

    #[test]
    fn test_parse_page_without_frontmatter() {
        let parsed = parse_page(&source("notes/my-first-note.md", "just text")).unwrap();
        assert!(parsed.warnings.is_empty());
        assert_eq!(parsed.page.title, "My First Note");
        assert_eq!(parsed.page.body, "just text");
    }

    #[test]
    fn test_parse_page_unclosed_frontmatter_is_warning() {
        let raw = "---\ntitle: Oops\nno closing fence";
        let parsed = parse_page(&source("a.md", raw)).unwrap();
        assert_eq!(parsed.warnings.len(), 1);
        assert_eq!(parsed.page.body, raw);
        assert_eq!(parsed.page.title, "A");
    }

    #[test]
    fn test_parse_page_malformed_yaml_is_warning() {
        let raw = "---\ntitle: [unclosed\n---\nbody\n";
        let parsed = parse_page(&source("a.md", raw)).unwrap();
        assert_eq!(parsed.warnings.len(), 1);
        // Whole file becomes the body when the frontmatter is unreadable.
        assert_eq!(parsed.page.body, raw);
    }

    #[test]
    fn test_parse_page_invalid_growth_is_fatal() {
        let raw = "---\ngrowth: sapling\n---\nbody\n";
        let err = parse_page(&source("a.md", raw)).unwrap_err();
        assert!(err.to_string().contains("invalid growth"));
    }

    #[test]
    fn test_growth_is_lowercased() {
        let raw = "---\ngrowth: Seedling\n---\nbody\n";
        let parsed = parse_page(&source("a.md", raw)).unwrap();
        assert_eq!(parsed.page.growth, Some(Growth::Seedling));
    }

    #[test]
    fn test_created_aliases_date() {
        let raw = "---\ncreated: 2023-05-01\n---\n";
        let parsed = parse_page(&source("a.md", raw)).unwrap();
        assert_eq!(parsed.page.date, Some(datetime!(2023-05-01 0:00 UTC)));
    }

    #[test]
    fn test_modified_aliases_updated() {
        let raw = "---\nmodified: 2023-06-01\n---\n";
        let parsed = parse_page(&source("a.md", raw)).unwrap();
        assert_eq!(parsed.page.modified, Some(datetime!(2023-06-01 0:00 UTC)));
    }

    #[test]
    fn test_parse_date_grammars() {
        assert_eq!(
            parse_date("2024-01-15T10:30:00+05:00"),
            Some(datetime!(2024-01-15 10:30 +5))
        );
        assert_eq!(parse_date("2024-01-15"), Some(datetime!(2024-01-15 0:00 UTC)));
        assert_eq!(
            parse_date("January 2, 2006"),
            Some(datetime!(2006-01-02 0:00 UTC))
        );
        assert_eq!(parse_date("next tuesday"), None);
    }

    #[test]
    fn test_unparseable_date_is_warning() {
        let raw = "---\ndate: whenever\n---\n";
        let parsed = parse_page(&source("a.md", raw)).unwrap();
        assert!(parsed.page.date.is_none());
        assert_eq!(parsed.warnings.len(), 1);
    }

    #[test]
    fn test_tags_from_comma_separated_string() {
        let raw = "---\ntags: rust, gardening\n---\n";
        let parsed = parse_page(&source("a.md", raw)).unwrap();
        assert_eq!(parsed.page.tags, vec!["rust", "gardening"]);
    }

    #[test]
    fn test_index_page_detection() {
        let parsed = parse_page(&source("notes/_index.md", "listing")).unwrap();
        assert!(parsed.page.is_index);
        assert_eq!(parsed.page.slug, "notes");
        assert_eq!(parsed.page.title, "Notes");
    }

    #[test]
    fn test_root_index_becomes_homepage() {
        let parsed = parse_page(&source("_index.md", "welcome")).unwrap();
        assert_eq!(parsed.page.slug, "");
        assert_eq!(parsed.page.permalink, "/");
        assert_eq!(parsed.page.output_path, PathBuf::from("index.html"));
    }

    #[test]
    fn test_toc_tri_state() {
        let on = parse_page(&source("a.md", "---\ntoc: true\n---\n")).unwrap();
        assert_eq!(on.page.toc, TocSetting::On);
        let off = parse_page(&source("a.md", "---\ntoc: false\n---\n")).unwrap();
        assert_eq!(off.page.toc, TocSetting::Off);
        let unset = parse_page(&source("a.md", "body")).unwrap();
        assert_eq!(unset.page.toc, TocSetting::Unset);
    }

    #[test]
    fn test_reading_time_override() {
        let raw = "---\nreadingTime: 12\n---\nshort body\n";
        let parsed = parse_page(&source("a.md", raw)).unwrap();
        assert_eq!(parsed.page.reading_time, 12);
    }

    #[test]
    fn test_slug_stability_across_parses() {
        let raw = "---\ntitle: T\n---\nbody";
        let a = parse_page(&source("Notes/Deep Dive.md", raw)).unwrap();
        let b = parse_page(&source("Notes/Deep Dive.md", raw)).unwrap();
        assert_eq!(a.page.slug, b.page.slug);
        assert_eq!(a.page.output_path, b.page.output_path);
    }

    #[test]
    fn test_section_sort_parsing() {
        let raw = "---\nsort: growth\n---\n";
        let parsed = parse_page(&source("notes/_index.md", raw)).unwrap();
        assert_eq!(parsed.page.section_sort, SectionSort::Growth);

        let raw = "---\nsort: shuffled\n---\n";
        let parsed = parse_page(&source("notes/_index.md", raw)).unwrap();
        assert_eq!(parsed.page.section_sort, SectionSort::Date);
        assert_eq!(parsed.warnings.len(), 1);
    }
}
