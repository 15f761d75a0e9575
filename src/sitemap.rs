// src/sitemap.rs

use time::OffsetDateTime;
use time::macros::format_description;

use crate::config::Config;
use crate::page::Page;

/// Generates a sitemap.xml string following the sitemap v0.9 protocol.
///
/// One `<url>` per page, newest first (modified-else-created, ties broken
/// by slug) so the output is byte-stable across builds.
pub(crate) fn generate_sitemap(config: &Config, pages: &[Page]) -> String {
    let mut xml = String::new();

    xml.push_str(r#"<?xml version="1.0" encoding="UTF-8"?>"#);
    xml.push('\n');
    xml.push_str(r#"<urlset xmlns="http://www.sitemaps.org/schemas/sitemap/0.9">"#);
    xml.push('\n');

    let base_url = config.base_url_trimmed();

    let mut ordered: Vec<&Page> = pages.iter().collect();
    ordered.sort_by(|a, b| {
        b.effective_date()
            .cmp(&a.effective_date())
            .then_with(|| a.slug.cmp(&b.slug))
    });

    for page in ordered {
        xml.push_str(&format_url_entry(
            base_url,
            &page.permalink,
            page.effective_date().as_ref(),
        ));
    }

    xml.push_str("</urlset>\n");
    xml
}

/// Formats a single URL entry for the sitemap.
fn format_url_entry(base_url: &str, path: &str, lastmod: Option<&OffsetDateTime>) -> String {
    let mut entry = String::new();
    entry.push_str("  <url>\n");
    entry.push_str(&format!("    <loc>{}{}</loc>\n", base_url, path));

    if let Some(date) = lastmod {
        // Format validated at compile time via macro
        const FORMAT: &[time::format_description::FormatItem<'static>] =
            format_description!("[year]-[month]-[day]");
        if let Ok(formatted) = date.format(&FORMAT) {
            entry.push_str(&format!("    <lastmod>{}</lastmod>\n", formatted));
        }
    }

    entry.push_str("  </url>\n");
    entry
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use std::path::PathBuf;
    use time::macros::datetime;

    fn page(slug: &str, date: Option<OffsetDateTime>) -> Page {
        Page {
            source_path: PathBuf::from(format!("{}.md", slug)),
            slug: slug.to_string(),
            permalink: crate::utils::permalink_for_slug(slug),
            date,
            ..Page::default()
        }
    }

    #[test]
    fn test_sitemap_structure() {
        let config = Config::from_str(r#"{"baseURL": "https://example.com"}"#).unwrap();
        let pages = vec![page("hello", Some(datetime!(2024-01-15 10:00 UTC)))];

        let sitemap = generate_sitemap(&config, &pages);

        assert!(sitemap.contains(r#"<?xml version="1.0" encoding="UTF-8"?>"#));
        assert!(sitemap.contains(r#"<urlset xmlns="http://www.sitemaps.org/schemas/sitemap/0.9">"#));
        assert!(sitemap.contains("<loc>https://example.com/hello/</loc>"));
        assert!(sitemap.contains("<lastmod>2024-01-15</lastmod>"));
        assert!(sitemap.contains("</urlset>"));
    }

    #[test]
    fn test_sitemap_homepage_entry() {
        let config = Config::from_str(r#"{"baseURL": "https://example.com"}"#).unwrap();
        let pages = vec![page("", None)];

        let sitemap = generate_sitemap(&config, &pages);
        assert!(sitemap.contains("<loc>https://example.com/</loc>"));
        assert!(!sitemap.contains("<lastmod>"));
    }

    #[test]
    fn test_sitemap_lastmod_prefers_modified() {
        let config = Config::from_str("{}").unwrap();
        let mut p = page("note", Some(datetime!(2024-01-01 0:00 UTC)));
        p.modified = Some(datetime!(2024-03-01 0:00 UTC));

        let sitemap = generate_sitemap(&config, &[p]);
        assert!(sitemap.contains("<lastmod>2024-03-01</lastmod>"));
        assert!(!sitemap.contains("2024-01-01"));
    }

    #[test]
    fn test_sitemap_order_is_deterministic() {
        let config = Config::from_str("{}").unwrap();
        let pages = vec![
            page("b", Some(datetime!(2024-01-01 0:00 UTC))),
            page("a", Some(datetime!(2024-01-01 0:00 UTC))),
            page("newer", Some(datetime!(2024-05-01 0:00 UTC))),
        ];

        let sitemap = generate_sitemap(&config, &pages);
        let newer = sitemap.find("/newer/").unwrap();
        let a = sitemap.find("<loc>/a/").unwrap();
        let b = sitemap.find("<loc>/b/").unwrap();
        assert!(newer < a);
        assert!(a < b);

        assert_eq!(sitemap, generate_sitemap(&config, &pages));
    }

    #[test]
    fn test_sitemap_balanced_tags() {
        let config = Config::from_str("{}").unwrap();
        let pages = vec![page("one", None), page("two", None)];
        let sitemap = generate_sitemap(&config, &pages);
        assert_eq!(sitemap.matches("<url>").count(), 2);
        assert_eq!(sitemap.matches("</url>").count(), 2);
    }
}
