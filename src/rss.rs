// src/rss.rs

use time::OffsetDateTime;

use crate::config::Config;
use crate::page::Page;
use crate::utils::strip_html;

/// Most recent pages the feed carries.
const FEED_LIMIT: usize = 20;

/// Characters of stripped content used as an item description when the page
/// has no explicit one.
const DESCRIPTION_CHARS: usize = 280;

/// Generates an RSS 2.0 feed with an Atom self-link.
///
/// Index pages are excluded; the rest sort newest-first on
/// modified-else-created with slug breaking ties, capped at 20 items.
pub(crate) fn generate_rss(config: &Config, pages: &[Page]) -> String {
    let mut xml = String::new();
    let base_url = config.base_url_trimmed();

    xml.push_str(r#"<?xml version="1.0" encoding="UTF-8"?>"#);
    xml.push('\n');
    xml.push_str(r#"<rss version="2.0" xmlns:atom="http://www.w3.org/2005/Atom">"#);
    xml.push('\n');
    xml.push_str("  <channel>\n");

    xml.push_str(&format!("    <title>{}</title>\n", xml_escape(&config.title)));
    xml.push_str(&format!("    <link>{}/</link>\n", base_url));
    xml.push_str(&format!(
        "    <description>{}</description>\n",
        xml_escape(&config.description)
    ));
    xml.push_str("    <language>en</language>\n");
    if !config.author.is_empty() {
        xml.push_str(&format!(
            "    <managingEditor>{}</managingEditor>\n",
            xml_escape(&config.author)
        ));
    }
    xml.push_str(&format!(
        "    <atom:link href=\"{}/feed.xml\" rel=\"self\" type=\"application/rss+xml\"/>\n",
        base_url
    ));

    let mut items: Vec<&Page> = pages.iter().filter(|p| !p.is_index).collect();
    items.sort_by(|a, b| {
        b.effective_date()
            .cmp(&a.effective_date())
            .then_with(|| a.slug.cmp(&b.slug))
    });
    items.truncate(FEED_LIMIT);

    for page in items {
        xml.push_str(&format_item(page, base_url));
    }

    xml.push_str("  </channel>\n");
    xml.push_str("</rss>\n");

    xml
}

/// Formats a single RSS item entry.
fn format_item(page: &Page, base_url: &str) -> String {
    let mut item = String::new();
    item.push_str("    <item>\n");

    item.push_str(&format!(
        "      <title>{}</title>\n",
        xml_escape(&page.title)
    ));

    let url = format!("{}{}", base_url, page.permalink);
    item.push_str(&format!("      <link>{}</link>\n", url));
    item.push_str(&format!("      <guid>{}</guid>\n", url));

    let description = match &page.description {
        Some(d) => d.clone(),
        None => {
            let mut text = strip_html(&page.html_content);
            if let Some((cut, _)) = text.char_indices().nth(DESCRIPTION_CHARS) {
                text.truncate(cut);
                text.push('…');
            }
            text
        }
    };
    if !description.is_empty() {
        item.push_str(&format!(
            "      <description>{}</description>\n",
            xml_escape(&description)
        ));
    }

    if let Some(author) = &page.author {
        item.push_str(&format!("      <author>{}</author>\n", xml_escape(author)));
    }

    if let Some(date) = page.effective_date() {
        item.push_str(&format!(
            "      <pubDate>{}</pubDate>\n",
            format_rfc2822(&date)
        ));
    }

    item.push_str("    </item>\n");
    item
}

/// Formats a date in RFC 2822 format for RSS pubDate.
///
/// Example: "Mon, 15 Jan 2024 10:30:00 +0000"
fn format_rfc2822(date: &OffsetDateTime) -> String {
    use time::format_description::well_known::Rfc2822;
    date.format(&Rfc2822).unwrap_or_default()
}

/// Escapes special XML characters in a string.
fn xml_escape(s: &str) -> String {
    let mut result = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => result.push_str("&amp;"),
            '<' => result.push_str("&lt;"),
            '>' => result.push_str("&gt;"),
            '"' => result.push_str("&quot;"),
            '\'' => result.push_str("&apos;"),
            _ => result.push(c),
        }
    }
    result
}
