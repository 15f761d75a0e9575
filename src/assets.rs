// src/assets.rs
//
// Everything the binary ships so a site builds with zero scaffolding:
// templates, the default stylesheet, and a fallback favicon.

use crate::config::{Background, Theme};

pub(crate) const HEAD_PARTIAL: &str = r#"<meta charset="utf-8">
<meta name="viewport" content="width=device-width, initial-scale=1">
<title>{{ page_title }} · {{ site.title }}</title>
{% if site.description %}<meta name="description" content="{{ site.description }}">{% endif %}
{% if site.author %}<meta name="author" content="{{ site.author }}">{% endif %}
{% if site.image %}<meta property="og:image" content="{{ site.image }}">{% endif %}
<link rel="icon" href="{{ site.base_path|url }}/{{ site.favicon }}">
<link rel="stylesheet" href="{{ site.base_path|url }}/css/style.css">
<link rel="alternate" type="application/rss+xml" title="{{ site.title }}" href="{{ site.base_path|url }}/feed.xml">
{% if site.font_href %}<link rel="preconnect" href="https://fonts.googleapis.com">
<link rel="stylesheet" href="{{ site.font_href|url }}">{% endif %}
{{ site.head_extra|safe }}"#;

pub(crate) const NAV_PARTIAL: &str = r#"<nav class="nav nav-{{ site.nav_style }} nav-active-{{ site.nav_active_style }}">
  <a class="nav-title" href="{{ site.base_path|url }}/">{{ site.title }}</a>
  <div class="nav-links">
  {% for item in site.nav %}
    <a href="{{ item.url|url }}"{% if item.path == active_path %} class="active"{% endif %}>{{ item.label }}</a>
  {% endfor %}
  </div>
</nav>"#;

pub(crate) const PAGE_TEMPLATE: &str = r##"<!doctype html>
<html lang="en">
<head>
{% with page_title = page.title %}{% include "head.html" %}{% endwith %}
</head>
<body>
{% with active_path = page.permalink %}{% include "nav.html" %}{% endwith %}
<main>
  <article>
    <header>
      <h1>{{ page.title }}</h1>
      <div class="page-meta">
        {% if page.date %}<time>{{ page.date }}</time>{% endif %}
        {% if page.growth %}<span class="growth growth-{{ page.growth }}">{{ page.growth }}</span>{% endif %}
        <span class="reading-time">{{ page.reading_time }} min read</span>
      </div>
    </header>
    {% if toc %}
    <nav class="toc">
      <ul>
      {% for entry in toc %}
        <li class="toc-{{ entry.level }}"><a href="#{{ entry.id }}">{{ entry.text }}</a></li>
      {% endfor %}
      </ul>
    </nav>
    {% endif %}
    <div class="content">
{{ page.content|safe }}
    </div>
    {% if listing %}
    <ul class="page-list">
    {% for item in listing %}
      <li>
        <a href="{{ item.url|url }}">{{ item.title }}</a>
        {% if item.growth %}<span class="growth growth-{{ item.growth }}">{{ item.growth }}</span>{% endif %}
        {% if item.date %}<time>{{ item.date }}</time>{% endif %}
      </li>
    {% endfor %}
    </ul>
    {% endif %}
    {% if page.tags %}
    <div class="tags">
    {% for tag in page.tags %}
      <a class="tag" href="{{ tag.url|url }}">#{{ tag.name }}</a>
    {% endfor %}
    </div>
    {% endif %}
    {% if backlinks %}
    <section class="backlinks">
      <h2>Linked from</h2>
      <ul>
      {% for link in backlinks %}
        <li><a href="{{ link.url|url }}">{{ link.title }}</a></li>
      {% endfor %}
      </ul>
    </section>
    {% endif %}
  </article>
</main>
</body>
</html>"##;

pub(crate) const SECTION_TEMPLATE: &str = r#"<!doctype html>
<html lang="en">
<head>
{% with page_title = section.title %}{% include "head.html" %}{% endwith %}
</head>
<body>
{% with active_path = section.permalink %}{% include "nav.html" %}{% endwith %}
<main>
  <article>
    <header><h1>{{ section.title }}</h1></header>
    <ul class="page-list">
    {% for item in listing %}
      <li>
        <a href="{{ item.url|url }}">{{ item.title }}</a>
        {% if item.growth %}<span class="growth growth-{{ item.growth }}">{{ item.growth }}</span>{% endif %}
        {% if item.date %}<time>{{ item.date }}</time>{% endif %}
      </li>
    {% endfor %}
    </ul>
  </article>
</main>
</body>
</html>"#;

pub(crate) const TAG_CLOUD_TEMPLATE: &str = r#"<!doctype html>
<html lang="en">
<head>
{% with page_title = "Tags" %}{% include "head.html" %}{% endwith %}
</head>
<body>
{% with active_path = "/tags/" %}{% include "nav.html" %}{% endwith %}
<main>
  <article>
    <header><h1>Tags</h1></header>
    <div class="tag-cloud">
    {% for tag in tags %}
      <a class="tag" href="{{ tag.url|url }}">#{{ tag.name }} <span class="count">{{ tag.count }}</span></a>
    {% endfor %}
    </div>
  </article>
</main>
</body>
</html>"#;

pub(crate) const TAG_PAGE_TEMPLATE: &str = r##"<!doctype html>
<html lang="en">
<head>
{% with page_title = "#" ~ tag.name %}{% include "head.html" %}{% endwith %}
</head>
<body>
{% with active_path = "/tags/" %}{% include "nav.html" %}{% endwith %}
<main>
  <article>
    <header><h1>#{{ tag.name }}</h1></header>
    <ul class="page-list">
    {% for item in listing %}
      <li>
        <a href="{{ item.url|url }}">{{ item.title }}</a>
        {% if item.date %}<time>{{ item.date }}</time>{% endif %}
      </li>
    {% endfor %}
    </ul>
  </article>
</main>
</body>
</html>"##;

pub(crate) const NOT_FOUND_TEMPLATE: &str = r#"<!doctype html>
<html lang="en">
<head>
{% with page_title = "Not Found" %}{% include "head.html" %}{% endwith %}
</head>
<body>
{% with active_path = "" %}{% include "nav.html" %}{% endwith %}
<main>
  <article class="not-found">
    <h1>404</h1>
    <p>This note does not exist (yet).</p>
    <p><a href="{{ site.base_path|url }}/">Back to the garden</a></p>
  </article>
</main>
</body>
</html>"#;

/// Baseline stylesheet; the theme block generated from config is prepended
/// and the user's `style.css` appended, so both can override it.
pub(crate) const DEFAULT_CSS: &str = r#"
* { box-sizing: border-box; }
body {
  margin: 0;
  font-family: var(--font-body), system-ui, sans-serif;
  background: var(--background);
  color: #1c1b17;
  line-height: 1.65;
}
h1, h2, h3, h4 { font-family: var(--font-heading), system-ui, sans-serif; line-height: 1.25; }
code, pre, kbd { font-family: var(--font-mono), ui-monospace, monospace; font-size: 0.92em; }
main { max-width: 44rem; margin: 0 auto; padding: 1.5rem 1rem 4rem; }
a { color: var(--accent); }

.nav { display: flex; justify-content: space-between; align-items: baseline; padding: 0.8rem 1.2rem; border-bottom: 1px solid rgba(0,0,0,0.08); }
.nav-sticky { position: sticky; top: 0; background: var(--background); z-index: 10; }
.nav-glassy { position: sticky; top: 0; backdrop-filter: blur(8px); background: rgba(255,255,255,0.7); z-index: 10; }
.nav-title { font-weight: 700; text-decoration: none; }
.nav-links a { margin-left: 1rem; text-decoration: none; }
.nav-active-box .nav-links a.active { background: var(--accent); color: #fff; padding: 0.15rem 0.5rem; border-radius: 4px; }
.nav-active-underlined .nav-links a.active { text-decoration: underline; text-underline-offset: 0.3em; }

.page-meta { color: #6b6a64; font-size: 0.9rem; display: flex; gap: 0.8rem; }
.wikilink { text-decoration-style: dotted; }
.broken-link { color: #a33; border-bottom: 1px dashed #a33; cursor: help; }

.callout { border-left: 4px solid var(--accent); border-radius: 4px; background: rgba(0,0,0,0.04); padding: 0.6rem 1rem; margin: 1rem 0; }
.callout-title { font-weight: 600; margin-bottom: 0.3rem; }
.callout-warning, .callout-danger, .callout-caution { border-left-color: #c4541f; }
.callout-tip, .callout-success { border-left-color: #3a7d44; }
.callout-question, .callout-info { border-left-color: #2b6cb0; }

.growth { font-size: 0.8rem; padding: 0.1rem 0.4rem; border-radius: 999px; background: rgba(0,0,0,0.06); }
.growth-seedling::before { content: "🌱 "; }
.growth-budding::before { content: "🌿 "; }
.growth-evergreen::before { content: "🌳 "; }

.toc { border: 1px solid rgba(0,0,0,0.1); border-radius: 6px; padding: 0.6rem 1rem; font-size: 0.92rem; }
.toc ul { margin: 0; padding-left: 1rem; list-style: none; }
.toc .toc-3 { padding-left: 1rem; }

.tags { margin-top: 1.5rem; }
.tag { margin-right: 0.6rem; text-decoration: none; }
.tag .count { color: #6b6a64; font-size: 0.85em; }
.tag-cloud { line-height: 2.2; }

.page-list { list-style: none; padding: 0; }
.page-list li { display: flex; gap: 0.7rem; align-items: baseline; padding: 0.25rem 0; }
.page-list time { color: #6b6a64; font-size: 0.85rem; margin-left: auto; }

.backlinks { margin-top: 2.5rem; border-top: 1px solid rgba(0,0,0,0.1); padding-top: 1rem; }
.backlinks h2 { font-size: 1rem; }

.chroma { border-radius: 6px; padding: 0.8rem 1rem; overflow-x: auto; }
img { max-width: 100%; }
.not-found { text-align: center; padding-top: 4rem; }
"#;

/// Fallback favicon written when the site supplies none of its own.
pub(crate) const FAVICON_SVG: &str = r##"<svg xmlns="http://www.w3.org/2000/svg" viewBox="0 0 16 16"><path fill="#4a7c59" d="M8 1C4 1 1 4 1 8c0 4 3 7 7 7 0-4 0-7 0-7s3 0 7 0c0-4-3-7-7-7z"/><path fill="#2f5138" d="M8 15c0-4 0-7 0-7l-4 4c1 2 2.5 3 4 3z"/></svg>
"##;

/// CSS custom properties derived from the configured theme. Prepended to
/// the stylesheet bundle so the defaults below pick them up.
pub(crate) fn theme_css(theme: &Theme) -> String {
    let mut css = String::from(":root {\n");
    css.push_str(&format!("  --accent: {};\n", theme.accent));
    css.push_str(&format!("  --font-heading: \"{}\";\n", theme.font_heading));
    css.push_str(&format!("  --font-body: \"{}\";\n", theme.font_body));
    css.push_str(&format!("  --font-mono: \"{}\";\n", theme.font_mono));
    match &theme.background {
        Background::Single(color) => {
            css.push_str(&format!("  --background: {};\n", color));
            css.push_str("}\n");
        }
        Background::Scheme { light, dark } => {
            css.push_str(&format!("  --background: {};\n", light));
            css.push_str("}\n");
            css.push_str(&format!(
                "@media (prefers-color-scheme: dark) {{\n  :root {{ --background: {}; }}\n}}\n",
                dark
            ));
        }
    }
    css
}

/// Google Fonts stylesheet URL for the configured families, or `None` when
/// every family is empty.
pub(crate) fn google_fonts_href(theme: &Theme) -> Option<String> {
    let mut families: Vec<&str> = vec![
        theme.font_heading.as_str(),
        theme.font_body.as_str(),
        theme.font_mono.as_str(),
    ];
    families.retain(|f| !f.trim().is_empty());
    families.dedup();
    if families.is_empty() {
        return None;
    }

    let query: Vec<String> = families
        .iter()
        .map(|f| format!("family={}", f.replace(' ', "+")))
        .collect();
    Some(format!(
        "https://fonts.googleapis.com/css2?{}&display=swap",
        query.join("&")
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;

    #[test]
    fn test_theme_css_contains_variables() {
        let config = Config::from_str("{}").unwrap();
        let css = theme_css(&config.theme);
        assert!(css.contains("--accent: #4a7c59;"));
        assert!(css.contains("--font-body: \"Inter\";"));
        assert!(css.contains("--background: #fffdf7;"));
    }

    #[test]
    fn test_theme_css_light_dark_scheme() {
        let config = Config::from_str(
            r##"{"theme": {"background": {"light": "#fff", "dark": "#111"}}}"##,
        )
        .unwrap();
        let css = theme_css(&config.theme);
        assert!(css.contains("--background: #fff;"));
        assert!(css.contains("prefers-color-scheme: dark"));
        assert!(css.contains("--background: #111;"));
    }

    #[test]
    fn test_google_fonts_href() {
        let config = Config::from_str("{}").unwrap();
        let href = google_fonts_href(&config.theme).unwrap();
        assert!(href.starts_with("https://fonts.googleapis.com/css2?"));
        assert!(href.contains("family=Inter"));
        assert!(href.contains("family=JetBrains+Mono"));
    }

    #[test]
    fn test_google_fonts_href_empty_when_no_fonts() {
        let config = Config::from_str(
            r#"{"theme": {"fontHeading": "", "fontBody": "", "fontMono": ""}}"#,
        )
        .unwrap();
        assert!(google_fonts_href(&config.theme).is_none());
    }
}
