// src/syntax.rs

use autumnus::formatter::Formatter;
use autumnus::languages::Language;
use autumnus::{HtmlInlineBuilder, themes};
use thiserror::Error;

/// Theme used for all server-side highlighting.
pub(crate) const HIGHLIGHT_THEME: &str = "github_light";

#[derive(Error, Debug)]
pub(crate) enum SyntaxError {
    #[error("Failed to highlight code: {0}")]
    Highlight(String),

    #[error("Invalid theme '{0}': {1}")]
    InvalidTheme(String, String),

    #[error("I/O error during highlighting: {0}")]
    Io(#[from] std::io::Error),
}

/// Maps fence info strings to Autumnus Language variants
fn map_lang_to_autumnus(lang: &str) -> Option<Language> {
    let lang = lang.trim().to_lowercase();

    match lang.as_str() {
        "rust" => Some(Language::Rust),
        "python" | "py" => Some(Language::Python),
        "javascript" | "js" => Some(Language::JavaScript),
        "typescript" | "ts" => Some(Language::TypeScript),
        "html" => Some(Language::HTML),
        "css" => Some(Language::CSS),
        "bash" | "sh" | "shell" => Some(Language::Bash),
        "json" => Some(Language::JSON),
        "toml" => Some(Language::Toml),
        "yaml" | "yml" => Some(Language::YAML),
        "plaintext" | "text" | "txt" => Some(Language::PlainText),
        _ => None,
    }
}

/// Highlights one code block into a `chroma`-classed `<pre>` so the frontend
/// can attach copy buttons to every fence uniformly.
pub(crate) fn highlight_code_block(code: &str, lang: Option<&str>) -> Result<String, SyntaxError> {
    let theme = themes::get(HIGHLIGHT_THEME)
        .map_err(|e| SyntaxError::InvalidTheme(HIGHLIGHT_THEME.to_string(), e.to_string()))?;

    let autumnus_lang = lang
        .and_then(map_lang_to_autumnus)
        .unwrap_or(Language::PlainText);

    let formatter = HtmlInlineBuilder::new()
        .source(code)
        .lang(autumnus_lang)
        .theme(Some(theme))
        .pre_class(Some("chroma"))
        .build()
        .map_err(|e| SyntaxError::Highlight(e.to_string()))?;

    let mut output = Vec::new();
    formatter
        .format(&mut output)
        .map_err(|e| SyntaxError::Highlight(e.to_string()))?;
    String::from_utf8(output)
        .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e).into())
}

/// Extracts the language from a code block's class attribute
fn extract_language_from_class(class: &str) -> Option<&str> {
    class
        .split_whitespace()
        .find(|c| c.starts_with("language-"))
        .map(|c| &c[9..])
}

/// The Markdown engine escapes fence content; undo that before handing the
/// raw source to the highlighter, which escapes its own output.
fn decode_entities(code: &str) -> String {
    code.replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&#39;", "'")
        .replace("&amp;", "&")
}

/// Highlights all `<pre><code>` blocks in rendered HTML.
///
/// Scans for the blocks the Markdown engine emits rather than parsing the
/// whole document; the fence content between the tags is replaced with the
/// highlighter's output wholesale.
pub(crate) fn highlight_html(html: &str) -> Result<String, SyntaxError> {
    if !html.contains("<pre><code") {
        return Ok(html.to_string());
    }

    let mut result = String::with_capacity(html.len() * 2);
    let mut remaining = html;

    while let Some(start_idx) = remaining.find("<pre><code") {
        result.push_str(&remaining[..start_idx]);

        let tag_end = remaining[start_idx..].find('>').ok_or_else(|| {
            std::io::Error::new(
                std::io::ErrorKind::InvalidData,
                "Malformed HTML: missing '>' in <code> tag",
            )
        })? + start_idx
            + 1;

        let opening_tag = &remaining[start_idx..tag_end];

        let lang = if let Some(class_start) = opening_tag.find("class=\"") {
            let class_start = class_start + 7;
            if let Some(class_end) = opening_tag[class_start..].find('"') {
                let class_str = &opening_tag[class_start..class_start + class_end];
                extract_language_from_class(class_str)
            } else {
                None
            }
        } else {
            None
        };

        let code_end_pattern = "</code></pre>";
        let code_end = remaining[tag_end..].find(code_end_pattern).ok_or_else(|| {
            std::io::Error::new(
                std::io::ErrorKind::InvalidData,
                "Malformed HTML: missing closing </code></pre>",
            )
        })?;

        let code_content = decode_entities(&remaining[tag_end..tag_end + code_end]);
        let block_end = tag_end + code_end + code_end_pattern.len();

        let highlighted = highlight_code_block(&code_content, lang)?;
        result.push_str(&highlighted);

        remaining = &remaining[block_end..];
    }

    result.push_str(remaining);

    Ok(result)
}
