// src/config.rs

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::io::ErrorKind;
use std::path::Path;
use std::{fs, path::PathBuf};
use thiserror::Error;
use tracing::info;

/// Name of the site configuration file, expected at the site root.
pub(crate) const CONFIG_FILE: &str = "leafpress.json";

/// Top-level directories that must never be used as an output directory.
const FORBIDDEN_OUTPUT_DIRS: &[&str] = &[
    "/", "/bin", "/boot", "/dev", "/etc", "/home", "/lib", "/proc", "/root", "/sbin", "/sys",
    "/usr", "/var",
];

#[derive(Error, Debug)]
pub(crate) enum ConfigError {
    #[error("IO error reading config file: {0}")]
    Io(#[from] std::io::Error),
    #[error("JSON parsing error in config file: {0}")]
    JsonParse(#[from] serde_json::Error),
    #[error("Config file not found: {0}")]
    FileNotFound(String),
    #[error("invalid port {0}: must be between 1 and 65535")]
    InvalidPort(u32),
    #[error("refusing to use {0:?} as output directory")]
    DangerousOutputDir(String),
    #[error("invalid accent color {0:?}: expected #RGB or #RRGGBB")]
    InvalidAccent(String),
    #[error("invalid navStyle {0:?}: expected one of base, sticky, glassy")]
    InvalidNavStyle(String),
    #[error("invalid navActiveStyle {0:?}: expected one of base, box, underlined")]
    InvalidNavActiveStyle(String),
    #[error("invalid nav entry: {0}")]
    InvalidNav(String),
    #[error("invalid baseURL {0:?}: expected an http(s) URL")]
    InvalidBaseUrl(String),
}

/// Site configuration as read from `leafpress.json`.
///
/// Values are validated once at load time and read-only for the rest of the
/// build. Unknown fields are preserved (forward compatibility) but have no
/// effect on rendering.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase", default)]
pub(crate) struct Config {
    pub title: String,
    pub author: String,
    pub description: String,
    pub image: String,

    #[serde(rename = "baseURL")]
    pub base_url: String,
    pub output_dir: String,
    pub port: u16,

    pub nav: Vec<NavEntry>,
    pub theme: Theme,

    pub graph: bool,
    pub search: bool,
    pub toc: bool,
    pub backlinks: bool,
    pub wikilinks: bool,

    /// Top-level folder names excluded from the content scan.
    pub ignore: Vec<String>,
    /// Verbatim HTML injected into `<head>` on every page.
    pub head_extra: String,

    #[serde(flatten)]
    pub extra: HashMap<String, serde_json::Value>,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            title: "Digital Garden".to_string(),
            author: String::new(),
            description: String::new(),
            image: String::new(),
            base_url: String::new(),
            output_dir: "dist".to_string(),
            port: 8080,
            nav: Vec::new(),
            theme: Theme::default(),
            graph: true,
            search: true,
            toc: true,
            backlinks: true,
            wikilinks: true,
            ignore: Vec::new(),
            head_extra: String::new(),
            extra: HashMap::new(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub(crate) struct NavEntry {
    pub label: String,
    pub path: String,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase", default)]
pub(crate) struct Theme {
    pub font_heading: String,
    pub font_body: String,
    pub font_mono: String,
    /// `#RGB` or `#RRGGBB`.
    pub accent: String,
    pub background: Background,
    pub nav_style: String,
    pub nav_active_style: String,
}

impl Default for Theme {
    fn default() -> Self {
        Theme {
            font_heading: "Inter".to_string(),
            font_body: "Inter".to_string(),
            font_mono: "JetBrains Mono".to_string(),
            accent: "#4a7c59".to_string(),
            background: Background::default(),
            nav_style: "base".to_string(),
            nav_active_style: "base".to_string(),
        }
    }
}

/// Page background: a single CSS color or gradient string, or a light/dark
/// pair picked by `prefers-color-scheme`.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(untagged)]
pub(crate) enum Background {
    Single(String),
    Scheme { light: String, dark: String },
}

impl Default for Background {
    fn default() -> Self {
        Background::Single("#fffdf7".to_string())
    }
}

impl Config {
    pub(crate) fn load_from_file(config_file: &str) -> Result<Config, ConfigError> {
        let content = fs::read_to_string(config_file).map_err(|e| {
            if e.kind() == ErrorKind::NotFound {
                ConfigError::FileNotFound(config_file.to_string())
            } else {
                e.into()
            }
        })?;

        let config = Self::from_str(&content)?;
        info!("config::load {} parsed and validated", config_file);
        Ok(config)
    }

    pub(crate) fn from_str(content: &str) -> Result<Config, ConfigError> {
        let config: Config = serde_json::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// All validation happens before any build work begins; a config that
    /// loads is a config the rest of the pipeline can trust.
    fn validate(&self) -> Result<(), ConfigError> {
        if self.port == 0 {
            return Err(ConfigError::InvalidPort(0));
        }

        let out = self.output_dir.trim_end_matches('/');
        if out.is_empty() || out == "." || out == ".." {
            return Err(ConfigError::DangerousOutputDir(self.output_dir.clone()));
        }
        if FORBIDDEN_OUTPUT_DIRS.contains(&out) {
            return Err(ConfigError::DangerousOutputDir(self.output_dir.clone()));
        }

        if !self.base_url.is_empty()
            && !self.base_url.starts_with("http://")
            && !self.base_url.starts_with("https://")
        {
            return Err(ConfigError::InvalidBaseUrl(self.base_url.clone()));
        }

        for entry in &self.nav {
            if entry.label.trim().is_empty() {
                return Err(ConfigError::InvalidNav(format!(
                    "empty label for path {:?}",
                    entry.path
                )));
            }
            if !entry.path.starts_with('/') {
                return Err(ConfigError::InvalidNav(format!(
                    "path {:?} must start with '/'",
                    entry.path
                )));
            }
        }

        if !is_valid_hex_color(&self.theme.accent) {
            return Err(ConfigError::InvalidAccent(self.theme.accent.clone()));
        }
        if !matches!(self.theme.nav_style.as_str(), "base" | "sticky" | "glassy") {
            return Err(ConfigError::InvalidNavStyle(self.theme.nav_style.clone()));
        }
        if !matches!(
            self.theme.nav_active_style.as_str(),
            "base" | "box" | "underlined"
        ) {
            return Err(ConfigError::InvalidNavActiveStyle(
                self.theme.nav_active_style.clone(),
            ));
        }

        Ok(())
    }

    /// Path component of `baseURL`, without a trailing slash. Prepended to
    /// every absolute link the generator emits, so sites hosted under a
    /// subdirectory keep working.
    pub(crate) fn base_path(&self) -> String {
        if self.base_url.is_empty() {
            return String::new();
        }
        let without_scheme = self.base_url.splitn(4, '/').nth(3).unwrap_or("");
        if without_scheme.is_empty() {
            String::new()
        } else {
            format!("/{}", without_scheme.trim_end_matches('/'))
        }
    }

    /// `baseURL` without a trailing slash, for absolute URLs in feeds.
    pub(crate) fn base_url_trimmed(&self) -> &str {
        self.base_url.trim_end_matches('/')
    }

    pub(crate) fn output_dir_path(&self) -> PathBuf {
        PathBuf::from(&self.output_dir)
    }

    /// True when the path's first component is in the `ignore` list.
    pub(crate) fn is_ignored(&self, rel_path: &Path) -> bool {
        rel_path
            .components()
            .next()
            .and_then(|c| c.as_os_str().to_str())
            .is_some_and(|top| self.ignore.iter().any(|i| i == top))
    }
}

fn is_valid_hex_color(s: &str) -> bool {
    let Some(hex) = s.strip_prefix('#') else {
        return false;
    };
    (hex.len() == 3 || hex.len() == 6) && hex.chars().all(|c| c.is_ascii_hexdigit())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        let config = Config::from_str("{}").unwrap();
        assert_eq!(config.title, "Digital Garden");
        assert_eq!(config.output_dir, "dist");
        assert!(config.graph && config.search && config.toc);
        assert!(config.backlinks && config.wikilinks);
    }

    #[test]
    fn test_full_config_parses() {
        let json = r##"{
            "title": "My Garden",
            "author": "A. Gardener",
            "baseURL": "https://example.com/garden/",
            "outputDir": "public",
            "port": 3000,
            "nav": [{"label": "Home", "path": "/"}, {"label": "Tags", "path": "/tags/"}],
            "theme": {"accent": "#abc", "navStyle": "sticky", "navActiveStyle": "underlined"},
            "graph": false,
            "ignore": ["templates", "drafts"]
        }"##;
        let config = Config::from_str(json).unwrap();
        assert_eq!(config.title, "My Garden");
        assert_eq!(config.port, 3000);
        assert!(!config.graph);
        assert_eq!(config.nav.len(), 2);
        assert_eq!(config.theme.nav_style, "sticky");
    }

    #[test]
    fn test_unknown_fields_are_preserved() {
        let config = Config::from_str(r#"{"futureOption": 42}"#).unwrap();
        assert_eq!(
            config.extra.get("futureOption"),
            Some(&serde_json::json!(42))
        );
    }

    #[test]
    fn test_rejects_dangerous_output_dir() {
        for dir in ["/", "/etc", "/usr", "", "."] {
            let json = format!(r#"{{"outputDir": "{}"}}"#, dir);
            assert!(
                Config::from_str(&json).is_err(),
                "outputDir {:?} should be rejected",
                dir
            );
        }
    }

    #[test]
    fn test_rejects_bad_accent() {
        for accent in ["4a7c59", "#12", "#12345", "#xyzxyz"] {
            let json = format!(r#"{{"theme": {{"accent": "{}"}}}}"#, accent);
            assert!(Config::from_str(&json).is_err(), "{} should fail", accent);
        }
        let ok = Config::from_str(r##"{"theme": {"accent": "#a1B2c3"}}"##);
        assert!(ok.is_ok());
    }

    #[test]
    fn test_rejects_unknown_nav_style() {
        let err = Config::from_str(r#"{"theme": {"navStyle": "floaty"}}"#).unwrap_err();
        assert!(err.to_string().contains("navStyle"));
    }

    #[test]
    fn test_rejects_unknown_nav_active_style() {
        let err = Config::from_str(r#"{"theme": {"navActiveStyle": "wiggle"}}"#).unwrap_err();
        assert!(err.to_string().contains("navActiveStyle"));
    }

    #[test]
    fn test_rejects_malformed_nav() {
        let err = Config::from_str(r#"{"nav": [{"label": "x", "path": "about"}]}"#).unwrap_err();
        assert!(err.to_string().contains("must start with '/'"));

        let err = Config::from_str(r#"{"nav": [{"label": " ", "path": "/a"}]}"#).unwrap_err();
        assert!(err.to_string().contains("empty label"));
    }

    #[test]
    fn test_base_path_extraction() {
        let config = Config::from_str(r#"{"baseURL": "https://example.com/garden/"}"#).unwrap();
        assert_eq!(config.base_path(), "/garden");

        let config = Config::from_str(r#"{"baseURL": "https://example.com"}"#).unwrap();
        assert_eq!(config.base_path(), "");

        let config = Config::from_str("{}").unwrap();
        assert_eq!(config.base_path(), "");
    }

    #[test]
    fn test_rejects_bad_base_url() {
        let err = Config::from_str(r#"{"baseURL": "example.com"}"#).unwrap_err();
        assert!(err.to_string().contains("baseURL"));
    }

    #[test]
    fn test_is_ignored() {
        let config = Config::from_str(r#"{"ignore": ["drafts"]}"#).unwrap();
        assert!(config.is_ignored(Path::new("drafts/wip.md")));
        assert!(!config.is_ignored(Path::new("notes/drafts.md")));
    }

    #[test]
    fn test_background_scheme_variant() {
        let config =
            Config::from_str(r##"{"theme": {"background": {"light": "#fff", "dark": "#111"}}}"##)
                .unwrap();
        match config.theme.background {
            Background::Scheme { ref light, ref dark } => {
                assert_eq!(light, "#fff");
                assert_eq!(dark, "#111");
            }
            _ => panic!("expected scheme background"),
        }
    }

    #[test]
    fn test_port_zero_rejected() {
        // serde will fail u16 range for 70000; zero passes serde but not validation
        let err = Config::from_str(r#"{"port": 0}"#).unwrap_err();
        assert!(err.to_string().contains("port"));
    }
}
