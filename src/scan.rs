// src/scan.rs

use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::debug;
use walkdir::WalkDir;

use crate::config::Config;

#[derive(Error, Debug)]
pub(crate) enum ScanError {
    #[error("I/O error scanning content tree at {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// A Markdown file found in the content tree, not yet parsed.
#[derive(Debug)]
pub(crate) struct PageSource {
    /// Path relative to the content root. Identity key for the page.
    pub rel_path: PathBuf,
    pub raw: String,
}

/// Walks the content root and reads every `.md` file into a `PageSource`.
///
/// Hidden entries, the output directory, and any top-level folder named in
/// `ignore` are skipped. Files are returned in a stable order (path-sorted),
/// which downstream passes treat as scan order.
pub(crate) fn scan_content(root: &Path, config: &Config) -> Result<Vec<PageSource>, ScanError> {
    let output_dir = config.output_dir_path();
    let mut sources = Vec::new();

    let walker = WalkDir::new(root)
        .sort_by_file_name()
        .into_iter()
        .filter_entry(|entry| {
            let Ok(rel) = entry.path().strip_prefix(root) else {
                return true;
            };
            if rel.as_os_str().is_empty() {
                return true; // the root itself
            }
            if is_hidden(rel) {
                return false;
            }
            if rel == output_dir || rel.starts_with(&output_dir) {
                return false;
            }
            // static/ is asset territory; C9 mirrors it verbatim
            if rel == Path::new("static") {
                return false;
            }
            !config.is_ignored(rel)
        });

    for entry in walker {
        let entry = entry.map_err(|e| ScanError::Io {
            path: e.path().map(Path::to_path_buf).unwrap_or_default(),
            source: e
                .into_io_error()
                .unwrap_or_else(|| std::io::Error::other("walkdir loop")),
        })?;

        if !entry.file_type().is_file() {
            continue;
        }
        let path = entry.path();
        if path.extension().is_none_or(|ext| ext != "md") {
            continue;
        }

        debug!("io::read ← {:?}", path);
        let raw = std::fs::read_to_string(path).map_err(|e| ScanError::Io {
            path: path.to_path_buf(),
            source: e,
        })?;

        let rel_path = path
            .strip_prefix(root)
            .unwrap_or(path)
            .to_path_buf();
        sources.push(PageSource { rel_path, raw });
    }

    debug!("content::scan found {} files", sources.len());
    Ok(sources)
}

/// True if any path component starts with a dot.
fn is_hidden(rel: &Path) -> bool {
    rel.components()
        .filter_map(|c| c.as_os_str().to_str())
        .any(|name| name.starts_with('.'))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use std::fs::{self, File};
    use std::io::Write;
    use tempfile::tempdir;

    fn write_file(path: &Path, content: &str) {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).unwrap();
        }
        File::create(path)
            .unwrap()
            .write_all(content.as_bytes())
            .unwrap();
    }

    #[test]
    fn test_scan_finds_markdown_files() {
        let temp = tempdir().unwrap();
        write_file(&temp.path().join("a.md"), "# A");
        write_file(&temp.path().join("notes/b.md"), "# B");
        write_file(&temp.path().join("notes/c.txt"), "not markdown");

        let config = Config::from_str("{}").unwrap();
        let sources = scan_content(temp.path(), &config).unwrap();

        assert_eq!(sources.len(), 2);
        assert!(sources.iter().any(|s| s.rel_path == Path::new("a.md")));
        assert!(sources.iter().any(|s| s.rel_path == Path::new("notes/b.md")));
    }

    #[test]
    fn test_scan_skips_hidden_entries() {
        let temp = tempdir().unwrap();
        write_file(&temp.path().join(".obsidian/workspace.md"), "internal");
        write_file(&temp.path().join(".hidden.md"), "hidden");
        write_file(&temp.path().join("visible.md"), "# ok");

        let config = Config::from_str("{}").unwrap();
        let sources = scan_content(temp.path(), &config).unwrap();

        assert_eq!(sources.len(), 1);
        assert_eq!(sources[0].rel_path, Path::new("visible.md"));
    }

    #[test]
    fn test_scan_skips_output_dir() {
        let temp = tempdir().unwrap();
        write_file(&temp.path().join("dist/stale.md"), "old build artifact");
        write_file(&temp.path().join("note.md"), "# ok");

        let config = Config::from_str("{}").unwrap();
        let sources = scan_content(temp.path(), &config).unwrap();

        assert_eq!(sources.len(), 1);
        assert_eq!(sources[0].rel_path, Path::new("note.md"));
    }

    #[test]
    fn test_scan_skips_ignored_top_level_folders() {
        let temp = tempdir().unwrap();
        write_file(&temp.path().join("templates/base.md"), "ignored");
        write_file(&temp.path().join("notes/templates.md"), "# not ignored");

        let config = Config::from_str(r#"{"ignore": ["templates"]}"#).unwrap();
        let sources = scan_content(temp.path(), &config).unwrap();

        assert_eq!(sources.len(), 1);
        assert_eq!(sources[0].rel_path, Path::new("notes/templates.md"));
    }

    #[test]
    fn test_scan_order_is_stable() {
        let temp = tempdir().unwrap();
        write_file(&temp.path().join("b.md"), "b");
        write_file(&temp.path().join("a.md"), "a");
        write_file(&temp.path().join("c.md"), "c");

        let config = Config::from_str("{}").unwrap();
        let first = scan_content(temp.path(), &config).unwrap();
        let second = scan_content(temp.path(), &config).unwrap();

        let order: Vec<_> = first.iter().map(|s| s.rel_path.clone()).collect();
        let order2: Vec<_> = second.iter().map(|s| s.rel_path.clone()).collect();
        assert_eq!(order, order2);
        assert_eq!(order[0], Path::new("a.md"));
    }

    #[test]
    fn test_scan_empty_tree() {
        let temp = tempdir().unwrap();
        let config = Config::from_str("{}").unwrap();
        let sources = scan_content(temp.path(), &config).unwrap();
        assert!(sources.is_empty());
    }
}
