// src/scaffold.rs

use std::path::Path;
use thiserror::Error;
use time::OffsetDateTime;
use time::macros::format_description;
use tracing::info;

use crate::config::CONFIG_FILE;
use crate::utils::humanize;

#[derive(Error, Debug)]
pub(crate) enum ScaffoldError {
    #[error("I/O error scaffolding {path:?}: {source}")]
    Io {
        path: std::path::PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Refusing to overwrite existing file {0:?}")]
    Exists(std::path::PathBuf),
}

const STARTER_CONFIG: &str = r#"{
  "title": "My Garden",
  "description": "Notes growing in public",
  "author": "",
  "baseURL": "",
  "outputDir": "dist",
  "nav": [
    { "label": "Home", "path": "/" },
    { "label": "Tags", "path": "/tags/" }
  ]
}
"#;

const STARTER_HOME: &str = r#"---
title: Home
---
Welcome to your garden. This page is `_index.md` at the root.

Start a note with `leafpress new notes/my-first-note.md`, link between
notes with `[[wiki-links]]`, and run `leafpress serve` to watch it grow.
"#;

const STARTER_NOTE: &str = r#"---
title: About this garden
growth: seedling
tags:
  - meta
---
A digital garden is a collection of interlinked notes. Unlike a blog, notes
are tended over time: they start as a `seedling`, grow to `budding`, and
settle as `evergreen`.

This note links back to [[Home]].
"#;

fn write_new(path: &Path, content: &str) -> Result<(), ScaffoldError> {
    if path.exists() {
        return Err(ScaffoldError::Exists(path.to_path_buf()));
    }
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        std::fs::create_dir_all(parent).map_err(|e| ScaffoldError::Io {
            path: parent.to_path_buf(),
            source: e,
        })?;
    }
    std::fs::write(path, content).map_err(|e| ScaffoldError::Io {
        path: path.to_path_buf(),
        source: e,
    })?;
    info!("scaffold::write → {:?}", path);
    Ok(())
}

/// `init`: lay down a minimal working site in `dir`.
pub(crate) fn init_site(dir: &Path) -> Result<(), ScaffoldError> {
    write_new(&dir.join(CONFIG_FILE), STARTER_CONFIG)?;
    write_new(&dir.join("_index.md"), STARTER_HOME)?;
    write_new(&dir.join("notes").join("about.md"), STARTER_NOTE)?;
    std::fs::create_dir_all(dir.join("static").join("images")).map_err(|e| ScaffoldError::Io {
        path: dir.join("static/images"),
        source: e,
    })?;
    println!("Initialized a new garden in {}", dir.display());
    println!("Next: leafpress serve");
    Ok(())
}

/// `new <path>`: scaffold one Markdown note with frontmatter.
pub(crate) fn new_note(path: &Path) -> Result<(), ScaffoldError> {
    let stem = path
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("untitled");
    let title = humanize(stem);

    const DATE: &[time::format_description::FormatItem<'static>] =
        format_description!("[year]-[month]-[day]");
    let today = OffsetDateTime::now_utc()
        .date()
        .format(&DATE)
        .unwrap_or_default();

    let content = format!(
        "---\ntitle: {}\ncreated: {}\ngrowth: seedling\n---\n\n",
        title, today
    );
    write_new(path, &content)?;
    println!("Created {}", path.display());
    Ok(())
}
