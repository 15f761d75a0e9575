// src/output.rs

use std::collections::HashSet;
use std::{
    fs,
    path::{Path, PathBuf},
};
use thiserror::Error;
use tracing::debug;
use walkdir::WalkDir;

use crate::assets;
use crate::config::Config;

#[derive(Error, Debug)]
pub(crate) enum WriteError {
    #[error("I/O error writing output file {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

fn io_err(path: &Path) -> impl FnOnce(std::io::Error) -> WriteError + '_ {
    move |source| WriteError::Io {
        path: path.to_path_buf(),
        source,
    }
}

pub(crate) fn write_output_file(output_path: &Path, content: &str) -> Result<(), WriteError> {
    debug!("io::write → {:?} ({} bytes)", output_path, content.len());
    if let Some(parent) = output_path.parent() {
        fs::create_dir_all(parent).map_err(io_err(parent))?;
    }
    fs::write(output_path, content).map_err(io_err(output_path))
}

/// Empties the output directory at the start of a full build. Incremental
/// rebuilds never call this; their whole point is mutating outputs in place.
pub(crate) fn clean_output_dir(output_dir: &Path) -> Result<(), WriteError> {
    if output_dir.exists() {
        debug!("output::clean {:?}", output_dir);
        fs::remove_dir_all(output_dir).map_err(io_err(output_dir))?;
    }
    fs::create_dir_all(output_dir).map_err(io_err(output_dir))
}

/// Removes one page's rendered output (`{slug}/index.html` and its directory
/// when that leaves it empty).
pub(crate) fn remove_page_output(output_dir: &Path, output_path: &Path) -> Result<(), WriteError> {
    let full = output_dir.join(output_path);
    if full.exists() {
        debug!("output::remove {:?}", full);
        fs::remove_file(&full).map_err(io_err(&full))?;
        if let Some(parent) = full.parent()
            && parent != output_dir
            && fs::read_dir(parent).map(|mut d| d.next().is_none()).unwrap_or(false)
        {
            fs::remove_dir(parent).map_err(io_err(parent))?;
        }
    }
    Ok(())
}

/// Mirrors the site's `static/` tree into the output, skipping hidden
/// entries. Unchanged files (same size, destination not older) are left
/// alone so watch-mode copies stay cheap.
pub(crate) fn copy_static_tree(site_root: &Path, output_dir: &Path) -> Result<(), WriteError> {
    let static_dir = site_root.join("static");
    if !static_dir.exists() {
        debug!("static::scan no directory found");
        return Ok(());
    }

    for entry in WalkDir::new(&static_dir)
        .into_iter()
        .filter_entry(|e| {
            e.file_name()
                .to_str()
                .is_none_or(|name| !name.starts_with('.'))
        })
        .filter_map(Result::ok)
        .filter(|e| e.file_type().is_file())
    {
        let source_path = entry.path();
        let relative_path = source_path
            .strip_prefix(&static_dir)
            .map_err(|e| WriteError::Io {
                path: source_path.to_path_buf(),
                source: std::io::Error::other(e),
            })?;
        let dest_path = output_dir.join("static").join(relative_path);

        if !should_copy_file(source_path, &dest_path) {
            debug!("static::check ✓ {:?}", source_path);
            continue;
        }

        if let Some(parent) = dest_path.parent() {
            fs::create_dir_all(parent).map_err(io_err(parent))?;
        }
        debug!("io::copy {:?} → {:?}", source_path, dest_path);
        fs::copy(source_path, &dest_path).map_err(io_err(&dest_path))?;
    }

    Ok(())
}

/// Checks if a file should be copied by comparing metadata.
fn should_copy_file(source: &Path, dest: &Path) -> bool {
    let dest_meta = match fs::metadata(dest) {
        Ok(meta) => meta,
        Err(_) => return true,
    };
    let source_meta = match fs::metadata(source) {
        Ok(meta) => meta,
        Err(_) => return true,
    };

    if source_meta.len() != dest_meta.len() {
        return true;
    }

    match (source_meta.modified().ok(), dest_meta.modified().ok()) {
        (Some(src), Some(dst)) => src > dst,
        _ => true,
    }
}

/// Lowercased filenames available under `static/images/`; the renderer
/// consults this set when expanding `![[file]]` embeds.
pub(crate) fn static_image_names(site_root: &Path) -> HashSet<String> {
    let images_dir = site_root.join("static").join("images");
    let mut names = HashSet::new();
    if let Ok(entries) = fs::read_dir(images_dir) {
        for entry in entries.flatten() {
            if entry.file_type().map(|t| t.is_file()).unwrap_or(false)
                && let Some(name) = entry.file_name().to_str()
            {
                names.insert(name.to_lowercase());
            }
        }
    }
    names
}

/// Writes the stylesheet bundle: theme variables, the embedded defaults,
/// then the user's `style.css` so it can override anything.
pub(crate) fn write_css_bundle(
    site_root: &Path,
    output_dir: &Path,
    config: &Config,
) -> Result<(), WriteError> {
    let mut css = assets::theme_css(&config.theme);
    css.push_str(assets::DEFAULT_CSS);

    let user_css_path = site_root.join("style.css");
    if user_css_path.exists() {
        let user_css = fs::read_to_string(&user_css_path).map_err(io_err(&user_css_path))?;
        css.push('\n');
        css.push_str(&user_css);
    }

    write_output_file(&output_dir.join("css").join("style.css"), &css)
}

/// Copies user favicons into the output root, falling back to the embedded
/// default. Returns the filename the `<head>` should reference.
pub(crate) fn write_favicons(site_root: &Path, output_dir: &Path) -> Result<String, WriteError> {
    let mut chosen = None;
    for name in ["favicon.ico", "favicon.svg", "favicon.png"] {
        let source = site_root.join(name);
        if source.exists() {
            let dest = output_dir.join(name);
            fs::create_dir_all(output_dir).map_err(io_err(output_dir))?;
            fs::copy(&source, &dest).map_err(io_err(&dest))?;
            chosen.get_or_insert_with(|| name.to_string());
        }
    }

    match chosen {
        Some(name) => Ok(name),
        None => {
            write_output_file(&output_dir.join("favicon.svg"), assets::FAVICON_SVG)?;
            Ok("favicon.svg".to_string())
        }
    }
}

/// robots.txt is always written; the Sitemap line appears only when the
/// site knows its public URL.
pub(crate) fn write_robots(output_dir: &Path, config: &Config) -> Result<(), WriteError> {
    let mut robots = String::from("User-agent: *\nAllow: /\n");
    if !config.base_url.is_empty() {
        robots.push_str(&format!("Sitemap: {}/sitemap.xml\n", config.base_url_trimmed()));
    }
    write_output_file(&output_dir.join("robots.txt"), &robots)
}
