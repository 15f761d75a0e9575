// src/watch.rs

use notify::{RecursiveMode, Watcher};
use std::collections::HashSet;
use std::path::PathBuf;
use std::sync::mpsc::channel;
use std::time::{Duration, Instant};
use thiserror::Error;
use tracing::{debug, error, info};

use crate::build::SiteCache;
use crate::incremental::RebuildOutcome;
use crate::error::RunError;

#[derive(Error, Debug)]
pub(crate) enum WatchError {
    #[error("File watcher error: {0}")]
    Notify(#[from] notify::Error),
}

/// Collapses a burst of filesystem events into a set of changed paths.
const DEBOUNCE: Duration = Duration::from_millis(300);

/// Watches the site tree and routes every change through the incremental
/// orchestrator. Blocks forever; Ctrl+C to stop.
///
/// The `on_rebuild` hook fires after each successful refresh so the caller
/// (the dev server) can nudge connected browsers.
pub(crate) fn watch_loop(
    mut cache: SiteCache,
    on_rebuild: impl Fn(&SiteCache),
) -> Result<(), RunError> {
    let site_root = cache.opts.site_root.clone();

    let (sender, receiver) = channel();
    let mut watcher = notify::recommended_watcher(move |result: notify::Result<notify::Event>| {
        if let Ok(event) = result {
            let _ = sender.send(event);
        }
    })
    .map_err(WatchError::from)?;
    watcher
        .watch(&site_root, RecursiveMode::Recursive)
        .map_err(WatchError::from)?;

    info!("watch::start {:?}", site_root);
    info!("watch::info press Ctrl+C to stop");

    loop {
        let Ok(first) = receiver.recv() else {
            break;
        };

        // Debounce: drain everything that arrives shortly after.
        let mut paths: HashSet<PathBuf> = first.paths.into_iter().collect();
        let deadline = Instant::now() + DEBOUNCE;
        while let Some(remaining) = deadline.checked_duration_since(Instant::now()) {
            match receiver.recv_timeout(remaining) {
                Ok(event) => paths.extend(event.paths),
                Err(_) => break,
            }
        }

        let warnings_before = cache.warnings.len();
        let mut rebuilt = false;
        let mut restart = false;

        let mut ordered: Vec<PathBuf> = paths.into_iter().collect();
        ordered.sort();
        for path in ordered {
            debug!("watch::change {:?}", path);
            match cache.rebuild_path(&path) {
                Ok(RebuildOutcome::Done) => rebuilt = true,
                Ok(RebuildOutcome::Ignored) => {}
                Ok(RebuildOutcome::ConfigChanged) => restart = true,
                Err(e) => error!("Rebuild failed: {:?}", e),
            }
        }

        if restart {
            info!("watch::config changed, rebuilding from scratch");
            match crate::config::Config::load_from_file(
                site_root.join(crate::config::CONFIG_FILE).to_str().unwrap_or(""),
            )
            .map_err(RunError::from)
            .and_then(|config| crate::build::full_build(config, cache.opts.clone()))
            {
                Ok(fresh) => {
                    cache = fresh;
                    rebuilt = true;
                }
                Err(e) => error!("Full rebuild failed: {:?}", e),
            }
        }

        if rebuilt {
            let new_warnings = cache.warnings.len().saturating_sub(warnings_before);
            if new_warnings > 0 {
                info!("watch::rebuilt (Warnings: {})", new_warnings);
            } else {
                info!("watch::rebuilt ✓");
            }
            on_rebuild(&cache);
        }
    }

    Ok(())
}
