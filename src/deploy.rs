// src/deploy.rs
//
// The deployment boundary: everything up to the actual upload. Providers
// are a trait; the bundled ones validate configuration and tokens and stop
// at the transport, which belongs to the hosting side of the fence. The
// state manifest and dry-run enumeration are fully implemented and are what
// `status` diffs against.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use thiserror::Error;
use time::OffsetDateTime;
use time::format_description::well_known::Rfc3339;
use tracing::{debug, info};
use walkdir::WalkDir;

use crate::config::Config;

pub(crate) const DEPLOY_STATE_FILE: &str = ".leafpress-deploy-state.json";

/// Deploy history records kept in the manifest.
const HISTORY_CAP: usize = 10;

#[derive(Error, Debug)]
pub(crate) enum DeployError {
    #[error("I/O error during deploy: {0}")]
    Io(#[from] std::io::Error),

    #[error("Malformed deploy state file: {0}")]
    State(#[from] serde_json::Error),

    #[error("Unknown provider {0:?}: expected github, netlify or vercel")]
    UnknownProvider(String),

    #[error("Missing deploy token: set {0}")]
    MissingToken(&'static str),

    #[error(
        "Provider {0} transport is not bundled; the built site in {1:?} is ready to upload \
         (use --dry-run to inspect the file set)"
    )]
    TransportUnavailable(&'static str, PathBuf),
}

/// One completed deploy, as recorded in `.leafpress-deploy-state.json`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct DeployRecord {
    pub timestamp: String,
    pub provider: String,
    #[serde(rename = "deployID")]
    pub deploy_id: String,
    pub url: String,
    pub file_count: usize,
    pub files_deployed: Vec<String>,
    /// content-root-relative Markdown path → blake3 digest at deploy time
    pub source_files: BTreeMap<String, String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct DeployState {
    pub last_deploy: Option<DeployRecord>,
    #[serde(default)]
    pub deploy_history: Vec<DeployRecord>,
}

impl DeployState {
    pub(crate) fn load(site_root: &Path) -> Result<DeployState, DeployError> {
        let path = site_root.join(DEPLOY_STATE_FILE);
        if !path.exists() {
            return Ok(DeployState::default());
        }
        let content = std::fs::read_to_string(&path)?;
        Ok(serde_json::from_str(&content)?)
    }

    pub(crate) fn save(&self, site_root: &Path) -> Result<(), DeployError> {
        let path = site_root.join(DEPLOY_STATE_FILE);
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(&path, json)?;
        Ok(())
    }

    /// Appends a record, keeping the newest `HISTORY_CAP` entries.
    pub(crate) fn record(&mut self, record: DeployRecord) {
        self.deploy_history.insert(0, record.clone());
        self.deploy_history.truncate(HISTORY_CAP);
        self.last_deploy = Some(record);
    }
}

pub(crate) struct DeployOutcome {
    pub deploy_id: String,
    pub url: String,
}

/// A deployment target. `upload` consumes the built output directory.
pub(crate) trait Provider {
    fn name(&self) -> &'static str;
    fn token_env(&self) -> &'static str;
    fn upload(&self, output_dir: &Path, files: &[String], token: &str)
    -> Result<DeployOutcome, DeployError>;
}

macro_rules! stub_provider {
    ($ty:ident, $name:literal, $env:literal) => {
        pub(crate) struct $ty;
        impl Provider for $ty {
            fn name(&self) -> &'static str {
                $name
            }
            fn token_env(&self) -> &'static str {
                $env
            }
            fn upload(
                &self,
                output_dir: &Path,
                _files: &[String],
                _token: &str,
            ) -> Result<DeployOutcome, DeployError> {
                Err(DeployError::TransportUnavailable(
                    $name,
                    output_dir.to_path_buf(),
                ))
            }
        }
    };
}

stub_provider!(GitHubPages, "github", "LEAFPRESS_GITHUB_TOKEN");
stub_provider!(Netlify, "netlify", "LEAFPRESS_NETLIFY_TOKEN");
stub_provider!(Vercel, "vercel", "LEAFPRESS_VERCEL_TOKEN");

pub(crate) fn provider_by_name(name: &str) -> Result<Box<dyn Provider>, DeployError> {
    match name {
        "github" => Ok(Box::new(GitHubPages)),
        "netlify" => Ok(Box::new(Netlify)),
        "vercel" => Ok(Box::new(Vercel)),
        other => Err(DeployError::UnknownProvider(other.to_string())),
    }
}

/// Every file in the built output, as forward-slash relative paths, sorted.
pub(crate) fn collect_output_files(output_dir: &Path) -> Result<Vec<String>, DeployError> {
    let mut files = Vec::new();
    for entry in WalkDir::new(output_dir)
        .into_iter()
        .filter_map(Result::ok)
        .filter(|e| e.file_type().is_file())
    {
        let rel = entry
            .path()
            .strip_prefix(output_dir)
            .unwrap_or(entry.path());
        files.push(crate::utils::path_to_url(rel));
    }
    files.sort();
    Ok(files)
}

/// blake3 digests of every Markdown source, keyed by relative path. The
/// `status` command diffs these against the last deploy's.
pub(crate) fn source_digests(
    site_root: &Path,
    config: &Config,
) -> Result<BTreeMap<String, String>, DeployError> {
    let output_dir = config.output_dir_path();
    let mut digests = BTreeMap::new();

    for entry in WalkDir::new(site_root)
        .into_iter()
        .filter_entry(|e| {
            let Ok(rel) = e.path().strip_prefix(site_root) else {
                return true;
            };
            if rel.as_os_str().is_empty() {
                return true;
            }
            let hidden = rel
                .components()
                .filter_map(|c| c.as_os_str().to_str())
                .any(|n| n.starts_with('.'));
            !(hidden || rel.starts_with(&output_dir) || config.is_ignored(rel))
        })
        .filter_map(Result::ok)
        .filter(|e| e.file_type().is_file())
    {
        let path = entry.path();
        if path.extension().is_none_or(|ext| ext != "md") {
            continue;
        }
        let bytes = std::fs::read(path)?;
        let digest = blake3::hash(&bytes).to_hex().to_string();
        let rel = path.strip_prefix(site_root).unwrap_or(path);
        digests.insert(crate::utils::path_to_url(rel), digest);
    }

    Ok(digests)
}

/// The `status` command's diff: current sources vs the last deploy.
#[derive(Debug, Default, PartialEq, Eq)]
pub(crate) struct SourceDiff {
    pub added: Vec<String>,
    pub modified: Vec<String>,
    pub removed: Vec<String>,
}

pub(crate) fn diff_sources(
    recorded: &BTreeMap<String, String>,
    current: &BTreeMap<String, String>,
) -> SourceDiff {
    let mut diff = SourceDiff::default();
    for (path, digest) in current {
        match recorded.get(path) {
            None => diff.added.push(path.clone()),
            Some(old) if old != digest => diff.modified.push(path.clone()),
            Some(_) => {}
        }
    }
    for path in recorded.keys() {
        if !current.contains_key(path) {
            diff.removed.push(path.clone());
        }
    }
    diff
}

/// Runs a deploy end to end: enumerate, upload, record.
pub(crate) fn run_deploy(
    provider: &dyn Provider,
    site_root: &Path,
    output_dir: &Path,
    config: &Config,
    dry_run: bool,
) -> Result<(), DeployError> {
    let files = collect_output_files(output_dir)?;
    info!(
        "deploy::plan {} files via {}",
        files.len(),
        provider.name()
    );

    if dry_run {
        for file in &files {
            println!("  {}", file);
        }
        println!("Dry run: {} files, nothing uploaded", files.len());
        return Ok(());
    }

    let token = std::env::var(provider.token_env())
        .map_err(|_| DeployError::MissingToken(provider.token_env()))?;

    let outcome = provider.upload(output_dir, &files, &token)?;
    debug!("deploy::uploaded id={}", outcome.deploy_id);

    let mut state = DeployState::load(site_root)?;
    state.record(DeployRecord {
        timestamp: OffsetDateTime::now_utc()
            .format(&Rfc3339)
            .unwrap_or_default(),
        provider: provider.name().to_string(),
        deploy_id: outcome.deploy_id,
        url: outcome.url,
        file_count: files.len(),
        files_deployed: files,
        source_files: source_digests(site_root, config)?,
    });
    state.save(site_root)?;
    info!("deploy::complete ✓");
    Ok(())
}
