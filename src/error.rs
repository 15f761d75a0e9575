// src/error.rs

use thiserror::Error;

use crate::{
    config::ConfigError, deploy::DeployError, frontmatter::ParseError, markdown::RenderError,
    output::WriteError, scaffold::ScaffoldError, scan::ScanError, serve::ServeError,
    watch::WatchError,
};

#[derive(Error, Debug)]
pub(crate) enum RunError {
    //
    #[error("Failed to load configuration")]
    Config(#[from] ConfigError),
    //
    #[error("Failed to scan content tree")]
    Scan(#[from] ScanError),
    //
    #[error("Failed to parse content")]
    Parse(#[from] ParseError),
    //
    #[error("Failed to render Markdown")]
    Render(#[from] RenderError),
    //
    #[error("Failed to render template")]
    Template(#[from] minijinja::Error),
    //
    #[error("Failed to write output")]
    Write(#[from] WriteError),
    //
    #[error("Failed to serialize artifact")]
    Serialize(#[from] serde_json::Error),
    //
    #[error("Failed to watch for changes")]
    Watch(#[from] WatchError),
    //
    #[error("Failed to start dev server")]
    Serve(#[from] ServeError),
    //
    #[error("Failed to deploy")]
    Deploy(#[from] DeployError),
    //
    #[error("Failed to scaffold")]
    Scaffold(#[from] ScaffoldError),
    //
    #[error("{0}")]
    IoError(String),
}
