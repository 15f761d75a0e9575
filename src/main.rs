// src/main.rs

use argh::FromArgs;
use std::path::PathBuf;
use tracing::error;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

mod assets;
mod build;
mod config;
mod deploy;
mod error;
mod frontmatter;
mod graph;
mod incremental;
mod indexes;
mod markdown;
mod output;
mod page;
mod resolver;
mod rss;
mod scaffold;
mod scan;
mod search;
mod serve;
mod sitemap;
mod syntax;
mod templates;
mod utils;
mod watch;

use crate::build::{BuildOptions, full_build};
use crate::config::{CONFIG_FILE, Config};
use crate::error::RunError;

const VERSION: &str = env!("CARGO_PKG_VERSION");

#[derive(FromArgs, Debug)]
/// leafpress - a static site generator for digital gardens
struct Argz {
    /// print version information
    #[argh(switch, short = 'V')]
    version: bool,

    #[argh(subcommand)]
    command: Option<SubCommand>,
}

#[derive(FromArgs, Debug)]
#[argh(subcommand)]
enum SubCommand {
    Init(InitArgs),
    Build(BuildArgs),
    Serve(ServeArgs),
    New(NewArgs),
    Status(StatusArgs),
    Deploy(DeployArgs),
}

#[derive(FromArgs, Debug)]
#[argh(subcommand, name = "init")]
/// Scaffold a new site tree
struct InitArgs {
    /// directory to initialize (default: current directory)
    #[argh(positional, default = "String::from(\".\")")]
    dir: String,
}

#[derive(FromArgs, Debug)]
#[argh(subcommand, name = "build")]
/// Run a full build
struct BuildArgs {
    /// include draft pages
    #[argh(switch)]
    drafts: bool,

    /// print every warning instead of just the count
    #[argh(switch, short = 'v')]
    verbose: bool,
}

#[derive(FromArgs, Debug)]
#[argh(subcommand, name = "serve")]
/// Build, watch for changes, and serve the site locally
struct ServeArgs {
    /// port to listen on (default: from config)
    #[argh(option, short = 'p')]
    port: Option<u16>,

    /// include draft pages
    #[argh(switch)]
    drafts: bool,
}

#[derive(FromArgs, Debug)]
#[argh(subcommand, name = "new")]
/// Scaffold a Markdown note
struct NewArgs {
    /// path of the note to create, e.g. notes/my-idea.md
    #[argh(positional)]
    path: String,
}

#[derive(FromArgs, Debug)]
#[argh(subcommand, name = "status")]
/// Show which sources changed since the last deploy
struct StatusArgs {}

#[derive(FromArgs, Debug)]
#[argh(subcommand, name = "deploy")]
/// Deploy the built site
struct DeployArgs {
    /// provider: github, netlify or vercel
    #[argh(option)]
    provider: Option<String>,

    /// enumerate the upload without deploying
    #[argh(switch)]
    dry_run: bool,

    /// ignore the remembered provider choice
    #[argh(switch)]
    reconfigure: bool,

    /// deploy the existing output without rebuilding
    #[argh(switch)]
    skip_build: bool,
}

fn main() {
    let argz: Argz = argh::from_env();

    if argz.version {
        println!("leafpress {}", VERSION);
        return;
    }

    // Format: "2025-01-03T12:00:00Z INFO message" (no module path, no spans)
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "leafpress=info".into()),
        )
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .with_span_events(tracing_subscriber::fmt::format::FmtSpan::NONE),
        )
        .init();

    let result = match argz.command {
        Some(SubCommand::Init(args)) => cmd_init(&args),
        Some(SubCommand::Build(args)) => cmd_build(&args),
        Some(SubCommand::Serve(args)) => cmd_serve(&args),
        Some(SubCommand::New(args)) => cmd_new(&args),
        Some(SubCommand::Status(_)) => cmd_status(),
        Some(SubCommand::Deploy(args)) => cmd_deploy(&args),
        None => {
            println!("leafpress {}", VERSION);
            println!("Use --help for usage information");
            return;
        }
    };

    if let Err(e) = result {
        error!("{:?}", e);
        std::process::exit(1);
    }
}

fn site_root() -> PathBuf {
    PathBuf::from(".")
}

/// Sites without a `leafpress.json` build with defaults; a present-but-bad
/// config is fatal.
fn load_config() -> Result<Config, RunError> {
    if PathBuf::from(CONFIG_FILE).exists() {
        Ok(Config::load_from_file(CONFIG_FILE)?)
    } else {
        Ok(Config::default())
    }
}

fn report_warnings(warnings: &[String], verbose: bool) {
    if verbose {
        for warning in warnings {
            eprintln!("warning: {}", warning);
        }
    }
    println!("Warnings: {}", warnings.len());
}

fn cmd_init(args: &InitArgs) -> Result<(), RunError> {
    scaffold::init_site(&PathBuf::from(&args.dir))?;
    Ok(())
}

fn cmd_build(args: &BuildArgs) -> Result<(), RunError> {
    let config = load_config()?;
    let cache = full_build(
        config,
        BuildOptions {
            site_root: site_root(),
            include_drafts: args.drafts,
        },
    )?;
    report_warnings(&cache.warnings, args.verbose);
    Ok(())
}

fn cmd_serve(args: &ServeArgs) -> Result<(), RunError> {
    let config = load_config()?;
    let port = args.port.unwrap_or(config.port);

    let cache = full_build(
        config,
        BuildOptions {
            site_root: site_root(),
            include_drafts: args.drafts,
        },
    )?;
    report_warnings(&cache.warnings, false);

    let (listener, port) = serve::bind(port)?;
    serve::spawn(listener, cache.output_dir.clone(), port);

    // The reload push channel lives with the server collaborator; rebuilds
    // land on disk and a browser refresh picks them up.
    watch::watch_loop(cache, |_| {})
}

fn cmd_new(args: &NewArgs) -> Result<(), RunError> {
    scaffold::new_note(&PathBuf::from(&args.path))?;
    Ok(())
}

fn cmd_status() -> Result<(), RunError> {
    let config = load_config()?;
    let root = site_root();

    let state = deploy::DeployState::load(&root).map_err(RunError::Deploy)?;
    let Some(last) = state.last_deploy else {
        println!("No deploy recorded yet");
        return Ok(());
    };

    let current = deploy::source_digests(&root, &config).map_err(RunError::Deploy)?;
    let diff = deploy::diff_sources(&last.source_files, &current);

    if diff.added.is_empty() && diff.modified.is_empty() && diff.removed.is_empty() {
        println!("In sync with deploy {} ({})", last.deploy_id, last.timestamp);
        return Ok(());
    }

    for path in &diff.added {
        println!("A {}", path);
    }
    for path in &diff.modified {
        println!("M {}", path);
    }
    for path in &diff.removed {
        println!("D {}", path);
    }
    println!(
        "{} added, {} modified, {} removed since deploy {}",
        diff.added.len(),
        diff.modified.len(),
        diff.removed.len(),
        last.deploy_id
    );
    Ok(())
}

fn cmd_deploy(args: &DeployArgs) -> Result<(), RunError> {
    let config = load_config()?;
    let root = site_root();

    let output_dir = if args.skip_build {
        build::resolve_output_dir(&root, &config)
    } else {
        let cache = full_build(
            config.clone(),
            BuildOptions {
                site_root: root.clone(),
                include_drafts: false,
            },
        )?;
        report_warnings(&cache.warnings, false);
        cache.output_dir
    };

    let state = deploy::DeployState::load(&root).map_err(RunError::Deploy)?;
    let remembered = state
        .last_deploy
        .as_ref()
        .map(|record| record.provider.clone());
    let provider_name = match (&args.provider, args.reconfigure) {
        (Some(name), _) => name.clone(),
        (None, false) => remembered.unwrap_or_else(|| "github".to_string()),
        (None, true) => "github".to_string(),
    };

    let provider = deploy::provider_by_name(&provider_name).map_err(RunError::Deploy)?;
    deploy::run_deploy(provider.as_ref(), &root, &output_dir, &config, args.dry_run)
        .map_err(RunError::Deploy)?;
    Ok(())
}
