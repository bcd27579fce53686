use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;

mod chunker;
mod cli;
mod commands;
mod context;
mod output;

#[tokio::main]
async fn main() {
    if let Err(error) = run().await {
        eprintln!("sav error: {error:#}");
        std::process::exit(1);
    }
}

async fn run() -> anyhow::Result<()> {
    let cli = cli::Cli::parse();
    init_tracing(cli.quiet, cli.verbose)?;

    let flags = cli.global_flags();

    if let cli::Commands::Init(args) = &cli.command {
        return commands::init::handle(args, &flags);
    }

    let config = sav_config::SavantConfig::load_with_dotenv()
        .context("failed to load savant configuration")?;

    let project_root = resolve_project_root(flags.project.as_deref())?;

    let ctx = context::AppContext::init(project_root, config)
        .await
        .context("failed to initialize savant application context")?;

    commands::dispatch::dispatch(cli.command, &ctx, &flags).await
}

fn init_tracing(quiet: bool, verbose: bool) -> anyhow::Result<()> {
    let level = if quiet {
        "error"
    } else if verbose {
        "debug"
    } else {
        "warn"
    };

    let filter = tracing_subscriber::EnvFilter::try_from_env("SAVANT_LOG")
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .try_init()
        .map_err(|error| anyhow::anyhow!("failed to initialize tracing subscriber: {error}"))?;

    Ok(())
}

fn resolve_project_root(project_override: Option<&str>) -> anyhow::Result<PathBuf> {
    if let Some(path) = project_override {
        let explicit = PathBuf::from(path);
        if explicit.join(".savant").is_dir() {
            return Ok(explicit);
        }
        anyhow::bail!(
            "invalid --project '{}': no .savant directory found there",
            explicit.display()
        );
    }

    let start = std::env::current_dir().context("failed to read current directory")?;
    find_project_root(&start)
        .context("not a savant project (no .savant directory found). Run 'sav init' first.")
}

/// Walk up from `start` looking for a directory containing `.savant/`.
fn find_project_root(start: &std::path::Path) -> Option<PathBuf> {
    let mut dir = start.to_path_buf();
    loop {
        if dir.join(".savant").is_dir() {
            return Some(dir);
        }
        if !dir.pop() {
            return None;
        }
    }
}
