//! Retention CLI for aptly repositories
//!
//! # Usage
//!
//! ```bash
//! # See what would go, without touching anything
//! repo-retention clean -c /etc/repo-retention.yaml --dry-run -v
//!
//! # Space a real run would reclaim
//! repo-retention clean -c /etc/repo-retention.yaml --calc
//!
//! # Artifact files no repository references
//! repo-retention orphans -c /etc/repo-retention.yaml
//! ```

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use tracing::error;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use repo_retention::config::current_user;
use repo_retention::{
    AptlyCatalog, EngineOptions, FsArtifactScanner, OrphanFinder, OrphanOptions, RetentionConfig,
    RetentionEngine,
};

#[derive(Parser)]
#[command(name = "repo-retention")]
#[command(about = "Removes outdated package versions from tiered aptly repositories", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Args)]
struct CommonArgs {
    /// Path to the YAML configuration
    #[arg(short, long)]
    config: PathBuf,

    /// Show debug messages
    #[arg(short, long)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Apply the retention policy
    Clean {
        #[command(flatten)]
        common: CommonArgs,

        /// Log what would be removed without removing it
        #[arg(long)]
        dry_run: bool,

        /// Remove from the repository only, keep files on disk
        #[arg(short = 'r', long)]
        only_from_repo: bool,

        /// Calculate reclaimable space (implies --dry-run)
        #[arg(long)]
        calc: bool,

        /// Run even if the current user is not the configured run user
        #[arg(long)]
        force_invalid_user: bool,
    },

    /// Find artifact files that no repository references
    Orphans {
        #[command(flatten)]
        common: CommonArgs,

        /// Delete the orphaned files
        #[arg(short = 'r', long)]
        remove: bool,

        /// Log what would be removed without removing it
        #[arg(long)]
        dry_run: bool,
    },
}

impl Commands {
    fn common(&self) -> &CommonArgs {
        match self {
            Commands::Clean { common, .. } | Commands::Orphans { common, .. } => common,
        }
    }
}

fn init_logging(verbose: bool) {
    let default_level = if verbose { "debug" } else { "info" };
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer().with_target(false))
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)))
        .init();
}

fn load_config(path: &Path) -> Result<RetentionConfig> {
    RetentionConfig::from_yaml(path)
        .with_context(|| format!("failed to load config {}", path.display()))
}

fn run(cli: Cli) -> Result<()> {
    match cli.command {
        Commands::Clean {
            common,
            dry_run,
            only_from_repo,
            calc,
            force_invalid_user,
        } => {
            let config = load_config(&common.config)?;
            config.check_run_user(current_user().as_deref(), force_invalid_user)?;

            let catalog = AptlyCatalog::new(&config.aptly_bin);
            let scanner = FsArtifactScanner::new();
            let options = EngineOptions::new()
                .dry_run(dry_run)
                .calculate(calc)
                .only_from_repo(only_from_repo);

            let report = RetentionEngine::new(&config, &catalog, &scanner, options).run()?;
            if calc {
                println!("{}", report.reclaimed());
            }
        }
        Commands::Orphans {
            common,
            remove,
            dry_run,
        } => {
            let config = load_config(&common.config)?;
            let catalog = AptlyCatalog::new(&config.aptly_bin);
            let scanner = FsArtifactScanner::new();

            let report =
                OrphanFinder::new(&config, &catalog, &scanner, OrphanOptions { remove, dry_run })
                    .run()?;
            for file in &report.orphans {
                println!("{}", file.path.display());
            }
            println!("total: {}", report.total());
        }
    }
    Ok(())
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.command.common().verbose);

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{:#}", e);
            ExitCode::FAILURE
        }
    }
}
