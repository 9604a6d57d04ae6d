//! Rim CLI - Command line interface for the rim workspace manager
//!
//! Lists the modules of a workspace as resolved from a manifest, a module
//! directory or the workspace itself, and checks workspace readiness.

mod commands;

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use rim_core::Config;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use commands::{CheckArgs, ManifestArgs, ModuleArgs, WorkspaceArgs};

/// rim: manage a workspace built from several git repositories
#[derive(Parser, Debug)]
#[command(name = "rim")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Review server that relative remotes resolve against (overrides config and env)
    #[arg(long, global = true, env = "RIM_SERVER_URL")]
    server_url: Option<String>,

    /// Workspace root
    #[arg(short = 'C', long, global = true, default_value = ".")]
    workspace: PathBuf,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Show version information
    Version,

    /// List the modules declared in a manifest
    #[command(visible_alias = "m")]
    Manifest(ManifestArgs),

    /// Show the module checked out in a directory
    Module(ModuleArgs),

    /// List the modules present in the workspace
    #[command(visible_alias = "ws")]
    Workspace(WorkspaceArgs),

    /// Check that the workspace has no uncommitted changes
    Check(CheckArgs),

    /// Show current configuration
    Config,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let default_level = if cli.verbose { "debug" } else { "warn" };
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .init();

    // Load configuration with overrides
    let config = Config::load_with_overrides(cli.server_url.clone())?;

    if cli.verbose {
        tracing::info!(
            server_url = %config.server.url,
            workspace = %cli.workspace.display(),
            "Configuration loaded"
        );
    }

    match cli.command {
        Some(Commands::Version) => {
            println!("rim {}", env!("CARGO_PKG_VERSION"));
        }
        Some(Commands::Manifest(args)) => {
            args.execute(&cli.workspace, &config)?;
        }
        Some(Commands::Module(args)) => {
            args.execute(&cli.workspace, &config)?;
        }
        Some(Commands::Workspace(args)) => {
            args.execute(&cli.workspace, &config)?;
        }
        Some(Commands::Check(args)) => {
            args.execute(&cli.workspace, &config)?;
        }
        Some(Commands::Config) => {
            println!("Rim Configuration");
            println!("=================");
            println!();
            println!("Server Settings:");
            println!("  url: {}", config.server.url);
            println!("  push_ref_format: {}", config.server.push_ref_format);
            println!();
            if let Some(path) = Config::default_config_path() {
                println!("Config file: {}", path.display());
                if path.exists() {
                    println!("  (exists)");
                } else {
                    println!("  (not found - using defaults)");
                }
            }
        }
        None => {
            println!("rim - multi-repository workspace manager");
            println!();
            println!("Use --help for usage information");
        }
    }

    Ok(())
}
