//! appmake - build automation for web apps
//!
//! CLI entry point that dispatches to actions.

use appmake::cli::{commands, Cli, Commands, LogFormat};
use appmake::config::ConfigManager;
use appmake::error::{AppmakeError, AppmakeResult};
use clap::Parser;
use console::style;
use std::process::ExitCode;
use tracing::debug;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> ExitCode {
    match run().await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("{} {}", style("Error:").red().bold(), e);
            if let Some(hint) = e.hint() {
                eprintln!("{} {}", style("Hint:").yellow(), hint);
            }
            ExitCode::FAILURE
        }
    }
}

fn init_logging(verbose: u8, format: LogFormat) {
    // 0 = warn, 1 = info, 2+ = debug; RUST_LOG wins when set
    let default = match verbose {
        0 => "appmake=warn",
        1 => "appmake=info",
        _ => "appmake=debug",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));

    match format {
        LogFormat::Text => tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(false)
            .without_time()
            .with_writer(std::io::stderr)
            .init(),
        LogFormat::Json => tracing_subscriber::fmt()
            .json()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .init(),
    }
}

async fn run() -> AppmakeResult<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose, cli.log_format);

    // Init command doesn't need config loading
    if let Commands::Init(args) = cli.command {
        return commands::init(args).await;
    }

    let manager = match cli.config {
        Some(ref path) => ConfigManager::with_path(path.clone()),
        None => {
            let cwd = std::env::current_dir()
                .map_err(|e| AppmakeError::io("getting current directory", e))?;
            match ConfigManager::find_project_config(&cwd) {
                Some(path) => ConfigManager::with_path(path),
                None => ConfigManager::in_dir(&cwd),
            }
        }
    };
    debug!("Using config: {}", manager.path().display());

    let config = manager.load().await?;
    let base = manager.project_dir().to_path_buf();

    match cli.command {
        Commands::Init(_) => unreachable!("Init handled above"),
        Commands::Clean => commands::clean(&config, &base).await,
        Commands::Build => commands::build(&config, &base).await,
        Commands::Rebuild => commands::rebuild(&config, &base).await,
        Commands::Less => commands::less(&config, &base).await,
        Commands::Templates => commands::templates(&config, &base).await,
        Commands::Bundle => commands::bundle(&config, &base).await,
        Commands::Optimize(args) => commands::optimize(args, &config, &base).await,
        Commands::Config(args) => commands::config(args, &config, &manager).await,
    }
}
