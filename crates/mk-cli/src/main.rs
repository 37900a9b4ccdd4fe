use anyhow::{Context, Result};
use clap::Parser;
use tracing_subscriber::EnvFilter;

use mk_cli::commands::{config, device, event};
use mk_cli::{Cli, Commands, Config};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize tracing with verbose flag support
    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::from_default_env()
    };
    // Use try_init to avoid panic if tracing is already initialized (e.g., in tests)
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();

    let cfg = Config::load_from(cli.config.as_deref()).context("failed to load configuration")?;
    tracing::debug!(config = ?cfg, "loaded configuration");

    let mut stdout = std::io::stdout();
    match &cli.command {
        Some(Commands::Event(args)) => {
            let identity = mk_cli::device::load_or_init_device()?;
            event::run(&mut stdout, args, &cfg, &identity).await?;
        }
        Some(Commands::Device { reset }) => {
            device::run(&mut stdout, *reset)?;
        }
        Some(Commands::Config) => {
            config::run(&mut stdout, &cfg)?;
        }
        None => {
            // No subcommand, show help
            use clap::CommandFactory;
            Cli::command().print_help()?;
            println!();
        }
    }

    Ok(())
}
