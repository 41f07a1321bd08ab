use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Parser;

use bocchi::cli::handlers::{self, CommandContext};
use bocchi::cli::{Cli, Commands};
use bocchi::config::BocchiConfig;

fn main() -> Result<()> {
    let cli = Cli::parse();

    let config = load_config(cli.config.as_deref())?;

    let log_file = cli
        .log_file
        .map(PathBuf::from)
        .or_else(|| config.log.file.clone());
    bocchi::logging::init(cli.verbose, log_file.as_deref())
        .context("Failed to set up logging")?;
    let ctx = CommandContext::new(config);

    match cli.command {
        Commands::Query {
            query,
            variables,
            operation_name,
            fetch_policy,
            data_only,
        } => handlers::handle_query(
            &ctx,
            query,
            variables,
            operation_name,
            fetch_policy.map(Into::into),
            data_only,
        ),
        Commands::Sdl => handlers::handle_sdl(&ctx),
    }
}

fn load_config(path: Option<&str>) -> Result<BocchiConfig> {
    match path {
        Some(path) => BocchiConfig::load(Path::new(path))
            .with_context(|| format!("Failed to load config from {}", path)),
        None => {
            let cwd = std::env::current_dir()?;
            BocchiConfig::discover(&cwd).context("Failed to load bocchi configuration")
        }
    }
}
