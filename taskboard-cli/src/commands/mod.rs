//! Command implementations

pub mod board;
pub mod mv;
pub mod rank;

use anyhow::{Context, Result};
use taskboard::HttpGateway;
use taskboard_config::{ConfigProvider, TaskboardConfig};
use tracing::debug;

use crate::cli::{Cli, Commands};

/// Run the parsed command, returning the process exit code
pub async fn run(cli: Cli) -> Result<i32> {
    let config = load_config(&cli)?;
    match cli.command {
        Commands::Board {
            project,
            keyword,
            priority,
            mine,
            json,
        } => {
            let filters = board::filters(keyword, priority, mine);
            board::run_board(&config, &project, &filters, json).await
        }
        Commands::Move {
            project,
            task,
            target,
        } => mv::run_move(&config, &project, &task, target).await,
        Commands::Rank { after, before } => rank::run_rank(&config, after, before),
    }
}

/// Layer configuration sources and apply command line flags on top
pub fn load_config(cli: &Cli) -> Result<TaskboardConfig> {
    let mut provider = ConfigProvider::new();
    if let Some(path) = &cli.config {
        provider = provider.with_file(path);
    }
    if let Some(base_url) = &cli.base_url {
        provider = provider.with_override("api.base_url", base_url);
    }
    if let Some(token) = &cli.token {
        provider = provider.with_override("api.token", token);
    }
    let config = provider.load().context("failed to load configuration")?;
    debug!(base_url = %config.api.base_url, "using configuration");
    Ok(config)
}

/// HTTP gateway for the configured backend
pub fn gateway(config: &TaskboardConfig) -> Result<HttpGateway> {
    let gateway = HttpGateway::with_timeout(&config.api.base_url, config.api.timeout())
        .with_context(|| format!("cannot use API at {}", config.api.base_url))?;
    Ok(match &config.api.token {
        Some(token) => gateway.with_token(token),
        None => gateway,
    })
}
