//! Taskboard CLI - inspect and reorder Kanban boards.
//!
//! Commands:
//! - `taskboard board --project <id>`: Show a board, optionally filtered
//! - `taskboard move --project <id> --task <id> (--column <id> | --onto <id>)`: Move a task
//! - `taskboard rank [--after R] [--before R]`: Compute a rank between two others
//!
//! Exit codes:
//! - 0: Success
//! - 1: Error, or the backend refused a move and it was rolled back

use clap::Parser;
use tracing_subscriber::EnvFilter;

use taskboard_cli::{commands, Cli};

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let filter = if cli.debug {
        EnvFilter::new("taskboard=debug,taskboard_config=debug,taskboard_cli=debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_ansi(false)
        .with_writer(std::io::stderr)
        .init();

    let exit_code = match commands::run(cli).await {
        Ok(code) => code,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            1
        }
    };
    std::process::exit(exit_code);
}
