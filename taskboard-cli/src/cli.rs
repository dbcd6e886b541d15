//! CLI definition for the taskboard command-line interface.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use taskboard::Priority;

/// Taskboard - inspect and reorder Kanban boards from the terminal.
///
/// Configuration is read from ~/.taskboard/taskboard.toml, ./.taskboard/taskboard.toml,
/// the file given with --config and TASKBOARD_* environment variables, in that order.
#[derive(Parser, Debug)]
#[command(name = "taskboard")]
#[command(version)]
#[command(about = "Inspect and reorder Kanban boards")]
#[command(
    long_about = "Taskboard fetches project boards from the REST backend and moves tasks \
    between columns, computing fractional ranks on the client.\n\n\
    Environment variables:\n  \
    TASKBOARD_API__BASE_URL      Override the API root\n  \
    TASKBOARD_API__TOKEN         Bearer token\n  \
    TASKBOARD_API__TIMEOUT_SECS  Per-request timeout\n  \
    TASKBOARD_RANK__MAX_LEN      Longest rank generated before giving up"
)]
pub struct Cli {
    /// Enable debug output to stderr
    #[arg(short, long, global = true)]
    pub debug: bool,

    /// Read configuration from this file as well
    #[arg(long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// API root, e.g. http://localhost:8080/api/v1
    #[arg(long, global = true, value_name = "URL")]
    pub base_url: Option<String>,

    /// Bearer token for the API
    #[arg(long, global = true, value_name = "TOKEN")]
    pub token: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Show a project's board
    Board {
        /// Project id
        #[arg(long)]
        project: String,
        /// Only tasks whose title matches this keyword
        #[arg(long)]
        keyword: Option<String>,
        /// Only tasks with this priority (low, medium, high, urgent)
        #[arg(long, value_parser = parse_priority)]
        priority: Option<Priority>,
        /// Only tasks assigned to me
        #[arg(long)]
        mine: bool,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Move a task and persist the new order
    Move {
        /// Project id
        #[arg(long)]
        project: String,
        /// Task to move
        #[arg(long)]
        task: String,
        #[command(flatten)]
        target: MoveTarget,
    },

    /// Print a rank that sorts between two others
    Rank {
        /// Rank the result must sort after
        #[arg(long, value_name = "RANK")]
        after: Option<String>,
        /// Rank the result must sort before
        #[arg(long, value_name = "RANK")]
        before: Option<String>,
    },
}

/// Where to drop the task
#[derive(Args, Debug)]
#[group(required = true, multiple = false)]
pub struct MoveTarget {
    /// Append to the end of this column
    #[arg(long, value_name = "COLUMN_ID")]
    pub column: Option<String>,
    /// Take the slot of this task
    #[arg(long, value_name = "TASK_ID")]
    pub onto: Option<String>,
}

fn parse_priority(value: &str) -> Result<Priority, String> {
    Priority::parse(value)
        .ok_or_else(|| format!("unknown priority '{}' (low, medium, high, urgent)", value))
}
