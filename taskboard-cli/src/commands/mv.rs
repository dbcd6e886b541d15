//! `taskboard move` - move a task through the reorder engine

use anyhow::{Context, Result};
use taskboard::{BoardFilters, BoardSession, DropTarget, MoveOutcome, TaskId};
use taskboard_config::TaskboardConfig;

use crate::cli::MoveTarget;

/// Run the move command.
///
/// The board is loaded unfiltered so neighbor ranks reflect the real column. Returns exit
/// code 1 when the backend refuses the move.
pub async fn run_move(
    config: &TaskboardConfig,
    project: &str,
    task: &str,
    target: MoveTarget,
) -> Result<i32> {
    let gateway = super::gateway(config)?;
    let mut session = BoardSession::open_with(
        gateway,
        project,
        BoardFilters::default(),
        config.rank.calculator(),
    )
    .await
    .with_context(|| format!("failed to load board of project {}", project))?;

    let task_id = TaskId::from(task);
    let outcome = session
        .drag(&task_id, drop_target(target)?)
        .await
        .with_context(|| format!("cannot move task {}", task))?;

    Ok(match outcome {
        MoveOutcome::NoChange => {
            println!("Task {} is already there.", task_id);
            0
        }
        MoveOutcome::Committed { task_id, position } => {
            let column = session
                .board()
                .column_of(&task_id)
                .map(|c| c.name.clone())
                .unwrap_or_default();
            println!("Moved task {} to {} (rank {}).", task_id, column, position);
            0
        }
        MoveOutcome::RolledBack { task_id, reason } => {
            eprintln!("Move of task {} was rolled back: {}", task_id, reason);
            1
        }
        MoveOutcome::Stale => 0,
    })
}

fn drop_target(target: MoveTarget) -> Result<DropTarget> {
    match (target.column, target.onto) {
        (Some(column), None) => Ok(DropTarget::Column(column.as_str().into())),
        (None, Some(onto)) => Ok(DropTarget::Task(onto.as_str().into())),
        _ => anyhow::bail!("exactly one of --column or --onto is required"),
    }
}
