//! `taskboard board` - fetch and print a board

use anyhow::{Context, Result};
use comfy_table::Table;
use taskboard::{Board, BoardFilters, PersistenceGateway, Priority, ProjectId};
use taskboard_config::TaskboardConfig;

use crate::table::{new_table, truncate_str};

/// Build filters from command line flags
pub fn filters(keyword: Option<String>, priority: Option<Priority>, mine: bool) -> BoardFilters {
    BoardFilters {
        keyword,
        priority,
        mine,
    }
}

/// Run the board command.
pub async fn run_board(
    config: &TaskboardConfig,
    project: &str,
    filters: &BoardFilters,
    json: bool,
) -> Result<i32> {
    let gateway = super::gateway(config)?;
    let mut board = gateway
        .fetch_board(&ProjectId::from(project), filters)
        .await
        .with_context(|| format!("failed to fetch board of project {}", project))?;
    board.normalize();

    if json {
        println!("{}", serde_json::to_string_pretty(&board)?);
        return Ok(0);
    }

    println!("{}", render_board(&board));
    if filters.is_active() {
        println!("Filtered view: reordering is disabled while filters are active.");
    }
    Ok(0)
}

/// One row per task, grouped by column in display order
pub fn render_board(board: &Board) -> Table {
    let mut table = new_table();
    table.set_header(vec!["Column", "Rank", "Task", "Title", "Priority", "Assignees"]);

    for column in &board.columns {
        if column.tasks.is_empty() {
            table.add_row(vec![column.name.clone(), "-".into(), "-".into(), "(empty)".into(), String::new(), String::new()]);
            continue;
        }
        for task in &column.tasks {
            let assignees = task
                .assignees
                .iter()
                .map(|a| a.name.as_str())
                .collect::<Vec<_>>()
                .join(", ");
            table.add_row(vec![
                column.name.clone(),
                task.position.to_string(),
                task.display_id.clone().unwrap_or_else(|| task.id.to_string()),
                truncate_str(&task.title, 48),
                task.priority.to_string(),
                assignees,
            ]);
        }
    }
    table
}
