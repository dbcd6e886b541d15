//! Board-level types: Board, Column

use super::ids::{ColumnId, TaskId, WorkspaceId};
use super::task::Task;
use serde::{Deserialize, Serialize};

/// The board of one project: columns in display order, each holding its tasks in rank
/// order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Board {
    #[serde(default)]
    pub columns: Vec<Column>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub workspace_id: Option<WorkspaceId>,
}

impl Board {
    /// Create a board from columns
    pub fn new(columns: Vec<Column>) -> Self {
        Self {
            columns,
            workspace_id: None,
        }
    }

    pub fn with_workspace(mut self, workspace_id: impl Into<WorkspaceId>) -> Self {
        self.workspace_id = Some(workspace_id.into());
        self
    }

    /// Find a column by ID
    pub fn find_column(&self, id: &ColumnId) -> Option<&Column> {
        self.columns.iter().find(|c| &c.id == id)
    }

    /// Index of a column in display order
    pub fn column_index(&self, id: &ColumnId) -> Option<usize> {
        self.columns.iter().position(|c| &c.id == id)
    }

    /// Column index and task index of a task
    pub fn locate_task(&self, id: &TaskId) -> Option<(usize, usize)> {
        self.columns.iter().enumerate().find_map(|(ci, column)| {
            column
                .tasks
                .iter()
                .position(|t| &t.id == id)
                .map(|ti| (ci, ti))
        })
    }

    /// Find a task anywhere on the board
    pub fn find_task(&self, id: &TaskId) -> Option<&Task> {
        self.locate_task(id)
            .map(|(ci, ti)| &self.columns[ci].tasks[ti])
    }

    /// Column currently holding a task
    pub fn column_of(&self, id: &TaskId) -> Option<&Column> {
        self.locate_task(id).map(|(ci, _)| &self.columns[ci])
    }

    pub fn task_count(&self) -> usize {
        self.columns.iter().map(|c| c.tasks.len()).sum()
    }

    /// Stamp every task with its containing column and sort each column by rank.
    ///
    /// The sort is stable, so tasks that arrive with equal ranks keep the backend's order.
    pub fn normalize(&mut self) {
        for column in &mut self.columns {
            for task in &mut column.tasks {
                task.column_id = column.id.clone();
            }
            column.tasks.sort_by(|a, b| a.position.cmp(&b.position));
        }
    }

    /// Describe every broken board invariant; empty when the board is consistent.
    pub fn invariant_violations(&self) -> Vec<String> {
        let mut violations = Vec::new();
        let mut seen = std::collections::HashSet::new();

        for column in &self.columns {
            for task in &column.tasks {
                if task.column_id != column.id {
                    violations.push(format!(
                        "task {} sits in column {} but points at {}",
                        task.id, column.id, task.column_id
                    ));
                }
                if !seen.insert(&task.id) {
                    violations.push(format!("task {} appears more than once", task.id));
                }
            }
            for pair in column.tasks.windows(2) {
                if pair[0].position > pair[1].position {
                    violations.push(format!(
                        "column {} out of order: {} ({}) before {} ({})",
                        column.id, pair[0].id, pair[0].position, pair[1].id, pair[1].position
                    ));
                }
            }
        }

        violations
    }
}

/// A column defines a workflow stage
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Column {
    pub id: ColumnId,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub tasks: Vec<Task>,
}

impl Column {
    /// Create an empty column
    pub fn new(id: impl Into<ColumnId>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            tasks: Vec::new(),
        }
    }

    /// Add a task (builder style); the task is stamped with this column
    pub fn with_task(mut self, mut task: Task) -> Self {
        task.column_id = self.id.clone();
        self.tasks.push(task);
        self
    }

    pub fn task_ids(&self) -> Vec<&TaskId> {
        self.tasks.iter().map(|t| &t.id).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Board {
        Board::new(vec![
            Column::new("todo", "To Do")
                .with_task(Task::new("t1", "One", "a"))
                .with_task(Task::new("t2", "Two", "m")),
            Column::new("done", "Done").with_task(Task::new("t3", "Three", "c")),
        ])
    }

    #[test]
    fn test_locate_and_find() {
        let board = sample();
        assert_eq!(board.locate_task(&"t2".into()), Some((0, 1)));
        assert_eq!(board.find_task(&"t3".into()).unwrap().title, "Three");
        assert_eq!(board.column_of(&"t3".into()).unwrap().name, "Done");
        assert_eq!(board.column_index(&"done".into()), Some(1));
        assert!(board.find_column(&"doing".into()).is_none());
        assert_eq!(board.task_count(), 3);
    }

    #[test]
    fn test_normalize_stamps_and_sorts() {
        let json = r#"{
            "columns": [
                {"id": 1, "name": "To Do", "tasks": [
                    {"id": 10, "position": "m", "title": "late"},
                    {"id": 11, "position": "b", "title": "early"}
                ]}
            ],
            "workspaceId": 9
        }"#;
        let mut board: Board = serde_json::from_str(json).unwrap();
        assert!(!board.invariant_violations().is_empty());

        board.normalize();
        assert!(board.invariant_violations().is_empty());
        assert_eq!(
            board.columns[0].task_ids(),
            vec![&TaskId::from("11"), &TaskId::from("10")]
        );
        assert_eq!(board.columns[0].tasks[0].column_id.as_str(), "1");
        assert_eq!(board.workspace_id, Some(WorkspaceId::from("9")));
    }

    #[test]
    fn test_unranked_task_does_not_break_the_board() {
        let json = r#"{
            "columns": [
                {"id": 1, "name": "To Do", "tasks": [
                    {"id": 10, "position": "m", "title": "ranked"},
                    {"id": 11, "position": null, "title": "unranked"}
                ]}
            ]
        }"#;
        let mut board: Board = serde_json::from_str(json).unwrap();
        board.normalize();

        assert_eq!(board.task_count(), 2);
        assert_eq!(board.columns[0].tasks[0].id.as_str(), "11");
        assert!(board.invariant_violations().is_empty());
    }

    #[test]
    fn test_invariant_violations_detects_duplicates() {
        let mut board = sample();
        let dup = board.columns[0].tasks[0].clone();
        board.columns[1].tasks.push(Task {
            column_id: "done".into(),
            ..dup
        });
        let violations = board.invariant_violations();
        assert!(violations.iter().any(|v| v.contains("more than once")));
    }
}
