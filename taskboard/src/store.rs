//! BoardStore - the in-memory board a view renders from
//!
//! The store holds data and applies mechanical changes to it. It knows nothing about
//! gestures, ranks or the backend; the reorder engine decides what to change.

use crate::error::{ReorderError, Result};
use crate::rank::Rank;
use crate::types::{Board, ColumnId, Task, TaskId};
use tokio::sync::broadcast;
use tracing::{debug, trace};

const EVENT_CAPACITY: usize = 64;

/// Notifications for views observing the store
#[derive(Debug, Clone, PartialEq)]
pub enum BoardEvent {
    /// The board changed and should be re-rendered
    Changed { revision: u64 },
    /// An optimistic move was undone
    MoveFailed { task_id: TaskId, reason: String },
}

/// Deep copy of a board, taken before an optimistic change.
///
/// A snapshot owns its data: mutating the live store never reaches it.
#[derive(Debug, Clone, PartialEq)]
pub struct BoardSnapshot {
    board: Board,
}

impl BoardSnapshot {
    pub fn board(&self) -> &Board {
        &self.board
    }
}

/// Single owner of the live board
pub struct BoardStore {
    board: Board,
    revision: u64,
    events: broadcast::Sender<BoardEvent>,
}

impl Default for BoardStore {
    fn default() -> Self {
        Self::new()
    }
}

impl BoardStore {
    /// Create a store holding an empty board
    pub fn new() -> Self {
        let (events, _) = broadcast::channel(EVENT_CAPACITY);
        Self {
            board: Board::default(),
            revision: 0,
            events,
        }
    }

    /// Create a store and load a board into it
    pub fn with_board(board: Board) -> Self {
        let mut store = Self::new();
        store.load(board);
        store
    }

    /// Current board, read-only
    pub fn board(&self) -> &Board {
        &self.board
    }

    /// Incremented on every change
    pub fn revision(&self) -> u64 {
        self.revision
    }

    /// Subscribe to change and failure notifications
    pub fn subscribe(&self) -> broadcast::Receiver<BoardEvent> {
        self.events.subscribe()
    }

    /// Replace the whole board (after a fetch)
    pub fn load(&mut self, mut board: Board) {
        board.normalize();
        debug!(
            columns = board.columns.len(),
            tasks = board.task_count(),
            "loading board"
        );
        self.board = board;
        self.touch();
    }

    /// Deep copy of the current board
    pub fn snapshot(&self) -> BoardSnapshot {
        BoardSnapshot {
            board: self.board.clone(),
        }
    }

    /// Put a snapshot back verbatim
    pub fn restore(&mut self, snapshot: BoardSnapshot) {
        debug!(revision = self.revision, "restoring board snapshot");
        self.board = snapshot.board;
        self.touch();
    }

    /// Move a task to `destination_index` of `destination`.
    ///
    /// The index is counted after the task has been taken out of its current column, so
    /// moving within a column behaves like removing then inserting. Nothing changes on
    /// error.
    pub fn apply_local_move(
        &mut self,
        task_id: &TaskId,
        destination: &ColumnId,
        destination_index: usize,
    ) -> Result<()> {
        let (source_col, source_idx) =
            self.board
                .locate_task(task_id)
                .ok_or_else(|| ReorderError::TaskNotFound {
                    id: task_id.to_string(),
                })?;
        let dest_col =
            self.board
                .column_index(destination)
                .ok_or_else(|| ReorderError::ColumnNotFound {
                    id: destination.to_string(),
                })?;

        let dest_len = self.board.columns[dest_col].tasks.len() - usize::from(source_col == dest_col);
        if destination_index > dest_len {
            return Err(ReorderError::invalid_drop_target(format!(
                "index {} past end of column {} ({} tasks)",
                destination_index, destination, dest_len
            )));
        }

        let mut task = self.board.columns[source_col].tasks.remove(source_idx);
        task.column_id = destination.clone();
        self.board.columns[dest_col]
            .tasks
            .insert(destination_index, task);

        trace!(
            task_id = %task_id,
            column_id = %destination,
            index = destination_index,
            "applied local move"
        );
        self.touch();
        Ok(())
    }

    /// Tasks immediately before and after `index` in a column
    pub fn neighbors(&self, column: &ColumnId, index: usize) -> (Option<&Task>, Option<&Task>) {
        let Some(column) = self.board.find_column(column) else {
            return (None, None);
        };
        let previous = index.checked_sub(1).and_then(|i| column.tasks.get(i));
        let next = column.tasks.get(index + 1);
        (previous, next)
    }

    /// Set the rank of a task in place
    pub fn set_task_position(&mut self, task_id: &TaskId, position: Rank) -> Result<()> {
        let (ci, ti) = self
            .board
            .locate_task(task_id)
            .ok_or_else(|| ReorderError::TaskNotFound {
                id: task_id.to_string(),
            })?;
        self.board.columns[ci].tasks[ti].position = position;
        self.touch();
        Ok(())
    }

    pub(crate) fn notify(&self, event: BoardEvent) {
        // No subscribers is fine
        let _ = self.events.send(event);
    }

    fn touch(&mut self) {
        self.revision += 1;
        self.notify(BoardEvent::Changed {
            revision: self.revision,
        });
    }
}
