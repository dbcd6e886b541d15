//! Core types for the board

mod board;
mod filters;
mod ids;
mod task;

// Re-export all types
pub use board::{Board, Column};
pub use filters::BoardFilters;
pub use ids::{ColumnId, ProjectId, TaskId, UserId, WorkspaceId};
pub use task::{Assignee, Priority, Task};
