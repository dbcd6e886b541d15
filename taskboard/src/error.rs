//! Error types for the reordering engine

use crate::gateway::GatewayError;
use crate::rank::RankError;
use thiserror::Error;

/// Result type for board operations
pub type Result<T> = std::result::Result<T, ReorderError>;

/// Errors that can occur while reordering a board
#[derive(Debug, Error)]
pub enum ReorderError {
    /// The drag ended somewhere that does not resolve to a column slot
    #[error("invalid drop target: {reason}")]
    InvalidDropTarget { reason: String },

    /// No rank could be synthesized for the new slot
    #[error(transparent)]
    Rank(#[from] RankError),

    /// The backend refused or never received the move
    #[error("move of task {task_id} was not persisted: {source}")]
    PersistenceFailure {
        task_id: String,
        #[source]
        source: GatewayError,
    },

    /// Drag attempted while the board shows a filtered subset
    #[error("drag is disabled while the board is filtered")]
    FilteredDragAttempt,

    /// A previous move is still waiting for the backend
    #[error("a move is still being persisted")]
    Busy,

    /// Drag-end arrived with no drag in progress
    #[error("no drag in progress")]
    NotDragging,

    /// Task not found
    #[error("task not found: {id}")]
    TaskNotFound { id: String },

    /// Column not found
    #[error("column not found: {id}")]
    ColumnNotFound { id: String },

    /// Board fetch or other gateway call failed
    #[error("gateway error: {0}")]
    Gateway(#[from] GatewayError),
}

impl ReorderError {
    /// Create an invalid drop target error
    pub fn invalid_drop_target(reason: impl Into<String>) -> Self {
        Self::InvalidDropTarget {
            reason: reason.into(),
        }
    }

    /// Check if the gesture can simply be tried again later
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Busy => true,
            Self::PersistenceFailure { source, .. } | Self::Gateway(source) => {
                source.is_retryable()
            }
            _ => false,
        }
    }
}
