//! Persistence gateway - the seam between the board and its backend
//!
//! The engine only needs two calls: fetch a (possibly filtered) board and persist a move.
//! Retries, timeouts and the backend's own rank computation live behind this trait.

mod http;

pub use http::{HttpGateway, DEFAULT_BASE_URL};

use crate::rank::Rank;
use crate::types::{Board, BoardFilters, ColumnId, ProjectId, TaskId};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Persist a move: the task, its new column and the ranks of its new neighbors.
///
/// The neighbor pair is the authoritative input; the backend may compute the same rank
/// the client did or its own.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MoveRequest {
    /// Travels in the URL, not the body
    #[serde(skip)]
    pub task_id: TaskId,
    pub target_column_id: ColumnId,
    pub prev_task_rank: Option<Rank>,
    pub next_task_rank: Option<Rank>,
}

/// Backend confirmation of a move
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MoveAck {
    /// Canonical rank assigned by the backend, if it reports one
    #[serde(default)]
    pub position: Option<Rank>,
}

impl MoveAck {
    pub fn with_position(position: impl Into<Rank>) -> Self {
        Self {
            position: Some(position.into()),
        }
    }
}

/// Errors from the backend or the transport
#[derive(Debug, Error)]
pub enum GatewayError {
    /// Connection, timeout or decoding failure inside the HTTP client
    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),

    /// Credentials missing, expired and not refreshable
    #[error("unauthorized: {0}")]
    Unauthorized(String),

    /// The backend answered with a non-success status
    #[error("request rejected ({status}): {message}")]
    Rejected { status: u16, message: String },

    /// The backend answered with a body we could not read
    #[error("invalid response: {0}")]
    InvalidResponse(String),

    /// The configured base URL cannot be used
    #[error("invalid url: {0}")]
    InvalidUrl(String),
}

impl GatewayError {
    /// Server-side or transport trouble that may go away on its own
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Transport(_) => true,
            Self::Rejected { status, .. } => *status >= 500,
            _ => false,
        }
    }
}

/// Backend operations consumed by the board
#[async_trait]
pub trait PersistenceGateway: Send + Sync {
    /// Fetch a project's board. With active filters the result is a subset.
    async fn fetch_board(
        &self,
        project_id: &ProjectId,
        filters: &BoardFilters,
    ) -> Result<Board, GatewayError>;

    /// Persist a move computed by the engine
    async fn move_task(&self, request: &MoveRequest) -> Result<MoveAck, GatewayError>;
}

#[async_trait]
impl<G: PersistenceGateway + ?Sized> PersistenceGateway for std::sync::Arc<G> {
    async fn fetch_board(
        &self,
        project_id: &ProjectId,
        filters: &BoardFilters,
    ) -> Result<Board, GatewayError> {
        (**self).fetch_board(project_id, filters).await
    }

    async fn move_task(&self, request: &MoveRequest) -> Result<MoveAck, GatewayError> {
        (**self).move_task(request).await
    }
}
