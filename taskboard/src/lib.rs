//! Kanban board state with optimistic drag-and-drop reordering
//!
//! This crate holds the in-memory board a view renders from and the machinery that
//! reorders it. A drag gesture is applied locally first, the moved task gets a new
//! fractional rank computed from its new neighbors, and the move is then sent to the
//! REST backend. If the backend refuses, the board is restored to the pre-drag snapshot
//! and a `MoveFailed` event is emitted.
//!
//! ## Overview
//!
//! - **[`BoardStore`]** - the single source of truth: load, snapshot, restore, local moves
//! - **[`RankCalculator`]** - base-62 fractional keys that sort between two neighbors
//! - **[`ReorderEngine`]** - the `Idle → Dragging → Resolving → Idle` state machine
//! - **[`PersistenceGateway`]** - the backend seam, with [`HttpGateway`] for the REST API
//! - **[`BoardSession`]** - one project's board, fetched through a gateway and reordered
//!
//! ## Basic Usage
//!
//! ```rust,no_run
//! use taskboard::{BoardSession, DropTarget, HttpGateway, ProjectId, TaskId};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let gateway = HttpGateway::new("http://localhost:8080/api/v1")?;
//! let mut session = BoardSession::open(gateway, ProjectId::from("42")).await?;
//!
//! // Drop task 7 onto the "done" column (appends at the end)
//! let outcome = session
//!     .drag(&TaskId::from("7"), DropTarget::Column("done".into()))
//!     .await?;
//! println!("{:?}", outcome);
//! # Ok(())
//! # }
//! ```
//!
//! ## Ranks
//!
//! Task positions are strings compared byte by byte. Inserting between two tasks never
//! renumbers the rest of the column; it only synthesizes a key between the neighbors:
//!
//! ```text
//! a ─────── m ─────── z        drag z between a and m
//! a ── g ── m                  new key "g"
//! ```
//!
//! Neighbor keys outside `0-9A-Za-z` are sent to the backend as they are, and the key it
//! answers with is used instead.

mod error;
pub mod engine;
pub mod gateway;
pub mod rank;
pub mod session;
pub mod store;
pub mod types;

pub use engine::{DropTarget, MoveOutcome, MoveTicket, PendingMove, Phase, ReorderEngine};
pub use error::{ReorderError, Result};
pub use gateway::{GatewayError, HttpGateway, MoveAck, MoveRequest, PersistenceGateway};
pub use rank::{Rank, RankCalculator, RankError};
pub use session::BoardSession;
pub use store::{BoardEvent, BoardSnapshot, BoardStore};

// Re-export commonly used types
pub use types::{
    Assignee, Board, BoardFilters, Column, ColumnId, Priority, ProjectId, Task, TaskId, UserId,
    WorkspaceId,
};
