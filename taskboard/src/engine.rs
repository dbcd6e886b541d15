//! ReorderEngine - optimistic drag-and-drop reordering
//!
//! ```text
//! Idle ──drag start──▶ Dragging ──drop──▶ Resolving ──ok───▶ Committed ──▶ Idle
//!   ▲                     │                   │
//!   └──── no target ──────┘                   └──error──▶ RolledBack ──▶ Idle
//! ```
//!
//! A drop is applied to the store immediately and the moved task gets its new rank before
//! anything is sent. The caller receives a [`PendingMove`] to send to the backend and
//! reports the answer back with [`ReorderEngine::settle`]; [`ReorderEngine::persist`]
//! does both against a [`PersistenceGateway`]. While a move is resolving, new drags are
//! refused.
//!
//! When a neighbor's rank is not in the calculator's alphabet (or is missing), the engine
//! does not compute one: the moved task keeps its old rank locally, the raw neighbor ranks
//! are sent as they are, and the rank the backend answers with is adopted on settle.

use crate::error::{ReorderError, Result};
use crate::gateway::{GatewayError, MoveAck, MoveRequest, PersistenceGateway};
use crate::rank::{Rank, RankCalculator, RankError};
use crate::store::{BoardEvent, BoardSnapshot, BoardStore};
use crate::types::{Board, BoardFilters, ColumnId, TaskId};
use std::fmt;
use tracing::{debug, info, warn};

/// Where a dragged task was released
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DropTarget {
    /// Onto the empty area of a column: append at the end
    Column(ColumnId),
    /// Onto another task: take that task's slot
    Task(TaskId),
}

/// Observable engine state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Idle,
    Dragging,
    Resolving,
}

/// Identifies one in-flight move
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct MoveTicket(u64);

impl fmt::Display for MoveTicket {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// A move that has been applied locally and still has to reach the backend
#[derive(Debug, Clone, PartialEq)]
pub struct PendingMove {
    pub ticket: MoveTicket,
    pub request: MoveRequest,
    /// Rank the client computed for the moved task, `None` when the backend assigns it
    pub position: Option<Rank>,
}

/// How a gesture ended
#[derive(Debug, Clone, PartialEq)]
pub enum MoveOutcome {
    /// Nothing to persist (no target, or dropped back onto its own slot)
    NoChange,
    /// Backend confirmed; `position` is the rank now held locally
    Committed { task_id: TaskId, position: Rank },
    /// Backend refused; the board is back to its pre-drag state
    RolledBack { task_id: TaskId, reason: String },
    /// Response for a move the engine no longer tracks (board reloaded meanwhile)
    Stale,
}

enum DragState {
    Idle,
    Dragging {
        task_id: TaskId,
    },
    Resolving {
        ticket: MoveTicket,
        task_id: TaskId,
        snapshot: BoardSnapshot,
    },
}

/// Drives drag gestures against a [`BoardStore`]
pub struct ReorderEngine {
    store: BoardStore,
    calculator: RankCalculator,
    filtered: bool,
    state: DragState,
    next_ticket: u64,
}

impl ReorderEngine {
    /// Engine over an existing store
    pub fn new(store: BoardStore) -> Self {
        Self {
            store,
            calculator: RankCalculator::new(),
            filtered: false,
            state: DragState::Idle,
            next_ticket: 0,
        }
    }

    /// Use a specific rank calculator
    pub fn with_calculator(mut self, calculator: RankCalculator) -> Self {
        self.calculator = calculator;
        self
    }

    pub fn store(&self) -> &BoardStore {
        &self.store
    }

    /// Board to render
    pub fn board(&self) -> &Board {
        self.store.board()
    }

    pub fn phase(&self) -> Phase {
        match self.state {
            DragState::Idle => Phase::Idle,
            DragState::Dragging { .. } => Phase::Dragging,
            DragState::Resolving { .. } => Phase::Resolving,
        }
    }

    /// Task currently being dragged or resolved
    pub fn active_task(&self) -> Option<&TaskId> {
        match &self.state {
            DragState::Idle => None,
            DragState::Dragging { task_id } | DragState::Resolving { task_id, .. } => {
                Some(task_id)
            }
        }
    }

    /// Replace the board after a fetch.
    ///
    /// Any gesture in progress is dropped; a response for a move that was resolving
    /// will be reported as [`MoveOutcome::Stale`].
    pub fn load(&mut self, board: Board) {
        if let DragState::Resolving { ticket, task_id, .. } = &self.state {
            warn!(%ticket, task_id = %task_id, "board reloaded while a move was resolving");
        }
        self.state = DragState::Idle;
        self.store.load(board);
    }

    /// Mark whether the loaded board is a filtered subset
    pub fn set_filters(&mut self, filters: &BoardFilters) {
        self.filtered = filters.is_active();
    }

    pub fn is_filtered(&self) -> bool {
        self.filtered
    }

    /// A drag began on `task_id`
    pub fn on_drag_start(&mut self, task_id: &TaskId) -> Result<()> {
        if let DragState::Resolving { ticket, .. } = &self.state {
            debug!(%ticket, task_id = %task_id, "drag refused while resolving");
            return Err(ReorderError::Busy);
        }
        if self.filtered {
            debug!(task_id = %task_id, "drag refused on filtered board");
            return Err(ReorderError::FilteredDragAttempt);
        }
        if self.store.board().locate_task(task_id).is_none() {
            return Err(ReorderError::TaskNotFound {
                id: task_id.to_string(),
            });
        }

        debug!(task_id = %task_id, "drag started");
        self.state = DragState::Dragging {
            task_id: task_id.clone(),
        };
        Ok(())
    }

    /// The view aborted the drag
    pub fn cancel_drag(&mut self) {
        if let DragState::Dragging { task_id } = &self.state {
            debug!(task_id = %task_id, "drag cancelled");
            self.state = DragState::Idle;
        }
    }

    /// A drag ended; `None` means it was released outside any target.
    ///
    /// Returns the move to persist, or `None` when nothing changed. On `Some`, the store
    /// already shows the new arrangement and the engine is `Resolving`.
    pub fn on_drag_end(
        &mut self,
        task_id: &TaskId,
        target: Option<DropTarget>,
    ) -> Result<Option<PendingMove>> {
        let dragged = match std::mem::replace(&mut self.state, DragState::Idle) {
            DragState::Dragging { task_id } => task_id,
            resolving @ DragState::Resolving { .. } => {
                self.state = resolving;
                return Err(ReorderError::Busy);
            }
            DragState::Idle => return Err(ReorderError::NotDragging),
        };

        if &dragged != task_id {
            return Err(ReorderError::invalid_drop_target(format!(
                "drag started on {} but ended on {}",
                dragged, task_id
            )));
        }
        if self.filtered {
            return Err(ReorderError::FilteredDragAttempt);
        }
        let Some(target) = target else {
            debug!(task_id = %task_id, "dropped outside any target");
            return Ok(None);
        };

        let (destination, index) = match self.resolve_target(task_id, &target)? {
            Some(slot) => slot,
            None => {
                debug!(task_id = %task_id, "dropped onto its own slot");
                return Ok(None);
            }
        };

        let snapshot = self.store.snapshot();
        self.store.apply_local_move(task_id, &destination, index)?;

        let (previous, next) = {
            let (p, n) = self.store.neighbors(&destination, index);
            (p.map(|t| t.position.clone()), n.map(|t| t.position.clone()))
        };

        let position = match self.calculator.between(previous.as_ref(), next.as_ref()) {
            Ok(rank) => Some(rank),
            Err(RankError::InvalidRank { rank }) => {
                debug!(task_id = %task_id, rank = %rank, "foreign neighbor rank, backend assigns");
                None
            }
            Err(e) => {
                warn!(task_id = %task_id, error = %e, "no rank for new slot, rolling back");
                self.store.restore(snapshot);
                self.store.notify(BoardEvent::MoveFailed {
                    task_id: task_id.clone(),
                    reason: e.to_string(),
                });
                return Err(e.into());
            }
        };
        if let Some(position) = &position {
            self.store.set_task_position(task_id, position.clone())?;
        }

        self.next_ticket += 1;
        let ticket = MoveTicket(self.next_ticket);
        info!(
            %ticket,
            task_id = %task_id,
            column_id = %destination,
            index,
            position = position.as_ref().map_or("<backend>", Rank::as_str),
            "move applied locally"
        );

        self.state = DragState::Resolving {
            ticket,
            task_id: task_id.clone(),
            snapshot,
        };

        Ok(Some(PendingMove {
            ticket,
            request: MoveRequest {
                task_id: task_id.clone(),
                target_column_id: destination,
                prev_task_rank: previous.filter(|r| !r.is_empty()),
                next_task_rank: next.filter(|r| !r.is_empty()),
            },
            position,
        }))
    }

    /// Report the backend's answer for a pending move
    pub fn settle(
        &mut self,
        ticket: MoveTicket,
        outcome: std::result::Result<MoveAck, GatewayError>,
    ) -> MoveOutcome {
        let current = matches!(&self.state, DragState::Resolving { ticket: t, .. } if *t == ticket);
        if !current {
            debug!(%ticket, "ignoring response for a move no longer tracked");
            return MoveOutcome::Stale;
        }
        let DragState::Resolving {
            task_id, snapshot, ..
        } = std::mem::replace(&mut self.state, DragState::Idle)
        else {
            return MoveOutcome::Stale;
        };

        match outcome {
            Ok(ack) => {
                let position = self.adopt_canonical(&task_id, ack.position);
                info!(%ticket, task_id = %task_id, position = %position, "move committed");
                MoveOutcome::Committed { task_id, position }
            }
            Err(e) => {
                let failure = ReorderError::PersistenceFailure {
                    task_id: task_id.to_string(),
                    source: e,
                };
                warn!(%ticket, error = %failure, "move rolled back");
                let reason = failure.to_string();
                self.store.restore(snapshot);
                self.store.notify(BoardEvent::MoveFailed {
                    task_id: task_id.clone(),
                    reason: reason.clone(),
                });
                MoveOutcome::RolledBack { task_id, reason }
            }
        }
    }

    /// Send a pending move through `gateway` and settle it
    pub async fn persist<G>(&mut self, pending: PendingMove, gateway: &G) -> MoveOutcome
    where
        G: PersistenceGateway + ?Sized,
    {
        let outcome = gateway.move_task(&pending.request).await;
        self.settle(pending.ticket, outcome)
    }

    /// Destination column and index for a drop, or `None` if the task would not move
    fn resolve_target(
        &self,
        task_id: &TaskId,
        target: &DropTarget,
    ) -> Result<Option<(ColumnId, usize)>> {
        let board = self.store.board();
        let (source_col, source_idx) =
            board
                .locate_task(task_id)
                .ok_or_else(|| ReorderError::TaskNotFound {
                    id: task_id.to_string(),
                })?;

        let (dest_col, dest_idx) = match target {
            DropTarget::Task(over) if over == task_id => return Ok(None),
            DropTarget::Task(over) => board.locate_task(over).ok_or_else(|| {
                ReorderError::invalid_drop_target(format!("task {} is not on the board", over))
            })?,
            DropTarget::Column(column) => {
                let ci = board.column_index(column).ok_or_else(|| {
                    ReorderError::invalid_drop_target(format!(
                        "column {} is not on the board",
                        column
                    ))
                })?;
                let len = board.columns[ci].tasks.len();
                (ci, len - usize::from(ci == source_col))
            }
        };

        if dest_col == source_col && dest_idx == source_idx {
            return Ok(None);
        }
        Ok(Some((board.columns[dest_col].id.clone(), dest_idx)))
    }

    /// Keep the backend's rank if it still sorts between the task's neighbors
    fn adopt_canonical(&mut self, task_id: &TaskId, canonical: Option<Rank>) -> Rank {
        let Some((ci, ti)) = self.store.board().locate_task(task_id) else {
            return canonical.unwrap_or_else(Rank::initial);
        };
        let column = &self.store.board().columns[ci];
        let local = column.tasks[ti].position.clone();

        let Some(canonical) = canonical else {
            return local;
        };
        if canonical == local {
            return local;
        }

        let after_previous = ti == 0 || column.tasks[ti - 1].position < canonical;
        let before_next = column
            .tasks
            .get(ti + 1)
            .is_none_or(|next| canonical < next.position);
        if !(after_previous && before_next) {
            warn!(
                task_id = %task_id,
                canonical = %canonical,
                local = %local,
                "backend rank does not fit between neighbors, keeping local rank"
            );
            return local;
        }

        match self.store.set_task_position(task_id, canonical.clone()) {
            Ok(()) => canonical,
            Err(_) => local,
        }
    }
}
