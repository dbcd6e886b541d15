//! BoardSession - one project's board bound to a gateway

use crate::engine::{DropTarget, MoveOutcome, ReorderEngine};
use crate::error::Result;
use crate::gateway::PersistenceGateway;
use crate::rank::RankCalculator;
use crate::store::{BoardEvent, BoardStore};
use crate::types::{Board, BoardFilters, ProjectId, TaskId};
use tokio::sync::broadcast;
use tracing::{info, warn};

/// Loads a project's board and runs complete drag gestures against the backend
pub struct BoardSession<G: PersistenceGateway> {
    gateway: G,
    project_id: ProjectId,
    filters: BoardFilters,
    engine: ReorderEngine,
}

impl<G: PersistenceGateway> BoardSession<G> {
    /// Fetch the unfiltered board of `project_id`
    pub async fn open(gateway: G, project_id: impl Into<ProjectId>) -> Result<Self> {
        Self::open_with(gateway, project_id, BoardFilters::default(), RankCalculator::new()).await
    }

    /// Fetch the board of `project_id` with filters and a rank calculator
    pub async fn open_with(
        gateway: G,
        project_id: impl Into<ProjectId>,
        filters: BoardFilters,
        calculator: RankCalculator,
    ) -> Result<Self> {
        let mut session = Self {
            gateway,
            project_id: project_id.into(),
            filters,
            engine: ReorderEngine::new(BoardStore::new()).with_calculator(calculator),
        };
        session.refresh().await?;
        Ok(session)
    }

    /// Re-fetch the board with the current filters
    pub async fn refresh(&mut self) -> Result<()> {
        let board = self
            .gateway
            .fetch_board(&self.project_id, &self.filters)
            .await?;
        info!(
            project_id = %self.project_id,
            columns = board.columns.len(),
            tasks = board.task_count(),
            "board fetched"
        );
        self.engine.set_filters(&self.filters);
        self.engine.load(board);
        Ok(())
    }

    /// Change the filters and re-fetch
    pub async fn apply_filters(&mut self, filters: BoardFilters) -> Result<()> {
        self.filters = filters;
        self.refresh().await
    }

    /// Drag `task_id` onto `target` and wait for the backend.
    ///
    /// If a committed move leaves a column out of rank order (the backend assigned the
    /// rank but did not report it), the board is fetched again.
    pub async fn drag(&mut self, task_id: &TaskId, target: DropTarget) -> Result<MoveOutcome> {
        self.engine.on_drag_start(task_id)?;
        let Some(pending) = self.engine.on_drag_end(task_id, Some(target))? else {
            return Ok(MoveOutcome::NoChange);
        };

        let outcome = self.engine.persist(pending, &self.gateway).await;
        if matches!(outcome, MoveOutcome::Committed { .. })
            && !self.engine.board().invariant_violations().is_empty()
        {
            if let Err(e) = self.refresh().await {
                warn!(task_id = %task_id, error = %e, "refresh after move failed");
            }
        }
        Ok(outcome)
    }

    pub fn board(&self) -> &Board {
        self.engine.board()
    }

    pub fn project_id(&self) -> &ProjectId {
        &self.project_id
    }

    pub fn filters(&self) -> &BoardFilters {
        &self.filters
    }

    pub fn gateway(&self) -> &G {
        &self.gateway
    }

    pub fn engine(&self) -> &ReorderEngine {
        &self.engine
    }

    /// Drive gestures step by step
    pub fn engine_mut(&mut self) -> &mut ReorderEngine {
        &mut self.engine
    }

    pub fn subscribe(&self) -> broadcast::Receiver<BoardEvent> {
        self.engine.store().subscribe()
    }
}
