//! End-to-end drag scenarios against an in-memory backend

use async_trait::async_trait;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use taskboard::{
    Board, BoardEvent, BoardFilters, BoardSession, BoardStore, Column, DropTarget, GatewayError,
    MoveAck, MoveOutcome, MoveRequest, PersistenceGateway, Phase, Rank, RankError, ReorderEngine,
    ReorderError, Task, TaskId,
};

/// Serves a fixed board and records every move it receives
#[derive(Default)]
struct FakeBackend {
    board: Mutex<Board>,
    moves: Mutex<Vec<MoveRequest>>,
    fail_moves: AtomicBool,
    fetches: Mutex<Vec<BoardFilters>>,
    ack: Mutex<MoveAck>,
}

impl FakeBackend {
    fn serving(board: Board) -> Arc<Self> {
        Arc::new(Self {
            board: Mutex::new(board),
            ..Default::default()
        })
    }

    fn fail_moves(&self) {
        self.fail_moves.store(true, Ordering::SeqCst);
    }

    fn ack_with(&self, position: &str) {
        *self.ack.lock().unwrap() = MoveAck::with_position(position);
    }

    fn fetch_count(&self) -> usize {
        self.fetches.lock().unwrap().len()
    }

    fn moves(&self) -> Vec<MoveRequest> {
        self.moves.lock().unwrap().clone()
    }
}

#[async_trait]
impl PersistenceGateway for FakeBackend {
    async fn fetch_board(
        &self,
        _project_id: &taskboard::ProjectId,
        filters: &BoardFilters,
    ) -> Result<Board, GatewayError> {
        self.fetches.lock().unwrap().push(filters.clone());
        Ok(self.board.lock().unwrap().clone())
    }

    async fn move_task(&self, request: &MoveRequest) -> Result<MoveAck, GatewayError> {
        self.moves.lock().unwrap().push(request.clone());
        if self.fail_moves.load(Ordering::SeqCst) {
            return Err(GatewayError::Rejected {
                status: 503,
                message: "backend unavailable".into(),
            });
        }
        Ok(self.ack.lock().unwrap().clone())
    }
}

fn two_columns() -> Board {
    Board::new(vec![
        Column::new("A", "To do")
            .with_task(Task::new("T1", "First", "a"))
            .with_task(Task::new("T2", "Second", "b")),
        Column::new("B", "Done"),
    ])
}

fn three_tasks() -> Board {
    Board::new(vec![Column::new("A", "To do")
        .with_task(Task::new("T1", "First", "a"))
        .with_task(Task::new("T2", "Second", "m"))
        .with_task(Task::new("T3", "Third", "z"))])
}

fn foreign_ranks() -> Board {
    Board::new(vec![Column::new("A", "To do")
        .with_task(Task::new("T1", "First", "0|hzzzzz:"))
        .with_task(Task::new("T2", "Second", "0|i00000:"))
        .with_task(Task::new("T3", "Third", "0|i0000g:"))])
}

fn order(board: &Board, column: usize) -> Vec<String> {
    board.columns[column]
        .tasks
        .iter()
        .map(|t| t.id.to_string())
        .collect()
}

fn count_failures(events: &mut tokio::sync::broadcast::Receiver<BoardEvent>) -> usize {
    let mut failures = 0;
    while let Ok(event) = events.try_recv() {
        if matches!(event, BoardEvent::MoveFailed { .. }) {
            failures += 1;
        }
    }
    failures
}

#[tokio::test]
async fn test_move_into_empty_column() {
    let backend = FakeBackend::serving(two_columns());
    let mut session = BoardSession::open(backend.clone(), "p1").await.unwrap();
    let t1 = TaskId::from("T1");

    let outcome = session
        .drag(&t1, DropTarget::Column("B".into()))
        .await
        .unwrap();

    assert!(matches!(outcome, MoveOutcome::Committed { .. }));
    assert_eq!(order(session.board(), 0), vec!["T2"]);
    assert_eq!(order(session.board(), 1), vec!["T1"]);

    let moved = session.board().find_task(&t1).unwrap();
    assert_eq!(moved.column_id.as_str(), "B");
    assert!(!moved.position.as_str().is_empty());

    let moves = backend.moves();
    assert_eq!(moves.len(), 1);
    assert_eq!(moves[0].task_id, t1);
    assert_eq!(moves[0].target_column_id.as_str(), "B");
    assert_eq!(moves[0].prev_task_rank, None);
    assert_eq!(moves[0].next_task_rank, None);
    assert!(session.board().invariant_violations().is_empty());
}

#[tokio::test]
async fn test_move_between_neighbors() {
    let backend = FakeBackend::serving(three_tasks());
    let mut session = BoardSession::open(backend.clone(), "p1").await.unwrap();
    let t3 = TaskId::from("T3");

    session
        .drag(&t3, DropTarget::Task("T2".into()))
        .await
        .unwrap();

    assert_eq!(order(session.board(), 0), vec!["T1", "T3", "T2"]);
    let position = &session.board().find_task(&t3).unwrap().position;
    assert!(Rank::from("a") < *position && *position < Rank::from("m"));

    let moves = backend.moves();
    assert_eq!(moves[0].prev_task_rank, Some(Rank::from("a")));
    assert_eq!(moves[0].next_task_rank, Some(Rank::from("m")));
    assert!(session.board().invariant_violations().is_empty());
}

#[tokio::test]
async fn test_failed_move_rolls_back_once() {
    let backend = FakeBackend::serving(three_tasks());
    backend.fail_moves();
    let mut session = BoardSession::open(backend.clone(), "p1").await.unwrap();
    let before = session.board().clone();
    let mut events = session.subscribe();

    let outcome = session
        .drag(&"T3".into(), DropTarget::Task("T2".into()))
        .await
        .unwrap();

    match outcome {
        MoveOutcome::RolledBack { task_id, reason } => {
            assert_eq!(task_id.as_str(), "T3");
            assert!(reason.contains("backend unavailable"));
        }
        other => panic!("expected rollback, got {:?}", other),
    }
    assert_eq!(session.board(), &before);
    assert_eq!(order(session.board(), 0), vec!["T1", "T2", "T3"]);
    assert_eq!(count_failures(&mut events), 1);
    assert_eq!(session.engine().phase(), Phase::Idle);
}

#[tokio::test]
async fn test_no_drag_under_filter() {
    let backend = FakeBackend::serving(three_tasks());
    let mut session = BoardSession::open(backend.clone(), "p1").await.unwrap();

    session
        .apply_filters(BoardFilters::default().with_keyword("second"))
        .await
        .unwrap();
    assert!(session.engine().is_filtered());

    let err = session
        .drag(&"T3".into(), DropTarget::Task("T2".into()))
        .await
        .unwrap_err();
    assert!(matches!(err, ReorderError::FilteredDragAttempt));
    assert_eq!(session.engine().phase(), Phase::Idle);
    assert!(backend.moves().is_empty());

    // The filters reached the backend
    let fetches = backend.fetches.lock().unwrap().clone();
    assert_eq!(fetches.last().unwrap().effective_keyword(), Some("second"));

    // Clearing the filter re-enables dragging
    session.apply_filters(BoardFilters::default()).await.unwrap();
    session
        .drag(&"T3".into(), DropTarget::Task("T2".into()))
        .await
        .unwrap();
    assert_eq!(backend.moves().len(), 1);
}

#[tokio::test]
async fn test_drop_on_own_slot_sends_nothing() {
    let backend = FakeBackend::serving(three_tasks());
    let mut session = BoardSession::open(backend.clone(), "p1").await.unwrap();

    let outcome = session
        .drag(&"T2".into(), DropTarget::Task("T2".into()))
        .await
        .unwrap();
    assert_eq!(outcome, MoveOutcome::NoChange);
    assert!(backend.moves().is_empty());
}

#[tokio::test]
async fn test_step_by_step_gesture_with_late_response() {
    let backend = FakeBackend::serving(three_tasks());
    let mut engine = ReorderEngine::new(BoardStore::with_board(three_tasks()));
    let t1 = TaskId::from("T1");

    engine.on_drag_start(&t1).unwrap();
    let pending = engine
        .on_drag_end(&t1, Some(DropTarget::Column("A".into())))
        .unwrap()
        .unwrap();
    assert_eq!(order(engine.board(), 0), vec!["T2", "T3", "T1"]);

    // Reentrancy: no new gesture while the move is in flight
    assert!(matches!(
        engine.on_drag_start(&"T2".into()),
        Err(ReorderError::Busy)
    ));

    let outcome = engine.persist(pending, backend.as_ref()).await;
    assert!(matches!(outcome, MoveOutcome::Committed { .. }));
    assert!(engine.board().find_task(&t1).unwrap().position > Rank::from("z"));
    engine.on_drag_start(&"T2".into()).unwrap();
}

#[tokio::test]
async fn test_foreign_ranks_reach_the_backend() {
    let backend = FakeBackend::serving(foreign_ranks());
    backend.ack_with("0|hzzzzz:i");
    let mut session = BoardSession::open(backend.clone(), "p1").await.unwrap();
    let t3 = TaskId::from("T3");

    let outcome = session
        .drag(&t3, DropTarget::Task("T2".into()))
        .await
        .unwrap();

    assert_eq!(
        outcome,
        MoveOutcome::Committed {
            task_id: t3.clone(),
            position: "0|hzzzzz:i".into()
        }
    );
    assert_eq!(order(session.board(), 0), vec!["T1", "T3", "T2"]);
    assert!(session.board().invariant_violations().is_empty());

    let moves = backend.moves();
    assert_eq!(moves.len(), 1);
    assert_eq!(moves[0].prev_task_rank, Some(Rank::from("0|hzzzzz:")));
    assert_eq!(moves[0].next_task_rank, Some(Rank::from("0|i00000:")));
}

#[tokio::test]
async fn test_backend_assigned_rank_without_answer_refetches() {
    let backend = FakeBackend::serving(foreign_ranks());
    let mut session = BoardSession::open(backend.clone(), "p1").await.unwrap();
    assert_eq!(backend.fetch_count(), 1);

    let outcome = session
        .drag(&"T3".into(), DropTarget::Task("T2".into()))
        .await
        .unwrap();

    assert!(matches!(outcome, MoveOutcome::Committed { .. }));
    assert_eq!(backend.moves().len(), 1);
    assert_eq!(backend.fetch_count(), 2);
    assert!(session.board().invariant_violations().is_empty());
}

#[tokio::test]
async fn test_equal_neighbor_ranks_send_nothing() {
    let backend = FakeBackend::serving(Board::new(vec![Column::new("A", "To do")
        .with_task(Task::new("T1", "First", "a"))
        .with_task(Task::new("T2", "Second", "a"))
        .with_task(Task::new("T3", "Third", "b"))]));
    let mut session = BoardSession::open(backend.clone(), "p1").await.unwrap();
    let before = session.board().clone();
    let mut events = session.subscribe();

    let err = session
        .drag(&"T3".into(), DropTarget::Task("T2".into()))
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        ReorderError::Rank(RankError::RankExhausted { .. })
    ));
    assert_eq!(session.board(), &before);
    assert_eq!(count_failures(&mut events), 1);
    assert!(backend.moves().is_empty());
}
