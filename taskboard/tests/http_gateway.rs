//! HttpGateway against a mock REST backend

use serde_json::json;
use taskboard::{
    BoardFilters, GatewayError, HttpGateway, MoveAck, MoveRequest, PersistenceGateway, Priority,
    ProjectId, Rank,
};
use wiremock::matchers::{body_json, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn board_body() -> serde_json::Value {
    json!({
        "workspaceId": 3,
        "columns": [
            {
                "id": 10,
                "name": "To do",
                "tasks": [
                    {"id": 2, "title": "Second", "position": "m", "priority": "HIGH"},
                    {"id": 1, "title": "First", "position": "a", "displayId": "PRJ-1",
                     "assignees": [{"id": 5, "name": "Ada", "avatarUrl": null}]}
                ]
            },
            {"id": 11, "name": "Done", "tasks": []}
        ]
    })
}

fn move_request() -> MoveRequest {
    MoveRequest {
        task_id: "1".into(),
        target_column_id: "11".into(),
        prev_task_rank: Some(Rank::from("a")),
        next_task_rank: None,
    }
}

#[tokio::test]
async fn test_fetch_board_sends_filters_and_token() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/projects/42/board"))
        .and(query_param("keyword", "login"))
        .and(query_param("priority", "URGENT"))
        .and(query_param("isMyTask", "true"))
        .and(header("authorization", "Bearer secret"))
        .respond_with(ResponseTemplate::new(200).set_body_json(board_body()))
        .expect(1)
        .mount(&server)
        .await;

    let gateway = HttpGateway::new(server.uri()).unwrap().with_token("secret");
    let filters = BoardFilters::default()
        .with_keyword("  login ")
        .with_priority(Priority::Urgent)
        .mine_only();

    let board = gateway
        .fetch_board(&ProjectId::from("42"), &filters)
        .await
        .unwrap();
    assert_eq!(board.columns.len(), 2);
    assert_eq!(board.workspace_id.as_ref().unwrap().as_str(), "3");
    assert_eq!(board.columns[0].tasks[0].priority, Priority::High);
    assert_eq!(board.columns[0].tasks[1].display_id.as_deref(), Some("PRJ-1"));
}

#[tokio::test]
async fn test_fetch_board_without_filters_has_no_query() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/projects/42/board"))
        .respond_with(ResponseTemplate::new(200).set_body_json(board_body()))
        .mount(&server)
        .await;

    let gateway = HttpGateway::new(server.uri()).unwrap();
    gateway
        .fetch_board(&ProjectId::from("42"), &BoardFilters::default())
        .await
        .unwrap();

    let requests = server.received_requests().await.unwrap();
    assert_eq!(requests.len(), 1);
    assert!(requests[0].url.query().is_none());
    assert!(requests[0].headers.get("authorization").is_none());
}

#[tokio::test]
async fn test_move_task_body() {
    let server = MockServer::start().await;
    Mock::given(method("PUT"))
        .and(path("/tasks/1/move"))
        .and(body_json(json!({
            "targetColumnId": "11",
            "prevTaskRank": "a",
            "nextTaskRank": null
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": 1,
            "position": "k",
            "columnId": 11
        })))
        .expect(1)
        .mount(&server)
        .await;

    let gateway = HttpGateway::new(server.uri()).unwrap();
    let ack = gateway.move_task(&move_request()).await.unwrap();
    assert_eq!(ack, MoveAck::with_position("k"));
}

#[tokio::test]
async fn test_move_task_empty_response() {
    let server = MockServer::start().await;
    Mock::given(method("PUT"))
        .and(path("/tasks/1/move"))
        .respond_with(ResponseTemplate::new(204))
        .mount(&server)
        .await;

    let gateway = HttpGateway::new(server.uri()).unwrap();
    let ack = gateway.move_task(&move_request()).await.unwrap();
    assert_eq!(ack, MoveAck::default());
}

#[tokio::test]
async fn test_expired_token_is_refreshed_once() {
    let server = MockServer::start().await;
    Mock::given(method("PUT"))
        .and(path("/tasks/1/move"))
        .and(header("authorization", "Bearer stale"))
        .respond_with(ResponseTemplate::new(401))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/auth/refresh-token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"accessToken": "fresh"})))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("PUT"))
        .and(path("/tasks/1/move"))
        .and(header("authorization", "Bearer fresh"))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;

    let gateway = HttpGateway::new(server.uri()).unwrap().with_token("stale");
    gateway.move_task(&move_request()).await.unwrap();
    assert_eq!(gateway.token().await.as_deref(), Some("fresh"));
}

#[tokio::test]
async fn test_failed_refresh_is_unauthorized() {
    let server = MockServer::start().await;
    Mock::given(method("PUT"))
        .and(path("/tasks/1/move"))
        .respond_with(ResponseTemplate::new(401))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/auth/refresh-token"))
        .respond_with(
            ResponseTemplate::new(401).set_body_json(json!({"message": "refresh token expired"})),
        )
        .expect(1)
        .mount(&server)
        .await;

    let gateway = HttpGateway::new(server.uri()).unwrap().with_token("stale");
    let err = gateway.move_task(&move_request()).await.unwrap_err();
    match err {
        GatewayError::Unauthorized(message) => assert_eq!(message, "refresh token expired"),
        other => panic!("expected Unauthorized, got {:?}", other),
    }
}

#[tokio::test]
async fn test_rejected_move_carries_message() {
    let server = MockServer::start().await;
    Mock::given(method("PUT"))
        .and(path("/tasks/1/move"))
        .respond_with(
            ResponseTemplate::new(409).set_body_json(json!({"message": "column is locked"})),
        )
        .mount(&server)
        .await;

    let gateway = HttpGateway::new(server.uri()).unwrap();
    let err = gateway.move_task(&move_request()).await.unwrap_err();
    assert!(!err.is_retryable());
    match err {
        GatewayError::Rejected { status, message } => {
            assert_eq!(status, 409);
            assert_eq!(message, "column is locked");
        }
        other => panic!("expected Rejected, got {:?}", other),
    }
}

#[tokio::test]
async fn test_garbage_board_is_invalid_response() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/projects/42/board"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>oops</html>"))
        .mount(&server)
        .await;

    let gateway = HttpGateway::new(server.uri()).unwrap();
    let err = gateway
        .fetch_board(&ProjectId::from("42"), &BoardFilters::default())
        .await
        .unwrap_err();
    assert!(matches!(err, GatewayError::InvalidResponse(_)));
}
