//! HTTP client for the board REST API.

use super::{GatewayError, MoveAck, MoveRequest, PersistenceGateway};
use crate::types::{Board, BoardFilters, ProjectId};
use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, Response, StatusCode};
use serde::Deserialize;
use std::time::Duration;
use tokio::sync::RwLock;
use tracing::{debug, warn};
use url::Url;

/// Default API root of a locally running backend.
pub const DEFAULT_BASE_URL: &str = "http://localhost:8080/api/v1";

const REFRESH_PATH: &str = "/auth/refresh-token";
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Extract a human-readable message from a JSON error body.
///
/// Tries `message`, then `error_description`, then `error`, then falls back to the raw
/// body.
fn extract_error_description(body: &str) -> String {
    if let Ok(json) = serde_json::from_str::<serde_json::Value>(body) {
        for key in ["message", "error_description", "error"] {
            if let Some(msg) = json.get(key).and_then(|v| v.as_str()) {
                return msg.to_string();
            }
        }
    }
    body.to_string()
}

async fn error_message(response: Response) -> String {
    let status = response.status();
    let body = response.text().await.unwrap_or_default();
    let message = extract_error_description(&body);
    if message.trim().is_empty() {
        status.to_string()
    } else {
        message
    }
}

/// Map a response to a `GatewayError` based on status code.
async fn check_response(response: Response) -> Result<Response, GatewayError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let message = error_message(response).await;
    match status {
        StatusCode::UNAUTHORIZED => Err(GatewayError::Unauthorized(message)),
        _ => Err(GatewayError::Rejected {
            status: status.as_u16(),
            message,
        }),
    }
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RefreshResponse {
    access_token: String,
}

/// Gateway talking to the REST backend.
///
/// Requests carry a bearer token when one is set. A `401` triggers one call to the
/// refresh endpoint (the refresh credential travels as a cookie) and one retry of the
/// original request with the new token.
pub struct HttpGateway {
    client: Client,
    base_url: String,
    token: RwLock<Option<String>>,
}

impl HttpGateway {
    /// Gateway for `base_url` with the default timeout
    pub fn new(base_url: impl Into<String>) -> Result<Self, GatewayError> {
        Self::with_timeout(base_url, DEFAULT_TIMEOUT)
    }

    /// Gateway for `base_url` with a per-request timeout
    pub fn with_timeout(
        base_url: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self, GatewayError> {
        let base_url = base_url.into();
        let parsed = Url::parse(&base_url)
            .map_err(|e| GatewayError::InvalidUrl(format!("{}: {}", base_url, e)))?;
        if !matches!(parsed.scheme(), "http" | "https") {
            return Err(GatewayError::InvalidUrl(format!(
                "{}: scheme must be http or https",
                base_url
            )));
        }

        let client = Client::builder()
            .timeout(timeout)
            .cookie_store(true)
            .build()?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            token: RwLock::new(None),
        })
    }

    /// Use an access token for every request
    pub fn with_token(self, token: impl Into<String>) -> Self {
        Self {
            token: RwLock::new(Some(token.into())),
            ..self
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Access token currently in use (it changes after a refresh)
    pub async fn token(&self) -> Option<String> {
        self.token.read().await.clone()
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    async fn authorized(&self, request: RequestBuilder) -> RequestBuilder {
        match self.token.read().await.as_deref() {
            Some(token) => request.bearer_auth(token),
            None => request,
        }
    }

    /// Send a request, refreshing the token once on `401`.
    async fn execute<F>(&self, build: F) -> Result<Response, GatewayError>
    where
        F: Fn(&Client) -> RequestBuilder + Send + Sync,
    {
        let response = self.authorized(build(&self.client)).await.send().await?;
        if response.status() != StatusCode::UNAUTHORIZED {
            return check_response(response).await;
        }

        debug!("access token rejected, refreshing");
        self.refresh_token().await?;

        let response = self.authorized(build(&self.client)).await.send().await?;
        if response.status() == StatusCode::UNAUTHORIZED {
            return Err(GatewayError::Unauthorized(error_message(response).await));
        }
        check_response(response).await
    }

    async fn refresh_token(&self) -> Result<(), GatewayError> {
        let response = self
            .client
            .post(self.endpoint(REFRESH_PATH))
            .send()
            .await?;
        if !response.status().is_success() {
            let message = error_message(response).await;
            warn!(%message, "token refresh failed");
            return Err(GatewayError::Unauthorized(message));
        }

        let text = response.text().await?;
        let refreshed: RefreshResponse = serde_json::from_str(&text)
            .map_err(|e| GatewayError::InvalidResponse(format!("refresh response: {}", e)))?;
        *self.token.write().await = Some(refreshed.access_token);
        debug!("access token refreshed");
        Ok(())
    }
}

#[async_trait]
impl PersistenceGateway for HttpGateway {
    async fn fetch_board(
        &self,
        project_id: &ProjectId,
        filters: &BoardFilters,
    ) -> Result<Board, GatewayError> {
        let raw = self.endpoint(&format!(
            "/projects/{}/board",
            urlencoding::encode(project_id.as_str())
        ));
        let mut url =
            Url::parse(&raw).map_err(|e| GatewayError::InvalidUrl(format!("{}: {}", raw, e)))?;
        let pairs = filters.query_pairs();
        if !pairs.is_empty() {
            let mut query = url.query_pairs_mut();
            for (key, value) in &pairs {
                query.append_pair(key, value);
            }
        }

        debug!(project_id = %project_id, filtered = filters.is_active(), "fetching board");
        let response = self.execute(|client| client.get(url.clone())).await?;
        let text = response.text().await?;
        serde_json::from_str(&text)
            .map_err(|e| GatewayError::InvalidResponse(format!("board: {}", e)))
    }

    async fn move_task(&self, request: &MoveRequest) -> Result<MoveAck, GatewayError> {
        let url = self.endpoint(&format!(
            "/tasks/{}/move",
            urlencoding::encode(request.task_id.as_str())
        ));

        debug!(
            task_id = %request.task_id,
            column_id = %request.target_column_id,
            "persisting move"
        );
        let response = self
            .execute(|client| client.put(&url).json(request))
            .await?;

        let text = response.text().await?;
        if text.trim().is_empty() {
            return Ok(MoveAck::default());
        }
        match serde_json::from_str::<MoveAck>(&text) {
            Ok(ack) => Ok(ack),
            Err(e) => {
                debug!(error = %e, "move response carried no usable position");
                Ok(MoveAck::default())
            }
        }
    }
}
