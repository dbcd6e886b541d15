//! Typed configuration

use crate::{error::ConfigError, ConfigResult};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use taskboard::gateway::DEFAULT_BASE_URL;
use taskboard::rank::{RankCalculator, DEFAULT_MAX_LEN};
use url::Url;

const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Complete taskboard configuration
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TaskboardConfig {
    pub api: ApiConfig,
    pub rank: RankConfig,
}

impl TaskboardConfig {
    /// Check value ranges that serde cannot express
    pub fn validate(&self) -> ConfigResult<()> {
        self.api.validate()?;
        self.rank.validate()
    }
}

/// Backend connection settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ApiConfig {
    /// API root, e.g. `http://localhost:8080/api/v1`
    pub base_url: String,
    /// Bearer token sent with every request
    #[serde(skip_serializing_if = "Option::is_none")]
    pub token: Option<String>,
    /// Per-request timeout
    pub timeout_secs: u64,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            token: None,
            timeout_secs: DEFAULT_TIMEOUT_SECS,
        }
    }
}

impl ApiConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    fn validate(&self) -> ConfigResult<()> {
        let url = Url::parse(&self.base_url)
            .map_err(|e| ConfigError::invalid_value("api.base_url", e.to_string()))?;
        if !matches!(url.scheme(), "http" | "https") {
            return Err(ConfigError::invalid_value(
                "api.base_url",
                format!("scheme must be http or https, got {}", url.scheme()),
            ));
        }
        if self.timeout_secs == 0 {
            return Err(ConfigError::invalid_value(
                "api.timeout_secs",
                "must be greater than zero",
            ));
        }
        Ok(())
    }
}

/// Rank generation settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RankConfig {
    /// Longest rank the client will generate before reporting exhaustion
    pub max_len: usize,
}

impl Default for RankConfig {
    fn default() -> Self {
        Self {
            max_len: DEFAULT_MAX_LEN,
        }
    }
}

impl RankConfig {
    /// Calculator honoring these settings
    pub fn calculator(&self) -> RankCalculator {
        RankCalculator::with_max_len(self.max_len)
    }

    fn validate(&self) -> ConfigResult<()> {
        if self.max_len < 2 {
            return Err(ConfigError::invalid_value(
                "rank.max_len",
                format!("must be at least 2, got {}", self.max_len),
            ));
        }
        Ok(())
    }
}
