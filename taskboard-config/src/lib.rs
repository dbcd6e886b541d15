//! Taskboard configuration management using Figment
//!
//! Configuration is layered from several sources, each overriding the previous one:
//!
//! - Defaults
//! - Global: `~/.taskboard/taskboard.{toml,yaml,yml,json}`
//! - Project: `./.taskboard/taskboard.{toml,yaml,yml,json}`
//! - An explicit file passed with `--config`
//! - Environment variables prefixed `TASKBOARD_`, with `__` between nested keys
//!   (`TASKBOARD_API__BASE_URL`)
//! - Command line flags
//!
//! ## Example TOML Configuration
//!
//! ```toml
//! [api]
//! base_url = "https://board.example.com/api/v1"
//! token = "eyJhbGciOi..."
//! timeout_secs = 10
//!
//! [rank]
//! max_len = 64
//! ```
//!
//! ## Loading
//!
//! ```no_run
//! use taskboard_config::ConfigProvider;
//!
//! let config = ConfigProvider::new()
//!     .with_override("api.token", "secret")
//!     .load()?;
//! println!("{}", config.api.base_url);
//! # Ok::<(), taskboard_config::ConfigError>(())
//! ```

pub mod discovery;
pub mod error;
pub mod provider;
pub mod types;

pub use discovery::{ConfigFile, ConfigFormat, ConfigScope, FileDiscovery, CONFIG_DIR_NAME};
pub use error::ConfigError;
pub use provider::{ConfigProvider, ENV_PREFIX};
pub use types::{ApiConfig, RankConfig, TaskboardConfig};

/// Result type for configuration operations
pub type ConfigResult<T> = Result<T, ConfigError>;

/// Load configuration from defaults, discovered files and the environment
pub fn load_configuration() -> ConfigResult<TaskboardConfig> {
    ConfigProvider::new().load()
}

#[cfg(test)]
mod tests;
