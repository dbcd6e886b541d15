//! Configuration provider using Figment

use crate::{
    discovery::{ConfigFormat, FileDiscovery},
    error::ConfigError,
    types::TaskboardConfig,
    ConfigResult,
};
use figment::{
    providers::{Env, Format, Json, Serialized, Toml, Yaml},
    Figment,
};
use serde::Serialize;
use std::path::{Path, PathBuf};
use tracing::{debug, info, trace};

/// Prefix of environment variables read as configuration
pub const ENV_PREFIX: &str = "TASKBOARD_";

/// Loads [`TaskboardConfig`] from all sources.
///
/// Sources in precedence order (later sources override earlier ones):
/// 1. Default values
/// 2. Discovered files: global, then project
/// 3. An explicit file (`--config`)
/// 4. `TASKBOARD_` environment variables, `__` separating nested keys
/// 5. Overrides set by the caller (command line flags)
///
/// Nothing is cached; every `load` reads the sources again.
pub struct ConfigProvider {
    discovery: FileDiscovery,
    explicit_file: Option<PathBuf>,
    overrides: Figment,
}

impl Default for ConfigProvider {
    fn default() -> Self {
        Self::new()
    }
}

impl ConfigProvider {
    pub fn new() -> Self {
        Self {
            discovery: FileDiscovery::new(),
            explicit_file: None,
            overrides: Figment::new(),
        }
    }

    /// Use a specific file discovery
    pub fn with_discovery(mut self, discovery: FileDiscovery) -> Self {
        self.discovery = discovery;
        self
    }

    /// Also read `path`, above discovered files
    pub fn with_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.explicit_file = Some(path.into());
        self
    }

    /// Set a dotted key (`api.base_url`) above every other source
    pub fn with_override<V: Serialize>(mut self, key: &str, value: V) -> Self {
        trace!("Override set for {}", key);
        self.overrides = self.overrides.merge((key, value));
        self
    }

    /// Load and validate the configuration
    pub fn load(&self) -> ConfigResult<TaskboardConfig> {
        let config: TaskboardConfig = self.build_figment()?.extract()?;
        config.validate()?;
        info!(
            base_url = %config.api.base_url,
            authenticated = config.api.token.is_some(),
            "configuration loaded"
        );
        Ok(config)
    }

    fn build_figment(&self) -> ConfigResult<Figment> {
        debug!("Building figment configuration with precedence order");

        let mut figment = Figment::from(Serialized::defaults(TaskboardConfig::default()));

        for file in self.discovery.discover_all() {
            trace!("Loading config file: {}", file.path.display());
            figment = figment.merge(Self::file_provider(&file.path, file.format));
        }

        if let Some(path) = &self.explicit_file {
            if !path.is_file() {
                return Err(ConfigError::FileNotFound { path: path.clone() });
            }
            let format = ConfigFormat::from_path(path)
                .ok_or_else(|| ConfigError::UnsupportedFormat { path: path.clone() })?;
            debug!("Loading explicit config file: {}", path.display());
            figment = figment.merge(Self::file_provider(path, format));
        }

        figment = figment.merge(Env::prefixed(ENV_PREFIX).split("__"));

        Ok(figment.merge(self.overrides.clone()))
    }

    fn file_provider(path: &Path, format: ConfigFormat) -> Figment {
        match format {
            ConfigFormat::Toml => Figment::from(Toml::file(path)),
            ConfigFormat::Yaml => Figment::from(Yaml::file(path)),
            ConfigFormat::Json => Figment::from(Json::file(path)),
        }
    }
}
