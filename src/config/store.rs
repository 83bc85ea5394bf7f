use serde_json::Value;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

use super::{Config, ConfigError};
use crate::fs::atomic_write;
use crate::paths;
use crate::translation::models::ProviderId;

const CONFIG_FILE_NAME: &str = "config.json";

/// Loads and saves the settings document.
///
/// Reads never fail: anything unreadable yields defaults. Writes do fail, so a
/// saved key is never silently lost.
#[derive(Debug, Clone)]
pub struct ConfigStore {
    path: PathBuf,
}

impl ConfigStore {
    /// Store at `$XDG_CONFIG_HOME/clip-translator/config.json`, or under
    /// `~/.config` when `XDG_CONFIG_HOME` is not set.
    pub fn new() -> Result<Self, ConfigError> {
        let dir = paths::config_dir().ok_or(ConfigError::NoConfigDir)?;
        Ok(Self::with_path(dir.join(CONFIG_FILE_NAME)))
    }

    pub fn with_path(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn load(&self) -> Config {
        let contents = match fs::read_to_string(&self.path) {
            Ok(contents) => contents,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                debug!(path = %self.path.display(), "no config file; using defaults");
                return Config::default();
            }
            Err(e) => {
                warn!(path = %self.path.display(), error = %e, "config file unreadable; using defaults");
                return Config::default();
            }
        };

        match serde_json::from_str::<Value>(&contents) {
            Ok(value) => {
                if !value.is_object() {
                    warn!(path = %self.path.display(), "config file is not a JSON object; using defaults");
                }
                Config::from_value(&value)
            }
            Err(e) => {
                warn!(path = %self.path.display(), error = %e, "config file is not valid JSON; using defaults");
                Config::default()
            }
        }
    }

    pub fn save(&self, config: &Config) -> Result<(), ConfigError> {
        let persist = |source: io::Error| ConfigError::Persist {
            path: self.path.clone(),
            source,
        };

        let contents = serde_json::to_string_pretty(config).map_err(|e| persist(e.into()))?;
        atomic_write(&self.path, &contents).map_err(persist)?;

        debug!(path = %self.path.display(), "config saved");
        Ok(())
    }

    /// Loads the config and checks that `provider` has a key.
    pub fn require_credential(&self, provider: ProviderId) -> Result<Config, ConfigError> {
        let config = self.load();
        if config.api_key(provider).is_none() {
            return Err(ConfigError::MissingCredential(provider));
        }
        Ok(config)
    }

    /// Loads the config and checks the provider of the selected model.
    pub fn require_selected_credential(&self) -> Result<Config, ConfigError> {
        let config = self.load();
        config.check_credential()?;
        Ok(config)
    }
}
