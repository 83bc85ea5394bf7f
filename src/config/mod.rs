//! Persisted user settings.

mod settings;
mod store;

use std::path::PathBuf;
use thiserror::Error;

use crate::translation::models::ProviderId;

pub use settings::{Config, mask_key};
pub use store::ConfigStore;

#[derive(Debug, Error)]
pub enum ConfigError {
    /// The provider of the selected model has no API key.
    #[error("missing api key for {0}")]
    MissingCredential(ProviderId),
    /// The stored model label is no longer registered.
    #[error("unknown model: '{0}'")]
    UnknownModel(String),
    #[error("failed to save config to {}: {source}", path.display())]
    Persist {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("could not determine the config directory (no home directory)")]
    NoConfigDir,
}

impl ConfigError {
    /// Failures the user resolves by running `configure`.
    pub const fn needs_configuration(&self) -> bool {
        matches!(self, Self::MissingCredential(_) | Self::UnknownModel(_))
    }
}
