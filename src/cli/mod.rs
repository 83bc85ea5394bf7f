//! Command-line interface definitions and handlers.

/// CLI argument parsing with clap.
pub mod args;

/// Subcommand implementations.
pub mod commands;

use thiserror::Error;

use crate::config::ConfigError;
use crate::translation::FailureKind;

pub use args::{Args, Command};

/// Exit code for failures without a more specific code.
const GENERAL_FAILURE: exitcode::ExitCode = 1;

/// A command failure that carries its process exit code.
///
/// An empty message means the failure was already reported.
#[derive(Debug, Error)]
#[error("{message}")]
pub struct CommandError {
    pub code: exitcode::ExitCode,
    pub message: String,
}

impl CommandError {
    pub fn new(code: exitcode::ExitCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }

    pub const fn reported(code: exitcode::ExitCode) -> Self {
        Self {
            code,
            message: String::new(),
        }
    }

    /// Wraps a failed translation, pointing at `configure` when that helps.
    pub fn from_failure(kind: FailureKind, message: &str) -> Self {
        let message = if kind.needs_configuration() {
            format!("{message}\n\nRun 'clip-translator configure' to update your settings.")
        } else {
            message.to_string()
        };
        Self::new(failure_exit_code(kind), message)
    }
}

impl From<ConfigError> for CommandError {
    fn from(err: ConfigError) -> Self {
        if err.needs_configuration() {
            Self::new(
                exitcode::CONFIG,
                format!("{err}\n\nRun 'clip-translator configure' to set it up."),
            )
        } else {
            Self::new(config_exit_code(&err), err.to_string())
        }
    }
}

pub const fn failure_exit_code(kind: FailureKind) -> exitcode::ExitCode {
    match kind {
        FailureKind::UnknownModel | FailureKind::MissingCredential => exitcode::CONFIG,
        FailureKind::Auth => exitcode::NOPERM,
        FailureKind::Provider => exitcode::SOFTWARE,
        FailureKind::Network => exitcode::UNAVAILABLE,
    }
}

const fn config_exit_code(err: &ConfigError) -> exitcode::ExitCode {
    match err {
        ConfigError::MissingCredential(_) | ConfigError::UnknownModel(_) => exitcode::CONFIG,
        ConfigError::Persist { .. } => exitcode::CANTCREAT,
        ConfigError::NoConfigDir => exitcode::OSFILE,
    }
}

/// Picks the process exit code for an error returned by a command.
pub fn exit_code(err: &anyhow::Error) -> exitcode::ExitCode {
    if let Some(e) = err.downcast_ref::<CommandError>() {
        return e.code;
    }
    if let Some(e) = err.downcast_ref::<ConfigError>() {
        return config_exit_code(e);
    }
    GENERAL_FAILURE
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::translation::ProviderId;

    #[test]
    fn test_failure_exit_codes() {
        assert_eq!(failure_exit_code(FailureKind::Network), exitcode::UNAVAILABLE);
        assert_eq!(failure_exit_code(FailureKind::Auth), exitcode::NOPERM);
        assert_eq!(failure_exit_code(FailureKind::Provider), exitcode::SOFTWARE);
        assert_eq!(
            failure_exit_code(FailureKind::MissingCredential),
            exitcode::CONFIG
        );
    }

    #[test]
    fn test_exit_code_from_anyhow() {
        let err = anyhow::Error::new(CommandError::new(exitcode::DATAERR, "Input is empty"));
        assert_eq!(exit_code(&err), exitcode::DATAERR);

        let err = anyhow::Error::new(ConfigError::NoConfigDir);
        assert_eq!(exit_code(&err), exitcode::OSFILE);

        assert_eq!(exit_code(&anyhow::anyhow!("boom")), GENERAL_FAILURE);
    }

    #[test]
    fn test_missing_credential_points_to_configure() {
        let err = CommandError::from(ConfigError::MissingCredential(ProviderId::Gemini));
        assert_eq!(err.code, exitcode::CONFIG);
        assert!(err.message.contains("missing api key for"));
        assert!(err.message.contains("clip-translator configure"));
    }
}
