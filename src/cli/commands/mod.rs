//! Subcommand implementations.

/// Chat mode command handler.
pub mod chat;

/// Configure command handler.
pub mod configure;

/// Model listing command handler.
pub mod models;

/// Translation command handler.
pub mod translate;
