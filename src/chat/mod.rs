//! Interactive chat mode for translation sessions.
//!
//! Provides a REPL-style interface with slash commands for switching models
//! and reviewing the session's cost.

/// Slash command parsing and autocomplete.
pub mod command;
mod ledger;
mod session;
mod ui;

pub use ledger::CostLedger;
pub use session::ChatSession;
