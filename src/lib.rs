//! # clip-translator - LLM Translation CLI
//!
//! `clip-translator` translates text with a choice of Anthropic, Gemini and
//! OpenAI models. One dispatch layer turns a model label, a system prompt and
//! the source text into a single provider call and reports the result with
//! its cost in USD.
//!
//! ## Quick Start
//!
//! ```bash
//! # Store an API key and pick a model
//! clip-translator configure
//!
//! # Translate a file, or stdin
//! clip-translator ./notes.md
//! pbpaste | clip-translator
//!
//! # One-off model and JSON output
//! clip-translator --text "Good morning" -m "Claude 3 Haiku" --json
//!
//! # Interactive chat mode
//! clip-translator chat
//! ```
//!
//! ## Configuration
//!
//! Settings live in `~/.config/clip-translator/config.json`:
//!
//! ```json
//! {
//!   "apiKeys": { "anthropic": "", "gemini": "AIza...", "openai": "" },
//!   "systemPrompt": "You are a language translation assistant. ...",
//!   "modelLabel": "Gemini 1.5 Flash"
//! }
//! ```

/// Interactive chat mode for translation sessions.
pub mod chat;

/// Command-line interface definitions and handlers.
pub mod cli;

/// Persisted settings: API keys, system prompt and model selection.
pub mod config;

/// File system utilities.
pub mod fs;

/// Input reading from inline text, files and stdin.
pub mod input;

/// Global output configuration and logging setup.
pub mod output;

/// XDG-style path utilities for configuration.
pub mod paths;

/// Model registry, pricing, provider adapters and dispatch.
pub mod translation;

/// Terminal UI components (spinner, colors, cost formatting).
pub mod ui;
