//! Translation dispatch across LLM providers.

pub mod dispatcher;
pub mod models;
pub mod pricing;
pub mod prompt;
pub mod providers;
mod sse_parser;

pub use dispatcher::{Dispatcher, FailureKind, TranslationResult};
pub use models::{DEFAULT_MODEL_LABEL, MODELS, ModelEntry, ModelError, ProviderId};
pub use pricing::{MODEL_PRICES, ModelPrice, PricingError};
pub use prompt::DEFAULT_SYSTEM_PROMPT;
pub use providers::{
    Adapters, Completion, EventStream, ProviderAdapter, ProviderError, SendRequest, StreamEvent,
    Usage,
};
