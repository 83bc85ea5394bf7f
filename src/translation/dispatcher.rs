//! Provider-agnostic translation dispatch.
//!
//! [`Dispatcher`] resolves the configured model, checks the credential for its
//! provider, calls the matching adapter once and wraps the outcome, including
//! every failure, into a [`TranslationResult`].

use futures_util::StreamExt;
use serde::Serialize;
use tracing::{debug, warn};

use super::models::{self, ModelEntry};
use super::pricing;
use super::providers::{
    Adapters, ProviderError, SendRequest, StreamEvent, Usage, UsageAccumulator,
};
use crate::config::{Config, ConfigError};

/// Why a translation produced no text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureKind {
    UnknownModel,
    MissingCredential,
    Auth,
    Provider,
    Network,
}

impl FailureKind {
    /// Failures that a trip to the settings screen can fix.
    pub const fn needs_configuration(self) -> bool {
        matches!(self, Self::UnknownModel | Self::MissingCredential | Self::Auth)
    }
}

impl From<&ProviderError> for FailureKind {
    fn from(err: &ProviderError) -> Self {
        match err {
            ProviderError::Auth(_) => Self::Auth,
            ProviderError::Provider(_) => Self::Provider,
            ProviderError::Network(_) => Self::Network,
        }
    }
}

/// Outcome of one translation request, consumed once by the caller.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case", rename_all_fields = "camelCase")]
pub enum TranslationResult {
    Success {
        destination_text: String,
        /// `None` when usage or pricing was unavailable.
        #[serde(rename = "costUSD")]
        cost_usd: Option<f64>,
        usage: Option<Usage>,
    },
    Error {
        kind: FailureKind,
        message: String,
    },
}

impl TranslationResult {
    pub const fn is_success(&self) -> bool {
        matches!(self, Self::Success { .. })
    }

    pub fn destination_text(&self) -> Option<&str> {
        match self {
            Self::Success {
                destination_text, ..
            } => Some(destination_text),
            Self::Error { .. } => None,
        }
    }

    fn error(kind: FailureKind, message: impl Into<String>) -> Self {
        Self::Error {
            kind,
            message: message.into(),
        }
    }
}

pub struct Dispatcher {
    adapters: Adapters,
}

impl Dispatcher {
    pub const fn new(adapters: Adapters) -> Self {
        Self { adapters }
    }

    /// Dispatcher talking to the public provider endpoints.
    pub fn http() -> Result<Self, ProviderError> {
        Ok(Self::new(Adapters::http()?))
    }

    /// Translates `source_text` with a single non-streaming provider call.
    pub async fn translate(&self, config: &Config, source_text: &str) -> TranslationResult {
        let (entry, request) = match prepare(config, source_text) {
            Ok(prepared) => prepared,
            Err(result) => return result,
        };

        match self.adapters.get(entry.provider).send(&request).await {
            Ok(completion) => success(entry, completion.text, completion.usage),
            Err(e) => failure(entry, &e, request.api_key),
        }
    }

    /// Translates `source_text` with a streaming provider call, handing each
    /// text fragment to `on_fragment` as it arrives. The returned text is the
    /// concatenation of all fragments.
    pub async fn translate_streaming<F>(
        &self,
        config: &Config,
        source_text: &str,
        mut on_fragment: F,
    ) -> TranslationResult
    where
        F: FnMut(&str),
    {
        let (entry, request) = match prepare(config, source_text) {
            Ok(prepared) => prepared,
            Err(result) => return result,
        };

        let mut stream = match self.adapters.get(entry.provider).stream(&request).await {
            Ok(stream) => stream,
            Err(e) => return failure(entry, &e, request.api_key),
        };

        let mut text = String::new();
        let mut usage = UsageAccumulator::default();

        while let Some(event) = stream.next().await {
            match event {
                Ok(StreamEvent::Text(fragment)) => {
                    on_fragment(&fragment);
                    text.push_str(&fragment);
                }
                Ok(StreamEvent::Usage {
                    input_tokens,
                    output_tokens,
                }) => usage.record(input_tokens, output_tokens),
                Err(e) => return failure(entry, &e, request.api_key),
            }
        }

        success(entry, text, usage.finish())
    }
}

/// Early exits: no network call is made when these fail.
fn prepare<'a>(
    config: &'a Config,
    source_text: &'a str,
) -> Result<(&'static ModelEntry, SendRequest<'a>), TranslationResult> {
    let entry = models::resolve(&config.model_label)
        .map_err(|e| TranslationResult::error(FailureKind::UnknownModel, e.to_string()))?;

    let api_key = config.api_key(entry.provider).ok_or_else(|| {
        TranslationResult::error(
            FailureKind::MissingCredential,
            ConfigError::MissingCredential(entry.provider).to_string(),
        )
    })?;

    debug!(
        provider = %entry.provider,
        model = entry.provider_model_id,
        source_chars = source_text.chars().count(),
        "dispatching translation"
    );

    Ok((
        entry,
        SendRequest {
            api_key,
            system_prompt: &config.system_prompt,
            provider_model_id: entry.provider_model_id,
            source_text,
            max_output_tokens: entry.max_output_tokens,
        },
    ))
}

fn success(entry: &ModelEntry, text: String, usage: Option<Usage>) -> TranslationResult {
    let cost_usd = match usage {
        Some(usage) => pricing::cost(entry.provider_model_id, &usage)
            .inspect_err(|e| warn!(error = %e, "cost unavailable"))
            .ok(),
        None => {
            warn!(
                model = entry.provider_model_id,
                "provider reported no usage; cost unavailable"
            );
            None
        }
    };

    TranslationResult::Success {
        destination_text: text,
        cost_usd,
        usage,
    }
}

fn failure(entry: &ModelEntry, err: &ProviderError, api_key: &str) -> TranslationResult {
    let message = redact(&err.to_string(), api_key);
    warn!(provider = %entry.provider, error = %message, "translation failed");
    TranslationResult::error(FailureKind::from(err), message)
}

fn redact(message: &str, secret: &str) -> String {
    if secret.is_empty() {
        message.to_string()
    } else {
        message.replace(secret, "***")
    }
}
