//! Provider adapters.
//!
//! Each adapter turns one system prompt plus one user message into a single
//! provider-native request and normalizes the reply into a [`Completion`].
//! Adapters make exactly one attempt; retrying is left to the caller.

mod anthropic;
mod gemini;
mod openai;

use async_trait::async_trait;
use futures_util::Stream;
use reqwest::{Client, RequestBuilder, Response, StatusCode};
use serde::{Deserialize, Serialize};
use std::pin::Pin;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;

pub use anthropic::AnthropicAdapter;
pub use gemini::GeminiAdapter;
pub use openai::OpenAiAdapter;

use super::models::ProviderId;
use super::sse_parser::sse_data_stream;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(60);

/// Longest slice of a raw error body kept in a message.
const MAX_ERROR_BODY_CHARS: usize = 500;

/// Token counts reported by a provider for one request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Usage {
    pub input_tokens: u64,
    pub output_tokens: u64,
}

/// Everything an adapter needs for one call.
#[derive(Debug, Clone, Copy)]
pub struct SendRequest<'a> {
    pub api_key: &'a str,
    pub system_prompt: &'a str,
    pub provider_model_id: &'a str,
    pub source_text: &'a str,
    pub max_output_tokens: u32,
}

/// Normalized reply. `usage` is `None` when the provider did not report it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Completion {
    pub text: String,
    pub usage: Option<Usage>,
}

impl Completion {
    fn into_events(self) -> Vec<StreamEvent> {
        let mut events = Vec::with_capacity(2);
        if !self.text.is_empty() {
            events.push(StreamEvent::Text(self.text));
        }
        if let Some(usage) = self.usage {
            events.push(StreamEvent::Usage {
                input_tokens: Some(usage.input_tokens),
                output_tokens: Some(usage.output_tokens),
            });
        }
        events
    }
}

/// One item of a streamed reply.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StreamEvent {
    Text(String),
    /// Cumulative counters; either side may be missing from a given event.
    Usage {
        input_tokens: Option<u64>,
        output_tokens: Option<u64>,
    },
}

pub type EventStream = Pin<Box<dyn Stream<Item = Result<StreamEvent, ProviderError>> + Send>>;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ProviderError {
    /// The provider rejected the API key.
    #[error("authentication failed (check your API key): {0}")]
    Auth(String),
    /// Non-2xx status, refused content, or a reply in an unexpected shape.
    #[error("provider error: {0}")]
    Provider(String),
    /// DNS, connect, timeout, or connection reset.
    #[error("network error: {0}")]
    Network(String),
}

#[async_trait]
pub trait ProviderAdapter: Send + Sync {
    /// Performs one non-streaming call.
    async fn send(&self, request: &SendRequest<'_>) -> Result<Completion, ProviderError>;

    /// Performs one streaming call. Adapters without a streaming endpoint
    /// yield the whole reply as a single fragment.
    async fn stream(&self, request: &SendRequest<'_>) -> Result<EventStream, ProviderError> {
        let completion = self.send(request).await?;
        Ok(Box::pin(futures_util::stream::iter(
            completion
                .into_events()
                .into_iter()
                .map(Ok::<_, ProviderError>),
        )))
    }
}

/// Merges usage events from a stream into a final [`Usage`].
#[derive(Debug, Clone, Copy, Default)]
pub struct UsageAccumulator {
    input_tokens: Option<u64>,
    output_tokens: Option<u64>,
}

impl UsageAccumulator {
    pub fn record(&mut self, input_tokens: Option<u64>, output_tokens: Option<u64>) {
        if input_tokens.is_some() {
            self.input_tokens = input_tokens;
        }
        if output_tokens.is_some() {
            self.output_tokens = output_tokens;
        }
    }

    /// `None` unless both counters were reported.
    pub fn finish(self) -> Option<Usage> {
        Some(Usage {
            input_tokens: self.input_tokens?,
            output_tokens: self.output_tokens?,
        })
    }
}

/// One adapter per provider; dispatch picks by exhaustive match.
#[derive(Clone)]
pub struct Adapters {
    anthropic: Arc<dyn ProviderAdapter>,
    gemini: Arc<dyn ProviderAdapter>,
    openai: Arc<dyn ProviderAdapter>,
}

impl Adapters {
    pub fn new(
        anthropic: Arc<dyn ProviderAdapter>,
        gemini: Arc<dyn ProviderAdapter>,
        openai: Arc<dyn ProviderAdapter>,
    ) -> Self {
        Self {
            anthropic,
            gemini,
            openai,
        }
    }

    /// Adapters for the public provider endpoints, sharing one HTTP client.
    pub fn http() -> Result<Self, ProviderError> {
        let client = http_client()?;
        Ok(Self::new(
            Arc::new(AnthropicAdapter::new(client.clone())),
            Arc::new(GeminiAdapter::new(client.clone())),
            Arc::new(OpenAiAdapter::new(client)),
        ))
    }

    pub fn get(&self, provider: ProviderId) -> &dyn ProviderAdapter {
        match provider {
            ProviderId::Anthropic => self.anthropic.as_ref(),
            ProviderId::Gemini => self.gemini.as_ref(),
            ProviderId::OpenAi => self.openai.as_ref(),
        }
    }
}

pub fn http_client() -> Result<Client, ProviderError> {
    Client::builder()
        .timeout(REQUEST_TIMEOUT)
        .build()
        .map_err(transport_error)
}

/// Sends the request and turns any non-2xx reply into a [`ProviderError`].
async fn execute(request: RequestBuilder) -> Result<Response, ProviderError> {
    let response = request.send().await.map_err(transport_error)?;
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = match response.text().await {
        Ok(body) => body,
        Err(e) => format!("(unreadable body: {})", e.without_url()),
    };
    Err(error_for_status(status, &body))
}

async fn read_body(response: Response) -> Result<String, ProviderError> {
    response.text().await.map_err(transport_error)
}

/// Maps an SSE response onto stream events using a per-provider payload parser.
/// The stream ends after the first error.
fn events_from_sse<F>(response: Response, parse: F) -> EventStream
where
    F: Fn(&str) -> Result<Vec<StreamEvent>, ProviderError> + Send + 'static,
{
    let payloads = sse_data_stream(response.bytes_stream());

    Box::pin(async_stream::stream! {
        use futures_util::StreamExt;

        let mut payloads = std::pin::pin!(payloads);

        while let Some(payload) = payloads.next().await {
            match payload.and_then(|p| parse(&p)) {
                Ok(events) => {
                    for event in events {
                        yield Ok(event);
                    }
                }
                Err(e) => {
                    yield Err(e);
                    return;
                }
            }
        }
    })
}

/// Transport failures never carry the request URL.
fn transport_error(err: reqwest::Error) -> ProviderError {
    let err = err.without_url();
    if err.is_timeout() {
        ProviderError::Network(format!("request timed out: {err}"))
    } else {
        ProviderError::Network(err.to_string())
    }
}

fn malformed(err: &serde_json::Error) -> ProviderError {
    ProviderError::Provider(format!("malformed response: {err}"))
}

fn error_for_status(status: StatusCode, body: &str) -> ProviderError {
    let message = provider_message(body);

    if status == StatusCode::UNAUTHORIZED
        || status == StatusCode::FORBIDDEN
        || body.contains("API_KEY_INVALID")
    {
        return ProviderError::Auth(message);
    }

    ProviderError::Provider(format!("HTTP {}: {message}", status.as_u16()))
}

/// Pulls `error.message` out of a JSON error body, falling back to the raw text.
fn provider_message(body: &str) -> String {
    let parsed = serde_json::from_str::<serde_json::Value>(body).ok();
    let message = parsed.as_ref().and_then(|v| {
        v.pointer("/error/message")
            .or_else(|| v.get("error"))
            .or_else(|| v.get("message"))
            .and_then(serde_json::Value::as_str)
    });

    match message {
        Some(m) => m.to_string(),
        None if body.trim().is_empty() => "(empty body)".to_string(),
        None => body.trim().chars().take(MAX_ERROR_BODY_CHARS).collect(),
    }
}
