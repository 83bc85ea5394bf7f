use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};

use super::{
    Completion, EventStream, ProviderAdapter, ProviderError, SendRequest, StreamEvent, Usage,
    events_from_sse, execute, malformed, read_body,
};

const DEFAULT_BASE_URL: &str = "https://api.anthropic.com";
const API_VERSION: &str = "2023-06-01";

/// Adapter for the Anthropic Messages API.
pub struct AnthropicAdapter {
    client: Client,
    base_url: String,
}

impl AnthropicAdapter {
    pub fn new(client: Client) -> Self {
        Self::with_base_url(client, DEFAULT_BASE_URL)
    }

    pub fn with_base_url(client: Client, base_url: impl Into<String>) -> Self {
        Self {
            client,
            base_url: base_url.into(),
        }
    }

    fn request(&self, request: &SendRequest<'_>, stream: bool) -> reqwest::RequestBuilder {
        let url = format!("{}/v1/messages", self.base_url.trim_end_matches('/'));
        let body = MessagesRequest {
            model: request.provider_model_id,
            max_tokens: request.max_output_tokens,
            system: request.system_prompt,
            messages: [Message {
                role: "user",
                content: request.source_text,
            }],
            stream,
        };

        self.client
            .post(url)
            .header("x-api-key", request.api_key)
            .header("anthropic-version", API_VERSION)
            .json(&body)
    }
}

#[async_trait]
impl ProviderAdapter for AnthropicAdapter {
    async fn send(&self, request: &SendRequest<'_>) -> Result<Completion, ProviderError> {
        let response = execute(self.request(request, false)).await?;
        let body = read_body(response).await?;
        parse_response(&body)
    }

    async fn stream(&self, request: &SendRequest<'_>) -> Result<EventStream, ProviderError> {
        let response = execute(self.request(request, true)).await?;
        Ok(events_from_sse(response, parse_stream_payload))
    }
}

#[derive(Debug, Serialize)]
struct MessagesRequest<'a> {
    model: &'a str,
    max_tokens: u32,
    system: &'a str,
    messages: [Message<'a>; 1],
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    stream: bool,
}

#[derive(Debug, Serialize)]
struct Message<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct MessagesResponse {
    #[serde(default)]
    content: Vec<ContentBlock>,
    usage: Option<WireUsage>,
}

#[derive(Debug, Deserialize)]
struct ContentBlock {
    #[serde(rename = "type")]
    kind: String,
    text: Option<String>,
}

#[derive(Debug, Deserialize)]
struct WireUsage {
    input_tokens: Option<u64>,
    output_tokens: Option<u64>,
}

fn parse_response(body: &str) -> Result<Completion, ProviderError> {
    let response: MessagesResponse = serde_json::from_str(body).map_err(|e| malformed(&e))?;

    let text = response
        .content
        .into_iter()
        .find(|block| block.kind == "text")
        .and_then(|block| block.text)
        .ok_or_else(|| ProviderError::Provider("response contained no text block".to_string()))?;

    let usage = response.usage.and_then(|u| {
        Some(Usage {
            input_tokens: u.input_tokens?,
            output_tokens: u.output_tokens?,
        })
    });

    Ok(Completion { text, usage })
}

#[derive(Debug, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum StreamPayload {
    MessageStart { message: StreamMessage },
    ContentBlockDelta { delta: Delta },
    MessageDelta { usage: Option<WireUsage> },
    Error { error: StreamError },
    #[serde(other)]
    Other,
}

#[derive(Debug, Deserialize)]
struct StreamMessage {
    usage: Option<WireUsage>,
}

#[derive(Debug, Deserialize)]
struct Delta {
    text: Option<String>,
}

#[derive(Debug, Deserialize)]
struct StreamError {
    message: String,
}

fn parse_stream_payload(payload: &str) -> Result<Vec<StreamEvent>, ProviderError> {
    let parsed: StreamPayload = serde_json::from_str(payload).map_err(|e| malformed(&e))?;

    let event = match parsed {
        StreamPayload::ContentBlockDelta {
            delta: Delta { text: Some(text) },
        } if !text.is_empty() => Some(StreamEvent::Text(text)),
        StreamPayload::MessageStart {
            message: StreamMessage { usage: Some(u) },
        }
        | StreamPayload::MessageDelta { usage: Some(u) } => Some(StreamEvent::Usage {
            input_tokens: u.input_tokens,
            output_tokens: u.output_tokens,
        }),
        StreamPayload::Error { error } => return Err(ProviderError::Provider(error.message)),
        _ => None,
    };

    Ok(event.into_iter().collect())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_response_first_text_block() {
        let body = r#"{
            "id": "msg_01",
            "type": "message",
            "role": "assistant",
            "content": [{"type": "text", "text": "Bonjour"}, {"type": "text", "text": "ignored"}],
            "stop_reason": "end_turn",
            "usage": {"input_tokens": 12, "output_tokens": 4}
        }"#;
        let completion = parse_response(body).unwrap();
        assert_eq!(completion.text, "Bonjour");
        assert_eq!(
            completion.usage,
            Some(Usage {
                input_tokens: 12,
                output_tokens: 4
            })
        );
    }

    #[test]
    fn test_parse_response_without_usage() {
        let body = r#"{"content": [{"type": "text", "text": "Hi"}]}"#;
        assert_eq!(parse_response(body).unwrap().usage, None);
    }

    #[test]
    fn test_parse_response_no_text_block() {
        let body = r#"{"content": [], "usage": {"input_tokens": 1, "output_tokens": 0}}"#;
        assert!(matches!(
            parse_response(body),
            Err(ProviderError::Provider(_))
        ));
    }

    #[test]
    fn test_parse_response_malformed() {
        let err = parse_response("<html>bad gateway</html>").unwrap_err();
        assert!(err.to_string().contains("malformed response"));
    }

    #[test]
    fn test_request_body_shape() {
        let body = MessagesRequest {
            model: "claude-3-haiku-20240307",
            max_tokens: 4096,
            system: "Translate.",
            messages: [Message {
                role: "user",
                content: "hello",
            }],
            stream: false,
        };
        let json = serde_json::to_value(&body).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "model": "claude-3-haiku-20240307",
                "max_tokens": 4096,
                "system": "Translate.",
                "messages": [{"role": "user", "content": "hello"}]
            })
        );
    }

    #[test]
    fn test_stream_payloads() {
        let start = r#"{"type":"message_start","message":{"id":"msg_1","usage":{"input_tokens":25,"output_tokens":1}}}"#;
        assert_eq!(
            parse_stream_payload(start).unwrap(),
            vec![StreamEvent::Usage {
                input_tokens: Some(25),
                output_tokens: Some(1)
            }]
        );

        let delta = r#"{"type":"content_block_delta","index":0,"delta":{"type":"text_delta","text":"Hel"}}"#;
        assert_eq!(
            parse_stream_payload(delta).unwrap(),
            vec![StreamEvent::Text("Hel".to_string())]
        );

        let end = r#"{"type":"message_delta","delta":{"stop_reason":"end_turn"},"usage":{"output_tokens":15}}"#;
        assert_eq!(
            parse_stream_payload(end).unwrap(),
            vec![StreamEvent::Usage {
                input_tokens: None,
                output_tokens: Some(15)
            }]
        );

        assert!(parse_stream_payload(r#"{"type":"ping"}"#).unwrap().is_empty());
    }

    #[test]
    fn test_stream_error_payload() {
        let payload = r#"{"type":"error","error":{"type":"overloaded_error","message":"Overloaded"}}"#;
        assert_eq!(
            parse_stream_payload(payload),
            Err(ProviderError::Provider("Overloaded".to_string()))
        );
    }
}
