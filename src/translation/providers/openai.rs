use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};

use super::{
    Completion, EventStream, ProviderAdapter, ProviderError, SendRequest, StreamEvent, Usage,
    events_from_sse, execute, malformed, read_body,
};

const DEFAULT_BASE_URL: &str = "https://api.openai.com";

/// Adapter for the OpenAI Chat Completions API.
pub struct OpenAiAdapter {
    client: Client,
    base_url: String,
}

impl OpenAiAdapter {
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
        let url = format!(
            "{}/v1/chat/completions",
            self.base_url.trim_end_matches('/')
        );
        let body = ChatCompletionRequest {
            model: request.provider_model_id,
            max_tokens: request.max_output_tokens,
            messages: [
                Message {
                    role: "system",
                    content: request.system_prompt,
                },
                Message {
                    role: "user",
                    content: request.source_text,
                },
            ],
            stream,
            stream_options: stream.then_some(StreamOptions {
                include_usage: true,
            }),
        };

        self.client
            .post(url)
            .bearer_auth(request.api_key)
            .json(&body)
    }
}

#[async_trait]
impl ProviderAdapter for OpenAiAdapter {
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
struct ChatCompletionRequest<'a> {
    model: &'a str,
    max_tokens: u32,
    messages: [Message<'a>; 2],
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    stream: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    stream_options: Option<StreamOptions>,
}

#[derive(Debug, Serialize)]
struct Message<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Debug, Serialize)]
struct StreamOptions {
    include_usage: bool,
}

#[derive(Debug, Deserialize)]
struct ChatCompletionResponse {
    #[serde(default)]
    choices: Vec<Choice>,
    usage: Option<WireUsage>,
    error: Option<WireError>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ResponseMessage,
    finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ResponseMessage {
    content: Option<String>,
    refusal: Option<String>,
}

/// In-band error object, sent with a 200 status once a stream has started.
#[derive(Debug, Deserialize)]
struct WireError {
    message: String,
}

#[derive(Debug, Deserialize)]
struct WireUsage {
    prompt_tokens: u64,
    completion_tokens: u64,
}

impl From<WireUsage> for Usage {
    fn from(u: WireUsage) -> Self {
        Self {
            input_tokens: u.prompt_tokens,
            output_tokens: u.completion_tokens,
        }
    }
}

fn parse_response(body: &str) -> Result<Completion, ProviderError> {
    let response: ChatCompletionResponse = serde_json::from_str(body).map_err(|e| malformed(&e))?;
    if let Some(error) = response.error {
        return Err(ProviderError::Provider(error.message));
    }
    let usage = response.usage.map(Usage::from);

    let choice = response
        .choices
        .into_iter()
        .next()
        .ok_or_else(|| ProviderError::Provider("response contained no choices".to_string()))?;

    if let Some(refusal) = choice.message.refusal {
        return Err(ProviderError::Provider(format!("request refused: {refusal}")));
    }

    let filtered = choice.finish_reason.as_deref() == Some("content_filter");

    // An empty string is still a reply; only a missing one is an error.
    match choice.message.content {
        Some(text) if !text.is_empty() || !filtered => Ok(Completion { text, usage }),
        _ if filtered => Err(ProviderError::Provider(
            "response blocked: content_filter".to_string(),
        )),
        _ => Err(ProviderError::Provider(
            "response contained no text".to_string(),
        )),
    }
}

#[derive(Debug, Deserialize)]
struct StreamChunk {
    #[serde(default)]
    choices: Vec<StreamChoice>,
    usage: Option<WireUsage>,
    error: Option<WireError>,
}

#[derive(Debug, Deserialize)]
struct StreamChoice {
    delta: Delta,
    finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct Delta {
    content: Option<String>,
}

fn parse_stream_payload(payload: &str) -> Result<Vec<StreamEvent>, ProviderError> {
    let chunk: StreamChunk = serde_json::from_str(payload).map_err(|e| malformed(&e))?;
    if let Some(error) = chunk.error {
        return Err(ProviderError::Provider(error.message));
    }

    let mut events = Vec::new();

    for choice in chunk.choices {
        if choice.finish_reason.as_deref() == Some("content_filter") {
            return Err(ProviderError::Provider(
                "response blocked: content_filter".to_string(),
            ));
        }
        if let Some(content) = choice.delta.content.filter(|c| !c.is_empty()) {
            events.push(StreamEvent::Text(content));
        }
    }

    if let Some(usage) = chunk.usage {
        events.push(StreamEvent::Usage {
            input_tokens: Some(usage.prompt_tokens),
            output_tokens: Some(usage.completion_tokens),
        });
    }

    Ok(events)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_response() {
        let body = r#"{
            "id": "chatcmpl-1",
            "object": "chat.completion",
            "choices": [{"index": 0, "message": {"role": "assistant", "content": "Hallo"}, "finish_reason": "stop"}],
            "usage": {"prompt_tokens": 9, "completion_tokens": 2, "total_tokens": 11}
        }"#;
        let completion = parse_response(body).unwrap();
        assert_eq!(completion.text, "Hallo");
        assert_eq!(
            completion.usage,
            Some(Usage {
                input_tokens: 9,
                output_tokens: 2
            })
        );
    }

    #[test]
    fn test_parse_response_without_usage() {
        let body = r#"{"choices": [{"message": {"content": "Hallo"}, "finish_reason": "stop"}]}"#;
        assert_eq!(parse_response(body).unwrap().usage, None);
    }

    #[test]
    fn test_parse_response_content_filter() {
        let body =
            r#"{"choices": [{"message": {"content": null}, "finish_reason": "content_filter"}]}"#;
        assert_eq!(
            parse_response(body),
            Err(ProviderError::Provider(
                "response blocked: content_filter".to_string()
            ))
        );
    }

    #[test]
    fn test_parse_response_refusal() {
        let body = r#"{"choices": [{"message": {"content": null, "refusal": "I can't help with that."}, "finish_reason": "stop"}]}"#;
        let err = parse_response(body).unwrap_err();
        assert!(err.to_string().contains("I can't help with that."));
    }

    #[test]
    fn test_parse_response_empty_content_is_success() {
        let body = r#"{"choices": [{"message": {"content": ""}, "finish_reason": "stop"}]}"#;
        assert_eq!(parse_response(body).unwrap().text, "");
    }

    #[test]
    fn test_parse_response_null_content() {
        let body = r#"{"choices": [{"message": {"content": null}, "finish_reason": "stop"}]}"#;
        assert_eq!(
            parse_response(body),
            Err(ProviderError::Provider(
                "response contained no text".to_string()
            ))
        );
    }

    #[test]
    fn test_parse_response_no_choices() {
        assert!(matches!(
            parse_response(r#"{"choices": []}"#),
            Err(ProviderError::Provider(_))
        ));
    }

    #[test]
    fn test_request_body_shape() {
        let body = ChatCompletionRequest {
            model: "gpt-4o-mini",
            max_tokens: 4096,
            messages: [
                Message {
                    role: "system",
                    content: "Translate.",
                },
                Message {
                    role: "user",
                    content: "hello",
                },
            ],
            stream: true,
            stream_options: Some(StreamOptions {
                include_usage: true,
            }),
        };
        assert_eq!(
            serde_json::to_value(&body).unwrap(),
            serde_json::json!({
                "model": "gpt-4o-mini",
                "max_tokens": 4096,
                "messages": [
                    {"role": "system", "content": "Translate."},
                    {"role": "user", "content": "hello"}
                ],
                "stream": true,
                "stream_options": {"include_usage": true}
            })
        );
    }

    #[test]
    fn test_stream_payload_with_content() {
        let payload = r#"{"choices":[{"index":0,"delta":{"content":"Hello"},"finish_reason":null}]}"#;
        assert_eq!(
            parse_stream_payload(payload).unwrap(),
            vec![StreamEvent::Text("Hello".to_string())]
        );
    }

    #[test]
    fn test_stream_payload_empty_delta() {
        let payload = r#"{"choices":[{"index":0,"delta":{"role":"assistant","content":""}}]}"#;
        assert!(parse_stream_payload(payload).unwrap().is_empty());
    }

    #[test]
    fn test_stream_payload_usage_chunk() {
        let payload =
            r#"{"choices":[],"usage":{"prompt_tokens":9,"completion_tokens":12,"total_tokens":21}}"#;
        assert_eq!(
            parse_stream_payload(payload).unwrap(),
            vec![StreamEvent::Usage {
                input_tokens: Some(9),
                output_tokens: Some(12)
            }]
        );
    }

    #[test]
    fn test_stream_payload_error_chunk() {
        let payload = r#"{"error":{"message":"The server had an error while processing your request.","type":"server_error","code":null}}"#;
        assert_eq!(
            parse_stream_payload(payload),
            Err(ProviderError::Provider(
                "The server had an error while processing your request.".to_string()
            ))
        );
    }

    #[test]
    fn test_stream_payload_unicode() {
        let payload = r#"{"choices":[{"delta":{"content":"こんにちは"}}]}"#;
        assert_eq!(
            parse_stream_payload(payload).unwrap(),
            vec![StreamEvent::Text("こんにちは".to_string())]
        );
    }
}
