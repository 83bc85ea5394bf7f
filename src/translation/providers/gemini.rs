use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};

use super::{
    Completion, EventStream, ProviderAdapter, ProviderError, SendRequest, StreamEvent, Usage,
    events_from_sse, execute, malformed, read_body,
};

const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com";

/// Finish reasons that mean the provider withheld the output.
const BLOCKED_FINISH_REASONS: &[&str] = &[
    "SAFETY",
    "RECITATION",
    "BLOCKLIST",
    "PROHIBITED_CONTENT",
    "SPII",
];

/// Adapter for the Gemini `generateContent` API.
pub struct GeminiAdapter {
    client: Client,
    base_url: String,
}

impl GeminiAdapter {
    pub fn new(client: Client) -> Self {
        Self::with_base_url(client, DEFAULT_BASE_URL)
    }

    pub fn with_base_url(client: Client, base_url: impl Into<String>) -> Self {
        Self {
            client,
            base_url: base_url.into(),
        }
    }

    fn request(&self, request: &SendRequest<'_>, method: &str) -> reqwest::RequestBuilder {
        let url = format!(
            "{}/v1beta/{}:{method}",
            self.base_url.trim_end_matches('/'),
            model_path(request.provider_model_id)
        );
        let body = GenerateContentRequest {
            system_instruction: Content {
                role: None,
                parts: [Part {
                    text: request.system_prompt,
                }],
            },
            contents: [Content {
                role: Some("user"),
                parts: [Part {
                    text: request.source_text,
                }],
            }],
            generation_config: GenerationConfig {
                max_output_tokens: request.max_output_tokens,
                candidate_count: 1,
            },
        };

        // Key in a header, never in the URL.
        self.client
            .post(url)
            .header("x-goog-api-key", request.api_key)
            .json(&body)
    }
}

#[async_trait]
impl ProviderAdapter for GeminiAdapter {
    async fn send(&self, request: &SendRequest<'_>) -> Result<Completion, ProviderError> {
        let response = execute(self.request(request, "generateContent")).await?;
        let body = read_body(response).await?;
        parse_response(&body)
    }

    async fn stream(&self, request: &SendRequest<'_>) -> Result<EventStream, ProviderError> {
        let response = execute(self.request(request, "streamGenerateContent?alt=sse")).await?;
        Ok(events_from_sse(response, parse_stream_payload))
    }
}

/// Model ids may or may not carry the `models/` resource prefix.
fn model_path(provider_model_id: &str) -> String {
    if provider_model_id.starts_with("models/") {
        provider_model_id.to_string()
    } else {
        format!("models/{provider_model_id}")
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentRequest<'a> {
    system_instruction: Content<'a>,
    contents: [Content<'a>; 1],
    generation_config: GenerationConfig,
}

#[derive(Debug, Serialize)]
struct Content<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    role: Option<&'static str>,
    parts: [Part<'a>; 1],
}

#[derive(Debug, Serialize)]
struct Part<'a> {
    text: &'a str,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    max_output_tokens: u32,
    candidate_count: u32,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
    prompt_feedback: Option<PromptFeedback>,
    usage_metadata: Option<UsageMetadata>,
    error: Option<WireError>,
}

/// In-band error object, sent with a 200 status once a stream has started.
#[derive(Debug, Deserialize)]
struct WireError {
    message: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Candidate {
    content: Option<CandidateContent>,
    finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<ResponsePart>,
}

#[derive(Debug, Deserialize)]
struct ResponsePart {
    text: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PromptFeedback {
    block_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct UsageMetadata {
    prompt_token_count: Option<u64>,
    candidates_token_count: Option<u64>,
}

impl GenerateContentResponse {
    /// Text of the first candidate's first part, if any.
    fn first_text(&mut self) -> Option<String> {
        self.candidates
            .first_mut()?
            .content
            .as_mut()?
            .parts
            .first_mut()?
            .text
            .take()
    }

    fn blocked_reason(&self) -> Option<String> {
        if let Some(reason) = self
            .prompt_feedback
            .as_ref()
            .and_then(|f| f.block_reason.as_deref())
        {
            return Some(format!("prompt blocked: {reason}"));
        }
        self.candidates
            .first()
            .and_then(|c| c.finish_reason.as_deref())
            .filter(|r| BLOCKED_FINISH_REASONS.contains(r))
            .map(|r| format!("response blocked: {r}"))
    }
}

fn parse_response(body: &str) -> Result<Completion, ProviderError> {
    let mut response: GenerateContentResponse =
        serde_json::from_str(body).map_err(|e| malformed(&e))?;
    if let Some(error) = response.error.take() {
        return Err(ProviderError::Provider(error.message));
    }

    let text = match response.first_text() {
        Some(text) => text,
        None => {
            let reason = response
                .blocked_reason()
                .unwrap_or_else(|| "response contained no text".to_string());
            return Err(ProviderError::Provider(reason));
        }
    };

    // Gemini omits usage on some replies; absent stays absent.
    let usage = response.usage_metadata.and_then(|u| {
        Some(Usage {
            input_tokens: u.prompt_token_count?,
            output_tokens: u.candidates_token_count.unwrap_or(0),
        })
    });

    Ok(Completion { text, usage })
}

fn parse_stream_payload(payload: &str) -> Result<Vec<StreamEvent>, ProviderError> {
    let mut chunk: GenerateContentResponse =
        serde_json::from_str(payload).map_err(|e| malformed(&e))?;
    if let Some(error) = chunk.error.take() {
        return Err(ProviderError::Provider(error.message));
    }

    let mut events = Vec::new();
    match chunk.first_text() {
        Some(text) if !text.is_empty() => events.push(StreamEvent::Text(text)),
        _ => {
            if let Some(reason) = chunk.blocked_reason() {
                return Err(ProviderError::Provider(reason));
            }
        }
    }

    if let Some(u) = chunk.usage_metadata
        && u.prompt_token_count.is_some()
    {
        events.push(StreamEvent::Usage {
            input_tokens: u.prompt_token_count,
            output_tokens: Some(u.candidates_token_count.unwrap_or(0)),
        });
    }

    Ok(events)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_model_path() {
        assert_eq!(
            model_path("gemini-1.5-flash-latest"),
            "models/gemini-1.5-flash-latest"
        );
        assert_eq!(
            model_path("models/gemini-1.5-pro-latest"),
            "models/gemini-1.5-pro-latest"
        );
    }

    #[test]
    fn test_parse_response_with_usage() {
        let body = r#"{
            "candidates": [{
                "content": {"parts": [{"text": "こんにちは"}], "role": "model"},
                "finishReason": "STOP"
            }],
            "usageMetadata": {"promptTokenCount": 8, "candidatesTokenCount": 3, "totalTokenCount": 11}
        }"#;
        let completion = parse_response(body).unwrap();
        assert_eq!(completion.text, "こんにちは");
        assert_eq!(
            completion.usage,
            Some(Usage {
                input_tokens: 8,
                output_tokens: 3
            })
        );
    }

    #[test]
    fn test_parse_response_missing_usage_is_absent() {
        let body = r#"{"candidates": [{"content": {"parts": [{"text": "Hi"}]}}]}"#;
        let completion = parse_response(body).unwrap();
        assert_eq!(completion.text, "Hi");
        assert_eq!(completion.usage, None);
    }

    #[test]
    fn test_parse_response_prompt_blocked() {
        let body = r#"{"promptFeedback": {"blockReason": "SAFETY"}}"#;
        assert_eq!(
            parse_response(body),
            Err(ProviderError::Provider("prompt blocked: SAFETY".to_string()))
        );
    }

    #[test]
    fn test_parse_response_candidate_blocked() {
        let body = r#"{"candidates": [{"finishReason": "SAFETY"}]}"#;
        assert_eq!(
            parse_response(body),
            Err(ProviderError::Provider("response blocked: SAFETY".to_string()))
        );
    }

    #[test]
    fn test_parse_response_empty_candidates() {
        let body = r#"{"candidates": []}"#;
        assert_eq!(
            parse_response(body),
            Err(ProviderError::Provider(
                "response contained no text".to_string()
            ))
        );
    }

    #[test]
    fn test_parse_response_empty_text_is_success() {
        let body = r#"{"candidates": [{"content": {"parts": [{"text": ""}]}, "finishReason": "STOP"}]}"#;
        assert_eq!(parse_response(body).unwrap().text, "");
    }

    #[test]
    fn test_request_body_shape() {
        let body = GenerateContentRequest {
            system_instruction: Content {
                role: None,
                parts: [Part { text: "Translate." }],
            },
            contents: [Content {
                role: Some("user"),
                parts: [Part { text: "hello" }],
            }],
            generation_config: GenerationConfig {
                max_output_tokens: 8192,
                candidate_count: 1,
            },
        };
        assert_eq!(
            serde_json::to_value(&body).unwrap(),
            serde_json::json!({
                "systemInstruction": {"parts": [{"text": "Translate."}]},
                "contents": [{"role": "user", "parts": [{"text": "hello"}]}],
                "generationConfig": {"maxOutputTokens": 8192, "candidateCount": 1}
            })
        );
    }

    #[test]
    fn test_stream_payloads() {
        let first = r#"{"candidates":[{"content":{"parts":[{"text":"Hel"}],"role":"model"}}],"usageMetadata":{"promptTokenCount":8}}"#;
        assert_eq!(
            parse_stream_payload(first).unwrap(),
            vec![
                StreamEvent::Text("Hel".to_string()),
                StreamEvent::Usage {
                    input_tokens: Some(8),
                    output_tokens: Some(0)
                }
            ]
        );

        let last = r#"{"candidates":[{"content":{"parts":[{"text":"lo"}],"role":"model"},"finishReason":"STOP"}],"usageMetadata":{"promptTokenCount":8,"candidatesTokenCount":2}}"#;
        assert_eq!(
            parse_stream_payload(last).unwrap(),
            vec![
                StreamEvent::Text("lo".to_string()),
                StreamEvent::Usage {
                    input_tokens: Some(8),
                    output_tokens: Some(2)
                }
            ]
        );
    }

    #[test]
    fn test_stream_payload_error_chunk() {
        let payload = r#"{"error":{"code":500,"message":"An internal error has occurred.","status":"INTERNAL"}}"#;
        assert_eq!(
            parse_stream_payload(payload),
            Err(ProviderError::Provider(
                "An internal error has occurred.".to_string()
            ))
        );
    }

    #[test]
    fn test_stream_payload_blocked() {
        let payload = r#"{"candidates":[{"finishReason":"RECITATION"}]}"#;
        assert_eq!(
            parse_stream_payload(payload),
            Err(ProviderError::Provider(
                "response blocked: RECITATION".to_string()
            ))
        );
    }
}
