//! Server-Sent Events (SSE) framing for streaming provider responses.
//!
//! Only the `data:` payloads are surfaced; each provider adapter decodes the
//! JSON inside them.

use bytes::Bytes;
use futures_util::Stream;

use super::providers::ProviderError;

/// Converts a raw SSE byte stream into a stream of `data:` payloads.
///
/// Handles buffering of partial lines across chunks, skips comments, blank
/// lines and non-data fields, and ends at the OpenAI-style `[DONE]` marker.
/// A transport error is yielded once and ends the stream.
pub fn sse_data_stream(
    byte_stream: impl Stream<Item = reqwest::Result<Bytes>> + Send + 'static,
) -> impl Stream<Item = Result<String, ProviderError>> + Send {
    async_stream::stream! {
        use futures_util::StreamExt;

        let mut byte_stream = std::pin::pin!(byte_stream);
        // Bytes, not text: a multi-byte character may span two chunks.
        let mut buffer: Vec<u8> = Vec::new();

        while let Some(chunk_result) = byte_stream.next().await {
            let chunk = match chunk_result {
                Ok(c) => c,
                Err(e) => {
                    yield Err(ProviderError::Network(format!(
                        "stream interrupted: {}",
                        e.without_url()
                    )));
                    return;
                }
            };

            buffer.extend_from_slice(&chunk);

            while let Some(line_end) = buffer.iter().position(|&b| b == b'\n') {
                let line: Vec<u8> = buffer.drain(..=line_end).collect();
                let line = String::from_utf8_lossy(&line).into_owned();

                match parse_sse_line(line.trim()) {
                    SseLine::Data(payload) => yield Ok(payload),
                    SseLine::Done => return,
                    SseLine::Skip => {}
                }
            }
        }

        // A final event may arrive without a trailing newline.
        let rest = String::from_utf8_lossy(&buffer).into_owned();
        if let SseLine::Data(payload) = parse_sse_line(rest.trim()) {
            yield Ok(payload);
        }
    }
}

#[derive(Debug, PartialEq, Eq)]
enum SseLine {
    Data(String),
    Done,
    Skip,
}

/// Classifies a single trimmed SSE line.
///
/// ```ignore
/// assert_eq!(parse_sse_line(r#"data: {"a":1}"#), SseLine::Data(r#"{"a":1}"#.into()));
/// ```
fn parse_sse_line(line: &str) -> SseLine {
    let Some(payload) = line.strip_prefix("data:") else {
        return SseLine::Skip;
    };
    let payload = payload.trim_start();

    if payload == "[DONE]" {
        SseLine::Done
    } else if payload.is_empty() {
        SseLine::Skip
    } else {
        SseLine::Data(payload.to_string())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use futures_util::StreamExt;

    fn data(s: &str) -> SseLine {
        SseLine::Data(s.to_string())
    }

    #[test]
    fn test_parse_sse_line_with_payload() {
        let line = r#"data: {"choices":[{"delta":{"content":"Hello"}}]}"#;
        assert_eq!(
            parse_sse_line(line),
            data(r#"{"choices":[{"delta":{"content":"Hello"}}]}"#)
        );
    }

    #[test]
    fn test_parse_sse_line_without_space() {
        assert_eq!(parse_sse_line(r#"data:{"a":1}"#), data(r#"{"a":1}"#));
    }

    #[test]
    fn test_parse_sse_line_done_marker() {
        assert_eq!(parse_sse_line("data: [DONE]"), SseLine::Done);
    }

    #[test]
    fn test_parse_sse_line_event_field() {
        assert_eq!(parse_sse_line("event: content_block_delta"), SseLine::Skip);
    }

    #[test]
    fn test_parse_sse_line_comment_and_empty() {
        assert_eq!(parse_sse_line(": keep-alive"), SseLine::Skip);
        assert_eq!(parse_sse_line(""), SseLine::Skip);
        assert_eq!(parse_sse_line("data:"), SseLine::Skip);
    }

    #[test]
    fn test_parse_sse_line_unicode_payload() {
        let line = r#"data: {"text":"こんにちは"}"#;
        assert_eq!(parse_sse_line(line), data(r#"{"text":"こんにちは"}"#));
    }

    async fn collect(chunks: Vec<&'static str>) -> Vec<String> {
        let bytes = futures_util::stream::iter(
            chunks
                .into_iter()
                .map(|c| Ok::<_, reqwest::Error>(Bytes::from_static(c.as_bytes()))),
        );
        sse_data_stream(bytes)
            .map(|r| r.unwrap())
            .collect::<Vec<_>>()
            .await
    }

    #[tokio::test]
    async fn test_stream_reassembles_split_lines() {
        let payloads = collect(vec![
            "event: message\ndata: {\"a\"",
            ":1}\n\ndata: {\"b\":2}\n",
            "\n",
        ])
        .await;
        assert_eq!(payloads, vec![r#"{"a":1}"#, r#"{"b":2}"#]);
    }

    #[tokio::test]
    async fn test_stream_stops_at_done() {
        let payloads = collect(vec!["data: one\n\ndata: [DONE]\n\ndata: two\n\n"]).await;
        assert_eq!(payloads, vec!["one"]);
    }

    #[tokio::test]
    async fn test_stream_flushes_unterminated_final_line() {
        let payloads = collect(vec!["data: one\r\n\r\ndata: two"]).await;
        assert_eq!(payloads, vec!["one", "two"]);
    }

    #[tokio::test]
    async fn test_stream_keeps_characters_split_across_chunks() {
        let line = "data: こんにちは\n".as_bytes();
        // Cut inside the second character.
        let (head, tail) = line.split_at(10);
        let bytes = futures_util::stream::iter(vec![
            Ok::<_, reqwest::Error>(Bytes::copy_from_slice(head)),
            Ok(Bytes::copy_from_slice(tail)),
        ]);
        let payloads: Vec<String> = sse_data_stream(bytes).map(|r| r.unwrap()).collect().await;
        assert_eq!(payloads, vec!["こんにちは"]);
    }
}
