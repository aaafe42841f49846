//! Server-Sent Events (SSE) streaming parser.
//!
//! Gemini (`alt=sse`) and OpenAI (`stream: true`) both stream replies as
//! SSE. Line handling lives in [`SseDecoder`] so it can be driven from
//! any line source; [`parse_sse_stream`] feeds it from a reqwest body.

use futures_util::StreamExt;
use tokio::io::AsyncBufReadExt;
use tokio_util::io::StreamReader;

use crate::BackendError;

/// A single SSE event parsed from the stream.
#[derive(Debug, Clone, PartialEq)]
pub struct SseEvent {
    pub event: Option<String>,
    pub data: String,
}

/// Incremental SSE line decoder.
#[derive(Debug, Default)]
pub struct SseDecoder {
    event: Option<String>,
    data: String,
}

impl SseDecoder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed one line (without its terminator). Returns an event when the
    /// line completes one.
    pub fn push_line(&mut self, line: &str) -> Option<SseEvent> {
        let line = line.strip_suffix('\r').unwrap_or(line);

        if line.is_empty() {
            return self.take();
        }

        if let Some(event_type) = field(line, "event") {
            self.event = Some(event_type.to_string());
        } else if let Some(data) = field(line, "data") {
            if !self.data.is_empty() {
                self.data.push('\n');
            }
            self.data.push_str(data);
        }
        // id:, retry: and comments are ignored
        None
    }

    /// Flush a trailing event not followed by a blank line.
    pub fn finish(&mut self) -> Option<SseEvent> {
        self.take()
    }

    fn take(&mut self) -> Option<SseEvent> {
        let event = self.event.take();
        if self.data.is_empty() {
            return None;
        }
        Some(SseEvent {
            event,
            data: std::mem::take(&mut self.data),
        })
    }
}

fn field<'a>(line: &'a str, name: &str) -> Option<&'a str> {
    let rest = line.strip_prefix(name)?.strip_prefix(':')?;
    Some(rest.strip_prefix(' ').unwrap_or(rest))
}

/// Parse one event's JSON payload. An `error` object sent mid-stream
/// becomes [`BackendError::ApiError`].
pub fn parse_json_event(data: &str) -> Result<serde_json::Value, BackendError> {
    let json: serde_json::Value = serde_json::from_str(data)
        .map_err(|e| BackendError::ParseError(format!("malformed stream event: {e}")))?;
    if let Some(error) = json.get("error").filter(|e| !e.is_null()) {
        let message = error["message"]
            .as_str()
            .map(String::from)
            .unwrap_or_else(|| error.to_string());
        return Err(BackendError::ApiError(message));
    }
    Ok(json)
}

/// Parse an SSE stream from a reqwest response, calling `on_event` for each
/// event. An error from `on_event` stops reading and is returned.
pub async fn parse_sse_stream(
    response: reqwest::Response,
    mut on_event: impl FnMut(SseEvent) -> Result<(), BackendError>,
) -> Result<(), BackendError> {
    let byte_stream = response
        .bytes_stream()
        .map(|result| result.map_err(std::io::Error::other));
    let reader = tokio::io::BufReader::new(StreamReader::new(byte_stream));
    let mut lines = reader.lines();
    let mut decoder = SseDecoder::new();

    while let Some(line) = lines
        .next_line()
        .await
        .map_err(|e| BackendError::NetworkError(e.to_string()))?
    {
        if let Some(event) = decoder.push_line(&line) {
            on_event(event)?;
        }
    }

    if let Some(event) = decoder.finish() {
        on_event(event)?;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn decode(input: &str) -> Vec<SseEvent> {
        let mut decoder = SseDecoder::new();
        let mut events: Vec<SseEvent> = input
            .lines()
            .filter_map(|line| decoder.push_line(line))
            .collect();
        events.extend(decoder.finish());
        events
    }

    #[test]
    fn splits_events_on_blank_lines() {
        let events = decode("data: {\"a\":1}\n\ndata: {\"b\":2}\n\n");
        assert_eq!(events.len(), 2);
        assert_eq!(events[0].data, "{\"a\":1}");
        assert_eq!(events[1].data, "{\"b\":2}");
    }

    #[test]
    fn keeps_event_type_and_joins_multiline_data() {
        let events = decode("event: delta\ndata: one\ndata: two\n\n");
        assert_eq!(
            events,
            vec![SseEvent {
                event: Some("delta".into()),
                data: "one\ntwo".into(),
            }]
        );
    }

    #[test]
    fn flushes_trailing_event_and_ignores_comments() {
        let events = decode(": keep-alive\nid: 7\ndata: [DONE]");
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].data, "[DONE]");
        assert_eq!(events[0].event, None);
    }

    #[test]
    fn json_event_error_payload_is_api_error() {
        let err = parse_json_event(r#"{"error":{"code":503,"message":"The model is overloaded."}}"#)
            .unwrap_err();
        assert!(matches!(err, BackendError::ApiError(ref m) if m == "The model is overloaded."));
    }

    #[test]
    fn json_event_rejects_malformed_payload() {
        assert!(matches!(
            parse_json_event("{\"candidates\": ["),
            Err(BackendError::ParseError(_))
        ));
        let ok = parse_json_event(r#"{"candidates":[],"error":null}"#).unwrap();
        assert!(ok["candidates"].is_array());
    }

    #[test]
    fn tolerates_crlf_and_missing_space() {
        let events = decode("data:x\r\n\r\n");
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].data, "x");
    }
}
