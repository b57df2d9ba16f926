//! Decoding of the chat endpoint's server-sent-event body.
//!
//! Each event is one `data: <payload>` line. The payload is either the
//! `[DONE]` sentinel or a JSON object carrying `content` (the full text of the
//! reply so far, not a delta) or `error`.

use serde_json::Value;
use thiserror::Error;
use tracing::warn;

pub const DATA_PREFIX: &str = "data: ";
pub const DONE_SENTINEL: &str = "[DONE]";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StreamFrame {
    /// Cumulative assistant text for the current turn.
    Content(String),
    Error(String),
    Done,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("malformed frame payload: {payload}")]
pub struct MalformedFrame {
    pub payload: String,
}

/// Classifies one line of the event stream.
///
/// `Ok(None)` covers lines that carry no frame: comments, keep-alives, other
/// SSE fields and JSON objects without `content` or `error`.
pub fn parse_line(line: &str) -> Result<Option<StreamFrame>, MalformedFrame> {
    let Some(data) = line.strip_prefix(DATA_PREFIX) else {
        return Ok(None);
    };
    if data == DONE_SENTINEL {
        return Ok(Some(StreamFrame::Done));
    }

    let value: Value = serde_json::from_str(data).map_err(|_| MalformedFrame {
        payload: data.to_string(),
    })?;

    if let Some(error) = value.get("error").filter(|e| !e.is_null()) {
        let message = match error {
            Value::String(message) => message.clone(),
            other => other.to_string(),
        };
        return Ok(Some(StreamFrame::Error(message)));
    }

    Ok(value
        .get("content")
        .and_then(Value::as_str)
        .map(|content| StreamFrame::Content(content.to_string())))
}

/// Longest line kept while waiting for its newline; replies are cumulative,
/// so this bounds the size of a single snapshot.
pub const MAX_LINE_BYTES: usize = 4 * 1024 * 1024;

/// Splits a byte stream into lines, carrying partial lines across reads.
///
/// A line that outgrows the limit is dropped up to its newline and reported
/// like any other malformed frame.
#[derive(Debug)]
pub struct LineDecoder {
    buffer: Vec<u8>,
    max_line: usize,
    discarding: bool,
}

impl Default for LineDecoder {
    fn default() -> Self {
        Self::with_max_line(MAX_LINE_BYTES)
    }
}

impl LineDecoder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_max_line(max_line: usize) -> Self {
        Self {
            buffer: Vec::new(),
            max_line,
            discarding: false,
        }
    }

    /// Feeds one network read and returns every line it completed.
    pub fn push(&mut self, chunk: &[u8]) -> Vec<String> {
        let mut lines = Vec::new();
        let mut rest = chunk;
        while let Some(offset) = rest.iter().position(|&b| b == b'\n') {
            let head = &rest[..offset];
            if self.discarding {
                self.discarding = false;
            } else if self.buffer.len() + head.len() > self.max_line {
                self.report_oversized(self.buffer.len() + head.len());
            } else {
                self.buffer.extend_from_slice(head);
                lines.push(decode_line(&self.buffer));
            }
            self.buffer.clear();
            rest = &rest[offset + 1..];
        }

        if !self.discarding {
            if self.buffer.len() + rest.len() > self.max_line {
                self.report_oversized(self.buffer.len() + rest.len());
                self.buffer.clear();
                self.discarding = true;
            } else {
                self.buffer.extend_from_slice(rest);
            }
        }
        lines
    }

    /// Returns the unterminated tail left when the stream closed.
    pub fn finish(&mut self) -> Option<String> {
        if std::mem::take(&mut self.discarding) || self.buffer.is_empty() {
            self.buffer.clear();
            return None;
        }
        let tail = std::mem::take(&mut self.buffer);
        Some(decode_line(&tail))
    }

    fn report_oversized(&self, len: usize) {
        warn!(len, limit = self.max_line, "skipping frame: line too long");
    }
}

fn decode_line(bytes: &[u8]) -> String {
    let bytes = bytes.strip_suffix(b"\r").unwrap_or(bytes);
    String::from_utf8_lossy(bytes).into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_content_frame() {
        assert_eq!(
            parse_line(r#"data: {"content":"Hi there"}"#),
            Ok(Some(StreamFrame::Content("Hi there".to_string())))
        );
    }

    #[test]
    fn test_parse_done_and_error() {
        assert_eq!(parse_line("data: [DONE]"), Ok(Some(StreamFrame::Done)));
        assert_eq!(
            parse_line(r#"data: {"error":"rate limited"}"#),
            Ok(Some(StreamFrame::Error("rate limited".to_string())))
        );
    }

    #[test]
    fn test_error_wins_over_content() {
        assert_eq!(
            parse_line(r#"data: {"content":"half","error":"upstream closed"}"#),
            Ok(Some(StreamFrame::Error("upstream closed".to_string())))
        );
    }

    #[test]
    fn test_structured_error_payload_is_stringified() {
        assert_eq!(
            parse_line(r#"data: {"error":{"code":429}}"#),
            Ok(Some(StreamFrame::Error(r#"{"code":429}"#.to_string())))
        );
    }

    #[test]
    fn test_non_frames_are_ignored() {
        assert_eq!(parse_line(""), Ok(None));
        assert_eq!(parse_line(": keep-alive"), Ok(None));
        assert_eq!(parse_line("event: message"), Ok(None));
        assert_eq!(parse_line("data:{\"content\":\"no space\"}"), Ok(None));
        assert_eq!(parse_line(r#"data: {"usage": 12}"#), Ok(None));
        assert_eq!(parse_line(r#"data: {"content": 12}"#), Ok(None));
        assert_eq!(
            parse_line(r#"data: {"error": null, "content": "ok"}"#),
            Ok(Some(StreamFrame::Content("ok".to_string())))
        );
    }

    #[test]
    fn test_malformed_payload() {
        let err = parse_line(r#"data: {"content":"trunc"#).unwrap_err();
        assert_eq!(err.payload, r#"{"content":"trunc"#);
    }

    #[test]
    fn test_line_split_across_reads_is_reassembled() {
        let mut decoder = LineDecoder::new();
        assert!(decoder.push(b"data: {\"cont").is_empty());
        assert_eq!(
            decoder.push(b"ent\":\"Hi\"}\ndata: [DO"),
            vec![r#"data: {"content":"Hi"}"#]
        );
        assert_eq!(decoder.push(b"NE]\n"), vec!["data: [DONE]"]);
        assert_eq!(decoder.finish(), None);
    }

    #[test]
    fn test_many_lines_in_one_read() {
        let mut decoder = LineDecoder::new();
        let lines = decoder.push(b"data: a\r\n\r\ndata: b\n\ndata: c");
        assert_eq!(lines, vec!["data: a", "", "data: b", ""]);
        assert_eq!(decoder.finish(), Some("data: c".to_string()));
    }

    #[test]
    fn test_multibyte_character_split_across_reads() {
        let line = "data: {\"content\":\"你好\"}\n".as_bytes();
        let split = line.len() - 5;
        let mut decoder = LineDecoder::new();
        assert!(decoder.push(&line[..split]).is_empty());
        assert_eq!(decoder.push(&line[split..]), vec!["data: {\"content\":\"你好\"}"]);
    }

    #[test]
    fn test_oversized_line_is_dropped_up_to_its_newline() {
        let mut decoder = LineDecoder::with_max_line(16);
        assert!(decoder.push(b"data: {\"content\":").is_empty());
        // Still inside the oversized line: nothing is buffered or returned.
        assert!(decoder.push(b"\"way too long for the limit").is_empty());
        assert_eq!(decoder.push(b"\"}\ndata: [DONE]\n"), vec!["data: [DONE]"]);
        assert_eq!(decoder.finish(), None);
    }

    #[test]
    fn test_oversized_line_within_one_read() {
        let mut decoder = LineDecoder::with_max_line(8);
        assert_eq!(
            decoder.push(b"data: 0123456789\ndata: ok\n"),
            vec!["data: ok"]
        );
    }

    #[test]
    fn test_oversized_tail_is_not_flushed() {
        let mut decoder = LineDecoder::with_max_line(8);
        assert!(decoder.push(b"data: never ends").is_empty());
        assert_eq!(decoder.finish(), None);
    }
}
