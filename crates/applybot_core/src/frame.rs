//! Incremental decoder for `text/event-stream` bodies.
//!
//! Input arrives in arbitrary fragments. A frame is complete once a blank
//! line follows it; everything after the last blank line stays buffered
//! until the next fragment arrives.

use applybot_logging::applybot_debug;
use serde_json::Value;

/// Event type used when a frame has no `event:` field.
pub const DEFAULT_EVENT: &str = "message";

const FRAME_BOUNDARY: &str = "\n\n";

/// Decoded `data:` payload of a frame.
#[derive(Debug, Clone, PartialEq)]
pub enum Payload {
    Structured(Value),
    Raw(String),
}

impl Payload {
    /// JSON when the text parses, the text itself otherwise.
    pub fn decode(text: String) -> Self {
        match serde_json::from_str::<Value>(&text) {
            Ok(value) => Self::Structured(value),
            Err(_) => Self::Raw(text),
        }
    }

    /// Text form of the payload, re-serialising structured values.
    pub fn to_text(&self) -> String {
        match self {
            Self::Structured(Value::String(text)) => text.clone(),
            Self::Structured(value) => value.to_string(),
            Self::Raw(text) => text.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Frame {
    pub event: String,
    pub data: Payload,
}

impl Frame {
    pub fn new(event: impl Into<String>, data: Payload) -> Self {
        Self {
            event: event.into(),
            data,
        }
    }
}

#[derive(Debug, Default)]
pub struct FrameDecoder {
    buffer: String,
    /// Trailing bytes of a UTF-8 sequence split across chunks.
    pending_utf8: Vec<u8>,
    /// Last character seen was `\r`; a following `\n` belongs to the same line break.
    after_cr: bool,
}

impl FrameDecoder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a text fragment. CRLF, LF and a lone CR all end a line.
    pub fn push(&mut self, fragment: &str) {
        for ch in fragment.chars() {
            match ch {
                '\r' => {
                    self.buffer.push('\n');
                    self.after_cr = true;
                }
                '\n' if self.after_cr => self.after_cr = false,
                _ => {
                    self.buffer.push(ch);
                    self.after_cr = false;
                }
            }
        }
    }

    /// Append raw bytes, holding back an incomplete trailing UTF-8 sequence.
    pub fn push_bytes(&mut self, bytes: &[u8]) {
        if self.pending_utf8.is_empty() {
            self.push_utf8(bytes);
        } else {
            let mut joined = std::mem::take(&mut self.pending_utf8);
            joined.extend_from_slice(bytes);
            self.push_utf8(&joined);
        }
    }

    fn push_utf8(&mut self, mut input: &[u8]) {
        loop {
            match std::str::from_utf8(input) {
                Ok(text) => {
                    self.push(text);
                    return;
                }
                Err(err) => {
                    let (valid, rest) = input.split_at(err.valid_up_to());
                    self.push(&String::from_utf8_lossy(valid));
                    match err.error_len() {
                        None => {
                            self.pending_utf8.extend_from_slice(rest);
                            return;
                        }
                        Some(len) => {
                            self.push("\u{FFFD}");
                            input = &rest[len..];
                        }
                    }
                }
            }
        }
    }

    /// Next complete frame carrying at least one `data:` line, if buffered.
    pub fn next_frame(&mut self) -> Option<Frame> {
        loop {
            let end = self.buffer.find(FRAME_BOUNDARY)?;
            let block: String = self.buffer.drain(..end + FRAME_BOUNDARY.len()).collect();
            if let Some(frame) = parse_block(&block[..end]) {
                return Some(frame);
            }
        }
    }

    /// Lazily yields every complete frame currently buffered, in input order.
    pub fn frames(&mut self) -> impl Iterator<Item = Frame> + '_ {
        std::iter::from_fn(move || self.next_frame())
    }

    /// Bytes of text still waiting for a frame boundary.
    pub fn residual_len(&self) -> usize {
        self.buffer.len() + self.pending_utf8.len()
    }
}

fn parse_block(block: &str) -> Option<Frame> {
    let mut event: Option<&str> = None;
    let mut data_lines: Vec<&str> = Vec::new();

    for line in block.split('\n') {
        if let Some(value) = line.strip_prefix("event:") {
            event = Some(strip_separator(value));
        } else if let Some(value) = line.strip_prefix("data:") {
            data_lines.push(strip_separator(value));
        }
        // Comments (`:`), `id:`, `retry:` and anything else are skipped.
    }

    if data_lines.is_empty() {
        applybot_debug!(
            "Dropping event-stream frame without data (event={:?})",
            event.unwrap_or(DEFAULT_EVENT)
        );
        return None;
    }

    let event = match event.map(str::trim) {
        Some(name) if !name.is_empty() => name.to_string(),
        _ => DEFAULT_EVENT.to_string(),
    };
    Some(Frame::new(event, Payload::decode(data_lines.join("\n"))))
}

fn strip_separator(value: &str) -> &str {
    value.strip_prefix(' ').unwrap_or(value)
}
