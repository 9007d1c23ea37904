use crate::connectors::errors::ConnectorError;
use serde::Deserialize;

/// Incremental line splitter for a `text/event-stream` body.
///
/// Bytes are buffered until a full line is available, so a multi-byte
/// character split across network chunks is decoded intact.
#[derive(Debug, Default)]
pub(super) struct SseDecoder {
    buffer: Vec<u8>,
}

#[derive(Debug, PartialEq)]
pub(super) enum SseEvent {
    Fragment(String),
    Done,
}

#[derive(Debug, Deserialize)]
struct ChunkEnvelope {
    #[serde(default)]
    choices: Vec<ChunkChoice>,
    error: Option<ProviderError>,
}

#[derive(Debug, Deserialize)]
struct ChunkChoice {
    #[serde(default)]
    delta: ChunkDelta,
}

#[derive(Debug, Default, Deserialize)]
struct ChunkDelta {
    content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ProviderError {
    #[serde(default)]
    message: String,
    #[serde(default, rename = "type")]
    kind: Option<String>,
}

impl SseDecoder {
    /// Feed raw body bytes, returning every event completed by them.
    pub(super) fn push(&mut self, bytes: &[u8]) -> Vec<Result<SseEvent, ConnectorError>> {
        self.buffer.extend_from_slice(bytes);

        let mut events = Vec::new();
        while let Some(pos) = self.buffer.iter().position(|b| *b == b'\n') {
            let line: Vec<u8> = self.buffer.drain(..=pos).collect();
            if let Some(event) = parse_line(&line) {
                events.push(event);
            }
        }
        events
    }

    /// Flush a trailing line that was not newline-terminated.
    pub(super) fn finish(&mut self) -> Option<Result<SseEvent, ConnectorError>> {
        if self.buffer.is_empty() {
            return None;
        }
        let line = std::mem::take(&mut self.buffer);
        parse_line(&line)
    }
}

fn parse_line(raw: &[u8]) -> Option<Result<SseEvent, ConnectorError>> {
    let line = match std::str::from_utf8(raw) {
        Ok(line) => line.trim_end_matches(['\r', '\n']),
        Err(err) => {
            return Some(Err(ConnectorError::InvalidResponse(format!(
                "Stream line is not valid UTF-8: {}",
                err
            ))))
        }
    };

    // Comments, `event:` / `id:` fields and blank separators carry no text.
    let data = line.strip_prefix("data:")?.trim_start();
    if data.is_empty() {
        return None;
    }
    if data == "[DONE]" {
        return Some(Ok(SseEvent::Done));
    }

    let envelope: ChunkEnvelope = match serde_json::from_str(data) {
        Ok(envelope) => envelope,
        Err(err) => {
            return Some(Err(ConnectorError::InvalidResponse(format!(
                "Invalid streaming chunk: {}",
                err
            ))))
        }
    };

    if let Some(error) = envelope.error {
        let msg = match error.kind {
            Some(kind) => format!("{}: {}", kind, error.message),
            None => error.message,
        };
        return Some(Err(ConnectorError::HttpError(msg)));
    }

    let content: String = envelope
        .choices
        .into_iter()
        .filter_map(|choice| choice.delta.content)
        .collect();

    if content.is_empty() {
        None
    } else {
        Some(Ok(SseEvent::Fragment(content)))
    }
}
