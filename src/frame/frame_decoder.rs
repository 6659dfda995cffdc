use super::{FrameDecodeError, InboundFrame};
use serde_json::Value;

/// Tagged result of decoding one raw frame.
#[derive(Debug, Clone, PartialEq)]
pub enum DecodeOutcome {
    Parsed { frame: InboundFrame, raw: String },
    Error { error: FrameDecodeError },
}

impl DecodeOutcome {
    pub fn is_parsed(&self) -> bool {
        matches!(self, DecodeOutcome::Parsed { .. })
    }
}

/// Decodes a text frame.
///
/// Never panics: every failure is reported as [`DecodeOutcome::Error`].
pub fn decode_frame(raw: &str) -> DecodeOutcome {
    match try_decode(raw) {
        Ok(frame) => DecodeOutcome::Parsed {
            frame,
            raw: raw.to_string(),
        },
        Err(error) => DecodeOutcome::Error { error },
    }
}

/// Decodes a binary frame holding UTF-8 JSON text.
pub fn decode_frame_bytes(bytes: &[u8]) -> DecodeOutcome {
    match std::str::from_utf8(bytes) {
        Ok(text) => decode_frame(text),
        Err(_) => DecodeOutcome::Error {
            error: FrameDecodeError::InvalidUtf8,
        },
    }
}

fn try_decode(raw: &str) -> Result<InboundFrame, FrameDecodeError> {
    let value: Value =
        serde_json::from_str(raw).map_err(|e| FrameDecodeError::MalformedJson(e.to_string()))?;

    let object = value.as_object().ok_or(FrameDecodeError::NotAnObject)?;

    match object.get("route") {
        Some(Value::String(route)) if !route.is_empty() => {}
        _ => return Err(FrameDecodeError::MissingRoute),
    }

    serde_json::from_value(value).map_err(|e| FrameDecodeError::MalformedJson(e.to_string()))
}
