use std::fmt;

/// Reasons a raw inbound frame could not be turned into an [`InboundFrame`](super::InboundFrame).
#[derive(Debug, Clone, PartialEq)]
pub enum FrameDecodeError {
    /// The text is not valid JSON, or does not match the frame shape.
    MalformedJson(String),

    /// The JSON value is valid but is not an object.
    NotAnObject,

    /// The object has no string `route` field.
    MissingRoute,

    /// A binary frame did not contain UTF-8 text.
    InvalidUtf8,
}

impl fmt::Display for FrameDecodeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FrameDecodeError::MalformedJson(msg) => write!(f, "malformed JSON: {}", msg),
            FrameDecodeError::NotAnObject => write!(f, "frame is not a JSON object"),
            FrameDecodeError::MissingRoute => write!(f, "frame has no `route`"),
            FrameDecodeError::InvalidUtf8 => write!(f, "binary frame is not UTF-8"),
        }
    }
}

impl std::error::Error for FrameDecodeError {}
