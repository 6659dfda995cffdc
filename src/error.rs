use crate::frame::{FrameDecodeError, RemoteError};
use std::fmt;
use std::time::Duration;

/// Errors surfaced by the dispatch layer.
///
/// Every failure is converted into one of these variants at the dispatcher
/// boundary and handed to an `on_error` callback or a rejected
/// [`ResponseFuture`](crate::dispatch::ResponseFuture); none of them are
/// raised as panics.
#[derive(Debug, Clone, PartialEq)]
pub enum SocketError {
    /// The socket is not open, or writing to it failed.
    Transport(String),
    /// An outbound payload could not be serialized.
    Encode(String),
    /// An inbound frame could not be decoded.
    Decode(FrameDecodeError),
    /// The backend answered on the route with an error object.
    Remote(RemoteError),
    /// No response arrived on `route` within `after`.
    Timeout { route: String, after: Duration },
    /// The connection closed while the request was outstanding.
    Disconnected,
    /// The request was abandoned before a result could be determined.
    Aborted,
    /// A decoded payload did not match the expected response type.
    Payload(String),
    /// A registered callback panicked while handling a frame on `route`.
    CallbackPanicked { route: String },
    /// No access token was available for the connection attempt.
    Unauthorized,
}

impl fmt::Display for SocketError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SocketError::Transport(msg) => write!(f, "Transport error: {}", msg),
            SocketError::Encode(msg) => write!(f, "Failed to encode frame: {}", msg),
            SocketError::Decode(err) => write!(f, "Failed to decode frame: {}", err),
            SocketError::Remote(err) => write!(f, "Remote error: {}", err),
            SocketError::Timeout { route, after } => {
                write!(f, "No response on `{}` after {:?}", route, after)
            }
            SocketError::Disconnected => write!(f, "Socket disconnected"),
            SocketError::Aborted => write!(f, "Request aborted"),
            SocketError::Payload(msg) => write!(f, "Unexpected payload: {}", msg),
            SocketError::CallbackPanicked { route } => {
                write!(f, "Callback for `{}` panicked", route)
            }
            SocketError::Unauthorized => write!(f, "No valid access token"),
        }
    }
}

impl std::error::Error for SocketError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            SocketError::Decode(e) => Some(e),
            SocketError::Remote(e) => Some(e),
            _ => None,
        }
    }
}

impl From<FrameDecodeError> for SocketError {
    fn from(e: FrameDecodeError) -> Self {
        SocketError::Decode(e)
    }
}

impl From<RemoteError> for SocketError {
    fn from(e: RemoteError) -> Self {
        SocketError::Remote(e)
    }
}
