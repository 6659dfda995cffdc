use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RemoteErrorCode {
    InternalServerError,
    NotFound,
    Unauthorized,
    BadRequest,
    #[serde(other)]
    Unknown,
}

/// Error object the backend attaches to a response frame.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct RemoteError {
    pub code: RemoteErrorCode,
    #[serde(default)]
    pub message: String,
}

impl fmt::Display for RemoteError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}: {}", self.code, self.message)
    }
}

impl std::error::Error for RemoteError {}
