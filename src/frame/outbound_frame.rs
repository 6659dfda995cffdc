use crate::SocketError;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A request frame sent to the backend: `{"route": ..., "payload": ...}`.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct OutboundFrame {
    pub route: String,
    pub payload: Value,
}

impl OutboundFrame {
    /// Builds a frame from any serializable payload.
    pub fn new<P: Serialize>(route: impl Into<String>, payload: P) -> Result<Self, SocketError> {
        let payload =
            serde_json::to_value(payload).map_err(|e| SocketError::Encode(e.to_string()))?;

        Ok(Self {
            route: route.into(),
            payload,
        })
    }

    /// Serializes the frame to the JSON text sent over the socket.
    pub fn encode(&self) -> Result<String, SocketError> {
        serde_json::to_string(self).map_err(|e| SocketError::Encode(e.to_string()))
    }
}
