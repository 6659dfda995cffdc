use super::RemoteError;
use crate::constants::ROUTE_EVENT_SEPARATOR;
use serde::{Deserialize, Serialize};
use serde_json::Value;

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct SentBy {
    pub id: String,
    pub name: String,
}

/// A response or push frame received from the backend.
///
/// The backend addresses frames with a `route` plus an optional `event`;
/// listeners are keyed on the combination (see [`InboundFrame::dispatch_key`]).
/// Older producers put the body under `data` instead of `payload`; both are
/// accepted.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct InboundFrame {
    pub route: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub event: Option<String>,
    #[serde(default, alias = "data")]
    pub payload: Value,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<RemoteError>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sent_by: Option<SentBy>,
}

impl InboundFrame {
    pub fn new(route: impl Into<String>, payload: Value) -> Self {
        Self {
            route: route.into(),
            event: None,
            payload,
            error: None,
            sent_by: None,
        }
    }

    pub fn with_event(mut self, event: impl Into<String>) -> Self {
        self.event = Some(event.into());
        self
    }

    pub fn with_error(mut self, error: RemoteError) -> Self {
        self.error = Some(error);
        self
    }

    /// The key listeners are registered under: `route:event`, or the bare
    /// route when the frame carries no event.
    pub fn dispatch_key(&self) -> String {
        match &self.event {
            Some(event) if !event.is_empty() => {
                format!("{}{}{}", self.route, ROUTE_EVENT_SEPARATOR, event)
            }
            _ => self.route.clone(),
        }
    }
}
