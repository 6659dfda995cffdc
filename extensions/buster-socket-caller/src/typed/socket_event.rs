use crate::SocketCallerInterface;
use buster_socket::SocketError;
use buster_socket::dispatch::{RouteCallback, RouteListener};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use serde_json::Value;

/// A route the backend pushes frames on without a matching request
/// (progress events, list updates).
pub trait SocketEvent {
    const ROUTE: &'static str;

    type Payload: DeserializeOwned + Send;

    fn decode_payload(payload: &Value) -> Result<Self::Payload, SocketError> {
        Self::Payload::deserialize(payload).map_err(|e| SocketError::Payload(e.to_string()))
    }
}

pub trait SocketListenTyped: SocketEvent {
    /// Registers `handler` for every frame on [`SocketEvent::ROUTE`].
    ///
    /// Frames whose payload does not decode are logged and skipped. Returns
    /// the registered callback; pass it to `off` to unsubscribe.
    fn listen<C, F>(client: &C, handler: F) -> RouteCallback
    where
        C: SocketCallerInterface,
        F: Fn(Self::Payload) + Send + Sync + 'static;
}

impl<T> SocketListenTyped for T
where
    T: SocketEvent + 'static,
{
    fn listen<C, F>(client: &C, handler: F) -> RouteCallback
    where
        C: SocketCallerInterface,
        F: Fn(Self::Payload) + Send + Sync + 'static,
    {
        let callback = RouteCallback::new(move |payload: &Value| match T::decode_payload(payload) {
            Ok(decoded) => handler(decoded),
            Err(e) => tracing::warn!(route = T::ROUTE, "Skipping event: {}", e),
        });

        client.on(RouteListener::new(T::ROUTE, callback.clone()));
        callback
    }
}
