use crate::SocketCallerInterface;
use buster_socket::SocketError;
use buster_socket::dispatch::RouteListener;
use buster_socket::frame::OutboundFrame;
use serde::{Deserialize, Serialize};
use serde::de::DeserializeOwned;
use serde_json::Value;

// Optional helper traits coupling a request route, its response route and
// their payload types in one place. The dispatcher itself only sees
// `serde_json::Value`; these traits are for applications that want typed
// request/response pairs.

/// A request route whose reply arrives on a fixed response route.
pub trait SocketRoute {
    const REQUEST_ROUTE: &'static str;
    const RESPONSE_ROUTE: &'static str;

    type Request: Serialize + Send + Sync;
    type Response: DeserializeOwned + Send;

    fn encode_request(request: &Self::Request) -> Result<OutboundFrame, SocketError> {
        OutboundFrame::new(Self::REQUEST_ROUTE, request)
    }

    fn decode_response(payload: &Value) -> Result<Self::Response, SocketError> {
        Self::Response::deserialize(payload).map_err(|e| SocketError::Payload(e.to_string()))
    }
}

/// Lets downstream code write `T::call(&client, request)`.
#[async_trait::async_trait]
pub trait SocketCallTyped: SocketRoute + Sized + Send + Sync {
    async fn call<C: SocketCallerInterface>(
        client: &C,
        request: Self::Request,
    ) -> Result<Self::Response, SocketError>;
}

#[async_trait::async_trait]
impl<T> SocketCallTyped for T
where
    T: SocketRoute + Send + Sync + 'static,
    T::Request: 'static,
    T::Response: 'static,
{
    async fn call<C: SocketCallerInterface>(
        client: &C,
        request: Self::Request,
    ) -> Result<Self::Response, SocketError> {
        let frame = Self::encode_request(&request)?;
        let payload = client
            .emit_and_once(frame, RouteListener::from_fn(Self::RESPONSE_ROUTE, |_| {}))
            .await?;

        Self::decode_response(&payload)
    }
}
