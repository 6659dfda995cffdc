use crate::SocketReadyState;
use buster_socket::SocketError;
use buster_socket::dispatch::{ResponseFuture, RouteCallback, RouteDispatcher, RouteListener};
use buster_socket::frame::OutboundFrame;
use futures::future::{BoxFuture, Either, select};
use serde::Serialize;
use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;

/// Defines a generic capability for exchanging routed frames.
///
/// Any struct that can provide a [`RouteDispatcher`] and a timer (e.g., a
/// Tokio client, or a mock in tests) implements this trait to gain `on`,
/// `off`, `emit` and timed `once` / `emit_and_once`.
#[async_trait::async_trait]
pub trait SocketCallerInterface: Send + Sync {
    // --- METHODS TO BE IMPLEMENTED BY THE STRUCT (e.g., SocketClient) ---

    /// Provides access to the shared dispatcher.
    fn get_dispatcher(&self) -> Arc<RouteDispatcher>;

    /// Timeout applied to requests that do not specify one. `None` waits forever.
    fn default_request_timeout(&self) -> Option<Duration>;

    /// Completes after `duration` on the implementor's runtime.
    fn sleep(&self, duration: Duration) -> BoxFuture<'static, ()>;

    fn ready_state(&self) -> SocketReadyState;

    // --- METHODS PROVIDED AUTOMATICALLY BY THE TRAIT ---

    fn on(&self, listener: RouteListener) {
        self.get_dispatcher().on(listener)
    }

    fn off(&self, route: &str, callback: &RouteCallback) -> bool {
        self.get_dispatcher().off(route, callback)
    }

    fn emit<P: Serialize>(&self, route: &str, payload: P) -> Result<(), SocketError>
    where
        Self: Sized,
    {
        self.get_dispatcher().emit(route, payload)
    }

    /// Waits for the next frame on `listener.route`.
    async fn once(&self, listener: RouteListener) -> Result<Value, SocketError> {
        let future = self.get_dispatcher().once(listener);
        self.await_response(future, self.default_request_timeout())
            .await
    }

    /// Emits `request` and waits for the first frame on `response.route`,
    /// bounded by the default request timeout.
    async fn emit_and_once(
        &self,
        request: OutboundFrame,
        response: RouteListener,
    ) -> Result<Value, SocketError> {
        self.emit_and_once_with_timeout(request, response, self.default_request_timeout())
            .await
    }

    async fn emit_and_once_with_timeout(
        &self,
        request: OutboundFrame,
        response: RouteListener,
        timeout: Option<Duration>,
    ) -> Result<Value, SocketError> {
        let future = self.get_dispatcher().emit_and_once(request, response)?;
        self.await_response(future, timeout).await
    }

    /// Races a pending response against `timeout`.
    ///
    /// On timeout the response future is dropped, which unregisters its
    /// listener, so a late frame is not delivered.
    async fn await_response(
        &self,
        future: ResponseFuture,
        timeout: Option<Duration>,
    ) -> Result<Value, SocketError> {
        let Some(after) = timeout else {
            return future.await;
        };

        let route = future.response_route().to_string();

        match select(future, self.sleep(after)).await {
            Either::Left((result, _)) => result,
            Either::Right(((), pending)) => {
                drop(pending);
                tracing::warn!(route = %route, "No response after {:?}", after);
                Err(SocketError::Timeout { route, after })
            }
        }
    }
}
