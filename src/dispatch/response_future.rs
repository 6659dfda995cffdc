use super::pending_request::ResponseResult;
use super::route_dispatcher::{DispatcherState, forget_pending};
use crate::SocketError;
use futures::channel::oneshot;
use serde_json::Value;
use std::future::Future;
use std::pin::Pin;
use std::sync::{Mutex, Weak};
use std::task::{Context, Poll};

/// Resolves with the first payload delivered on a one-shot listener's route.
///
/// Dropping the future before it resolves cancels the request: the listener
/// is unregistered and a later matching frame is not delivered to it.
pub struct ResponseFuture {
    rx: oneshot::Receiver<ResponseResult>,
    state: Weak<Mutex<DispatcherState>>,
    pending_id: u64,
    response_route: String,
}

impl ResponseFuture {
    pub(crate) fn new(
        rx: oneshot::Receiver<ResponseResult>,
        state: Weak<Mutex<DispatcherState>>,
        pending_id: u64,
        response_route: String,
    ) -> Self {
        Self {
            rx,
            state,
            pending_id,
            response_route,
        }
    }

    pub fn response_route(&self) -> &str {
        &self.response_route
    }
}

impl Future for ResponseFuture {
    type Output = Result<Value, SocketError>;

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        match Pin::new(&mut self.rx).poll(cx) {
            Poll::Ready(Ok(result)) => Poll::Ready(result),
            // The dispatcher went away without settling.
            Poll::Ready(Err(oneshot::Canceled)) => Poll::Ready(Err(SocketError::Aborted)),
            Poll::Pending => Poll::Pending,
        }
    }
}

impl Drop for ResponseFuture {
    fn drop(&mut self) {
        forget_pending(&self.state, self.pending_id);
    }
}
