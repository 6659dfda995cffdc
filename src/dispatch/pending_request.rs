use super::{ErrorCallback, RouteCallback};
use crate::SocketError;
use crate::frame::OutboundFrame;
use futures::channel::oneshot;
use serde_json::Value;
use std::sync::{Arc, Mutex, PoisonError};

pub(crate) type ResponseResult = Result<Value, SocketError>;

/// One-time completion handle shared by every path that can finish a
/// request (response, error frame, disconnect).
#[derive(Clone)]
pub(crate) struct SettleHandle(Arc<Mutex<Option<oneshot::Sender<ResponseResult>>>>);

impl SettleHandle {
    pub fn new(tx: oneshot::Sender<ResponseResult>) -> Self {
        Self(Arc::new(Mutex::new(Some(tx))))
    }

    /// Returns `false` if the request was already settled.
    pub fn settle(&self, result: ResponseResult) -> bool {
        let tx = self.0.lock().unwrap_or_else(PoisonError::into_inner).take();

        match tx {
            Some(tx) => {
                // The receiver may already be gone (cancelled request).
                let _ = tx.send(result);
                true
            }
            None => false,
        }
    }
}

pub(crate) struct PendingRequest {
    pub response_route: String,
    /// Identity of the one-shot registration, used to unregister it.
    pub registration: RouteCallback,
    pub emitted: Option<OutboundFrame>,
    /// The caller's own error callback, if any.
    pub on_error: Option<ErrorCallback>,
    pub settle: SettleHandle,
}
