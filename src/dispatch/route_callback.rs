use crate::SocketError;
use serde_json::Value;
use std::fmt;
use std::sync::Arc;

/// Listener invoked with the decoded payload of every frame on its route.
///
/// Identity is the shared pointer: clones of a `RouteCallback` are the same
/// listener, while two callbacks built from identical closures are not. Keep a
/// clone around to pass to [`RouteDispatcher::off`](super::RouteDispatcher::off).
#[derive(Clone)]
pub struct RouteCallback(Arc<dyn Fn(&Value) + Send + Sync>);

impl RouteCallback {
    pub fn new<F>(f: F) -> Self
    where
        F: Fn(&Value) + Send + Sync + 'static,
    {
        Self(Arc::new(f))
    }

    pub fn call(&self, payload: &Value) {
        (self.0)(payload)
    }

    pub fn same_as(&self, other: &RouteCallback) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }
}

impl PartialEq for RouteCallback {
    fn eq(&self, other: &Self) -> bool {
        self.same_as(other)
    }
}

impl Eq for RouteCallback {}

impl fmt::Debug for RouteCallback {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "RouteCallback({:p})", Arc::as_ptr(&self.0))
    }
}

/// Listener invoked when a frame on its route carries an error, or when a
/// request it belongs to fails.
#[derive(Clone)]
pub struct ErrorCallback(Arc<dyn Fn(&SocketError) + Send + Sync>);

impl ErrorCallback {
    pub fn new<F>(f: F) -> Self
    where
        F: Fn(&SocketError) + Send + Sync + 'static,
    {
        Self(Arc::new(f))
    }

    pub fn call(&self, error: &SocketError) {
        (self.0)(error)
    }
}

impl fmt::Debug for ErrorCallback {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ErrorCallback({:p})", Arc::as_ptr(&self.0))
    }
}
