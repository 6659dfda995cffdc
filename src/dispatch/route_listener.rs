use super::{ErrorCallback, RouteCallback};
use crate::SocketError;
use serde_json::Value;

/// A `(route, callback, on_error)` registration request.
#[derive(Clone, Debug)]
pub struct RouteListener {
    pub route: String,
    pub callback: RouteCallback,
    pub on_error: Option<ErrorCallback>,
}

impl RouteListener {
    pub fn new(route: impl Into<String>, callback: RouteCallback) -> Self {
        Self {
            route: route.into(),
            callback,
            on_error: None,
        }
    }

    /// Shorthand for wrapping a closure in a fresh [`RouteCallback`].
    ///
    /// The callback can still be removed later through `listener.callback`.
    pub fn from_fn<F>(route: impl Into<String>, f: F) -> Self
    where
        F: Fn(&Value) + Send + Sync + 'static,
    {
        Self::new(route, RouteCallback::new(f))
    }

    pub fn with_on_error(mut self, on_error: ErrorCallback) -> Self {
        self.on_error = Some(on_error);
        self
    }

    pub fn with_on_error_fn<F>(self, f: F) -> Self
    where
        F: Fn(&SocketError) + Send + Sync + 'static,
    {
        self.with_on_error(ErrorCallback::new(f))
    }
}
