use super::pending_request::{PendingRequest, SettleHandle};
use super::route_registry::{Registration, RouteRegistry};
use super::{ErrorCallback, ResponseFuture, RouteCallback, RouteListener};
use crate::SocketError;
use crate::frame::{FrameDecodeError, InboundFrame, OutboundFrame};
use futures::channel::oneshot;
use serde::Serialize;
use serde_json::Value;
use std::collections::HashMap;
use std::panic::{AssertUnwindSafe, catch_unwind};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, Weak};

/// Hands an encoded text frame to the transport.
pub type EmitFn = Arc<dyn Fn(String) -> Result<(), SocketError> + Send + Sync>;

pub(crate) struct DispatcherState {
    registry: RouteRegistry,
    pending: HashMap<u64, PendingRequest>,
    next_pending_id: u64,
}

impl DispatcherState {
    fn new() -> Self {
        Self {
            registry: RouteRegistry::new(),
            pending: HashMap::new(),
            next_pending_id: 1,
        }
    }
}

fn lock(state: &Mutex<DispatcherState>) -> MutexGuard<'_, DispatcherState> {
    state.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Drops a pending request and its one-shot registration, if still present.
pub(crate) fn forget_pending(state: &Weak<Mutex<DispatcherState>>, pending_id: u64) {
    let Some(state) = state.upgrade() else {
        return;
    };

    let mut state = lock(&state);
    if let Some(pending) = state.pending.remove(&pending_id) {
        state
            .registry
            .remove(&pending.response_route, &pending.registration);
    }
}

/// Route-keyed pub/sub with request/response pairing.
///
/// The dispatcher owns its registry; nothing is global, so independent
/// instances (one per connection, or one per test) never see each other's
/// listeners. Outbound frames are handed to the `on_emit` function supplied at
/// construction.
///
/// Listeners are always invoked with the internal lock released, so a
/// callback may freely call back into `on`, `off` or `emit`.
pub struct RouteDispatcher {
    state: Arc<Mutex<DispatcherState>>,
    on_emit: EmitFn,
    fallback_error_handler: Arc<Mutex<Option<ErrorCallback>>>,
}

impl RouteDispatcher {
    pub fn new<E>(on_emit: E) -> Self
    where
        E: Fn(String) -> Result<(), SocketError> + Send + Sync + 'static,
    {
        Self {
            state: Arc::new(Mutex::new(DispatcherState::new())),
            on_emit: Arc::new(on_emit),
            fallback_error_handler: Arc::new(Mutex::new(None)),
        }
    }

    /// Sink for errors no listener handles (remote errors on routes whose
    /// listeners have no `on_error`, panicking callbacks).
    pub fn set_fallback_error_handler(&self, handler: ErrorCallback) {
        *self
            .fallback_error_handler
            .lock()
            .unwrap_or_else(PoisonError::into_inner) = Some(handler);
    }

    /// Registers a persistent listener. Listeners on the same route run in
    /// registration order.
    pub fn on(&self, listener: RouteListener) {
        tracing::trace!(route = %listener.route, "Registering listener");

        lock(&self.state).registry.register(
            listener.route,
            Registration {
                callback: listener.callback,
                on_error: listener.on_error,
                once: false,
            },
        );
    }

    /// Removes exactly `callback` from `route`. Returns `false` if it was not
    /// registered there.
    pub fn off(&self, route: &str, callback: &RouteCallback) -> bool {
        let removed = lock(&self.state).registry.remove(route, callback);
        tracing::trace!(route = %route, removed, "Removing listener");
        removed
    }

    /// Registers a listener that fires for the next frame on its route only.
    pub fn once(&self, listener: RouteListener) -> ResponseFuture {
        self.register_once(listener, None)
    }

    /// Serializes `payload` under `route` and sends it. Fire-and-forget: no
    /// response is awaited.
    pub fn emit<P: Serialize>(&self, route: &str, payload: P) -> Result<(), SocketError> {
        let frame = OutboundFrame::new(route, payload)?;
        self.emit_frame(&frame)
    }

    pub fn emit_frame(&self, frame: &OutboundFrame) -> Result<(), SocketError> {
        let text = frame.encode()?;
        tracing::trace!(route = %frame.route, "Emitting frame");
        (self.on_emit)(text)
    }

    /// Emits `request`, then resolves with the first payload delivered on
    /// `response.route`.
    ///
    /// The listener is registered before the request leaves, so a fast reply
    /// cannot be missed. It is removed together with the first delivery;
    /// further frames on the route do not reach it and the future settles
    /// exactly once. A remote error on the route runs `response.on_error` (or
    /// the fallback handler) and rejects the future.
    pub fn emit_and_once(
        &self,
        request: OutboundFrame,
        response: RouteListener,
    ) -> Result<ResponseFuture, SocketError> {
        let text = request.encode()?;
        let request_route = request.route.clone();

        let future = self.register_once(response, Some(request));

        tracing::trace!(route = %request_route, "Emitting frame");
        // On failure `future` is dropped here, which unregisters it.
        (self.on_emit)(text)?;

        Ok(future)
    }

    fn register_once(&self, listener: RouteListener, emitted: Option<OutboundFrame>) -> ResponseFuture {
        let (tx, rx) = oneshot::channel();
        let settle = SettleHandle::new(tx);
        let weak_state = Arc::downgrade(&self.state);

        let mut state = lock(&self.state);
        let pending_id = state.next_pending_id;
        state.next_pending_id += 1;

        let registration = {
            let settle = settle.clone();
            let weak_state = weak_state.clone();
            let user_callback = listener.callback.clone();

            RouteCallback::new(move |payload: &Value| {
                settle.settle(Ok(payload.clone()));
                forget_pending(&weak_state, pending_id);
                user_callback.call(payload);
            })
        };

        let on_error = {
            let settle = settle.clone();
            let weak_state = weak_state.clone();
            let user_on_error = listener.on_error.clone();
            let fallback = self.fallback_error_handler.clone();

            ErrorCallback::new(move |error: &SocketError| {
                settle.settle(Err(error.clone()));
                forget_pending(&weak_state, pending_id);
                match &user_on_error {
                    Some(cb) => cb.call(error),
                    None => notify(&fallback, error),
                }
            })
        };

        state.registry.register(
            listener.route.clone(),
            Registration {
                callback: registration.clone(),
                on_error: Some(on_error),
                once: true,
            },
        );

        state.pending.insert(
            pending_id,
            PendingRequest {
                response_route: listener.route.clone(),
                registration,
                emitted,
                on_error: listener.on_error,
                settle,
            },
        );

        ResponseFuture::new(rx, weak_state, pending_id, listener.route)
    }

    /// Delivers a decoded frame to every listener on its dispatch key, in
    /// registration order. Returns the number of listeners reached.
    pub fn dispatch(&self, frame: &InboundFrame) -> usize {
        let route = frame.dispatch_key();
        let registrations = lock(&self.state).registry.take_for_dispatch(&route);

        if registrations.is_empty() {
            tracing::trace!(route = %route, "No listeners for frame");
            return 0;
        }

        let remote_error = frame.error.clone().map(SocketError::Remote);

        for registration in &registrations {
            let outcome = catch_unwind(AssertUnwindSafe(|| match &remote_error {
                Some(error) => match &registration.on_error {
                    Some(on_error) => on_error.call(error),
                    None => notify(&self.fallback_error_handler, error),
                },
                None => registration.callback.call(&frame.payload),
            }));

            if outcome.is_err() {
                tracing::error!(route = %route, "Listener panicked while handling frame");
                notify(
                    &self.fallback_error_handler,
                    &SocketError::CallbackPanicked {
                        route: route.clone(),
                    },
                );
            }
        }

        registrations.len()
    }

    /// Reports a frame that could not be decoded.
    ///
    /// The frame cannot be attributed to a route, so no request is settled;
    /// every outstanding request's own `on_error` is informed instead.
    /// Returns the number of callbacks invoked.
    pub fn handle_decode_error(&self, error: &FrameDecodeError) -> usize {
        tracing::warn!("Dropping undecodable frame: {}", error);

        let handlers: Vec<ErrorCallback> = lock(&self.state)
            .pending
            .values()
            .filter_map(|p| p.on_error.clone())
            .collect();

        let error = SocketError::Decode(error.clone());
        for handler in &handlers {
            if catch_unwind(AssertUnwindSafe(|| handler.call(&error))).is_err() {
                tracing::error!("Error callback panicked while handling decode error");
            }
        }

        handlers.len()
    }

    /// Rejects every outstanding request with `error` and removes its
    /// one-shot listener. Persistent listeners are kept.
    pub fn reject_all_pending(&self, error: SocketError) -> usize {
        let drained: Vec<PendingRequest> = {
            let mut state = lock(&self.state);
            let drained: Vec<PendingRequest> = state.pending.drain().map(|(_, p)| p).collect();
            for pending in &drained {
                state
                    .registry
                    .remove(&pending.response_route, &pending.registration);
            }
            drained
        };

        let mut rejected = 0;
        for pending in drained {
            if pending.settle.settle(Err(error.clone())) {
                rejected += 1;
                tracing::debug!(
                    route = %pending.response_route,
                    request = ?pending.emitted.as_ref().map(|f| f.route.as_str()),
                    "Rejected pending request: {}",
                    error
                );
            }
        }

        rejected
    }

    pub fn listener_count(&self, route: &str) -> usize {
        lock(&self.state).registry.listener_count(route)
    }

    pub fn route_count(&self) -> usize {
        lock(&self.state).registry.route_count()
    }

    /// Number of `once` / `emit_and_once` requests not yet settled or cancelled.
    pub fn pending_count(&self) -> usize {
        lock(&self.state).pending.len()
    }
}

fn notify(handler: &Mutex<Option<ErrorCallback>>, error: &SocketError) {
    let handler = handler
        .lock()
        .unwrap_or_else(PoisonError::into_inner)
        .clone();

    match handler {
        Some(handler) => handler.call(error),
        None => tracing::warn!("Unhandled socket error: {}", error),
    }
}
