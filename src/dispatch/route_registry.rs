use super::{ErrorCallback, RouteCallback};
use std::collections::HashMap;

#[derive(Clone)]
pub(crate) struct Registration {
    pub callback: RouteCallback,
    pub on_error: Option<ErrorCallback>,
    /// Removed as part of the first dispatch that reaches it.
    pub once: bool,
}

/// Route -> ordered listeners.
#[derive(Default)]
pub(crate) struct RouteRegistry {
    routes: HashMap<String, Vec<Registration>>,
}

impl RouteRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, route: String, registration: Registration) {
        self.routes.entry(route).or_default().push(registration);
    }

    /// Removes every registration of `callback` on `route`.
    pub fn remove(&mut self, route: &str, callback: &RouteCallback) -> bool {
        let Some(registrations) = self.routes.get_mut(route) else {
            return false;
        };

        let before = registrations.len();
        registrations.retain(|r| !r.callback.same_as(callback));
        let removed = registrations.len() != before;

        if registrations.is_empty() {
            self.routes.remove(route);
        }

        removed
    }

    /// Snapshot of the listeners a frame on `route` must reach, in
    /// registration order. One-shot registrations are removed in the same
    /// step, so a later frame can never reach them.
    pub fn take_for_dispatch(&mut self, route: &str) -> Vec<Registration> {
        let Some(registrations) = self.routes.get_mut(route) else {
            return Vec::new();
        };

        let snapshot = registrations.clone();
        registrations.retain(|r| !r.once);

        if registrations.is_empty() {
            self.routes.remove(route);
        }

        snapshot
    }

    pub fn listener_count(&self, route: &str) -> usize {
        self.routes.get(route).map_or(0, Vec::len)
    }

    pub fn route_count(&self) -> usize {
        self.routes.len()
    }
}
