mod pending_request;
mod response_future;
mod route_callback;
mod route_dispatcher;
mod route_listener;
mod route_registry;

pub use response_future::ResponseFuture;
pub use route_callback::{ErrorCallback, RouteCallback};
pub use route_dispatcher::{EmitFn, RouteDispatcher};
pub use route_listener::RouteListener;
