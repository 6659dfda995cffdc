mod socket_event;
mod socket_route;

pub use socket_event::{SocketEvent, SocketListenTyped};
pub use socket_route::{SocketCallTyped, SocketRoute};
