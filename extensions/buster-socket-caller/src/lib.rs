mod caller_interface;
pub use caller_interface::SocketCallerInterface;

mod ready_state;
pub use ready_state::SocketReadyState;

pub mod typed;
pub use typed::{SocketCallTyped, SocketEvent, SocketListenTyped, SocketRoute};
