pub mod constants;
pub mod dispatch;
pub mod error;
pub mod frame;
pub mod monitor;

pub use error::SocketError;
