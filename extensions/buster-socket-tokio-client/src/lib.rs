pub mod constants;

mod config;
pub use config::SocketClientConfig;

mod decode_worker;
pub use decode_worker::{DecodeWorker, RawFrame};

mod frame_processor;
pub use frame_processor::FrameProcessor;

mod socket_client;
pub use socket_client::SocketClient;

mod token_provider;
pub use token_provider::{StaticTokenProvider, TokenProvider};

pub mod utils;

pub use buster_socket_caller::{SocketCallerInterface, SocketReadyState};
