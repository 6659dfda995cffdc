mod frame_decoder;
mod frame_error;
mod inbound_frame;
mod outbound_frame;
mod remote_error;

pub use frame_decoder::{DecodeOutcome, decode_frame, decode_frame_bytes};
pub use frame_error::FrameDecodeError;
pub use inbound_frame::{InboundFrame, SentBy};
pub use outbound_frame::OutboundFrame;
pub use remote_error::{RemoteError, RemoteErrorCode};
