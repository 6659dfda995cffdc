use buster_socket::frame::{DecodeOutcome, FrameDecodeError, decode_frame, decode_frame_bytes};
use bytes::Bytes;
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender, unbounded_channel};
use tokio::task::JoinHandle;

/// A frame as it came off the socket, not yet parsed.
#[derive(Debug, Clone, PartialEq)]
pub enum RawFrame {
    Text(String),
    Binary(Bytes),
}

impl RawFrame {
    pub fn len(&self) -> usize {
        match self {
            RawFrame::Text(text) => text.len(),
            RawFrame::Binary(bytes) => bytes.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn decode(&self) -> DecodeOutcome {
        match self {
            RawFrame::Text(text) => decode_frame(text),
            RawFrame::Binary(bytes) => decode_frame_bytes(bytes),
        }
    }
}

/// Parses raw frames off the socket path.
///
/// The worker is its own task: raw frames go in over one channel, tagged
/// [`DecodeOutcome`]s come out over another, in the same order. Frames above
/// `large_frame_threshold` bytes are parsed on the blocking pool so a huge
/// payload never stalls the runtime's worker threads.
pub struct DecodeWorker {
    input: UnboundedSender<RawFrame>,
    task: JoinHandle<()>,
}

impl DecodeWorker {
    pub fn spawn(large_frame_threshold: usize) -> (Self, UnboundedReceiver<DecodeOutcome>) {
        let (input, input_rx) = unbounded_channel::<RawFrame>();
        let (output_tx, output_rx) = unbounded_channel::<DecodeOutcome>();

        let task = tokio::spawn(Self::run(input_rx, output_tx, large_frame_threshold));

        (Self { input, task }, output_rx)
    }

    /// Handle for feeding raw frames to the worker.
    pub fn input(&self) -> UnboundedSender<RawFrame> {
        self.input.clone()
    }

    async fn run(
        mut input: mpsc::UnboundedReceiver<RawFrame>,
        output: mpsc::UnboundedSender<DecodeOutcome>,
        large_frame_threshold: usize,
    ) {
        while let Some(raw) = input.recv().await {
            let outcome = if raw.len() > large_frame_threshold {
                tracing::trace!(bytes = raw.len(), "Decoding large frame on blocking pool");
                tokio::task::spawn_blocking(move || raw.decode())
                    .await
                    .unwrap_or_else(|e| DecodeOutcome::Error {
                        error: FrameDecodeError::MalformedJson(format!("decode task failed: {e}")),
                    })
            } else {
                raw.decode()
            };

            if output.send(outcome).is_err() {
                break;
            }
        }

        tracing::debug!("Decode worker stopped");
    }
}

impl Drop for DecodeWorker {
    fn drop(&mut self) {
        self.task.abort();
    }
}
