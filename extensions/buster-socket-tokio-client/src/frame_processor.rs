use buster_socket::dispatch::RouteDispatcher;
use buster_socket::frame::DecodeOutcome;
use buster_socket::monitor::{PerformanceMonitor, ProcessingCapabilities};
use std::collections::VecDeque;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Instant;
use tokio::sync::mpsc::UnboundedReceiver;

/// Drains decoded frames into the dispatcher in adaptive batches.
///
/// Each batch handles at most `max_messages_per_frame` frames and stops early
/// once `process_time` is spent. After a batch the capabilities are adjusted
/// from its duration, and throttled further while the monitor reports that
/// the rolling per-frame average is over budget. Frames beyond `max_backlog`
/// are dropped oldest-first.
pub struct FrameProcessor {
    dispatcher: Arc<RouteDispatcher>,
    monitor: Arc<Mutex<PerformanceMonitor>>,
    capabilities: ProcessingCapabilities,
    backlog: VecDeque<DecodeOutcome>,
    max_backlog: usize,
}

impl FrameProcessor {
    pub fn new(
        dispatcher: Arc<RouteDispatcher>,
        monitor: Arc<Mutex<PerformanceMonitor>>,
        capabilities: ProcessingCapabilities,
        max_backlog: usize,
    ) -> Self {
        Self {
            dispatcher,
            monitor,
            capabilities,
            backlog: VecDeque::new(),
            max_backlog: max_backlog.max(1),
        }
    }

    pub fn capabilities(&self) -> ProcessingCapabilities {
        self.capabilities
    }

    pub fn backlog_len(&self) -> usize {
        self.backlog.len()
    }

    /// Queues a decoded frame, evicting the oldest one if the backlog is full.
    pub fn enqueue(&mut self, outcome: DecodeOutcome) {
        if self.backlog.len() >= self.max_backlog {
            self.backlog.pop_front();
            lock(&self.monitor).record_dropped(1);
            tracing::warn!(max_backlog = self.max_backlog, "Backlog full, dropped oldest frame");
        }

        self.backlog.push_back(outcome);
        let depth = self.backlog.len();
        lock(&self.monitor).set_backlog(depth);
    }

    /// Runs one batch. Returns the number of frames taken off the backlog.
    pub fn process_batch(&mut self) -> usize {
        let batch_start = Instant::now();
        let mut handled = 0;

        // The time budget is checked after the first frame so a batch always makes progress.
        while handled < self.capabilities.max_messages_per_frame
            && (handled == 0 || batch_start.elapsed() < self.capabilities.process_time)
        {
            let Some(outcome) = self.backlog.pop_front() else {
                break;
            };
            handled += 1;

            match outcome {
                DecodeOutcome::Parsed { frame, .. } => {
                    let frame_start = Instant::now();
                    self.dispatcher.dispatch(&frame);
                    lock(&self.monitor).record_processing_time(frame_start.elapsed());
                }
                DecodeOutcome::Error { error } => {
                    self.dispatcher.handle_decode_error(&error);
                    lock(&self.monitor).record_dropped(1);
                }
            }
        }

        self.capabilities.adjust(batch_start.elapsed());

        let depth = self.backlog.len();
        let mut monitor = lock(&self.monitor);
        monitor.set_backlog(depth);
        if monitor.should_adjust_capabilities() {
            self.capabilities.throttle();
            tracing::debug!(
                average = ?monitor.rolling_average(),
                max_messages_per_frame = self.capabilities.max_messages_per_frame,
                "Frame processing over budget, throttling"
            );
        }

        handled
    }

    /// Processes frames until the decode worker's output channel closes.
    pub async fn run(mut self, mut decoded: UnboundedReceiver<DecodeOutcome>) {
        loop {
            if self.backlog.is_empty() {
                match decoded.recv().await {
                    Some(outcome) => self.enqueue(outcome),
                    None => break,
                }
            }

            while let Ok(outcome) = decoded.try_recv() {
                self.enqueue(outcome);
            }

            self.process_batch();

            // Give the rest of the runtime a turn between batches.
            tokio::task::yield_now().await;
        }

        tracing::debug!("Frame processor stopped");
    }
}

fn lock(monitor: &Mutex<PerformanceMonitor>) -> MutexGuard<'_, PerformanceMonitor> {
    monitor.lock().unwrap_or_else(PoisonError::into_inner)
}
