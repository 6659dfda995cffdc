use crate::constants::{
    DEFAULT_MAX_MESSAGES_PER_FRAME, DEFAULT_PROCESS_TIME, MAX_MESSAGES_PER_FRAME,
    MESSAGES_PER_FRAME_STEP_DOWN, MESSAGES_PER_FRAME_STEP_UP, MIN_MESSAGES_PER_FRAME,
};
use std::time::Duration;

/// Budget for one batch of inbound frame processing.
///
/// The batch size adapts to how long batches actually take: it grows while
/// batches finish in under 80% of `process_time` and shrinks once they use
/// more than 90% of it, always staying within
/// [`MIN_MESSAGES_PER_FRAME`]..=[`MAX_MESSAGES_PER_FRAME`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProcessingCapabilities {
    pub max_messages_per_frame: usize,
    pub process_time: Duration,
}

impl Default for ProcessingCapabilities {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_MESSAGES_PER_FRAME, DEFAULT_PROCESS_TIME)
    }
}

impl ProcessingCapabilities {
    pub fn new(max_messages_per_frame: usize, process_time: Duration) -> Self {
        Self {
            max_messages_per_frame: max_messages_per_frame
                .clamp(MIN_MESSAGES_PER_FRAME, MAX_MESSAGES_PER_FRAME),
            process_time,
        }
    }

    /// Feeds back the wall-clock time the last batch took.
    pub fn adjust(&mut self, batch_elapsed: Duration) {
        if batch_elapsed < self.process_time.mul_f64(0.8) {
            self.max_messages_per_frame = (self.max_messages_per_frame
                + MESSAGES_PER_FRAME_STEP_UP)
                .min(MAX_MESSAGES_PER_FRAME);
        } else if batch_elapsed > self.process_time.mul_f64(0.9) {
            self.throttle();
        }
    }

    /// Shrinks the batch size by one step.
    pub fn throttle(&mut self) {
        self.max_messages_per_frame = self
            .max_messages_per_frame
            .saturating_sub(MESSAGES_PER_FRAME_STEP_DOWN)
            .max(MIN_MESSAGES_PER_FRAME);
    }
}
