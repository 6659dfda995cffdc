use crate::constants::{DEFAULT_FRAME_BUDGET, DEFAULT_PERFORMANCE_WINDOW};
use std::collections::VecDeque;
use std::time::Duration;

/// Point-in-time copy of the monitor's counters.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PerformanceSnapshot {
    pub rolling_average: Duration,
    pub sample_count: usize,
    pub backlog: usize,
    pub dropped: u64,
    pub processed: u64,
}

/// Tracks how long inbound frames take to process.
///
/// Keeps the most recent `capacity` per-frame durations (oldest evicted
/// first), the current backlog depth and a running count of dropped frames.
/// [`should_adjust_capabilities`](Self::should_adjust_capabilities) is an
/// advisory load signal; acting on it is up to the caller.
#[derive(Debug, Clone)]
pub struct PerformanceMonitor {
    samples: VecDeque<Duration>,
    capacity: usize,
    frame_budget: Duration,
    backlog: usize,
    dropped: u64,
    processed: u64,
}

impl Default for PerformanceMonitor {
    fn default() -> Self {
        Self::new(DEFAULT_PERFORMANCE_WINDOW, DEFAULT_FRAME_BUDGET)
    }
}

impl PerformanceMonitor {
    /// A zero `capacity` is treated as one.
    pub fn new(capacity: usize, frame_budget: Duration) -> Self {
        let capacity = capacity.max(1);
        Self {
            samples: VecDeque::with_capacity(capacity),
            capacity,
            frame_budget,
            backlog: 0,
            dropped: 0,
            processed: 0,
        }
    }

    pub fn record_processing_time(&mut self, elapsed: Duration) {
        if self.samples.len() == self.capacity {
            self.samples.pop_front();
        }
        self.samples.push_back(elapsed);
        self.processed += 1;
    }

    /// Mean of the samples currently in the window, or zero when empty.
    pub fn rolling_average(&self) -> Duration {
        if self.samples.is_empty() {
            return Duration::ZERO;
        }

        let total: Duration = self.samples.iter().sum();
        total / self.samples.len() as u32
    }

    pub fn set_backlog(&mut self, depth: usize) {
        self.backlog = depth;
    }

    pub fn backlog(&self) -> usize {
        self.backlog
    }

    pub fn record_dropped(&mut self, count: u64) {
        self.dropped += count;
    }

    pub fn dropped(&self) -> u64 {
        self.dropped
    }

    pub fn sample_count(&self) -> usize {
        self.samples.len()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn frame_budget(&self) -> Duration {
        self.frame_budget
    }

    /// True while the rolling average exceeds the frame budget.
    pub fn should_adjust_capabilities(&self) -> bool {
        self.rolling_average() > self.frame_budget
    }

    pub fn snapshot(&self) -> PerformanceSnapshot {
        PerformanceSnapshot {
            rolling_average: self.rolling_average(),
            sample_count: self.samples.len(),
            backlog: self.backlog,
            dropped: self.dropped,
            processed: self.processed,
        }
    }
}
