mod performance_monitor;
mod processing_capabilities;

pub use performance_monitor::{PerformanceMonitor, PerformanceSnapshot};
pub use processing_capabilities::ProcessingCapabilities;
