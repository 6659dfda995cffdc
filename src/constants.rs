use std::time::Duration;

/// Separator placed between a backend route and its event name when forming
/// the key an inbound frame is dispatched under (e.g. `/threads/get:fetchingData`).
pub const ROUTE_EVENT_SEPARATOR: char = ':';

/// Number of per-frame processing samples kept by the performance monitor.
pub const DEFAULT_PERFORMANCE_WINDOW: usize = 100;

/// Processing budget of a single 60fps frame (16.67 ms).
pub const DEFAULT_FRAME_BUDGET: Duration = Duration::from_micros(16_670);

/// Initial number of inbound frames handled per processing batch.
pub const DEFAULT_MAX_MESSAGES_PER_FRAME: usize = 10;

/// Lower bound for the adaptive batch size.
pub const MIN_MESSAGES_PER_FRAME: usize = 5;

/// Upper bound for the adaptive batch size.
pub const MAX_MESSAGES_PER_FRAME: usize = 50;

/// Batch size increase applied after a batch that finished well within budget.
pub const MESSAGES_PER_FRAME_STEP_UP: usize = 5;

/// Batch size decrease applied after a batch that ran close to (or over) budget.
pub const MESSAGES_PER_FRAME_STEP_DOWN: usize = 2;

/// Default wall-clock budget for one processing batch.
pub const DEFAULT_PROCESS_TIME: Duration = Duration::from_millis(8);
