use std::time::Duration;

/// Path of the real-time endpoint below the API base URL.
pub const WS_PATH: &str = "/api/v1/ws";

/// Query parameter carrying the access token on the upgrade request.
pub const AUTHENTICATION_QUERY_PARAM: &str = "authentication";

/// Environment variable holding the full WebSocket URL.
pub const ENV_WS_URL: &str = "BUSTER_WS_URL";

/// Environment variable holding the API base URL; [`WS_PATH`] is appended.
pub const ENV_WS_BASE_URL: &str = "BUSTER_WS_BASE_URL";

pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Minimum spacing between two connection attempts.
pub const DEFAULT_RECONNECT_DELAY: Duration = Duration::from_millis(3_000);

/// Decoded frames waiting for dispatch beyond this are dropped, oldest first.
pub const DEFAULT_MAX_BACKLOG: usize = 10_000;

/// Frames larger than this (in bytes) are decoded on the blocking pool.
pub const DEFAULT_LARGE_FRAME_THRESHOLD: usize = 256 * 1024;
