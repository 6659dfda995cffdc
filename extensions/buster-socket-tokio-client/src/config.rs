use crate::constants::{
    DEFAULT_LARGE_FRAME_THRESHOLD, DEFAULT_MAX_BACKLOG, DEFAULT_RECONNECT_DELAY,
    DEFAULT_REQUEST_TIMEOUT, ENV_WS_BASE_URL, ENV_WS_URL, WS_PATH,
};
use buster_socket::constants::{DEFAULT_FRAME_BUDGET, DEFAULT_PERFORMANCE_WINDOW};
use buster_socket::monitor::ProcessingCapabilities;
use std::time::Duration;

/// Settings for a [`SocketClient`](crate::SocketClient).
#[derive(Debug, Clone, PartialEq)]
pub struct SocketClientConfig {
    /// Full WebSocket URL, e.g. `wss://api.buster.so/api/v1/ws`.
    pub url: String,
    /// Applied to `once` / `emit_and_once` calls that do not pass their own.
    pub request_timeout: Duration,
    pub reconnect_delay: Duration,
    pub performance_window: usize,
    pub frame_budget: Duration,
    pub max_backlog: usize,
    pub large_frame_threshold: usize,
    /// Starting point for adaptive batch processing.
    pub capabilities: ProcessingCapabilities,
}

impl Default for SocketClientConfig {
    fn default() -> Self {
        Self::new("ws://127.0.0.1:3001/api/v1/ws")
    }
}

impl SocketClientConfig {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
            reconnect_delay: DEFAULT_RECONNECT_DELAY,
            performance_window: DEFAULT_PERFORMANCE_WINDOW,
            frame_budget: DEFAULT_FRAME_BUDGET,
            max_backlog: DEFAULT_MAX_BACKLOG,
            large_frame_threshold: DEFAULT_LARGE_FRAME_THRESHOLD,
            capabilities: ProcessingCapabilities::default(),
        }
    }

    /// Builds the endpoint URL from an API base URL.
    ///
    /// `http(s)://` schemes are rewritten to `ws(s)://`.
    pub fn from_base_url(base_url: &str) -> Self {
        let base = base_url.trim_end_matches('/');
        let base = if let Some(rest) = base.strip_prefix("https://") {
            format!("wss://{}", rest)
        } else if let Some(rest) = base.strip_prefix("http://") {
            format!("ws://{}", rest)
        } else {
            base.to_string()
        };

        Self::new(format!("{}{}", base, WS_PATH))
    }

    pub fn from_host_port(host: &str, port: u16) -> Self {
        Self::from_base_url(&format!("ws://{}:{}", host, port))
    }

    /// Reads `BUSTER_WS_URL`, falling back to `BUSTER_WS_BASE_URL`.
    pub fn from_env() -> Option<Self> {
        if let Ok(url) = std::env::var(ENV_WS_URL) {
            return Some(Self::new(url));
        }

        std::env::var(ENV_WS_BASE_URL)
            .ok()
            .map(|base| Self::from_base_url(&base))
    }

    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }

    pub fn with_reconnect_delay(mut self, delay: Duration) -> Self {
        self.reconnect_delay = delay;
        self
    }

    pub fn with_performance_window(mut self, window: usize) -> Self {
        self.performance_window = window;
        self
    }

    pub fn with_frame_budget(mut self, budget: Duration) -> Self {
        self.frame_budget = budget;
        self
    }

    pub fn with_max_backlog(mut self, max_backlog: usize) -> Self {
        self.max_backlog = max_backlog;
        self
    }

    pub fn with_large_frame_threshold(mut self, bytes: usize) -> Self {
        self.large_frame_threshold = bytes;
        self
    }

    pub fn with_capabilities(mut self, capabilities: ProcessingCapabilities) -> Self {
        self.capabilities = capabilities;
        self
    }
}
