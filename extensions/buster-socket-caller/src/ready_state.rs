use std::fmt;

/// Connection state of a socket transport.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SocketReadyState {
    Connecting,
    Open,
    Closing,
    Closed,
}

impl SocketReadyState {
    pub fn is_open(self) -> bool {
        self == SocketReadyState::Open
    }
}

impl fmt::Display for SocketReadyState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            SocketReadyState::Connecting => "connecting",
            SocketReadyState::Open => "open",
            SocketReadyState::Closing => "closing",
            SocketReadyState::Closed => "closed",
        };
        f.write_str(label)
    }
}
