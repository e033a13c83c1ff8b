use std::fmt;

/// Lifecycle of the transport's connection.
///
/// `Closed -> Connecting -> Open -> Closing -> Closed`, with `Error`
/// reachable from any active state. `Error` ends that connection attempt;
/// only an explicit `connect` starts a new one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConnectionState {
    Connecting,
    Open,
    Closing,
    Closed,
    Error(String),
}

impl ConnectionState {
    pub fn is_open(&self) -> bool {
        matches!(self, ConnectionState::Open)
    }

    /// A new `connect` is allowed from here.
    pub fn is_idle(&self) -> bool {
        matches!(self, ConnectionState::Closed | ConnectionState::Error(_))
    }
}

impl fmt::Display for ConnectionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConnectionState::Connecting => write!(f, "connecting"),
            ConnectionState::Open => write!(f, "open"),
            ConnectionState::Closing => write!(f, "closing"),
            ConnectionState::Closed => write!(f, "closed"),
            ConnectionState::Error(reason) => write!(f, "error: {reason}"),
        }
    }
}
