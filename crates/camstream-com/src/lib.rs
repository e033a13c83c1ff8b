//! WebSocket delivery of encoded frames.
//!
//! [`WsTransport`] is the producer side: one persistent client connection
//! with an observable [`ConnectionState`] and a non-blocking, best-effort
//! `send`. [`FrameReceiver`] is the viewer side used by the `viewer` binary
//! and by tests.

pub mod error;
pub mod receiver;
pub mod state;
pub mod transport;

pub use error::ComError;
pub use receiver::FrameReceiver;
pub use state::ConnectionState;
pub use transport::{DEFAULT_QUEUE_CAPACITY, Transport, WsTransport};
