//! Live camera frames to a remote viewer, one JPEG per WebSocket message.
//!
//! A [`Streamer`] owns the whole chain: a [`FrameSource`] feeds a capture
//! thread, each frame runs through the [`Pipeline`] (gate, convert, encode,
//! send) on the blocking pool, and a single [`WsTransport`] carries the
//! result. Frames that arrive while one is still in flight are dropped.

pub mod config;
pub mod error;
pub mod gate;
pub mod pipeline;
pub mod streamer;

pub use config::{ReconnectPolicy, StreamConfig};
pub use error::StreamError;
pub use gate::{FrameGate, GateToken};
pub use pipeline::{FrameOutcome, Pipeline, PipelineStats, StatsSnapshot};
pub use streamer::Streamer;

pub use camstream_base::init_stdout_logger;
pub use camstream_camera::{CameraError, FrameSource, TestPattern};
pub use camstream_com::{ComError, ConnectionState, Transport, WsTransport};
pub use camstream_image::{FrameEncoder, ImageError, RawFrame};

#[cfg(feature = "v4l2")]
pub use camstream_camera::V4l2Camera;
