//! Frame sources for the streaming pipeline.
//!
//! The sensor driver is an external collaborator; this crate only defines
//! the [`FrameSource`] boundary it is consumed through, a synthetic
//! [`TestPattern`] source, and a V4L2 backend behind the `v4l2` feature.

pub mod error;
pub mod pattern;
pub mod pool;
pub mod traits;

#[cfg(feature = "v4l2")]
pub mod v4l2;

pub use error::CameraError;
pub use pattern::TestPattern;
pub use pool::BufferPool;
pub use traits::FrameSource;

#[cfg(feature = "v4l2")]
pub use v4l2::V4l2Camera;
