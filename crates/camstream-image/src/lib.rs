//! Frame data model and the CPU-side stages of the streaming pipeline.
//!
//! A [`RawFrame`] borrowed from the sensor is converted into an NV21
//! [`InterleavedFrame`] by [`convert`], then compressed into a JPEG
//! [`EncodedFrame`] by [`FrameEncoder`]. Both stages are synchronous and
//! never panic on malformed input.

pub mod convert;
pub mod encode;
pub mod error;
pub mod frame;
pub mod pixelformat;

pub use convert::convert;
pub use encode::{DEFAULT_QUALITY, FrameEncoder, encode_nv21, nv21_to_rgb};
pub use error::ImageError;
pub use frame::{EncodedFrame, InterleavedFrame, Plane, RawFrame};
pub use pixelformat::{PixelFormat, fourcc_to_string};
