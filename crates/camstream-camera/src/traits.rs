use crate::CameraError;
use camstream_image::{PixelFormat, RawFrame};

/// Blocking frame source driven by a dedicated capture thread.
///
/// Every returned frame holds one of the source's buffers until it is
/// released or dropped.
pub trait FrameSource: Send {
    /// Frame geometry as `(width, height)`.
    fn size(&self) -> (usize, usize);

    /// Pixel format of delivered frames.
    fn format(&self) -> PixelFormat;

    /// Block until the next frame is available.
    fn capture(&mut self) -> Result<RawFrame, CameraError>;
}
