use crate::PixelFormat;

/// One plane of a raw sensor frame.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Plane {
    pub data: Vec<u8>,
    pub row_stride: usize,
    pub pixel_stride: usize,
}

impl Plane {
    pub fn new(data: Vec<u8>, row_stride: usize, pixel_stride: usize) -> Self {
        Self {
            data,
            row_stride,
            pixel_stride,
        }
    }

    /// Minimum buffer length needed to address `rows` x `cols` samples,
    /// or `None` if the strides overflow.
    pub fn required_len(&self, rows: usize, cols: usize) -> Option<usize> {
        if rows == 0 || cols == 0 {
            return Some(0);
        }
        let last_row = (rows - 1).checked_mul(self.row_stride)?;
        let last_col = (cols - 1).checked_mul(self.pixel_stride)?;
        last_row.checked_add(last_col)?.checked_add(1)
    }
}

type ReleaseHook = Box<dyn FnOnce() + Send>;

/// A frame borrowed from the sensor.
///
/// The sensor owns a small pool of buffers, so every frame carries a release
/// hook that hands its buffer back. The hook runs exactly once, either from
/// [`RawFrame::release`] or when the frame is dropped.
pub struct RawFrame {
    width: usize,
    height: usize,
    format: PixelFormat,
    planes: Vec<Plane>,
    release: Option<ReleaseHook>,
}

impl RawFrame {
    pub fn new(width: usize, height: usize, format: PixelFormat, planes: Vec<Plane>) -> Self {
        Self {
            width,
            height,
            format,
            planes,
            release: None,
        }
    }

    /// Attach the hook that returns this frame's buffer to its owner.
    pub fn with_release(mut self, hook: impl FnOnce() + Send + 'static) -> Self {
        self.release = Some(Box::new(hook));
        self
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn format(&self) -> PixelFormat {
        self.format
    }

    pub fn planes(&self) -> &[Plane] {
        &self.planes
    }

    pub fn plane(&self, index: usize) -> Option<&Plane> {
        self.planes.get(index)
    }

    /// Give the buffer back to the sensor now.
    pub fn release(mut self) {
        self.run_release();
    }

    fn run_release(&mut self) {
        if let Some(hook) = self.release.take() {
            hook();
        }
    }
}

impl Drop for RawFrame {
    fn drop(&mut self) {
        self.run_release();
    }
}

impl std::fmt::Debug for RawFrame {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RawFrame")
            .field("width", &self.width)
            .field("height", &self.height)
            .field("format", &self.format)
            .field("planes", &self.planes.len())
            .field("release", &self.release.is_some())
            .finish()
    }
}

/// Luma followed by interleaved V/U pairs (NV21).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InterleavedFrame {
    pub width: usize,
    pub height: usize,
    pub data: Vec<u8>,
}

impl InterleavedFrame {
    /// Byte length of an NV21 buffer for the given geometry, or `None` if it
    /// does not fit in `usize`.
    pub fn expected_len(width: usize, height: usize) -> Option<usize> {
        let luma = width.checked_mul(height)?;
        luma.checked_add(luma / 2)
    }

    pub fn luma(&self) -> &[u8] {
        &self.data[..self.luma_len()]
    }

    pub fn chroma(&self) -> &[u8] {
        &self.data[self.luma_len()..]
    }

    fn luma_len(&self) -> usize {
        self.width.saturating_mul(self.height).min(self.data.len())
    }
}

/// A compressed image, sent once and then discarded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncodedFrame {
    data: Vec<u8>,
}

impl EncodedFrame {
    pub fn new(data: Vec<u8>) -> Self {
        Self { data }
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.data
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.data
    }
}
