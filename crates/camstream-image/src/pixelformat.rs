use std::fmt;

// fourcc codes
pub(crate) const FOURCC_NV12: u32 = u32::from_le_bytes(*b"NV12");
pub(crate) const FOURCC_NV21: u32 = u32::from_le_bytes(*b"NV21");
pub(crate) const FOURCC_YU12: u32 = u32::from_le_bytes(*b"YU12");
pub(crate) const FOURCC_YV12: u32 = u32::from_le_bytes(*b"YV12");
pub(crate) const FOURCC_YUYV: u32 = u32::from_le_bytes(*b"YUYV");
pub(crate) const FOURCC_RGB3: u32 = u32::from_le_bytes(*b"RGB3");
pub(crate) const FOURCC_MJPG: u32 = u32::from_le_bytes(*b"MJPG");

/// Convert a fourcc code to a readable 4-character string.
pub fn fourcc_to_string(fourcc: u32) -> String {
    String::from_utf8_lossy(&fourcc.to_le_bytes()).into_owned()
}

/// Pixel format tag carried by every raw frame.
///
/// `Yuv420` is the only format the converter accepts: 4:2:0 subsampled
/// luma plus two chroma planes, each described by its own buffer, row stride
/// and pixel stride. NV12, NV21, YU12 and YV12 buffers can all be expressed
/// this way by choosing the plane offsets and strides.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PixelFormat {
    Yuv420,
    Yuyv,
    Rgb8,
    Jpeg,
    Other(u32),
}

impl PixelFormat {
    pub fn from_fourcc(fourcc: u32) -> Self {
        match fourcc {
            FOURCC_NV12 | FOURCC_NV21 | FOURCC_YU12 | FOURCC_YV12 => PixelFormat::Yuv420,
            FOURCC_YUYV => PixelFormat::Yuyv,
            FOURCC_RGB3 => PixelFormat::Rgb8,
            FOURCC_MJPG => PixelFormat::Jpeg,
            other => PixelFormat::Other(other),
        }
    }

    /// Number of plane descriptors a frame of this format carries.
    pub fn plane_count(&self) -> usize {
        match self {
            PixelFormat::Yuv420 => 3,
            _ => 1,
        }
    }

    pub fn is_supported(&self) -> bool {
        matches!(self, PixelFormat::Yuv420)
    }
}

impl fmt::Display for PixelFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PixelFormat::Yuv420 => write!(f, "YUV 4:2:0"),
            PixelFormat::Yuyv => write!(f, "YUYV"),
            PixelFormat::Rgb8 => write!(f, "RGB8"),
            PixelFormat::Jpeg => write!(f, "MJPG"),
            PixelFormat::Other(fourcc) => write!(f, "fourcc {}", fourcc_to_string(*fourcc)),
        }
    }
}
