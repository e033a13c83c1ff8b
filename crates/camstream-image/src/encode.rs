use crate::*;
use image::ImageEncoder;
use image::codecs::jpeg::JpegEncoder;

/// JPEG quality used for streamed frames.
pub const DEFAULT_QUALITY: u8 = 90;

// full-range BT.601 YUV-to-RGB for a single pixel (fixed-point, shift 8)
#[inline]
fn yuv_to_rgb(y: u8, u: u8, v: u8) -> [u8; 3] {
    let y = y as i32;
    let u = u as i32 - 128;
    let v = v as i32 - 128;
    let r = (y + ((359 * v) >> 8)).clamp(0, 255) as u8;
    let g = (y - ((88 * u + 183 * v) >> 8)).clamp(0, 255) as u8;
    let b = (y + ((454 * u) >> 8)).clamp(0, 255) as u8;
    [r, g, b]
}

/// Expands an NV21 buffer to packed RGB, 3 bytes per pixel.
///
/// Returns `None` unless `data` is exactly `width * height * 3 / 2` bytes
/// with even, non-zero dimensions.
pub fn nv21_to_rgb(data: &[u8], width: usize, height: usize) -> Option<Vec<u8>> {
    if width == 0 || height == 0 || width % 2 != 0 || height % 2 != 0 {
        return None;
    }
    if InterleavedFrame::expected_len(width, height) != Some(data.len()) {
        return None;
    }

    let (luma, vu) = data.split_at(width * height);
    let mut rgb = Vec::with_capacity(width * height * 3);

    for row in 0..height {
        let luma_row = &luma[row * width..(row + 1) * width];
        let vu_row = &vu[(row / 2) * width..(row / 2 + 1) * width];
        for (col, &y) in luma_row.iter().enumerate() {
            let pair = (col / 2) * 2;
            rgb.extend_from_slice(&yuv_to_rgb(y, vu_row[pair + 1], vu_row[pair]));
        }
    }

    Some(rgb)
}

/// Compresses an NV21 buffer into a baseline JPEG stream.
///
/// # Errors
///
/// Returns `ImageError::Encode` if `quality` is outside 1..=100, the buffer
/// length does not match the geometry, or the JPEG codec rejects the image.
pub fn encode_nv21(
    data: &[u8],
    width: usize,
    height: usize,
    quality: u8,
) -> Result<EncodedFrame, ImageError> {
    if !(1..=100).contains(&quality) {
        return Err(ImageError::Encode(format!(
            "quality {quality} outside 1..=100"
        )));
    }
    let rgb = nv21_to_rgb(data, width, height).ok_or_else(|| {
        ImageError::Encode(format!(
            "{} bytes is not an NV21 buffer for {width}x{height}",
            data.len()
        ))
    })?;
    let (w, h) = match (u32::try_from(width), u32::try_from(height)) {
        (Ok(w), Ok(h)) => (w, h),
        _ => {
            return Err(ImageError::Encode(format!(
                "{width}x{height} exceeds encoder limits"
            )));
        }
    };

    let mut buffer = Vec::new();
    JpegEncoder::new_with_quality(&mut buffer, quality).write_image(
        &rgb,
        w,
        h,
        image::ExtendedColorType::Rgb8,
    )?;

    Ok(EncodedFrame::new(buffer))
}

/// JPEG encoder at a fixed quality.
#[derive(Debug, Clone, Copy)]
pub struct FrameEncoder {
    quality: u8,
}

impl Default for FrameEncoder {
    fn default() -> Self {
        Self::new(DEFAULT_QUALITY)
    }
}

impl FrameEncoder {
    /// The quality is checked on every `encode` call, not here.
    pub fn new(quality: u8) -> Self {
        Self { quality }
    }

    pub fn quality(&self) -> u8 {
        self.quality
    }

    pub fn encode(&self, frame: &InterleavedFrame) -> Result<EncodedFrame, ImageError> {
        encode_nv21(&frame.data, frame.width, frame.height, self.quality)
    }
}
