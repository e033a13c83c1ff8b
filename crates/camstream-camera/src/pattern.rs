use crate::{BufferPool, CameraError, FrameSource};
use camstream_image::{PixelFormat, Plane, RawFrame};
use std::time::{Duration, Instant};

// extra bytes at the end of every row, as hardware alignment would add
const ROW_PADDING: usize = 32;

// horizontal scroll per frame, in pixels
const SCROLL_STEP: usize = 4;

// (Y, U, V) of the classic eight color bars, full range
const BARS: [(u8, u8, u8); 8] = [
    (255, 128, 128), // white
    (226, 0, 149),   // yellow
    (179, 170, 0),   // cyan
    (150, 44, 21),   // green
    (105, 212, 235), // magenta
    (76, 85, 255),   // red
    (29, 255, 107),  // blue
    (0, 128, 128),   // black
];

/// Synthetic sensor producing scrolling color bars.
///
/// Frames use the semi-planar layout NV12 sensors deliver: a padded luma
/// plane and one padded U/V buffer exposed as two chroma planes with pixel
/// stride 2. Capture is paced to the configured frame rate and draws from a
/// fixed [`BufferPool`].
#[derive(Debug)]
pub struct TestPattern {
    width: usize,
    height: usize,
    row_stride: usize,
    interval: Option<Duration>,
    next_deadline: Option<Instant>,
    frame_index: usize,
    pool: BufferPool,
}

impl TestPattern {
    /// Create a pattern source.
    ///
    /// A `fps` of 0 disables pacing.
    ///
    /// # Errors
    ///
    /// Returns `CameraError::Device` if the geometry is empty or odd, or
    /// `buffer_count` is 0.
    pub fn new(width: usize, height: usize, fps: u32, buffer_count: usize) -> Result<Self, CameraError> {
        if width == 0 || height == 0 || width % 2 != 0 || height % 2 != 0 {
            return Err(CameraError::Device(format!(
                "test pattern needs an even, non-empty size, got {width}x{height}"
            )));
        }
        if buffer_count == 0 {
            return Err(CameraError::Device("buffer count must be at least 1".to_string()));
        }

        log::debug!("test pattern {width}x{height} at {fps} fps, {buffer_count} buffers");
        Ok(Self {
            width,
            height,
            row_stride: width + ROW_PADDING,
            interval: (fps > 0).then(|| Duration::from_secs(1) / fps),
            next_deadline: None,
            frame_index: 0,
            pool: BufferPool::new(buffer_count),
        })
    }

    pub fn pool(&self) -> &BufferPool {
        &self.pool
    }

    pub fn row_stride(&self) -> usize {
        self.row_stride
    }

    fn pace(&mut self) {
        let Some(interval) = self.interval else {
            return;
        };
        let now = Instant::now();
        if let Some(deadline) = self.next_deadline {
            if deadline > now {
                std::thread::sleep(deadline - now);
            }
        }
        // a late frame does not make the following ones burst
        let base = self.next_deadline.map_or(now, |deadline| deadline.max(now));
        self.next_deadline = Some(base + interval);
    }

    fn bar_at(&self, col: usize) -> (u8, u8, u8) {
        let shifted = (col + self.frame_index * SCROLL_STEP) % self.width;
        BARS[shifted * BARS.len() / self.width]
    }

    fn render(&self) -> RawFrame {
        let (width, height, stride) = (self.width, self.height, self.row_stride);

        let mut luma = vec![0u8; stride * height];
        for row in luma.chunks_exact_mut(stride) {
            for (col, sample) in row[..width].iter_mut().enumerate() {
                *sample = self.bar_at(col).0;
            }
        }

        let mut uv = vec![0u8; stride * (height / 2)];
        for row in uv.chunks_exact_mut(stride) {
            for (pair, sample) in row[..width].chunks_exact_mut(2).enumerate() {
                let (_, u, v) = self.bar_at(pair * 2);
                sample[0] = u;
                sample[1] = v;
            }
        }

        let v_view = uv[1..].to_vec();
        RawFrame::new(
            width,
            height,
            PixelFormat::Yuv420,
            vec![
                Plane::new(luma, stride, 1),
                Plane::new(uv, stride, 2),
                Plane::new(v_view, stride, 2),
            ],
        )
    }
}

impl FrameSource for TestPattern {
    fn size(&self) -> (usize, usize) {
        (self.width, self.height)
    }

    fn format(&self) -> PixelFormat {
        PixelFormat::Yuv420
    }

    fn capture(&mut self) -> Result<RawFrame, CameraError> {
        self.pace();
        let lease = self.pool.acquire().inspect_err(|e| {
            log::warn!("test pattern stalled: {e}");
        })?;
        let frame = self.render();
        self.frame_index = self.frame_index.wrapping_add(1);
        Ok(lease.attach(frame))
    }
}
