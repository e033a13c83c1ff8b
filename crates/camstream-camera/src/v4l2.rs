use crate::{BufferPool, CameraError, FrameSource};
use camstream_image::{PixelFormat, Plane, RawFrame};
use std::thread::{self, JoinHandle};
use tokio::sync::mpsc;
use v4l::buffer::Type;
use v4l::io::mmap::Stream as MmapStream;
use v4l::io::traits::CaptureStream;
use v4l::video::Capture;
use v4l::{Device, Format, FourCC};

type FrameResult = Result<RawFrame, CameraError>;

// negotiated geometry, shared with the capture thread
#[derive(Debug, Clone, Copy)]
struct Layout {
    width: usize,
    height: usize,
    row_stride: usize,
    fourcc: [u8; 4],
    format: PixelFormat,
}

/// V4L2 camera delivering NV12 frames.
///
/// A background thread dequeues driver buffers, copies them out and hands
/// them over through a bounded channel. When the consumer falls behind the
/// newest frames are dropped instead of queued. Outstanding frames are
/// tracked by a [`BufferPool`] the size of the driver's buffer ring.
pub struct V4l2Camera {
    layout: Layout,
    pool: BufferPool,
    receiver: Option<mpsc::Receiver<FrameResult>>,
    thread_handle: Option<JoinHandle<()>>,
}

impl std::fmt::Debug for V4l2Camera {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("V4l2Camera")
            .field("layout", &self.layout)
            .field("pool", &self.pool)
            .field("receiver", &self.receiver.is_some())
            .field("thread_handle", &self.thread_handle.is_some())
            .finish()
    }
}

impl V4l2Camera {
    /// Open the device at `path`, request NV12 at the given size and rate, and
    /// start capturing.
    ///
    /// The device may pick a different size or format; the negotiated values
    /// are what frames carry. Frames in anything other than a 4:2:0 layout are
    /// still delivered, tagged with their real format, and rejected
    /// downstream.
    ///
    /// # Errors
    ///
    /// Returns `CameraError::Device` if the device cannot be opened or
    /// configured.
    pub fn open(
        path: &str,
        width: u32,
        height: u32,
        fps: u32,
        buffer_count: u32,
    ) -> Result<Self, CameraError> {
        let device = Device::with_path(path)?;

        let requested = Format::new(width, height, FourCC::new(b"NV12"));
        let actual = Capture::set_format(&device, &requested)?;
        if actual.fourcc != FourCC::new(b"NV12") {
            log::warn!("{path} refused NV12, negotiated {} instead", actual.fourcc);
        }

        let params = v4l::video::capture::Parameters::with_fps(fps);
        Capture::set_params(&device, &params)?;

        log::info!(
            "{path} opened: {}x{} {} (row stride {})",
            actual.width,
            actual.height,
            actual.fourcc,
            actual.stride
        );

        let fourcc = actual.fourcc.repr;
        let layout = Layout {
            width: actual.width as usize,
            height: actual.height as usize,
            row_stride: (actual.stride as usize).max(actual.width as usize),
            fourcc,
            format: PixelFormat::from_fourcc(u32::from_le_bytes(fourcc)),
        };

        let buffer_count = buffer_count.max(1);
        let pool = BufferPool::new(buffer_count as usize);
        let (tx, rx) = mpsc::channel(buffer_count as usize);

        let thread_pool = pool.clone();
        let handle = thread::Builder::new()
            .name("v4l2-capture".to_string())
            .spawn(move || {
                if let Err(e) = Self::capture_loop(device, layout, thread_pool, tx, buffer_count) {
                    log::error!("capture thread stopped: {e}");
                }
            })?;

        Ok(Self {
            layout,
            pool,
            receiver: Some(rx),
            thread_handle: Some(handle),
        })
    }

    pub fn pool(&self) -> &BufferPool {
        &self.pool
    }

    fn capture_loop(
        device: Device,
        layout: Layout,
        pool: BufferPool,
        tx: mpsc::Sender<FrameResult>,
        buffer_count: u32,
    ) -> Result<(), CameraError> {
        let mut stream = MmapStream::with_buffers(&device, Type::VideoCapture, buffer_count)
            .map_err(|e| CameraError::Stream(e.to_string()))?;

        loop {
            let (data, metadata) = CaptureStream::next(&mut stream)
                .map_err(|e| CameraError::Stream(e.to_string()))?;

            let result = pool.acquire().map(|lease| {
                let used = match metadata.bytesused as usize {
                    0 => data.len(),
                    n => n.min(data.len()),
                };
                // driver buffer is only valid until the next dequeue
                let planes = planes(&layout, &data[..used]);
                lease.attach(RawFrame::new(
                    layout.width,
                    layout.height,
                    layout.format,
                    planes,
                ))
            });

            match tx.try_send(result) {
                Ok(()) => {}
                Err(mpsc::error::TrySendError::Full(_)) => {
                    log::debug!("consumer behind, frame {} dropped", metadata.sequence);
                }
                Err(mpsc::error::TrySendError::Closed(_)) => break,
            }
        }

        Ok(())
    }
}

fn planes(layout: &Layout, data: &[u8]) -> Vec<Plane> {
    if layout.format != PixelFormat::Yuv420 {
        return vec![Plane::new(data.to_vec(), layout.row_stride, 1)];
    }

    let luma_len = (layout.row_stride * layout.height).min(data.len());
    let (luma, uv) = data.split_at(luma_len);
    let shifted = uv.get(1..).unwrap_or_default().to_vec();

    // NV12 stores U first, NV21 stores V first
    let (u, v) = if &layout.fourcc == b"NV21" {
        (shifted, uv.to_vec())
    } else {
        (uv.to_vec(), shifted)
    };
    vec![
        Plane::new(luma.to_vec(), layout.row_stride, 1),
        Plane::new(u, layout.row_stride, 2),
        Plane::new(v, layout.row_stride, 2),
    ]
}

impl FrameSource for V4l2Camera {
    fn size(&self) -> (usize, usize) {
        (self.layout.width, self.layout.height)
    }

    fn format(&self) -> PixelFormat {
        self.layout.format
    }

    /// Block until the capture thread delivers the next frame.
    ///
    /// Must not be called from inside an async context.
    fn capture(&mut self) -> Result<RawFrame, CameraError> {
        let receiver = self
            .receiver
            .as_mut()
            .ok_or_else(|| CameraError::Channel("receiver not initialized".to_string()))?;

        receiver
            .blocking_recv()
            .ok_or_else(|| CameraError::Channel("capture thread stopped".to_string()))?
    }
}

impl Drop for V4l2Camera {
    fn drop(&mut self) {
        // the capture thread exits on its next send
        drop(self.receiver.take());

        if let Some(handle) = self.thread_handle.take() {
            let _ = handle.join();
        }
    }
}
