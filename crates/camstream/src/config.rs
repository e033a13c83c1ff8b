use camstream_com::DEFAULT_QUEUE_CAPACITY;
use camstream_image::DEFAULT_QUALITY;
use std::time::Duration;

pub const DEFAULT_ENDPOINT: &str = "ws://127.0.0.1:3000";

/// What the streamer does after the connection ends without `stop()`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ReconnectPolicy {
    /// Stay disconnected; frames are dropped until the process restarts.
    #[default]
    Never,
    /// Wait, then connect the same transport again. Repeats forever.
    FixedDelay(Duration),
}

/// Start-time configuration of a [`Streamer`](crate::Streamer).
#[derive(Clone, Debug)]
pub struct StreamConfig {
    endpoint: String,
    width: u32,
    height: u32,
    fps: u32,
    quality: u8,
    device: String,
    buffer_count: u32,
    send_queue_capacity: usize,
    reconnect: ReconnectPolicy,
}

impl Default for StreamConfig {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_ENDPOINT.to_string(),
            width: 1280,
            height: 720,
            fps: 30,
            quality: DEFAULT_QUALITY,
            device: "/dev/video0".to_string(),
            buffer_count: 4,
            send_queue_capacity: DEFAULT_QUEUE_CAPACITY,
            reconnect: ReconnectPolicy::Never,
        }
    }
}

impl StreamConfig {
    /// Set the viewer endpoint (`ws://host:port[/path]`).
    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }

    /// Set the capture width in pixels.
    pub fn with_width(mut self, width: u32) -> Self {
        self.width = width;
        self
    }

    /// Set the capture height in pixels.
    pub fn with_height(mut self, height: u32) -> Self {
        self.height = height;
        self
    }

    /// Set the frames per second.
    pub fn with_fps(mut self, fps: u32) -> Self {
        self.fps = fps;
        self
    }

    /// Set the JPEG quality (1-100).
    pub fn with_quality(mut self, quality: u8) -> Self {
        self.quality = quality;
        self
    }

    /// Set the device path (e.g., "/dev/video0").
    pub fn with_device(mut self, device: impl Into<String>) -> Self {
        self.device = device.into();
        self
    }

    /// Set the buffer count for the capture stream.
    pub fn with_buffer_count(mut self, buffer_count: u32) -> Self {
        self.buffer_count = buffer_count;
        self
    }

    pub fn with_send_queue_capacity(mut self, capacity: usize) -> Self {
        self.send_queue_capacity = capacity;
        self
    }

    pub fn with_reconnect(mut self, reconnect: ReconnectPolicy) -> Self {
        self.reconnect = reconnect;
        self
    }

    // Getters
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn fps(&self) -> u32 {
        self.fps
    }

    pub fn quality(&self) -> u8 {
        self.quality
    }

    pub fn device(&self) -> &str {
        &self.device
    }

    pub fn buffer_count(&self) -> u32 {
        self.buffer_count
    }

    pub fn send_queue_capacity(&self) -> usize {
        self.send_queue_capacity
    }

    pub fn reconnect(&self) -> ReconnectPolicy {
        self.reconnect
    }
}
