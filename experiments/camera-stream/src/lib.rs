use camstream::{ReconnectPolicy, StreamConfig};
use std::time::{Duration, Instant};

/// Command line of the `camera` binary: `camera [ENDPOINT] [RECONNECT_MS]`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CameraArgs {
    pub endpoint: Option<String>,
    pub reconnect: ReconnectPolicy,
}

impl CameraArgs {
    pub fn parse(args: impl IntoIterator<Item = String>) -> Result<Self, String> {
        let mut args = args.into_iter();
        let endpoint = args.next();
        let reconnect = match args.next() {
            None => ReconnectPolicy::Never,
            Some(ms) => {
                let ms: u64 = ms
                    .parse()
                    .map_err(|_| format!("reconnect delay must be milliseconds, got {ms:?}"))?;
                ReconnectPolicy::FixedDelay(Duration::from_millis(ms))
            }
        };
        if let Some(extra) = args.next() {
            return Err(format!("unexpected argument {extra:?}"));
        }
        Ok(Self {
            endpoint,
            reconnect,
        })
    }

    pub fn apply(&self, config: StreamConfig) -> StreamConfig {
        let config = config.with_reconnect(self.reconnect);
        match &self.endpoint {
            Some(endpoint) => config.with_endpoint(endpoint.clone()),
            None => config,
        }
    }
}

/// Frame and byte rate over fixed reporting windows.
#[derive(Debug)]
pub struct FrameMeter {
    window: Duration,
    window_start: Instant,
    frames: u64,
    bytes: u64,
}

/// Rates over one finished window.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rate {
    pub fps: f64,
    pub kbytes_per_sec: f64,
}

impl FrameMeter {
    pub fn new(window: Duration, now: Instant) -> Self {
        Self {
            window,
            window_start: now,
            frames: 0,
            bytes: 0,
        }
    }

    /// Count one frame; returns the rates when a window completes.
    pub fn record(&mut self, bytes: usize, now: Instant) -> Option<Rate> {
        self.frames += 1;
        self.bytes += bytes as u64;

        let elapsed = now.saturating_duration_since(self.window_start);
        if elapsed < self.window {
            return None;
        }
        let secs = elapsed.as_secs_f64();
        let rate = Rate {
            fps: self.frames as f64 / secs,
            kbytes_per_sec: self.bytes as f64 / 1024.0 / secs,
        };
        self.window_start = now;
        self.frames = 0;
        self.bytes = 0;
        Some(rate)
    }
}
