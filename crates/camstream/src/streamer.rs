use crate::{Pipeline, ReconnectPolicy, StatsSnapshot, StreamConfig, StreamError};
use camstream_camera::FrameSource;
use camstream_com::{ComError, ConnectionState, Transport, WsTransport};
use camstream_image::FrameEncoder;
use std::{
    sync::{
        Arc,
        atomic::{AtomicBool, Ordering},
    },
    time::Duration,
};
use tokio::{
    sync::watch,
    task::{JoinHandle, spawn_blocking},
};

// delay before capturing again after a failed capture
const WAIT_AFTER_CAPTURE_ERROR_MS: u64 = 100;

// how long stop() waits for the close handshake
const CLOSE_TIMEOUT_MS: u64 = 2000;

/// Running capture-to-transport session.
///
/// Owns the single [`WsTransport`] of the process, the capture worker and,
/// with [`ReconnectPolicy::FixedDelay`], a supervisor task that reconnects
/// the transport after it drops.
pub struct Streamer {
    pipeline: Arc<Pipeline<WsTransport>>,
    cancel: Arc<AtomicBool>,
    worker: Option<JoinHandle<()>>,
    supervisor: Option<JoinHandle<()>>,
}

impl Streamer {
    /// Connect to the configured endpoint and start streaming frames from
    /// `source`. Must be called from within a tokio runtime.
    ///
    /// Returns once the connection attempt is under way; frames captured
    /// before it opens are counted as not connected and dropped.
    ///
    /// # Errors
    ///
    /// Returns `StreamError::Com` if the endpoint is invalid or no runtime is
    /// available.
    pub fn start<S>(config: StreamConfig, source: S) -> Result<Self, StreamError>
    where
        S: FrameSource + 'static,
    {
        let transport = WsTransport::with_queue_capacity(config.send_queue_capacity());
        transport.connect(config.endpoint())?;

        let pipeline = Arc::new(Pipeline::new(
            transport,
            FrameEncoder::new(config.quality()),
        ));
        let cancel = Arc::new(AtomicBool::new(false));

        let supervisor = match config.reconnect() {
            ReconnectPolicy::Never => None,
            ReconnectPolicy::FixedDelay(delay) => Some(tokio::spawn(supervise(
                Arc::clone(&pipeline),
                config.endpoint().to_string(),
                delay,
                Arc::clone(&cancel),
            ))),
        };

        let worker = spawn_blocking({
            let pipeline = Arc::clone(&pipeline);
            let cancel = Arc::clone(&cancel);
            move || capture_loop(source, pipeline, cancel)
        });

        log::info!(
            "streaming to {} at quality {}",
            config.endpoint(),
            config.quality()
        );

        Ok(Self {
            pipeline,
            cancel,
            worker: Some(worker),
            supervisor,
        })
    }

    pub fn state(&self) -> ConnectionState {
        self.pipeline.transport().state()
    }

    pub fn subscribe(&self) -> watch::Receiver<ConnectionState> {
        self.pipeline.transport().subscribe()
    }

    pub fn stats(&self) -> StatsSnapshot {
        self.pipeline.stats().snapshot()
    }

    /// Stop capturing, stop reconnecting and close the connection.
    ///
    /// A frame already being processed runs to completion on the blocking
    /// pool. Returns the final counters.
    pub async fn stop(mut self) -> StatsSnapshot {
        self.shutdown();

        if let Some(worker) = self.worker.take() {
            if let Err(e) = worker.await {
                log::error!("capture worker failed: {e}");
            }
        }

        let close = self.pipeline.transport().idle();
        if tokio::time::timeout(Duration::from_millis(CLOSE_TIMEOUT_MS), close)
            .await
            .is_err()
        {
            log::warn!("connection did not close in time");
        }

        let stats = self.stats();
        log::info!("streamer stopped: {stats}");
        stats
    }

    fn shutdown(&mut self) {
        self.cancel.store(true, Ordering::Release);
        if let Some(supervisor) = self.supervisor.take() {
            supervisor.abort();
        }
        self.pipeline.transport().close();
    }
}

impl Drop for Streamer {
    fn drop(&mut self) {
        self.shutdown();
    }
}

fn capture_loop<S: FrameSource>(
    mut source: S,
    pipeline: Arc<Pipeline<WsTransport>>,
    cancel: Arc<AtomicBool>,
) {
    let (width, height) = source.size();
    log::info!(
        "capture worker: {width}x{height} {}, starting capture loop",
        source.format()
    );

    while !cancel.load(Ordering::Acquire) {
        match source.capture() {
            Ok(frame) => {
                let pipeline = Arc::clone(&pipeline);
                // detached; the gate drops frames that overlap
                spawn_blocking(move || pipeline.on_frame(frame));
            }
            Err(e) => {
                log::warn!("capture worker: capture failed: {e}");
                std::thread::sleep(Duration::from_millis(WAIT_AFTER_CAPTURE_ERROR_MS));
            }
        }
    }

    log::info!("capture worker: stopped");
}

async fn supervise(
    pipeline: Arc<Pipeline<WsTransport>>,
    endpoint: String,
    delay: Duration,
    cancel: Arc<AtomicBool>,
) {
    let transport = pipeline.transport();
    let mut states = transport.subscribe();

    loop {
        // wait for the current connection to end
        if states.wait_for(ConnectionState::is_idle).await.is_err() {
            return;
        }
        if cancel.load(Ordering::Acquire) {
            return;
        }

        log::info!(
            "connection {}, reconnecting in {} ms",
            transport.state(),
            delay.as_millis()
        );
        tokio::time::sleep(delay).await;
        if cancel.load(Ordering::Acquire) {
            return;
        }

        match transport.connect(&endpoint) {
            Ok(()) | Err(ComError::AlreadyActive) => {}
            Err(e) => {
                log::error!("reconnect to {endpoint} failed: {e}");
                return;
            }
        }
    }
}
