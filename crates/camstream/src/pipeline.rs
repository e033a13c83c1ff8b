use crate::FrameGate;
use camstream_com::{ComError, Transport};
use camstream_image::{FrameEncoder, RawFrame, convert};
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

/// What happened to one frame handed to [`Pipeline::on_frame`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FrameOutcome {
    Sent { bytes: usize },
    /// Another frame was in flight.
    Busy,
    ConvertFailed,
    EncodeFailed,
    NotConnected,
    SendFailed,
}

/// Running per-outcome counters.
#[derive(Debug, Default)]
pub struct PipelineStats {
    received: AtomicU64,
    busy: AtomicU64,
    convert_failed: AtomicU64,
    encode_failed: AtomicU64,
    not_connected: AtomicU64,
    send_failed: AtomicU64,
    sent: AtomicU64,
    bytes_sent: AtomicU64,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct StatsSnapshot {
    pub received: u64,
    pub busy: u64,
    pub convert_failed: u64,
    pub encode_failed: u64,
    pub not_connected: u64,
    pub send_failed: u64,
    pub sent: u64,
    pub bytes_sent: u64,
}

impl PipelineStats {
    fn record(&self, outcome: FrameOutcome) {
        let counter = match outcome {
            FrameOutcome::Sent { bytes } => {
                self.bytes_sent.fetch_add(bytes as u64, Ordering::Relaxed);
                &self.sent
            }
            FrameOutcome::Busy => &self.busy,
            FrameOutcome::ConvertFailed => &self.convert_failed,
            FrameOutcome::EncodeFailed => &self.encode_failed,
            FrameOutcome::NotConnected => &self.not_connected,
            FrameOutcome::SendFailed => &self.send_failed,
        };
        counter.fetch_add(1, Ordering::Relaxed);
    }

    pub fn snapshot(&self) -> StatsSnapshot {
        StatsSnapshot {
            received: self.received.load(Ordering::Relaxed),
            busy: self.busy.load(Ordering::Relaxed),
            convert_failed: self.convert_failed.load(Ordering::Relaxed),
            encode_failed: self.encode_failed.load(Ordering::Relaxed),
            not_connected: self.not_connected.load(Ordering::Relaxed),
            send_failed: self.send_failed.load(Ordering::Relaxed),
            sent: self.sent.load(Ordering::Relaxed),
            bytes_sent: self.bytes_sent.load(Ordering::Relaxed),
        }
    }
}

impl fmt::Display for StatsSnapshot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} received, {} sent ({} bytes), {} busy, {} not connected, \
             {} convert failed, {} encode failed, {} send failed",
            self.received,
            self.sent,
            self.bytes_sent,
            self.busy,
            self.not_connected,
            self.convert_failed,
            self.encode_failed,
            self.send_failed
        )
    }
}

/// Per-frame processing: gate, convert to NV21, JPEG-encode, send.
///
/// Every failure is local to its frame: it is logged, counted and the frame
/// is dropped. The frame is released and the gate freed on every exit path,
/// in that order.
pub struct Pipeline<T> {
    transport: T,
    encoder: FrameEncoder,
    gate: FrameGate,
    stats: PipelineStats,
}

impl<T: Transport> Pipeline<T> {
    pub fn new(transport: T, encoder: FrameEncoder) -> Self {
        Self {
            transport,
            encoder,
            gate: FrameGate::new(),
            stats: PipelineStats::default(),
        }
    }

    /// Process one captured frame. Callable from any thread.
    pub fn on_frame(&self, frame: RawFrame) -> FrameOutcome {
        self.stats.received.fetch_add(1, Ordering::Relaxed);

        let Some(_token) = self.gate.enter() else {
            frame.release();
            log::debug!("previous frame still in flight, frame dropped");
            self.stats.record(FrameOutcome::Busy);
            return FrameOutcome::Busy;
        };

        // `frame` is consumed inside, so it is released before `_token` drops
        let outcome = self.process(frame);
        self.stats.record(outcome);
        outcome
    }

    fn process(&self, frame: RawFrame) -> FrameOutcome {
        let nv21 = match convert(&frame) {
            Ok(nv21) => nv21,
            Err(e) => {
                log::warn!("conversion failed, frame dropped: {e}");
                return FrameOutcome::ConvertFailed;
            }
        };
        // the interleaved copy no longer needs the sensor buffer
        frame.release();

        let jpeg = match self.encoder.encode(&nv21) {
            Ok(jpeg) => jpeg,
            Err(e) => {
                log::error!("encoding failed, frame dropped: {e}");
                return FrameOutcome::EncodeFailed;
            }
        };

        let bytes = jpeg.len();
        match self.transport.send(jpeg.into_bytes()) {
            Ok(()) => {
                log::debug!("frame sent ({bytes} bytes)");
                FrameOutcome::Sent { bytes }
            }
            Err(ComError::NotConnected) => {
                log::debug!("not connected, frame dropped");
                FrameOutcome::NotConnected
            }
            Err(e) => {
                log::warn!("send failed, frame dropped: {e}");
                FrameOutcome::SendFailed
            }
        }
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    pub fn gate(&self) -> &FrameGate {
        &self.gate
    }

    pub fn stats(&self) -> &PipelineStats {
        &self.stats
    }
}
