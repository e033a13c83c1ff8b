use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};

/// Single-slot admission gate: at most one frame is processed at a time and
/// frames arriving meanwhile are dropped, never queued.
#[derive(Debug, Default)]
pub struct FrameGate {
    busy: AtomicBool,
    accepted: AtomicU64,
    dropped: AtomicU64,
}

impl FrameGate {
    pub fn new() -> Self {
        Self::default()
    }

    /// Take the slot if it is free. Never waits.
    pub fn try_acquire(&self) -> bool {
        let acquired = self
            .busy
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_ok();
        if acquired {
            self.accepted.fetch_add(1, Ordering::Relaxed);
        } else {
            self.dropped.fetch_add(1, Ordering::Relaxed);
        }
        acquired
    }

    /// Free the slot, whoever holds it.
    pub fn release(&self) {
        self.busy.store(false, Ordering::Release);
    }

    /// Scoped form of [`try_acquire`](Self::try_acquire); the slot is freed
    /// when the token drops.
    pub fn enter(&self) -> Option<GateToken<'_>> {
        self.try_acquire().then_some(GateToken { gate: self })
    }

    pub fn is_busy(&self) -> bool {
        self.busy.load(Ordering::Acquire)
    }

    pub fn accepted(&self) -> u64 {
        self.accepted.load(Ordering::Relaxed)
    }

    pub fn dropped(&self) -> u64 {
        self.dropped.load(Ordering::Relaxed)
    }
}

/// Proof of holding the [`FrameGate`] slot.
#[derive(Debug)]
pub struct GateToken<'a> {
    gate: &'a FrameGate,
}

impl Drop for GateToken<'_> {
    fn drop(&mut self) {
        self.gate.release();
    }
}
