use crate::CameraError;
use camstream_image::RawFrame;
use std::sync::{
    Arc,
    atomic::{AtomicUsize, Ordering},
};

/// Fixed pool of frame buffers, as held by a sensor driver.
///
/// A frame that is never released keeps its slot forever; once every slot is
/// held the source cannot deliver any more frames.
#[derive(Debug, Clone)]
pub struct BufferPool {
    capacity: usize,
    in_use: Arc<AtomicUsize>,
}

impl BufferPool {
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity,
            in_use: Arc::new(AtomicUsize::new(0)),
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Number of buffers currently lent out.
    pub fn in_use(&self) -> usize {
        self.in_use.load(Ordering::Acquire)
    }

    /// Reserve a buffer slot.
    ///
    /// # Errors
    ///
    /// Returns `CameraError::Exhausted` if every slot is held.
    pub fn acquire(&self) -> Result<Lease, CameraError> {
        self.in_use
            .fetch_update(Ordering::AcqRel, Ordering::Acquire, |held| {
                (held < self.capacity).then_some(held + 1)
            })
            .map_err(|_| CameraError::Exhausted(self.capacity))?;
        Ok(Lease {
            in_use: Some(Arc::clone(&self.in_use)),
        })
    }
}

/// A reserved slot. Dropping an unattached lease frees the slot.
#[derive(Debug)]
pub struct Lease {
    in_use: Option<Arc<AtomicUsize>>,
}

impl Lease {
    /// Tie the slot to `frame`; it is freed when the frame is released.
    pub fn attach(mut self, frame: RawFrame) -> RawFrame {
        match self.in_use.take() {
            Some(in_use) => frame.with_release(move || {
                in_use.fetch_sub(1, Ordering::AcqRel);
            }),
            None => frame,
        }
    }
}

impl Drop for Lease {
    fn drop(&mut self) {
        if let Some(in_use) = self.in_use.take() {
            in_use.fetch_sub(1, Ordering::AcqRel);
        }
    }
}
