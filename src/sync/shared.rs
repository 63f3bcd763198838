//! Latest-value shared buffer between one producer and one consumer stage.
//!
//! The buffer is created as a writer/reader handle pair.  Neither handle is
//! `Clone`, so each edge of the pipeline graph has exactly one stage that
//! can mutate it and one stage that can observe it.  Ordering between the
//! two is the adjacent [`HandoffSemaphore`](super::HandoffSemaphore)'s job;
//! the cell itself only fences each individual access with a critical
//! section so a multi-word value is never observed half-written.

use core::cell::Cell;
use std::sync::Arc;

use embassy_sync::blocking_mutex::Mutex;
use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;

type Slot<T> = Mutex<CriticalSectionRawMutex, Cell<T>>;

/// Allocate a buffer holding `initial` and split it into its two ends.
pub fn shared_buffer<T: Copy + Send>(initial: T) -> (BufferWriter<T>, BufferReader<T>) {
    let slot: Arc<Slot<T>> = Arc::new(Mutex::new(Cell::new(initial)));
    (
        BufferWriter { slot: slot.clone() },
        BufferReader { slot },
    )
}

/// Write end, owned by the producer stage.
pub struct BufferWriter<T: Copy> {
    slot: Arc<Slot<T>>,
}

impl<T: Copy> BufferWriter<T> {
    /// Overwrite the buffer in place.
    pub fn write(&mut self, value: T) {
        self.slot.lock(|cell| cell.set(value));
    }

    /// The value last written by this producer.
    pub fn last(&self) -> T {
        self.slot.lock(Cell::get)
    }
}

/// Read end, owned by the consumer stage.  Read only after the upstream
/// handoff released the consumer.
pub struct BufferReader<T: Copy> {
    slot: Arc<Slot<T>>,
}

impl<T: Copy> BufferReader<T> {
    pub fn read(&self) -> T {
        self.slot.lock(Cell::get)
    }
}
