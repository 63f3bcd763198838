//! Inter-stage synchronization: the handoff semaphore and the latest-value
//! shared buffer it guards.

pub mod handoff;
pub mod shared;

pub use handoff::HandoffSemaphore;
pub use shared::{BufferReader, BufferWriter, shared_buffer};
