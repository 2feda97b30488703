//! Transport receive rings
//!
//! [`ChunkedRingBuffer`] is the plain data structure; [`SharedRing`] puts it
//! behind a platform raw mutex so an interrupt/DMA producer and the control
//! task can share one instance.

mod chunked;
mod shared;

pub use chunked::ChunkedRingBuffer;
pub use shared::SharedRing;

/// Backpressure conditions reported by a ring
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum RingError {
    /// Not enough free space for the requested write
    Full,
    /// Nothing to read
    Empty,
}
