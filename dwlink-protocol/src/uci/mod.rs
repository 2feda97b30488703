//! UCI (UWB Command Interface) packet plumbing
//!
//! Packets arrive over USB/UART with arbitrary boundaries. The
//! [`UciFramer`] stitches them back together using the length byte in the
//! fixed header, and hands each complete packet to the ranging engine
//! through [`PacketSink`]. Packet storage comes from a [`BlockPool`];
//! ownership of a block moves with the packet.

mod block;
mod framer;
mod transport;

pub use block::{BlockPool, FixedBlockPool, UciBlock};
pub use framer::UciFramer;
pub use transport::UciTransport;

use alloc::boxed::Box;

/// Fixed UCI header size in bytes
pub const UCI_PACKET_HEADER_SIZE: usize = 4;

/// Offset of the payload length byte inside the header
pub const UCI_PAYLOAD_LENGTH_OFFSET: usize = 3;

/// Largest packet the length byte can describe
pub const UCI_MAX_PACKET_SIZE: usize = UCI_PACKET_HEADER_SIZE + u8::MAX as usize;

/// A partial packet older than this is discarded
pub const UCI_GARBAGE_TIMEOUT_MS: i64 = 100;

const ENOMEM: i32 = 12;
const EINVAL: i32 = 22;

/// Errors reported by a UCI read
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum UciError {
    /// Block pool exhausted; retry on the next read
    NoMemory,
    /// Partial packet stalled past [`UCI_GARBAGE_TIMEOUT_MS`] and was dropped
    Timeout,
}

impl UciError {
    /// Negative errno value expected by the ranging engine
    pub const fn errno(self) -> i32 {
        match self {
            UciError::NoMemory => -ENOMEM,
            UciError::Timeout => -EINVAL,
        }
    }
}

/// Upstream entry point for received packets
///
/// The receiver takes ownership and eventually returns the block to the
/// pool it came from.
pub trait PacketSink {
    /// A complete packet (possibly a chain) has been received
    fn packet_received(&mut self, packet: Box<UciBlock>);
}

/// The ranging engine as seen by the transport
pub trait UciStack: PacketSink {
    /// Next packet queued for transmission to the host, if any
    fn next_to_send(&mut self) -> Option<Box<UciBlock>>;

    /// Transmission of `packet` has finished
    fn send_done(&mut self, packet: Box<UciBlock>);
}
