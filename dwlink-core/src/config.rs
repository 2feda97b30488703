//! Build-time configuration
//!
//! Buffer sizes are fixed at compile time: each transport owns one
//! statically sized ring and nothing is resized afterwards.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Size of a single USB bulk OUT transfer
pub const USB_MAX_RX_SIZE: usize = 64;

/// USB receive ring capacity (16 transfers)
pub const USB_RX_BUFF_SIZE: usize = USB_MAX_RX_SIZE * 16;

/// UART receive ring capacity
pub const UART_RX_BUF_SIZE: usize = 0x200;

/// UART writes one byte per interrupt
pub const UART_CHUNK_SIZE: usize = 1;

/// Pending notifications the control queue can hold
pub const CONTROL_QUEUE_DEPTH: usize = 5;

/// Geometry of a transport receive ring
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct RingConfig {
    /// Storage size in bytes
    pub capacity: usize,
    /// Largest single producer write; the ring wraps early to keep such a
    /// write contiguous
    pub chunk_size: usize,
}

impl RingConfig {
    /// USB CDC receive ring
    pub const USB: Self = Self {
        capacity: USB_RX_BUFF_SIZE,
        chunk_size: USB_MAX_RX_SIZE,
    };

    /// UART receive ring
    pub const UART: Self = Self {
        capacity: UART_RX_BUF_SIZE,
        chunk_size: UART_CHUNK_SIZE,
    };

    /// Bytes lost to padding on a wrap, at most
    pub const fn max_padding(&self) -> usize {
        self.chunk_size.saturating_sub(1)
    }
}

/// Which protocol the control layer runs on received bytes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum RxMode {
    /// Text command line with local echo
    #[default]
    Cli,
    /// Binary UCI packets for the ranging engine
    Uci,
}
