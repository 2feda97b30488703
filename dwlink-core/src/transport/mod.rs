//! Host transport receive paths
//!
//! Producers run in interrupt context: they store received bytes in the
//! transport's [`SharedRing`](crate::ring::SharedRing) and post a
//! [`ControlMessage`](crate::control::ControlMessage) so the control task
//! drains it.

pub mod uart;
pub mod usb;

pub use uart::UartRx;
pub use usb::UsbRx;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Host-facing transport a notification refers to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum TransportId {
    /// USB CDC ACM
    Usb,
    /// Debug UART
    Uart,
}
