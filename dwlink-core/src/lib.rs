//! Receive path core for UWB reference boards
//!
//! This crate owns everything between a transport's receive interrupt and
//! the application's command/packet handlers:
//!
//! - Chunked circular receive buffers shared with interrupt/DMA writers
//! - USB (chunked DMA) and UART (byte-wise) producer paths
//! - Control routing: queue of receive notifications, per-transport ports
//!   running the command or UCI framer, hand-off to the application
//! - Build-time configuration
//!
//! Framing itself lives in `dwlink-protocol`; platform seams in `dwlink-hal`.

#![no_std]
#![deny(unsafe_code)]

#[macro_use]
mod fmt;

pub mod config;
pub mod control;
pub mod ring;
pub mod transport;

pub use config::{RingConfig, RxMode};
pub use control::{
    notify_data_received, notify_stop_app, Control, ControlMessage, ControlQueue, Dispatcher,
    RxHandler, RxOutcome, RxPort,
};
pub use ring::{ChunkedRingBuffer, RingError, SharedRing};
pub use transport::{TransportId, UartRx, UsbRx};
