//! dwlink Hardware Abstraction Layer
//!
//! This crate defines the small set of platform seams the receive path
//! depends on. Board support code (USB CDC, UART, RTC) implements them;
//! the framers and buffers in the other crates only ever see the traits.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────┐
//! │  dwlink-core (rings, control routing)   │
//! └─────────────────────────────────────────┘
//!                     │
//!                     ▼
//! ┌─────────────────────────────────────────┐
//! │  dwlink-protocol (command / UCI framing)│
//! └─────────────────────────────────────────┘
//!                     │
//!                     ▼
//! ┌─────────────────────────────────────────┐
//! │  dwlink-hal (this crate - traits)       │
//! └─────────────────────────────────────────┘
//! ```
//!
//! # Traits
//!
//! - [`port::PortTx`] - Byte transmit (local echo, UCI responses)
//! - [`clock::MonotonicClock`] - Microsecond timestamps
//! - [`source::RxSource`] - Pull side of a receive buffer

#![no_std]
#![deny(unsafe_code)]

pub mod clock;
pub mod port;
pub mod source;

// Re-export key traits at crate root for convenience
pub use clock::MonotonicClock;
pub use port::PortTx;
pub use source::RxSource;
