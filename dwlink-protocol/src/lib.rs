//! Host link framing for UWB reference boards
//!
//! This crate turns the raw byte stream arriving over USB or UART into
//! discrete units for the upper layers. Two protocols share the link,
//! selected per build:
//!
//! - **Command line** ([`command`]) - text commands, either terminated by a
//!   newline or wrapped in balanced braces (JSON-style), with terminal echo
//!   and backspace editing.
//! - **UCI** ([`uci`]) - binary packets with a fixed header that carries the
//!   body length:
//!
//! ```text
//! ┌──────┬──────┬──────┬────────┬──────────────┐
//! │ HDR0 │ HDR1 │ HDR2 │ LENGTH │ PAYLOAD      │
//! │ 1B   │ 1B   │ 1B   │ 1B     │ 0–255B       │
//! └──────┴──────┴──────┴────────┴──────────────┘
//! ```
//!
//! Both framers are plain state machines: they never block, they own no
//! locks, and they report capacity/timing problems through return values.

#![no_std]
#![deny(unsafe_code)]

extern crate alloc;

#[macro_use]
mod fmt;

pub mod command;
pub mod uci;

pub use command::{Command, CommandFramer, Framing, MAX_CMD_LENGTH};
pub use uci::{
    BlockPool, FixedBlockPool, PacketSink, UciBlock, UciError, UciFramer, UciStack, UciTransport,
    UCI_GARBAGE_TIMEOUT_MS, UCI_MAX_PACKET_SIZE, UCI_PACKET_HEADER_SIZE,
    UCI_PAYLOAD_LENGTH_OFFSET,
};
