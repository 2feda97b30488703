//! Control task routing
//!
//! Receive interrupts post a [`ControlMessage`] on the [`ControlQueue`]; the
//! control task takes one message at a time, lets the matching [`RxPort`]
//! run the framer selected by the current [`RxMode`](crate::config::RxMode)
//! and hands the result to the application [`Dispatcher`].

mod dispatch;
mod port;

pub use dispatch::{Control, Dispatcher};
pub use port::{RxHandler, RxPort};

use dwlink_protocol::Command;
use embassy_sync::blocking_mutex::raw::RawMutex;
use embassy_sync::channel::Channel;

use crate::config::CONTROL_QUEUE_DEPTH;
use crate::transport::TransportId;

/// Message posted to the control task
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ControlMessage {
    /// New bytes are waiting in a transport's ring
    DataReceived(TransportId),
    /// The running application must stop
    StopApp,
}

/// Result of draining a port once
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum RxOutcome {
    /// Nothing complete yet
    NoData,
    /// CLI mode: a complete command, terminator included
    CommandReady(Command),
    /// UCI mode: bytes are pending for the UCI framer
    DataReady,
}

/// Queue between the receive interrupts and the control task
pub type ControlQueue<M> = Channel<M, ControlMessage, CONTROL_QUEUE_DEPTH>;

/// Tell the control task that `transport` has new bytes
///
/// Never blocks; returns `false` (and the notification is lost) when the
/// queue is full. The bytes stay in the ring and are picked up with the
/// next notification.
pub fn notify_data_received<M: RawMutex>(queue: &ControlQueue<M>, transport: TransportId) -> bool {
    if queue.try_send(ControlMessage::DataReceived(transport)).is_err() {
        warn!("CONTROL: queue full, {} notification dropped", transport);
        return false;
    }
    true
}

/// Ask the control task to stop the running application
pub fn notify_stop_app<M: RawMutex>(queue: &ControlQueue<M>) -> bool {
    if queue.try_send(ControlMessage::StopApp).is_err() {
        warn!("CONTROL: queue full, stop request dropped");
        return false;
    }
    true
}
