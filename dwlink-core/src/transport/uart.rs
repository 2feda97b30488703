//! UART receive path (one byte per interrupt)

use core::sync::atomic::{AtomicBool, Ordering};

use embassy_sync::blocking_mutex::raw::RawMutex;

use crate::control::{notify_data_received, ControlQueue};
use crate::ring::SharedRing;
use crate::transport::TransportId;

/// UART producer state
///
/// Shared between the UART interrupt and whoever puts the UART to sleep, so
/// every method takes `&self`.
#[derive(Debug, Default)]
pub struct UartRx {
    discard_next: AtomicBool,
}

impl UartRx {
    /// Create a producer that keeps every byte
    pub const fn new() -> Self {
        Self {
            discard_next: AtomicBool::new(false),
        }
    }

    /// Drop the next received symbol
    ///
    /// Waking the UART from sleep produces one garbage symbol.
    pub fn discard_next_symbol(&self) {
        self.discard_next.store(true, Ordering::Relaxed);
    }

    /// True while the next symbol is going to be dropped
    pub fn discard_pending(&self) -> bool {
        self.discard_next.load(Ordering::Relaxed)
    }

    /// Handle one received byte (interrupt context)
    ///
    /// Stores `byte` in `ring` and notifies the control task. Returns `false`
    /// if the byte was discarded or lost to overflow; the control task is
    /// still notified on overflow so it drains what is there.
    pub fn on_byte<M: RawMutex, const N: usize>(
        &self,
        ring: &SharedRing<M, N>,
        queue: &ControlQueue<M>,
        byte: u8,
    ) -> bool {
        // The UART interrupt is the only consumer of the latch.
        if self.discard_next.load(Ordering::Relaxed) {
            self.discard_next.store(false, Ordering::Relaxed);
            trace!("UART: discarded wake-up symbol {=u8:#x}", byte);
            return false;
        }

        let stored = ring.write_byte(byte).is_ok();
        if !stored {
            warn!("UART: RX buffer overflow");
        }
        notify_data_received(queue, TransportId::Uart);
        stored
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::control::ControlMessage;
    use embassy_sync::blocking_mutex::raw::NoopRawMutex;

    #[test]
    fn test_byte_is_stored_and_notified() {
        let uart = UartRx::new();
        let ring = SharedRing::<NoopRawMutex, 8>::new(1);
        let queue = ControlQueue::<NoopRawMutex>::new();

        assert!(uart.on_byte(&ring, &queue, b'a'));

        assert_eq!(ring.read_byte(), Ok(b'a'));
        assert_eq!(
            queue.try_receive().ok(),
            Some(ControlMessage::DataReceived(TransportId::Uart))
        );
    }

    #[test]
    fn test_discard_drops_exactly_one_symbol() {
        let uart = UartRx::new();
        let ring = SharedRing::<NoopRawMutex, 8>::new(1);
        let queue = ControlQueue::<NoopRawMutex>::new();

        uart.discard_next_symbol();
        assert!(uart.discard_pending());
        assert!(!uart.on_byte(&ring, &queue, 0xFF));
        assert!(ring.is_empty());
        assert!(queue.try_receive().is_err());

        assert!(!uart.discard_pending());
        assert!(uart.on_byte(&ring, &queue, b'b'));
        assert_eq!(ring.len(), 1);
    }

    #[test]
    fn test_overflow_still_notifies() {
        let uart = UartRx::new();
        let ring = SharedRing::<NoopRawMutex, 2>::new(1);
        let queue = ControlQueue::<NoopRawMutex>::new();

        assert!(uart.on_byte(&ring, &queue, 1));
        assert!(uart.on_byte(&ring, &queue, 2));
        assert!(!uart.on_byte(&ring, &queue, 3));

        assert_eq!(ring.len(), 2);
        assert_eq!(queue.len(), 3);
    }
}
