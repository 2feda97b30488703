//! USB CDC receive path (one bulk transfer per chunk)
//!
//! The ring is built with `chunk_size == USB_MAX_RX_SIZE`, so every transfer
//! lands in one contiguous slot. A slot is reserved ("armed") when the port
//! opens and again after each completed transfer; when no slot can be
//! reserved the path stays disarmed and the next transfer is dropped until
//! the control task has drained the ring.

use embassy_sync::blocking_mutex::raw::RawMutex;

use crate::config::USB_MAX_RX_SIZE;
use crate::control::{notify_data_received, ControlQueue};
use crate::ring::{RingError, SharedRing};
use crate::transport::TransportId;

/// USB producer state
#[derive(Debug, Default)]
pub struct UsbRx {
    armed: bool,
}

impl UsbRx {
    /// Create a closed port
    pub const fn new() -> Self {
        Self { armed: false }
    }

    /// True while a transfer slot is reserved
    pub fn is_armed(&self) -> bool {
        self.armed
    }

    /// Host opened the port: reserve the slot for the first transfer
    pub fn port_open<M: RawMutex, const N: usize>(
        &mut self,
        ring: &SharedRing<M, N>,
    ) -> Result<(), RingError> {
        self.arm(ring)
    }

    /// Host closed the port
    pub fn port_close(&mut self) {
        self.armed = false;
    }

    /// A transfer completed with `packet`
    ///
    /// Stores the packet in the reserved slot, re-arms for the next transfer
    /// and notifies the control task. Bytes beyond [`USB_MAX_RX_SIZE`] are
    /// dropped. Returns the number of bytes stored.
    ///
    /// # Errors
    ///
    /// [`RingError::Full`] if no slot could be reserved; the packet is lost.
    pub fn rx_done<M: RawMutex, const N: usize>(
        &mut self,
        ring: &SharedRing<M, N>,
        queue: &ControlQueue<M>,
        packet: &[u8],
    ) -> Result<usize, RingError> {
        if !self.armed {
            // Ring was full at the previous completion; try again now.
            if let Err(e) = self.arm(ring) {
                warn!("USB: no RX slot, {} bytes dropped", packet.len());
                return Err(e);
            }
        }

        let len = packet.len().min(USB_MAX_RX_SIZE);
        if len < packet.len() {
            warn!("USB: transfer of {} bytes truncated", packet.len());
        }

        let stored = ring.write_chunk(USB_MAX_RX_SIZE, |slot| {
            let n = len.min(slot.len());
            slot[..n].copy_from_slice(&packet[..n]);
            n
        });
        self.armed = false;

        // Set up the next transfer. Failure leaves us disarmed; the ring is
        // still handed to the control task below.
        let _ = self.arm(ring);
        notify_data_received(queue, TransportId::Usb);

        trace!("USB: {} bytes received", len);
        stored
    }

    fn arm<M: RawMutex, const N: usize>(
        &mut self,
        ring: &SharedRing<M, N>,
    ) -> Result<(), RingError> {
        self.armed = ring
            .lock(|r| r.write_slot(USB_MAX_RX_SIZE).map(|_| ()))
            .is_ok();
        if self.armed {
            Ok(())
        } else {
            Err(RingError::Full)
        }
    }
}
