//! UCI packet reassembly
//!
//! A read copies as many bytes as the current phase needs (rest of the
//! header, then rest of the declared body) straight from the receive
//! buffer into the packet block. Complete packets go upstream at once;
//! the next packet may start in the same read.
//!
//! A packet left incomplete is timestamped. If a later read still finds it
//! incomplete more than [`UCI_GARBAGE_TIMEOUT_MS`] after it started, the
//! partial block is returned to the pool and the read fails with
//! [`UciError::Timeout`]. The check only runs when new bytes arrive.

use alloc::boxed::Box;

use dwlink_hal::{MonotonicClock, RxSource};

use super::{
    BlockPool, PacketSink, UciBlock, UciError, UCI_GARBAGE_TIMEOUT_MS, UCI_MAX_PACKET_SIZE,
    UCI_PACKET_HEADER_SIZE, UCI_PAYLOAD_LENGTH_OFFSET,
};

/// Reassembly state for one transport
#[derive(Debug, Default)]
pub struct UciFramer {
    /// Block being filled, if a packet is in progress
    rx: Option<Box<UciBlock>>,
    /// Bytes of the current packet received so far
    offset: usize,
    /// Start of the current partial packet (µs), set while one is pending
    pending_since: Option<i64>,
}

impl UciFramer {
    /// Create an idle framer
    pub const fn new() -> Self {
        Self {
            rx: None,
            offset: 0,
            pending_since: None,
        }
    }

    /// True while a partial packet is held
    pub fn in_progress(&self) -> bool {
        self.rx.is_some()
    }

    /// Bytes of the partial packet received so far
    pub fn offset(&self) -> usize {
        self.offset
    }

    /// Consume the bytes currently available in `source`
    ///
    /// Every packet completed on the way is handed to `sink`. Returns the
    /// number of packets delivered.
    ///
    /// # Errors
    ///
    /// - [`UciError::NoMemory`] if no block could be allocated; nothing was
    ///   consumed for the packet that needed it.
    /// - [`UciError::Timeout`] if the partial packet went stale; it has been
    ///   discarded and any bytes left in `source` are kept for the next read.
    pub fn read<S, P, C, K>(
        &mut self,
        source: &mut S,
        pool: &mut P,
        clock: &C,
        sink: &mut K,
    ) -> Result<usize, UciError>
    where
        S: RxSource,
        P: BlockPool,
        C: MonotonicClock,
        K: PacketSink,
    {
        let mut available = source.available();
        let mut delivered = 0;

        while available > 0 {
            if self.rx.is_none() {
                match pool.allocate(UCI_MAX_PACKET_SIZE) {
                    Some(block) => self.rx = Some(block),
                    None => {
                        warn!("UCI: Packet allocation failed");
                        return Err(UciError::NoMemory);
                    }
                }
            }
            let Some(block) = self.rx.as_mut() else {
                break;
            };

            let target = if self.offset < UCI_PACKET_HEADER_SIZE {
                UCI_PACKET_HEADER_SIZE
            } else {
                packet_len(block)
            };
            let n = (target - self.offset).min(available);

            let copied = source.copy_out(&mut block.storage_mut()[self.offset..self.offset + n]);
            if copied == 0 {
                // Source drained behind our back
                break;
            }
            available = available.saturating_sub(copied);
            self.offset += copied;

            if self.offset >= UCI_PACKET_HEADER_SIZE && self.offset == packet_len(block) {
                block.set_len(self.offset);
                if let Some(packet) = self.rx.take() {
                    trace!("UCI: packet received ({} bytes)", packet.len());
                    sink.packet_received(packet);
                }
                self.offset = 0;
                self.pending_since = None;
                delivered += 1;
            } else {
                let now = clock.now_us();
                match self.pending_since {
                    None => self.pending_since = Some(now),
                    Some(start) if now.wrapping_sub(start) > UCI_GARBAGE_TIMEOUT_MS * 1000 => {
                        warn!("UCI: Timeout, flushing UCI buffer");
                        self.flush(pool);
                        return Err(UciError::Timeout);
                    }
                    Some(_) => {}
                }
            }
        }

        Ok(delivered)
    }

    /// Release any partial packet back to `pool`
    ///
    /// Safe to call when nothing is in progress.
    pub fn flush<P: BlockPool>(&mut self, pool: &mut P) {
        if let Some(block) = self.rx.take() {
            pool.free_chain(block);
        }
        self.offset = 0;
        self.pending_since = None;
    }
}

/// Total length declared by a block whose header is complete
fn packet_len(block: &UciBlock) -> usize {
    UCI_PACKET_HEADER_SIZE + block.byte_at(UCI_PAYLOAD_LENGTH_OFFSET) as usize
}
