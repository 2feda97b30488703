//! UCI transport glue between a host port and the ranging engine

use dwlink_hal::{MonotonicClock, PortTx, RxSource};

use super::{BlockPool, UciError, UciFramer, UciStack};

/// UCI endpoint bound to one host transport (USB or UART)
#[derive(Debug, Default)]
pub struct UciTransport {
    framer: UciFramer,
    attached: bool,
}

impl UciTransport {
    /// Create a detached transport
    pub const fn new() -> Self {
        Self {
            framer: UciFramer::new(),
            attached: false,
        }
    }

    /// Start routing traffic to the engine
    pub fn attach(&mut self) {
        self.attached = true;
    }

    /// Stop routing traffic and release any partial packet
    pub fn detach<P: BlockPool>(&mut self, pool: &mut P) {
        self.framer.flush(pool);
        self.attached = false;
    }

    /// True between [`attach`](Self::attach) and [`detach`](Self::detach)
    pub fn is_attached(&self) -> bool {
        self.attached
    }

    /// Reassembly state
    pub fn framer(&self) -> &UciFramer {
        &self.framer
    }

    /// Feed received bytes to the engine
    ///
    /// Bytes arriving while detached are left in `source`.
    pub fn read<S, P, C, E>(
        &mut self,
        source: &mut S,
        pool: &mut P,
        clock: &C,
        stack: &mut E,
    ) -> Result<usize, UciError>
    where
        S: RxSource,
        P: BlockPool,
        C: MonotonicClock,
        E: UciStack,
    {
        if !self.attached {
            return Ok(0);
        }
        self.framer.read(source, pool, clock, stack)
    }

    /// Drop any partial packet
    pub fn flush<P: BlockPool>(&mut self, pool: &mut P) {
        self.framer.flush(pool);
    }

    /// Write out every packet the engine has ready
    ///
    /// Each chain is written block by block, then handed back to the engine
    /// through [`UciStack::send_done`]. Returns the number of packets sent.
    pub fn send_ready<E, T>(&mut self, stack: &mut E, tx: &mut T) -> usize
    where
        E: UciStack,
        T: PortTx,
    {
        let mut sent = 0;
        while let Some(packet) = stack.next_to_send() {
            for block in packet.chain() {
                if tx.write_blocking(block.data()).is_err() {
                    warn!("UCI: transmit failed ({} bytes)", block.len());
                }
            }
            stack.send_done(packet);
            sent += 1;
        }
        sent
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::uci::{FixedBlockPool, PacketSink, UciBlock};
    use alloc::boxed::Box;
    use alloc::collections::VecDeque;
    use alloc::vec::Vec;
    use dwlink_hal::source::SliceSource;

    struct FixedClock;

    impl MonotonicClock for FixedClock {
        fn now_us(&self) -> i64 {
            0
        }
    }

    #[derive(Default)]
    struct Engine {
        received: Vec<Box<UciBlock>>,
        outgoing: VecDeque<Box<UciBlock>>,
        done: usize,
    }

    impl PacketSink for Engine {
        fn packet_received(&mut self, packet: Box<UciBlock>) {
            self.received.push(packet);
        }
    }

    impl UciStack for Engine {
        fn next_to_send(&mut self) -> Option<Box<UciBlock>> {
            self.outgoing.pop_front()
        }

        fn send_done(&mut self, _packet: Box<UciBlock>) {
            self.done += 1;
        }
    }

    #[derive(Default)]
    struct Wire(Vec<u8>);

    impl PortTx for Wire {
        type Error = ();

        fn write_blocking(&mut self, data: &[u8]) -> Result<(), ()> {
            self.0.extend_from_slice(data);
            Ok(())
        }
    }

    #[test]
    fn test_detached_transport_ignores_input() {
        let mut tp = UciTransport::new();
        let mut pool = FixedBlockPool::<2>::new();
        let mut engine = Engine::default();
        let mut src = SliceSource::new(&[0x20, 0x00, 0x00, 0x00]);

        assert_eq!(tp.read(&mut src, &mut pool, &FixedClock, &mut engine), Ok(0));
        assert_eq!(src.available(), 4);

        tp.attach();
        assert_eq!(tp.read(&mut src, &mut pool, &FixedClock, &mut engine), Ok(1));
        assert_eq!(engine.received.len(), 1);
    }

    #[test]
    fn test_detach_releases_partial_packet() {
        let mut tp = UciTransport::new();
        let mut pool = FixedBlockPool::<2>::new();
        let mut engine = Engine::default();
        tp.attach();

        tp.read(&mut SliceSource::new(&[0x20, 0x00]), &mut pool, &FixedClock, &mut engine)
            .unwrap();
        assert_eq!(pool.in_use(), 1);

        tp.detach(&mut pool);
        assert_eq!(pool.in_use(), 0);
        assert!(!tp.is_attached());
        assert!(!tp.framer().in_progress());
    }

    #[test]
    fn test_send_ready_writes_chains_in_order() {
        let mut tp = UciTransport::new();
        let mut engine = Engine::default();
        let mut wire = Wire::default();

        let mut first = Box::new(UciBlock::from_slice(&[0x40, 0x00, 0x00, 0x02]).unwrap());
        first.append(Box::new(UciBlock::from_slice(&[0xDE, 0xAD]).unwrap()));
        engine.outgoing.push_back(first);
        engine
            .outgoing
            .push_back(Box::new(UciBlock::from_slice(&[0x60, 0x01, 0x00, 0x00]).unwrap()));

        assert_eq!(tp.send_ready(&mut engine, &mut wire), 2);
        assert_eq!(
            wire.0.as_slice(),
            &[0x40, 0x00, 0x00, 0x02, 0xDE, 0xAD, 0x60, 0x01, 0x00, 0x00]
        );
        assert_eq!(engine.done, 2);
        assert_eq!(tp.send_ready(&mut engine, &mut wire), 0);
    }
}
