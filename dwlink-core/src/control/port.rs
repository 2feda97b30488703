//! Per-transport receive port

use dwlink_hal::{MonotonicClock, PortTx};
use dwlink_protocol::{BlockPool, CommandFramer, UciError, UciStack, UciTransport};
use embassy_sync::blocking_mutex::raw::RawMutex;

use super::RxOutcome;
use crate::config::RxMode;
use crate::ring::SharedRing;
use crate::transport::TransportId;

/// Consumer side of one transport, as seen by the control task
pub trait RxHandler {
    /// Transport this handler drains
    fn transport(&self) -> TransportId;

    /// Drain pending bytes according to `mode`
    fn on_rx(&mut self, mode: RxMode) -> RxOutcome;

    /// Run the UCI framer over pending bytes
    ///
    /// Returns the number of packets handed to `stack`.
    fn read_uci<P, C, S>(
        &mut self,
        pool: &mut P,
        clock: &C,
        stack: &mut S,
    ) -> Result<usize, UciError>
    where
        P: BlockPool,
        C: MonotonicClock,
        S: UciStack;

    /// Write every packet `stack` has ready back to the host
    fn send_uci<S: UciStack>(&mut self, stack: &mut S) -> usize;

    /// Drop all receive state
    fn detach<P: BlockPool>(&mut self, pool: &mut P);
}

/// Receive port: a transport ring plus the framer state that drains it
///
/// `tx` is the transport's transmit side, used for command echo and
/// outgoing UCI packets.
pub struct RxPort<'a, M: RawMutex, const N: usize, T> {
    id: TransportId,
    ring: &'a SharedRing<M, N>,
    commands: CommandFramer,
    uci: UciTransport,
    tx: T,
}

impl<'a, M: RawMutex, const N: usize, T: PortTx> RxPort<'a, M, N, T> {
    /// Create a port draining `ring`
    pub fn new(id: TransportId, ring: &'a SharedRing<M, N>, tx: T) -> Self {
        Self {
            id,
            ring,
            commands: CommandFramer::new(),
            uci: UciTransport::new(),
            tx,
        }
    }

    /// Command framer state
    pub fn commands(&self) -> &CommandFramer {
        &self.commands
    }

    /// UCI endpoint
    pub fn uci(&self) -> &UciTransport {
        &self.uci
    }

    /// Start delivering UCI packets from this port
    pub fn attach_uci(&mut self) {
        self.uci.attach();
    }

    /// Transmit side
    pub fn tx_mut(&mut self) -> &mut T {
        &mut self.tx
    }

    /// Receive ring
    pub fn ring(&self) -> &'a SharedRing<M, N> {
        self.ring
    }
}

impl<M: RawMutex, const N: usize, T: PortTx> RxHandler for RxPort<'_, M, N, T> {
    fn transport(&self) -> TransportId {
        self.id
    }

    fn on_rx(&mut self, mode: RxMode) -> RxOutcome {
        if self.ring.is_empty() {
            return RxOutcome::NoData;
        }

        match mode {
            RxMode::Cli => {
                let commands = &mut self.commands;
                let tx = &mut self.tx;
                // Hold the ring for the whole command so the interrupt
                // cannot interleave with the echo.
                match self.ring.lock(|ring| commands.drain(ring, tx)) {
                    Some(command) => {
                        debug!(
                            "CONTROL: command ready on {} ({} bytes)",
                            self.id,
                            command.len()
                        );
                        RxOutcome::CommandReady(command)
                    }
                    None => RxOutcome::NoData,
                }
            }
            RxMode::Uci => RxOutcome::DataReady,
        }
    }

    fn read_uci<P, C, S>(
        &mut self,
        pool: &mut P,
        clock: &C,
        stack: &mut S,
    ) -> Result<usize, UciError>
    where
        P: BlockPool,
        C: MonotonicClock,
        S: UciStack,
    {
        let mut source = self.ring;
        self.uci.read(&mut source, pool, clock, stack)
    }

    fn send_uci<S: UciStack>(&mut self, stack: &mut S) -> usize {
        self.uci.send_ready(stack, &mut self.tx)
    }

    fn detach<P: BlockPool>(&mut self, pool: &mut P) {
        debug!("CONTROL: detaching {}", self.id);
        self.ring.reset();
        self.uci.detach(pool);
        self.commands.reset();
    }
}
