//! Control task loop body

use embassy_sync::blocking_mutex::raw::RawMutex;

use super::{ControlMessage, ControlQueue, RxHandler, RxOutcome};
use crate::config::RxMode;
use crate::transport::TransportId;

/// Application side of the control task
///
/// Called for every data notification, including those that produced no
/// complete command, so the application can poll its own state. A
/// notification whose bytes hold several commands dispatches each of them.
pub trait Dispatcher {
    /// Handle the outcome of draining `port`
    ///
    /// In UCI mode this is where the application runs
    /// [`RxHandler::read_uci`] with its block pool and ranging engine.
    fn dispatch<H: RxHandler>(&mut self, outcome: RxOutcome, port: &mut H);

    /// The running application was asked to stop
    fn stop(&mut self) {}
}

/// Routes control messages to the transport ports and the dispatcher
#[derive(Debug)]
pub struct Control<D> {
    mode: RxMode,
    dispatcher: D,
}

impl<D: Dispatcher> Control<D> {
    /// Create a control task body starting in `mode`
    pub fn new(mode: RxMode, dispatcher: D) -> Self {
        Self { mode, dispatcher }
    }

    /// Active receive mode
    pub fn mode(&self) -> RxMode {
        self.mode
    }

    /// Switch framers; takes effect with the next message
    pub fn set_mode(&mut self, mode: RxMode) {
        debug!("CONTROL: mode {}", mode);
        self.mode = mode;
    }

    /// Application dispatcher
    pub fn dispatcher(&self) -> &D {
        &self.dispatcher
    }

    /// Mutable access to the application dispatcher
    pub fn dispatcher_mut(&mut self) -> &mut D {
        &mut self.dispatcher
    }

    /// Handle one message
    pub fn handle<U, A>(&mut self, msg: ControlMessage, usb: &mut U, uart: &mut A)
    where
        U: RxHandler,
        A: RxHandler,
    {
        match msg {
            ControlMessage::DataReceived(TransportId::Usb) => self.route(usb),
            ControlMessage::DataReceived(TransportId::Uart) => self.route(uart),
            ControlMessage::StopApp => {
                debug!("CONTROL: stop requested");
                self.dispatcher.stop();
            }
        }
    }

    /// Wait for the next message on `queue` and handle it
    ///
    /// Returns the message that was handled.
    pub async fn process_next<M, U, A>(
        &mut self,
        queue: &ControlQueue<M>,
        usb: &mut U,
        uart: &mut A,
    ) -> ControlMessage
    where
        M: RawMutex,
        U: RxHandler,
        A: RxHandler,
    {
        let msg = queue.receive().await;
        trace!("CONTROL: {}", msg);
        self.handle(msg, usb, uart);
        msg
    }

    fn route<H: RxHandler>(&mut self, port: &mut H) {
        let mut outcome = port.on_rx(self.mode);
        loop {
            let command = matches!(outcome, RxOutcome::CommandReady(_));
            self.dispatcher.dispatch(outcome, port);
            if !command {
                return;
            }

            // One notification may cover several commands.
            outcome = port.on_rx(self.mode);
            if matches!(outcome, RxOutcome::NoData) {
                return;
            }
        }
    }
}
