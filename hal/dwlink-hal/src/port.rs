//! Byte transmit port abstraction
//!
//! USB CDC and UART both end up as "write these bytes back to the host".
//! The command framer uses it for local echo, the UCI transport for
//! outgoing packets.

/// Transmit side of a host-facing transport
pub trait PortTx {
    /// Error type for transmit operations
    type Error;

    /// Write data to the port
    ///
    /// Blocks until all data has been queued or an error occurs.
    fn write_blocking(&mut self, data: &[u8]) -> Result<(), Self::Error>;

    /// Flush any buffered data
    fn flush(&mut self) -> Result<(), Self::Error> {
        Ok(())
    }
}

impl<T: PortTx + ?Sized> PortTx for &mut T {
    type Error = T::Error;

    fn write_blocking(&mut self, data: &[u8]) -> Result<(), Self::Error> {
        T::write_blocking(self, data)
    }

    fn flush(&mut self) -> Result<(), Self::Error> {
        T::flush(self)
    }
}

/// Port that discards everything written to it
///
/// Used where a transport has no echo path (e.g. BLE).
#[derive(Debug, Default, Clone, Copy)]
pub struct NullPort;

impl PortTx for NullPort {
    type Error = core::convert::Infallible;

    fn write_blocking(&mut self, _data: &[u8]) -> Result<(), Self::Error> {
        Ok(())
    }
}

/// Adapter exposing any [`embedded_io::Write`] as a [`PortTx`]
#[cfg(feature = "embedded-io")]
pub struct IoPort<W>(pub W);

#[cfg(feature = "embedded-io")]
impl<W: embedded_io::Write> PortTx for IoPort<W> {
    type Error = W::Error;

    fn write_blocking(&mut self, data: &[u8]) -> Result<(), Self::Error> {
        self.0.write_all(data)
    }

    fn flush(&mut self) -> Result<(), Self::Error> {
        self.0.flush()
    }
}
