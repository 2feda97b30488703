//! Pull side of a transport receive buffer
//!
//! Framers never see the ring buffer type directly; they drain whatever
//! implements [`RxSource`]. Implementations that are shared with an
//! interrupt-context writer take their own critical section per call.

/// Byte source drained by the framers
pub trait RxSource {
    /// Number of bytes currently readable
    fn available(&self) -> usize;

    /// Remove and return the oldest byte, or `None` when empty
    fn read_byte(&mut self) -> Option<u8>;

    /// Move up to `dest.len()` bytes into `dest`
    ///
    /// Returns the number of bytes copied (0 when empty).
    fn copy_out(&mut self, dest: &mut [u8]) -> usize;
}

impl<T: RxSource + ?Sized> RxSource for &mut T {
    fn available(&self) -> usize {
        T::available(self)
    }

    fn read_byte(&mut self) -> Option<u8> {
        T::read_byte(self)
    }

    fn copy_out(&mut self, dest: &mut [u8]) -> usize {
        T::copy_out(self, dest)
    }
}

/// [`RxSource`] over a borrowed slice
///
/// Handy for feeding framers from data that is already contiguous.
#[derive(Debug)]
pub struct SliceSource<'a> {
    data: &'a [u8],
}

impl<'a> SliceSource<'a> {
    /// Wrap a slice
    pub fn new(data: &'a [u8]) -> Self {
        Self { data }
    }

    /// Bytes not yet consumed
    pub fn remaining(&self) -> &'a [u8] {
        self.data
    }
}

impl RxSource for SliceSource<'_> {
    fn available(&self) -> usize {
        self.data.len()
    }

    fn read_byte(&mut self) -> Option<u8> {
        let (&first, rest) = self.data.split_first()?;
        self.data = rest;
        Some(first)
    }

    fn copy_out(&mut self, dest: &mut [u8]) -> usize {
        let n = dest.len().min(self.data.len());
        let (head, rest) = self.data.split_at(n);
        dest[..n].copy_from_slice(head);
        self.data = rest;
        n
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_slice_source_drains_in_order() {
        let mut src = SliceSource::new(b"abcdef");
        assert_eq!(src.read_byte(), Some(b'a'));

        let mut out = [0u8; 3];
        assert_eq!(src.copy_out(&mut out), 3);
        assert_eq!(&out, b"bcd");
        assert_eq!(src.available(), 2);

        let mut big = [0u8; 8];
        assert_eq!(src.copy_out(&mut big), 2);
        assert_eq!(&big[..2], b"ef");
        assert_eq!(src.read_byte(), None);
        assert_eq!(src.copy_out(&mut big), 0);
    }
}
