//! Ring shared between an interrupt producer and the control task

use core::cell::RefCell;

use dwlink_hal::RxSource;
use embassy_sync::blocking_mutex::raw::RawMutex;
use embassy_sync::blocking_mutex::Mutex;

use super::{ChunkedRingBuffer, RingError};

/// [`ChunkedRingBuffer`] guarded by a platform lock
///
/// Every operation runs with `M` held, so it can be called from interrupt
/// context and from tasks alike. On target `M` is
/// `CriticalSectionRawMutex`; single-threaded tests use `NoopRawMutex`.
pub struct SharedRing<M: RawMutex, const N: usize> {
    inner: Mutex<M, RefCell<ChunkedRingBuffer<N>>>,
}

impl<M: RawMutex, const N: usize> SharedRing<M, N> {
    /// Create an empty shared ring, usable in a `static`
    pub const fn new(chunk_size: usize) -> Self {
        Self {
            inner: Mutex::new(RefCell::new(ChunkedRingBuffer::new(chunk_size))),
        }
    }

    /// Run `f` with exclusive access to the ring
    ///
    /// Use this to make several operations atomic, e.g. to drain a whole
    /// command without the producer interleaving.
    ///
    /// # Panics
    ///
    /// If called re-entrantly from inside `f`.
    pub fn lock<R>(&self, f: impl FnOnce(&mut ChunkedRingBuffer<N>) -> R) -> R {
        self.inner.lock(|cell| f(&mut *cell.borrow_mut()))
    }

    /// Append one byte (UART receive path)
    pub fn write_byte(&self, byte: u8) -> Result<(), RingError> {
        self.lock(|ring| ring.write_byte(byte))
    }

    /// Reserve up to `max_write` bytes, let `fill` write into the slot and
    /// commit what it reports (USB receive path)
    ///
    /// `fill` runs with the lock held and returns the number of bytes it
    /// wrote; the value is clamped to the slot length.
    pub fn write_chunk<F>(&self, max_write: usize, fill: F) -> Result<usize, RingError>
    where
        F: FnOnce(&mut [u8]) -> usize,
    {
        self.lock(|ring| {
            let slot = ring.write_slot(max_write)?;
            let len = slot.len();
            let written = fill(slot).min(len);
            ring.commit_write(written);
            Ok(written)
        })
    }

    /// Remove and return the oldest byte
    pub fn read_byte(&self) -> Result<u8, RingError> {
        self.lock(|ring| ring.read_byte())
    }

    /// Move up to `dest.len()` bytes out of the ring
    pub fn copy_out(&self, dest: &mut [u8]) -> usize {
        self.lock(|ring| ring.copy_out(dest))
    }

    /// Readable bytes
    pub fn len(&self) -> usize {
        self.lock(|ring| ring.len())
    }

    /// True if there is nothing to read
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Drop all content
    pub fn reset(&self) {
        self.lock(|ring| ring.reset());
    }
}

/// Byte source with one lock round-trip per call
impl<M: RawMutex, const N: usize> RxSource for &SharedRing<M, N> {
    fn available(&self) -> usize {
        self.len()
    }

    fn read_byte(&mut self) -> Option<u8> {
        self.lock(|ring| RxSource::read_byte(ring))
    }

    fn copy_out(&mut self, dest: &mut [u8]) -> usize {
        self.lock(|ring| RxSource::copy_out(ring, dest))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use embassy_sync::blocking_mutex::raw::NoopRawMutex;

    #[test]
    fn test_write_chunk_commits_reported_length() {
        let ring = SharedRing::<NoopRawMutex, 16>::new(8);

        let written = ring
            .write_chunk(8, |slot| {
                slot[..3].copy_from_slice(b"abc");
                3
            })
            .unwrap();

        assert_eq!(written, 3);
        assert_eq!(ring.len(), 3);
        let mut out = [0u8; 8];
        assert_eq!(ring.copy_out(&mut out), 3);
        assert_eq!(&out[..3], b"abc");
    }

    #[test]
    fn test_write_chunk_clamps_overreport() {
        let ring = SharedRing::<NoopRawMutex, 8>::new(4);
        let written = ring.write_chunk(2, |_| 100).unwrap();
        assert_eq!(written, 2);
        assert_eq!(ring.len(), 2);
    }

    #[test]
    fn test_write_chunk_full_skips_fill() {
        let ring = SharedRing::<NoopRawMutex, 8>::new(4);
        ring.write_chunk(4, |slot| slot.len()).unwrap();
        ring.write_chunk(4, |slot| slot.len()).unwrap();

        let mut called = false;
        let result = ring.write_chunk(4, |_| {
            called = true;
            0
        });

        assert_eq!(result, Err(RingError::Full));
        assert!(!called);
    }

    #[test]
    fn test_source_view_reads_through_lock() {
        let ring = SharedRing::<NoopRawMutex, 8>::new(1);
        ring.write_byte(b'x').unwrap();
        ring.write_byte(b'y').unwrap();

        let mut src = &ring;
        assert_eq!(src.available(), 2);
        assert_eq!(RxSource::read_byte(&mut src), Some(b'x'));
        let mut out = [0u8; 4];
        assert_eq!(RxSource::copy_out(&mut src, &mut out), 1);
        assert_eq!(out[0], b'y');
        assert_eq!(RxSource::read_byte(&mut src), None);
    }

    #[test]
    fn test_reset_empties_ring() {
        let ring = SharedRing::<NoopRawMutex, 8>::new(1);
        ring.write_byte(1).unwrap();
        ring.reset();
        assert!(ring.is_empty());
        assert_eq!(ring.read_byte(), Err(RingError::Empty));
    }
}
