//! Chunked circular buffer
//!
//! Works like a regular circular buffer but lets a producer write a whole
//! chunk straight into storage (e.g. a USB DMA transfer). When fewer than
//! `chunk_size` bytes remain before the physical end, the producer is moved
//! to offset 0 and the skipped tail is recorded as padding, so a chunk is
//! never split across the end. The reader skips the padding and clears it
//! once it wraps.
//!
//! ```text
//!   0                 head          tail          N-padding    N
//!   ├─────── data ─────┤─── free ────┤─── data ─────┤── padding ─┤
//! ```

use dwlink_hal::RxSource;

use super::RingError;

/// Fixed-capacity byte ring with chunk-aware wraparound
#[derive(Debug, Clone)]
pub struct ChunkedRingBuffer<const N: usize> {
    data: [u8; N],
    /// Next write position
    head: usize,
    /// Next read position
    tail: usize,
    /// Valid bytes, padding excluded
    count: usize,
    /// Unused bytes at the physical end after an early wrap
    padding: usize,
    chunk_size: usize,
}

impl<const N: usize> ChunkedRingBuffer<N> {
    /// Create an empty ring
    ///
    /// # Panics
    ///
    /// If `chunk_size` is zero or larger than `N`.
    pub const fn new(chunk_size: usize) -> Self {
        assert!(chunk_size > 0 && chunk_size <= N, "invalid chunk size");
        Self {
            data: [0; N],
            head: 0,
            tail: 0,
            count: 0,
            padding: 0,
            chunk_size,
        }
    }

    /// Drop all content; capacity and chunk size are kept
    pub fn reset(&mut self) {
        self.head = 0;
        self.tail = 0;
        self.count = 0;
        self.padding = 0;
    }

    /// Storage size
    pub const fn capacity(&self) -> usize {
        N
    }

    /// Largest single producer write
    pub fn chunk_size(&self) -> usize {
        self.chunk_size
    }

    /// Readable bytes
    pub fn len(&self) -> usize {
        self.count
    }

    /// True if there is nothing to read
    pub fn is_empty(&self) -> bool {
        self.count == 0
    }

    /// Bytes currently skipped at the physical end
    pub fn padding(&self) -> usize {
        self.padding
    }

    /// Bytes that can still be written
    pub fn free(&self) -> usize {
        N - self.count - self.padding
    }

    /// Next write position
    pub fn head(&self) -> usize {
        self.head
    }

    /// Next read position
    pub fn tail(&self) -> usize {
        self.tail
    }

    /// Reserve room for a direct write of up to `max_write` bytes
    ///
    /// Returns the writable slot starting at the write position; fill some
    /// prefix of it and report the amount with
    /// [`commit_write`](Self::commit_write). If fewer than `chunk_size` bytes
    /// remain before the physical end, the ring wraps first and the slot
    /// starts at offset 0.
    ///
    /// Fails with [`RingError::Full`] when `max_write` exceeds the free space.
    pub fn write_slot(&mut self, max_write: usize) -> Result<&mut [u8], RingError> {
        let space_left = N - self.head;
        // Only wrap while all data sits behind the write position.
        let wrap = space_left < self.chunk_size
            && self.padding == 0
            && (self.tail < self.head || self.count == 0);
        let padding = if wrap { space_left } else { self.padding };

        let free = N.saturating_sub(self.count + padding);
        if max_write > free {
            warn!("RING: not enough space for {} bytes", max_write);
            return Err(RingError::Full);
        }

        if wrap {
            self.padding = padding;
            self.head = 0;
        }

        let len = max_write.min(N - self.head);
        Ok(&mut self.data[self.head..self.head + len])
    }

    /// Account for `bytes_written` bytes placed through
    /// [`write_slot`](Self::write_slot)
    ///
    /// # Panics
    ///
    /// If more bytes are committed than there is free space.
    pub fn commit_write(&mut self, bytes_written: usize) {
        assert!(bytes_written <= self.free(), "commit beyond free space");
        self.head = (self.head + bytes_written) % N;
        self.count += bytes_written;
    }

    /// Append one byte
    pub fn write_byte(&mut self, byte: u8) -> Result<(), RingError> {
        match self.write_slot(1) {
            Ok(slot) => {
                slot[0] = byte;
                self.commit_write(1);
                Ok(())
            }
            Err(e) => {
                warn!("RING: full, byte dropped");
                Err(e)
            }
        }
    }

    /// Copy a whole chunk in, reserving, filling and committing in one go
    ///
    /// Returns the number of bytes stored; a chunk that cannot be stored
    /// whole is rejected.
    pub fn write_chunk(&mut self, bytes: &[u8]) -> Result<usize, RingError> {
        let slot = self.write_slot(bytes.len())?;
        if slot.len() < bytes.len() {
            warn!("RING: chunk of {} bytes would split, rejected", bytes.len());
            return Err(RingError::Full);
        }
        slot[..bytes.len()].copy_from_slice(bytes);
        self.commit_write(bytes.len());
        Ok(bytes.len())
    }

    /// Remove and return the oldest byte
    pub fn read_byte(&mut self) -> Result<u8, RingError> {
        let mut byte = [0u8; 1];
        match self.copy_out(&mut byte) {
            1 => Ok(byte[0]),
            _ => Err(RingError::Empty),
        }
    }

    /// Move up to `dest.len()` bytes into `dest`, oldest first
    ///
    /// Reads that cross the wrap point skip the padding and clear it.
    /// Returns the number of bytes copied; 0 if the ring was empty.
    pub fn copy_out(&mut self, dest: &mut [u8]) -> usize {
        if self.count == 0 {
            warn!("RING: empty, nothing to read");
            return 0;
        }

        let read_cnt = dest.len().min(self.count);
        let space_to_end = N - self.tail - self.padding;

        if read_cnt > space_to_end {
            let (first, second) = dest[..read_cnt].split_at_mut(space_to_end);
            first.copy_from_slice(&self.data[self.tail..self.tail + space_to_end]);
            second.copy_from_slice(&self.data[..read_cnt - space_to_end]);
            self.tail = read_cnt - space_to_end;
            self.padding = 0;
        } else {
            dest[..read_cnt].copy_from_slice(&self.data[self.tail..self.tail + read_cnt]);
            self.tail += read_cnt;
            if self.tail == N - self.padding {
                self.tail = 0;
                self.padding = 0;
            }
        }
        self.count -= read_cnt;

        read_cnt
    }
}

impl<const N: usize> RxSource for ChunkedRingBuffer<N> {
    fn available(&self) -> usize {
        self.count
    }

    fn read_byte(&mut self) -> Option<u8> {
        if self.is_empty() {
            return None;
        }
        ChunkedRingBuffer::read_byte(self).ok()
    }

    fn copy_out(&mut self, dest: &mut [u8]) -> usize {
        if self.is_empty() {
            return 0;
        }
        ChunkedRingBuffer::copy_out(self, dest)
    }
}
