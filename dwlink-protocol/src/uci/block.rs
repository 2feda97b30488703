//! Packet storage blocks and the pool that owns them

use alloc::boxed::Box;

use super::UCI_MAX_PACKET_SIZE;

/// One storage node of a UCI packet
///
/// Large packets are carried as a chain linked through `next`. Each node
/// has a single owner at any time: the pool, the framer, or the engine.
#[derive(Debug)]
pub struct UciBlock {
    data: [u8; UCI_MAX_PACKET_SIZE],
    capacity: usize,
    len: usize,
    next: Option<Box<UciBlock>>,
}

impl UciBlock {
    /// Create an empty block able to hold `capacity` bytes
    ///
    /// `capacity` is clamped to [`UCI_MAX_PACKET_SIZE`].
    pub fn new(capacity: usize) -> Self {
        Self {
            data: [0; UCI_MAX_PACKET_SIZE],
            capacity: capacity.min(UCI_MAX_PACKET_SIZE),
            len: 0,
            next: None,
        }
    }

    /// Create a block holding a copy of `bytes`
    ///
    /// Returns `None` if `bytes` does not fit in one block.
    pub fn from_slice(bytes: &[u8]) -> Option<Self> {
        if bytes.len() > UCI_MAX_PACKET_SIZE {
            return None;
        }
        let mut block = Self::new(bytes.len());
        block.data[..bytes.len()].copy_from_slice(bytes);
        block.len = bytes.len();
        Some(block)
    }

    /// Valid bytes of this block
    pub fn data(&self) -> &[u8] {
        &self.data[..self.len]
    }

    /// Whole writable area of this block
    pub fn storage_mut(&mut self) -> &mut [u8] {
        &mut self.data[..self.capacity]
    }

    /// Raw byte at `index`, regardless of the current length
    pub(crate) fn byte_at(&self, index: usize) -> u8 {
        self.data[index]
    }

    /// Number of valid bytes
    pub fn len(&self) -> usize {
        self.len
    }

    /// True if no bytes are valid
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Writable size of this block
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Mark the first `len` bytes as valid
    ///
    /// # Panics
    ///
    /// If `len` exceeds the block capacity.
    pub fn set_len(&mut self, len: usize) {
        assert!(len <= self.capacity, "UCI block length beyond capacity");
        self.len = len;
    }

    /// Next block of the chain
    pub fn next(&self) -> Option<&UciBlock> {
        self.next.as_deref()
    }

    /// Detach and return the rest of the chain
    pub fn take_next(&mut self) -> Option<Box<UciBlock>> {
        self.next.take()
    }

    /// Append `block` (and whatever follows it) to the end of this chain
    pub fn append(&mut self, block: Box<UciBlock>) {
        let mut slot = &mut self.next;
        while let Some(node) = slot {
            slot = &mut node.next;
        }
        *slot = Some(block);
    }

    /// Iterate over this block and every block chained after it
    pub fn chain(&self) -> impl Iterator<Item = &UciBlock> {
        core::iter::successors(Some(self), |block| block.next())
    }

    /// Total valid bytes across the chain
    pub fn chain_len(&self) -> usize {
        self.chain().map(UciBlock::len).sum()
    }
}

/// Allocator for packet blocks (owned by the ranging engine)
pub trait BlockPool {
    /// Allocate a block able to hold `max_size` bytes
    ///
    /// Returns `None` when the pool is exhausted.
    fn allocate(&mut self, max_size: usize) -> Option<Box<UciBlock>>;

    /// Return a single block to the pool
    ///
    /// Any chained blocks must be released separately (see
    /// [`BlockPool::free_chain`]).
    fn free(&mut self, block: Box<UciBlock>);

    /// Return a whole chain to the pool, head first
    fn free_chain(&mut self, head: Box<UciBlock>) {
        let mut next = Some(head);
        while let Some(mut block) = next {
            next = block.take_next();
            self.free(block);
        }
    }
}

/// Heap-backed pool with a fixed number of outstanding blocks
///
/// Tracks how many blocks are currently handed out, so leaks show up as a
/// count that does not return to its baseline.
#[derive(Debug, Default)]
pub struct FixedBlockPool<const N: usize> {
    in_use: usize,
}

impl<const N: usize> FixedBlockPool<N> {
    /// Create an empty pool
    pub const fn new() -> Self {
        Self { in_use: 0 }
    }

    /// Blocks currently allocated and not yet freed
    pub fn in_use(&self) -> usize {
        self.in_use
    }

    /// Blocks still available
    pub fn available(&self) -> usize {
        N - self.in_use
    }
}

impl<const N: usize> BlockPool for FixedBlockPool<N> {
    fn allocate(&mut self, max_size: usize) -> Option<Box<UciBlock>> {
        if max_size > UCI_MAX_PACKET_SIZE || self.in_use >= N {
            return None;
        }
        self.in_use += 1;
        Some(Box::new(UciBlock::new(max_size)))
    }

    fn free(&mut self, block: Box<UciBlock>) {
        debug_assert!(block.next.is_none(), "free() on a chained block");
        self.in_use = self.in_use.saturating_sub(1);
    }
}
