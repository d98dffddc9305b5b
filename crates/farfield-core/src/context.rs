//! Block context providing the SIMT facade for kernel bodies.
//!
//! A kernel body receives one [`BlockContext`] per block. The body is written
//! as a sequence of phases separated by [`BlockContext::sync_threads`]. Each
//! phase is executed for every thread of the block before the barrier is
//! crossed, which gives the barrier its full-group semantics: no thread observes
//! block-shared state written in a phase until every thread has finished it.

use std::sync::atomic::{fence, Ordering};

use crate::types::{BlockId, Dim3, ThreadId};

/// Block-scoped execution context.
pub struct BlockContext {
    /// Block identity within grid.
    block_id: BlockId,
    /// Block dimensions.
    block_dim: Dim3,
    /// Grid dimensions.
    grid_dim: Dim3,
    /// Barriers crossed so far.
    barriers: u64,
}

impl BlockContext {
    /// Create a new context.
    pub fn new(block_id: BlockId, block_dim: Dim3, grid_dim: Dim3) -> Self {
        Self {
            block_id,
            block_dim,
            grid_dim,
            barriers: 0,
        }
    }

    // === Identity ===

    /// Get block ID within grid.
    #[inline]
    pub fn block_id(&self) -> BlockId {
        self.block_id
    }

    /// Linear block index within the grid.
    #[inline]
    pub fn block_index(&self) -> usize {
        self.block_id.linear_for_dim(self.grid_dim) as usize
    }

    /// Get block dimensions.
    #[inline]
    pub fn block_dim(&self) -> Dim3 {
        self.block_dim
    }

    /// Get grid dimensions.
    #[inline]
    pub fn grid_dim(&self) -> Dim3 {
        self.grid_dim
    }

    /// Number of threads in the block.
    #[inline]
    pub fn num_threads(&self) -> usize {
        self.block_dim.linear() as usize
    }

    // === Phases ===

    /// Run one phase of the kernel body on every thread of the block.
    ///
    /// Threads are visited in index order. Kernel code must not rely on that
    /// order; anything shared between threads goes through atomics or waits
    /// for the next barrier.
    #[inline]
    pub fn for_each_thread<F>(&self, mut f: F)
    where
        F: FnMut(ThreadId),
    {
        for t in 0..self.block_dim.linear() {
            f(ThreadId::new_1d(t));
        }
    }

    /// Run one phase on the designated worker (thread 0) only.
    #[inline]
    pub fn single<F, R>(&self, f: F) -> R
    where
        F: FnOnce(ThreadId) -> R,
    {
        f(ThreadId::new_1d(0))
    }

    // === Synchronization ===

    /// Synchronize all threads in the block.
    ///
    /// All threads in the block must reach this barrier before any
    /// thread can proceed past it.
    #[inline]
    pub fn sync_threads(&mut self) {
        fence(Ordering::SeqCst);
        self.barriers += 1;
    }

    /// Barriers crossed by this block so far.
    #[inline]
    pub fn barrier_count(&self) -> u64 {
        self.barriers
    }
}

impl std::fmt::Debug for BlockContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BlockContext")
            .field("block_id", &self.block_id)
            .field("block_dim", &self.block_dim)
            .field("grid_dim", &self.grid_dim)
            .field("barriers", &self.barriers)
            .finish()
    }
}
