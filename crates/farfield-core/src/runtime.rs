//! CPU launcher for block-structured kernels.
//!
//! Every block of the grid is independent, so the launcher hands blocks to a
//! rayon pool. Inside a block the body runs phase by phase through its
//! [`BlockContext`].

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};

use parking_lot::RwLock;
use rayon::prelude::*;
use tracing::{debug, info};

use crate::context::BlockContext;
use crate::error::{CoreError, Result};
use crate::types::{BlockId, Dim3};

/// Options for launching a kernel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LaunchOptions {
    /// Number of blocks.
    pub grid_size: u32,
    /// Threads per block.
    pub block_size: u32,
    /// Run blocks concurrently.
    pub parallel: bool,
}

impl LaunchOptions {
    /// Create launch options for a 1D grid of 1D blocks.
    pub fn new(grid_size: u32, block_size: u32) -> Self {
        Self {
            grid_size,
            block_size,
            parallel: true,
        }
    }

    /// Set grid size.
    pub fn with_grid_size(mut self, grid_size: u32) -> Self {
        self.grid_size = grid_size;
        self
    }

    /// Set block size.
    pub fn with_block_size(mut self, block_size: u32) -> Self {
        self.block_size = block_size;
        self
    }

    /// Run blocks one after another on the calling thread.
    pub fn sequential(mut self) -> Self {
        self.parallel = false;
        self
    }

    fn validate(&self) -> Result<()> {
        if self.block_size == 0 {
            return Err(CoreError::invalid_config("block size must be non-zero"));
        }
        Ok(())
    }
}

impl Default for LaunchOptions {
    fn default() -> Self {
        Self::new(1, 256)
    }
}

/// Summary of a completed launch.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LaunchReport {
    /// Blocks executed.
    pub blocks: u64,
    /// Barriers crossed, summed over all blocks.
    pub barriers: u64,
    /// Wall-clock time of the launch.
    pub elapsed: Duration,
}

/// Snapshot of launcher counters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LauncherMetrics {
    /// Total kernels launched.
    pub total_launched: u64,
    /// Total blocks executed.
    pub blocks_executed: u64,
    /// Total barriers crossed.
    pub barriers: u64,
}

/// Host launcher that simulates a GPU grid on the CPU.
pub struct CpuLauncher {
    /// Total kernels launched.
    total_launched: AtomicU64,
    /// Total blocks executed.
    blocks_executed: AtomicU64,
    /// Total barriers crossed.
    barriers: AtomicU64,
    /// Shutdown flag.
    shutdown: RwLock<bool>,
}

impl CpuLauncher {
    /// Create a new launcher.
    pub fn new() -> Self {
        Self {
            total_launched: AtomicU64::new(0),
            blocks_executed: AtomicU64::new(0),
            barriers: AtomicU64::new(0),
            shutdown: RwLock::new(false),
        }
    }

    /// Check if launcher is shut down.
    pub fn is_shutdown(&self) -> bool {
        *self.shutdown.read()
    }

    /// Refuse further launches.
    pub fn shutdown(&self) {
        *self.shutdown.write() = true;
        info!("CPU launcher shut down");
    }

    /// Launch `body` once per block and wait for every block to finish.
    ///
    /// A grid of size zero is accepted and executes nothing.
    pub fn launch<F>(&self, name: &str, options: LaunchOptions, body: F) -> Result<LaunchReport>
    where
        F: Fn(&mut BlockContext) + Sync,
    {
        if self.is_shutdown() {
            return Err(CoreError::launch_failed("launcher is shut down"));
        }
        options.validate()?;

        debug!(
            "Launching CPU kernel '{}' (grid={}, block={}, parallel={})",
            name, options.grid_size, options.block_size, options.parallel
        );

        let grid_dim = Dim3::new_1d(options.grid_size);
        let block_dim = Dim3::new_1d(options.block_size);
        let run_block = |b: u32| {
            let mut ctx = BlockContext::new(BlockId::new_1d(b), block_dim, grid_dim);
            body(&mut ctx);
            ctx.barrier_count()
        };

        let start = Instant::now();
        let barriers: u64 = if options.parallel {
            (0..options.grid_size).into_par_iter().map(run_block).sum()
        } else {
            (0..options.grid_size).map(run_block).sum()
        };
        let elapsed = start.elapsed();

        let blocks = options.grid_size as u64;
        self.total_launched.fetch_add(1, Ordering::Relaxed);
        self.blocks_executed.fetch_add(blocks, Ordering::Relaxed);
        self.barriers.fetch_add(barriers, Ordering::Relaxed);

        info!(
            "CPU kernel '{}' completed: {} blocks, {} barriers in {:?}",
            name, blocks, barriers, elapsed
        );

        Ok(LaunchReport {
            blocks,
            barriers,
            elapsed,
        })
    }

    /// Get launcher metrics.
    pub fn metrics(&self) -> LauncherMetrics {
        LauncherMetrics {
            total_launched: self.total_launched.load(Ordering::Relaxed),
            blocks_executed: self.blocks_executed.load(Ordering::Relaxed),
            barriers: self.barriers.load(Ordering::Relaxed),
        }
    }
}

impl Default for CpuLauncher {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for CpuLauncher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CpuLauncher")
            .field("metrics", &self.metrics())
            .field("shutdown", &self.is_shutdown())
            .finish()
    }
}
