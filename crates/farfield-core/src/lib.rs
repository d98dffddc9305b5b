//! # FarField Core
//!
//! SIMT execution model used by the far-field radiation kernels.
//!
//! Kernels are written against a grid of independent blocks, each block a
//! group of threads that share block-local memory, meet at block barriers and
//! coordinate through atomics. This crate provides that model on the host:
//! blocks run in parallel, and each block executes its body one *phase* at a
//! time, where a phase is the code between two barriers executed for every
//! thread of the block.
//!
//! ## Core Abstractions
//!
//! - [`BlockContext`] - Block identity, thread phases and barriers
//! - [`SharedArena`] - Block-local scratch with atomic slot allocation
//! - [`AtomicF64`] - Lock-free floating-point accumulation
//! - [`CpuLauncher`] - Grid launch with per-launch reporting
//!
//! ## Example
//!
//! ```ignore
//! use farfield_core::prelude::*;
//!
//! let launcher = CpuLauncher::new();
//! let report = launcher.launch("sum", LaunchOptions::new(4, 256), |block| {
//!     block.for_each_thread(|tid| { /* phase 1 */ });
//!     block.sync_threads();
//! })?;
//! assert_eq!(report.blocks, 4);
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod context;
pub mod error;
pub mod memory;
pub mod runtime;
pub mod types;

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::context::BlockContext;
    pub use crate::error::{CoreError, Result};
    pub use crate::memory::{AtomicF64, SharedArena};
    pub use crate::runtime::{CpuLauncher, LaunchOptions, LaunchReport, LauncherMetrics};
    pub use crate::types::{BlockId, Dim3, ThreadId};
}

// Re-exports for convenience
pub use context::BlockContext;
pub use error::{CoreError, Result};
pub use memory::{AtomicF64, SharedArena};
pub use runtime::{CpuLauncher, LaunchOptions, LaunchReport, LauncherMetrics};
pub use types::{BlockId, Dim3, ThreadId};
