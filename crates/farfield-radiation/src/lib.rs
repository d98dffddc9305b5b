//! # FarField Radiation
//!
//! Angularly and spectrally resolved far-field radiation of the charged
//! macro-particles of a particle-in-cell simulation.
//!
//! Every step, the kernel evaluates the relativistic radiation formula for
//! each accelerated particle and each observation direction, rotates the
//! result by the retarded-time phase of each frequency and adds it into a
//! shared (direction, frequency) amplitude buffer. Summed over the run, the
//! squared magnitude of an entry is the radiated spectrum.
//!
//! ## Modules
//!
//! - [`frame`] - Super-cell frame storage and the most-recent-first frame walk
//! - [`filter`] - Eligibility predicates combined by logical AND
//! - [`amplitude`] - Radiation formula and complex amplitudes
//! - [`nyquist`], [`form_factor`], [`window`] - Strategies selected at setup
//! - [`observer`], [`frequency`] - Direction and frequency tables
//! - [`buffer`] - Atomically accumulated output buffer
//! - [`kernel`] - The block-structured radiation kernel
//! - [`plugin`] - Step schedule and buffer lifecycle
//!
//! ## Example
//!
//! ```ignore
//! use farfield_radiation::prelude::*;
//!
//! let config = RadiationConfig::default().with_block_width(256);
//! let directions = AngularGrid::new(64, 1, (0.0, 0.05), (0.0, 0.0))?;
//! let freqs = LogFrequencies::new(512, 1.0e14, 1.0e18)?;
//! let mut plugin = RadiationPlugin::new(config, directions, freqs)?;
//!
//! for step in 0..steps {
//!     plugin.notify(step, &store, &mapping, domain_size, [0; 3])?;
//! }
//! let spectrum = plugin.integrated_spectrum();
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod amplitude;
pub mod buffer;
pub mod config;
pub mod constants;
pub mod error;
pub mod filter;
pub mod form_factor;
pub mod frame;
pub mod frequency;
pub mod kernel;
pub mod mapping;
pub mod nyquist;
pub mod observer;
pub mod particle;
pub mod plugin;
pub mod vector;
pub mod window;

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::amplitude::{compute, Amplitude, RadiatingParticle};
    pub use crate::buffer::AmplitudeBuffer;
    pub use crate::config::{AccumulationPolicy, RadiationConfig};
    pub use crate::error::{RadiationError, Result};
    pub use crate::filter::{FilterChain, FilterConfig, ParticlePredicate};
    pub use crate::form_factor::FormFactor;
    pub use crate::frame::{FrameBatch, FrameSource, FrameStream, ParticleStore};
    pub use crate::frequency::{FrequencyList, FrequencyTable, LinearFrequencies, LogFrequencies};
    pub use crate::kernel::{KernelInputs, RadiationKernel};
    pub use crate::mapping::{Dimensionality, SuperCellIdx, SuperCellMapping};
    pub use crate::nyquist::NyquistFilter;
    pub use crate::observer::{AngularGrid, DirectionList, ObserverGeometry};
    pub use crate::particle::Particle;
    pub use crate::plugin::RadiationPlugin;
    pub use crate::vector::Float3;
    pub use crate::window::WindowFunction;
}

// Re-exports for convenience
pub use buffer::AmplitudeBuffer;
pub use config::RadiationConfig;
pub use error::{RadiationError, Result};
pub use kernel::{KernelInputs, RadiationKernel};
pub use plugin::RadiationPlugin;
