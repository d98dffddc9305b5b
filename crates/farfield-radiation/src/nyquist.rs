//! Nyquist low-pass against aliased frequencies.
//!
//! The particle trajectory is sampled once per time step. Seen from the
//! observer the sampling interval is compressed to `dt · (1 − β·n)`, so
//! frequencies above `π / (dt · (1 − β·n))` cannot be resolved and would alias.

use std::f64::consts::PI;

use serde::{Deserialize, Serialize};

use crate::vector::Float3;

/// Margin subtracted from π in the cutoff.
const PI_MARGIN: f64 = 0.01;

/// Default fraction of the Nyquist frequency that is kept.
pub const DEFAULT_NYQUIST_FACTOR: f64 = 0.5;

/// Frequency cutoff strategy.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum NyquistFilter {
    /// Keep every frequency.
    #[default]
    Disabled,
    /// Keep frequencies below `factor` times the per-particle Nyquist frequency.
    LowPass {
        /// Fraction of the Nyquist frequency, in (0, 1].
        factor: f64,
    },
}

impl NyquistFilter {
    /// Low-pass with the default factor.
    pub fn low_pass() -> Self {
        Self::LowPass {
            factor: DEFAULT_NYQUIST_FACTOR,
        }
    }

    /// Check if the filter removes anything.
    pub fn is_enabled(&self) -> bool {
        matches!(self, Self::LowPass { .. })
    }

    /// Cutoff for a particle moving with `beta`, observed along `n`.
    #[inline]
    pub fn cutoff(&self, n: Float3, beta: Float3, dt: f64) -> Cutoff {
        match *self {
            Self::Disabled => Cutoff::UNLIMITED,
            Self::LowPass { factor } => {
                let one_minus_beta_n = 1.0 - beta.dot(n);
                Cutoff((PI - PI_MARGIN) / (dt * one_minus_beta_n) * factor)
            }
        }
    }
}

/// Per-particle frequency cutoff.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Cutoff(pub f64);

impl Cutoff {
    /// Cutoff that passes every finite frequency.
    pub const UNLIMITED: Cutoff = Cutoff(f64::INFINITY);

    /// Cutoff angular frequency.
    #[inline]
    pub fn omega(&self) -> f64 {
        self.0
    }

    /// True if `omega` is below the cutoff.
    #[inline]
    pub fn passes(&self, omega: f64) -> bool {
        omega < self.0
    }
}

impl Default for Cutoff {
    fn default() -> Self {
        Self::UNLIMITED
    }
}
