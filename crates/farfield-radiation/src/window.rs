//! Spatial window functions.
//!
//! The simulated volume ends abruptly at the domain boundary, which shows up
//! as spurious high-frequency content in the spectrum. A window tapers the
//! amplitude of particles near the boundary. It is evaluated per axis on the
//! position relative to the domain centre and multiplied over the axes.

use std::f64::consts::PI;

use serde::{Deserialize, Serialize};

use crate::mapping::Dimensionality;
use crate::vector::Float3;

/// Offset of the Hamming window.
const HAMMING_OFFSET: f64 = 0.08;

/// Decay constant of the Triplett window, in units of 1/L.
const TRIPLETT_DECAY: f64 = 5.0;

/// Width of the Gauss window, in units of L.
const GAUSS_SIGMA: f64 = 0.25;

/// Window strategy.
///
/// Only `Triangle` and `Triplett` reach 0 at the domain boundary. `Hamming`
/// and `Gauss` keep a finite weight there, so boundary particles still
/// radiate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WindowFunction {
    /// Constant 1 inside the domain.
    None,
    /// Linear taper from the centre to the boundary.
    #[default]
    Triangle,
    /// Raised cosine. Keeps a weight of 0.08 at the boundary.
    Hamming,
    /// Exponential times squared cosine.
    Triplett,
    /// Gaussian with σ = L/4. Keeps a weight of e⁻² at the boundary.
    Gauss,
}

impl WindowFunction {
    /// Weight along one axis.
    ///
    /// `x` is measured from the domain centre, `length` is the domain extent
    /// along the axis. Positions outside `|x| <= length / 2` get 0.
    #[inline]
    pub fn weight_1d(&self, x: f64, length: f64) -> f64 {
        let half = 0.5 * length;
        if x.abs() > half {
            return 0.0;
        }

        match self {
            Self::None => 1.0,
            Self::Triangle => 1.0 - x.abs() / half,
            Self::Hamming => {
                let c = (PI * x / length).cos();
                HAMMING_OFFSET + (1.0 - HAMMING_OFFSET) * c * c
            }
            Self::Triplett => {
                let c = (PI * x / length).cos();
                (-(TRIPLETT_DECAY / length) * x.abs()).exp() * c * c
            }
            Self::Gauss => {
                let r = x / (GAUSS_SIGMA * length);
                (-0.5 * r * r).exp()
            }
        }
    }

    /// Weight of a particle at global `position` inside a domain spanning
    /// `[0, domain_size)` on each axis.
    pub fn weight(&self, position: Float3, domain_size: Float3, dims: Dimensionality) -> f64 {
        (0..dims.axes())
            .map(|axis| {
                let length = domain_size[axis];
                self.weight_1d(position[axis] - 0.5 * length, length)
            })
            .product()
    }
}
