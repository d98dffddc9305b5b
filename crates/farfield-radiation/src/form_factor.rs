//! Macro-particle form factors.
//!
//! A macro-particle of weighting N stands for N real particles. If they
//! radiate in phase the amplitude grows with N (coherent), if their phases
//! are random it grows with √N (incoherent). For a macro-particle with a
//! spatial shape whose Fourier transform is F(ω), the amplitude factor is
//!
//! ```text
//! √(N + (N² − N) · F(ω)²)
//! ```
//!
//! which tends to N for wavelengths much larger than the shape and to √N for
//! wavelengths much smaller.

use serde::{Deserialize, Serialize};

use crate::constants::SPEED_OF_LIGHT;
use crate::vector::Float3;

/// Form factor strategy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FormFactor {
    /// No weighting correction; the amplitude is used as is.
    #[default]
    Disabled,
    /// All real particles radiate in phase: factor N.
    Coherent,
    /// Random phases: factor √N.
    Incoherent,
    /// Cloud-in-cell shape in 3D.
    Cic3d,
    /// Triangular-shaped cloud in 3D.
    Tsc3d,
    /// Piecewise cubic spline in 3D.
    Pcs3d,
    /// Cloud-in-cell shape along y only.
    Cic1dY,
    /// Spherical Gaussian, σ = half a cell width.
    GaussSpherical,
    /// Gaussian with σ = half a cell along each axis.
    GaussCell,
}

/// sin(x)/x with sinc(0) = 1.
#[inline]
fn sinc(x: f64) -> f64 {
    if x.abs() < 1e-8 {
        1.0
    } else {
        x.sin() / x
    }
}

impl FormFactor {
    /// Check if the weighting of macro-particles is taken into account.
    pub fn is_enabled(&self) -> bool {
        !matches!(self, Self::Disabled)
    }

    /// Amplitude factor for a macro-particle of weighting `n_real`, at angular
    /// frequency `omega`, observed along `direction`, with cell extent `cell`.
    pub fn factor(&self, n_real: f64, omega: f64, direction: Float3, cell: Float3) -> f64 {
        let shaped = |f_squared: f64| (n_real + (n_real * n_real - n_real) * f_squared).sqrt();
        let k = omega / (2.0 * SPEED_OF_LIGHT);
        let sinc_product = || {
            sinc(k * cell.x * direction.x)
                * sinc(k * cell.y * direction.y)
                * sinc(k * cell.z * direction.z)
        };

        match self {
            Self::Disabled => 1.0,
            Self::Coherent => n_real,
            Self::Incoherent => n_real.sqrt(),
            Self::Cic3d => shaped(sinc_product().powi(4)),
            Self::Tsc3d => shaped(sinc_product().powi(6)),
            Self::Pcs3d => shaped(sinc_product().powi(8)),
            Self::Cic1dY => shaped(sinc(k * cell.y * direction.y).powi(4)),
            Self::GaussSpherical => {
                let sigma = 0.5 * cell.x;
                let x = omega * sigma / SPEED_OF_LIGHT;
                shaped((-x * x).exp())
            }
            Self::GaussCell => {
                let sigma = cell * 0.5;
                let wx = omega * sigma.x * direction.x / SPEED_OF_LIGHT;
                let wy = omega * sigma.y * direction.y / SPEED_OF_LIGHT;
                let wz = omega * sigma.z * direction.z / SPEED_OF_LIGHT;
                shaped((-(wx * wx + wy * wy + wz * wz)).exp())
            }
        }
    }
}
