//! Observation directions.
//!
//! Each execution group of the kernel handles one direction, identified by an
//! index in `0..len()`. The index layout must stay identical between domain
//! partitions so that their buffers can be summed entry by entry.

use serde::{Deserialize, Serialize};

use crate::error::{RadiationError, Result};
use crate::vector::Float3;

/// Fixed table of unit observation vectors.
pub trait ObserverGeometry: Sync {
    /// Number of directions.
    fn len(&self) -> usize;

    /// Unit vector for `index` in `0..len()`.
    fn direction(&self, index: usize) -> Float3;

    /// Check if the table has no directions.
    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Regular grid in polar angle θ and azimuth φ.
///
/// Direction `iθ · n_phi + iφ` points along
/// `(sin θ cos φ, sin θ sin φ, cos θ)`. Both ranges include their end points.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawAngularGrid")]
pub struct AngularGrid {
    /// Number of θ samples.
    pub n_theta: usize,
    /// Number of φ samples.
    pub n_phi: usize,
    /// First and last θ [rad].
    pub theta: (f64, f64),
    /// First and last φ [rad].
    pub phi: (f64, f64),
}

#[derive(Deserialize)]
struct RawAngularGrid {
    n_theta: usize,
    n_phi: usize,
    theta: (f64, f64),
    phi: (f64, f64),
}

impl TryFrom<RawAngularGrid> for AngularGrid {
    type Error = RadiationError;

    fn try_from(raw: RawAngularGrid) -> Result<Self> {
        Self::new(raw.n_theta, raw.n_phi, raw.theta, raw.phi)
    }
}

impl AngularGrid {
    /// Create an angular grid.
    pub fn new(n_theta: usize, n_phi: usize, theta: (f64, f64), phi: (f64, f64)) -> Result<Self> {
        if n_theta == 0 || n_phi == 0 {
            return Err(RadiationError::invalid_config(format!(
                "angular grid needs at least one sample per angle, got {}x{}",
                n_theta, n_phi
            )));
        }
        Ok(Self {
            n_theta,
            n_phi,
            theta,
            phi,
        })
    }

    /// θ and φ of a direction index.
    pub fn angles(&self, index: usize) -> (f64, f64) {
        let i_theta = index / self.n_phi;
        let i_phi = index % self.n_phi;
        (
            sample(self.theta, self.n_theta, i_theta),
            sample(self.phi, self.n_phi, i_phi),
        )
    }
}

fn sample((start, end): (f64, f64), n: usize, i: usize) -> f64 {
    if n > 1 {
        start + (end - start) * i as f64 / (n - 1) as f64
    } else {
        start
    }
}

impl ObserverGeometry for AngularGrid {
    fn len(&self) -> usize {
        self.n_theta * self.n_phi
    }

    fn direction(&self, index: usize) -> Float3 {
        let (theta, phi) = self.angles(index);
        let (sin_t, cos_t) = theta.sin_cos();
        let (sin_p, cos_p) = phi.sin_cos();
        Float3::new(sin_t * cos_p, sin_t * sin_p, cos_t)
    }
}

/// Explicit list of directions, normalized at construction and on
/// deserialization.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawDirections", into = "RawDirections")]
pub struct DirectionList {
    directions: Vec<Float3>,
}

#[derive(Serialize, Deserialize)]
struct RawDirections {
    directions: Vec<Float3>,
}

impl TryFrom<RawDirections> for DirectionList {
    type Error = RadiationError;

    fn try_from(raw: RawDirections) -> Result<Self> {
        Self::new(raw.directions)
    }
}

impl From<DirectionList> for RawDirections {
    fn from(list: DirectionList) -> Self {
        Self {
            directions: list.directions,
        }
    }
}

impl DirectionList {
    /// Create from arbitrary non-zero vectors.
    pub fn new<I>(directions: I) -> Result<Self>
    where
        I: IntoIterator<Item = Float3>,
    {
        let directions = directions
            .into_iter()
            .enumerate()
            .map(|(i, d)| {
                let n = d.norm();
                if n.is_finite() && n > 0.0 {
                    Ok(d / n)
                } else {
                    Err(RadiationError::invalid_config(format!(
                        "direction {} has no orientation",
                        i
                    )))
                }
            })
            .collect::<Result<Vec<_>>>()?;
        Ok(Self { directions })
    }

    /// Single direction.
    pub fn single(direction: Float3) -> Result<Self> {
        Self::new([direction])
    }
}

impl ObserverGeometry for DirectionList {
    fn len(&self) -> usize {
        self.directions.len()
    }

    fn direction(&self, index: usize) -> Float3 {
        self.directions[index]
    }
}
