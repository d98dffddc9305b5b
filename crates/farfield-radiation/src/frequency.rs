//! Frequency tables: index to angular frequency.
//!
//! Tables are read-only and shared by every execution group. Order and
//! spacing are up to the caller; the kernel never assumes monotonicity.

use serde::{Deserialize, Serialize};

use crate::error::{RadiationError, Result};

/// Mapping from frequency index to angular frequency [rad/s].
pub trait FrequencyTable: Sync {
    /// Number of frequencies.
    fn len(&self) -> usize;

    /// Angular frequency for `index` in `0..len()`.
    fn omega(&self, index: usize) -> f64;

    /// Check if the table has no entries.
    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

fn check_range(n: usize, min: f64, max: f64) -> Result<()> {
    if n == 0 {
        return Err(RadiationError::invalid_config("frequency table is empty"));
    }
    if !min.is_finite() || !max.is_finite() || min > max {
        return Err(RadiationError::invalid_config(format!(
            "invalid frequency range [{}, {}]",
            min, max
        )));
    }
    Ok(())
}

/// Serialized form of the generated tables: count and inclusive bounds.
#[derive(Serialize, Deserialize)]
struct FrequencyRange {
    n: usize,
    omega_min: f64,
    omega_max: f64,
}

/// `n` evenly spaced frequencies from `omega_min` to `omega_max` inclusive.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "FrequencyRange", into = "FrequencyRange")]
pub struct LinearFrequencies {
    n: usize,
    omega_min: f64,
    delta: f64,
}

impl LinearFrequencies {
    /// Create a linear table.
    pub fn new(n: usize, omega_min: f64, omega_max: f64) -> Result<Self> {
        check_range(n, omega_min, omega_max)?;
        let delta = if n > 1 {
            (omega_max - omega_min) / (n - 1) as f64
        } else {
            0.0
        };
        Ok(Self {
            n,
            omega_min,
            delta,
        })
    }
}

impl TryFrom<FrequencyRange> for LinearFrequencies {
    type Error = RadiationError;

    fn try_from(range: FrequencyRange) -> Result<Self> {
        Self::new(range.n, range.omega_min, range.omega_max)
    }
}

impl From<LinearFrequencies> for FrequencyRange {
    fn from(table: LinearFrequencies) -> Self {
        Self {
            n: table.n,
            omega_min: table.omega_min,
            omega_max: table.omega(table.n.saturating_sub(1)),
        }
    }
}

impl FrequencyTable for LinearFrequencies {
    fn len(&self) -> usize {
        self.n
    }

    #[inline]
    fn omega(&self, index: usize) -> f64 {
        self.omega_min + self.delta * index as f64
    }
}

/// `n` logarithmically spaced frequencies from `omega_min` to `omega_max`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "FrequencyRange", into = "FrequencyRange")]
pub struct LogFrequencies {
    n: usize,
    log_min: f64,
    log_delta: f64,
}

impl LogFrequencies {
    /// Create a logarithmic table. Both bounds must be positive.
    pub fn new(n: usize, omega_min: f64, omega_max: f64) -> Result<Self> {
        check_range(n, omega_min, omega_max)?;
        if omega_min <= 0.0 {
            return Err(RadiationError::invalid_config(
                "logarithmic frequencies need a positive lower bound",
            ));
        }
        let log_min = omega_min.ln();
        let log_delta = if n > 1 {
            (omega_max.ln() - log_min) / (n - 1) as f64
        } else {
            0.0
        };
        Ok(Self {
            n,
            log_min,
            log_delta,
        })
    }
}

impl TryFrom<FrequencyRange> for LogFrequencies {
    type Error = RadiationError;

    fn try_from(range: FrequencyRange) -> Result<Self> {
        Self::new(range.n, range.omega_min, range.omega_max)
    }
}

impl From<LogFrequencies> for FrequencyRange {
    fn from(table: LogFrequencies) -> Self {
        Self {
            n: table.n,
            omega_min: table.omega(0),
            omega_max: table.omega(table.n.saturating_sub(1)),
        }
    }
}

impl FrequencyTable for LogFrequencies {
    fn len(&self) -> usize {
        self.n
    }

    #[inline]
    fn omega(&self, index: usize) -> f64 {
        (self.log_min + self.log_delta * index as f64).exp()
    }
}

/// Arbitrary externally supplied frequencies.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct FrequencyList {
    omegas: Vec<f64>,
}

impl FrequencyList {
    /// Create from a list of angular frequencies.
    pub fn new(omegas: Vec<f64>) -> Self {
        Self { omegas }
    }

    /// Parse a JSON array of angular frequencies.
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(Self::new(serde_json::from_str(json)?))
    }
}

impl From<Vec<f64>> for FrequencyList {
    fn from(omegas: Vec<f64>) -> Self {
        Self::new(omegas)
    }
}

impl FrequencyTable for FrequencyList {
    fn len(&self) -> usize {
        self.omegas.len()
    }

    #[inline]
    fn omega(&self, index: usize) -> f64 {
        self.omegas[index]
    }
}
