//! Radiation setup configuration.
//!
//! Everything that is fixed for a run: launch shape, time step, the strategy
//! objects and the step schedule. Loaded from JSON or built in code.
//!
//! ```ignore
//! use farfield_radiation::config::RadiationConfig;
//!
//! let config = RadiationConfig::from_json(r#"{ "dt": 1.0e-16, "window": "hamming" }"#)?;
//! ```

use serde::{Deserialize, Serialize};

use crate::error::{RadiationError, Result};
use crate::filter::FilterConfig;
use crate::form_factor::FormFactor;
use crate::nyquist::NyquistFilter;
use crate::window::WindowFunction;

/// What happens to the per-step amplitude buffer between kernel passes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AccumulationPolicy {
    /// Zero the buffer before every pass; a separate buffer integrates the run.
    #[default]
    ResetEachStep,
    /// Keep adding into the same buffer for the whole run.
    Accumulate,
}

/// Radiation configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RadiationConfig {
    /// Threads per block. Must equal the frame capacity of the particle store.
    #[serde(default = "default_block_width")]
    pub block_width: usize,

    /// Simulation time step [s].
    #[serde(default = "default_dt")]
    pub dt: f64,

    /// Frequency cutoff strategy.
    #[serde(default)]
    pub nyquist: NyquistFilter,

    /// Macro-particle weighting strategy.
    #[serde(default)]
    pub form_factor: FormFactor,

    /// Spatial window.
    #[serde(default)]
    pub window: WindowFunction,

    /// Eligibility criteria.
    #[serde(default)]
    pub filters: FilterConfig,

    /// First step that radiates.
    #[serde(default)]
    pub start_step: u64,

    /// Steps at or after this one do not radiate.
    #[serde(default = "default_end_step")]
    pub end_step: u64,

    /// Radiate every `period` steps.
    #[serde(default = "default_period")]
    pub period: u64,

    /// Per-step buffer lifecycle.
    #[serde(default)]
    pub accumulation: AccumulationPolicy,

    /// Run blocks on the rayon pool.
    #[serde(default = "default_parallel")]
    pub parallel: bool,
}

fn default_block_width() -> usize {
    256
}

fn default_dt() -> f64 {
    1.0e-16
}

fn default_end_step() -> u64 {
    u64::MAX
}

fn default_period() -> u64 {
    1
}

fn default_parallel() -> bool {
    true
}

impl Default for RadiationConfig {
    fn default() -> Self {
        Self {
            block_width: default_block_width(),
            dt: default_dt(),
            nyquist: NyquistFilter::default(),
            form_factor: FormFactor::default(),
            window: WindowFunction::default(),
            filters: FilterConfig::default(),
            start_step: 0,
            end_step: default_end_step(),
            period: default_period(),
            accumulation: AccumulationPolicy::default(),
            parallel: default_parallel(),
        }
    }
}

impl RadiationConfig {
    /// Parse and validate a JSON configuration.
    pub fn from_json(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Serialize to pretty JSON.
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Set the block width.
    pub fn with_block_width(mut self, width: usize) -> Self {
        self.block_width = width;
        self
    }

    /// Set the time step.
    pub fn with_dt(mut self, dt: f64) -> Self {
        self.dt = dt;
        self
    }

    /// Set the Nyquist strategy.
    pub fn with_nyquist(mut self, nyquist: NyquistFilter) -> Self {
        self.nyquist = nyquist;
        self
    }

    /// Set the form factor.
    pub fn with_form_factor(mut self, form_factor: FormFactor) -> Self {
        self.form_factor = form_factor;
        self
    }

    /// Set the window.
    pub fn with_window(mut self, window: WindowFunction) -> Self {
        self.window = window;
        self
    }

    /// Set the eligibility criteria.
    pub fn with_filters(mut self, filters: FilterConfig) -> Self {
        self.filters = filters;
        self
    }

    /// Set the radiating step range `[start, end)` and period.
    pub fn with_schedule(mut self, start_step: u64, end_step: u64, period: u64) -> Self {
        self.start_step = start_step;
        self.end_step = end_step;
        self.period = period;
        self
    }

    /// Set the buffer lifecycle.
    pub fn with_accumulation(mut self, accumulation: AccumulationPolicy) -> Self {
        self.accumulation = accumulation;
        self
    }

    /// Run blocks one after another on the calling thread.
    pub fn sequential(mut self) -> Self {
        self.parallel = false;
        self
    }

    /// Check if `step` is scheduled to radiate.
    pub fn is_active(&self, step: u64) -> bool {
        step >= self.start_step
            && step < self.end_step
            && (step - self.start_step) % self.period == 0
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<()> {
        if self.block_width == 0 {
            return Err(RadiationError::invalid_config(
                "block width must be greater than 0",
            ));
        }

        if self.block_width > u32::MAX as usize {
            return Err(RadiationError::invalid_config(format!(
                "block width {} exceeds the compaction counter range",
                self.block_width
            )));
        }

        if !(self.dt.is_finite() && self.dt > 0.0) {
            return Err(RadiationError::invalid_config(format!(
                "time step must be positive, got {}",
                self.dt
            )));
        }

        if let NyquistFilter::LowPass { factor } = self.nyquist {
            if !(factor > 0.0 && factor <= 1.0) {
                return Err(RadiationError::invalid_config(format!(
                    "Nyquist factor must be in (0, 1], got {}",
                    factor
                )));
            }
        }

        if let Some(threshold) = self.filters.gamma_threshold {
            if threshold.is_nan() {
                return Err(RadiationError::invalid_config("gamma threshold is NaN"));
            }
        }

        if self.period == 0 {
            return Err(RadiationError::invalid_config(
                "period must be greater than 0",
            ));
        }

        if self.start_step > self.end_step {
            return Err(RadiationError::invalid_config(format!(
                "start step {} is after end step {}",
                self.start_step, self.end_step
            )));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_valid() {
        let config = RadiationConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.block_width, 256);
        assert_eq!(config.window, WindowFunction::Triangle);
        assert!(!config.nyquist.is_enabled());
    }

    #[test]
    fn test_from_json_fills_defaults() {
        let config = RadiationConfig::from_json(
            r#"{
                "dt": 2.0e-17,
                "nyquist": { "kind": "low_pass", "factor": 0.8 },
                "form_factor": "incoherent",
                "window": "hamming",
                "filters": { "radiation_flag": true, "gamma_threshold": 2.0 },
                "accumulation": "accumulate"
            }"#,
        )
        .unwrap();

        assert_eq!(config.dt, 2.0e-17);
        assert_eq!(config.nyquist, NyquistFilter::LowPass { factor: 0.8 });
        assert_eq!(config.form_factor, FormFactor::Incoherent);
        assert_eq!(config.window, WindowFunction::Hamming);
        assert!(config.filters.radiation_flag);
        assert_eq!(config.accumulation, AccumulationPolicy::Accumulate);
        assert_eq!(config.block_width, 256);
        assert_eq!(config.period, 1);
    }

    #[test]
    fn test_json_roundtrip() {
        let config = RadiationConfig::default()
            .with_window(WindowFunction::Gauss)
            .with_schedule(10, 20, 5);
        let json = config.to_json().unwrap();
        assert_eq!(RadiationConfig::from_json(&json).unwrap(), config);
    }

    #[test]
    fn test_invalid_values() {
        let bad = [
            RadiationConfig::default().with_block_width(0),
            RadiationConfig::default().with_dt(0.0),
            RadiationConfig::default().with_dt(f64::NAN),
            RadiationConfig::default().with_nyquist(NyquistFilter::LowPass { factor: 1.5 }),
            RadiationConfig::default().with_nyquist(NyquistFilter::LowPass { factor: 0.0 }),
            RadiationConfig::default().with_schedule(0, 10, 0),
            RadiationConfig::default().with_schedule(10, 5, 1),
        ];
        for config in bad {
            assert!(
                matches!(config.validate(), Err(RadiationError::InvalidConfig(_))),
                "{:?} should be rejected",
                config
            );
        }
    }

    #[test]
    fn test_parse_error() {
        let err = RadiationConfig::from_json("{ \"dt\": }").unwrap_err();
        assert!(matches!(err, RadiationError::Parse(_)));
    }

    #[test]
    fn test_schedule() {
        let config = RadiationConfig::default().with_schedule(10, 20, 5);
        assert!(!config.is_active(5));
        assert!(config.is_active(10));
        assert!(!config.is_active(12));
        assert!(config.is_active(15));
        assert!(!config.is_active(20));
    }
}
