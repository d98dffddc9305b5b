//! Particle eligibility predicates.
//!
//! Whether a particle radiates is decided in two stages:
//!
//! 1. A fixed physics short-circuit: a particle whose momentum did not change
//!    has zero acceleration and therefore a vanishing radiation amplitude. It
//!    is always skipped, before any configurable test runs.
//! 2. A [`FilterChain`]: user-selected predicates combined by logical AND and
//!    terminated by a [`TrueFilter`], assembled once at setup.

use serde::{Deserialize, Serialize};

use crate::particle::Particle;

/// A boolean test on one particle.
pub trait ParticlePredicate: Send + Sync + std::fmt::Debug {
    /// Short name used in logs.
    fn name(&self) -> &'static str;

    /// True if the particle passes.
    fn eligible(&self, particle: &Particle) -> bool;
}

/// Accepts every particle.
#[derive(Debug, Clone, Copy, Default)]
pub struct TrueFilter;

impl ParticlePredicate for TrueFilter {
    fn name(&self) -> &'static str {
        "true"
    }

    #[inline]
    fn eligible(&self, _particle: &Particle) -> bool {
        true
    }
}

/// Accepts particles whose explicit radiation flag is set.
#[derive(Debug, Clone, Copy, Default)]
pub struct RadiationFlagFilter;

impl ParticlePredicate for RadiationFlagFilter {
    fn name(&self) -> &'static str {
        "radiation_flag"
    }

    #[inline]
    fn eligible(&self, particle: &Particle) -> bool {
        particle.radiation_flag != 0
    }
}

/// Accepts particles with Lorentz factor at or above a threshold.
#[derive(Debug, Clone, Copy)]
pub struct GammaFilter {
    /// Minimum Lorentz factor.
    pub threshold: f64,
}

impl GammaFilter {
    /// Create a gamma filter.
    pub fn new(threshold: f64) -> Self {
        Self { threshold }
    }
}

impl ParticlePredicate for GammaFilter {
    fn name(&self) -> &'static str {
        "gamma"
    }

    #[inline]
    fn eligible(&self, particle: &Particle) -> bool {
        particle.gamma() >= self.threshold
    }
}

/// Which configurable criteria are switched on.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct FilterConfig {
    /// Require the explicit radiation flag.
    pub radiation_flag: bool,
    /// Require γ at or above this value.
    pub gamma_threshold: Option<f64>,
}

impl FilterConfig {
    /// Require the explicit radiation flag.
    pub fn with_radiation_flag(mut self) -> Self {
        self.radiation_flag = true;
        self
    }

    /// Require a minimum Lorentz factor.
    pub fn with_gamma_threshold(mut self, threshold: f64) -> Self {
        self.gamma_threshold = Some(threshold);
        self
    }
}

/// Conjunction of predicates.
#[derive(Debug)]
pub struct FilterChain {
    predicates: Vec<Box<dyn ParticlePredicate>>,
}

impl FilterChain {
    /// Create a chain that accepts everything.
    pub fn new() -> Self {
        Self {
            predicates: vec![Box::new(TrueFilter)],
        }
    }

    /// Assemble the chain from configuration flags.
    pub fn from_config(config: &FilterConfig) -> Self {
        let mut chain = Self::new();
        if config.radiation_flag {
            chain = chain.and(RadiationFlagFilter);
        }
        if let Some(threshold) = config.gamma_threshold {
            chain = chain.and(GammaFilter::new(threshold));
        }
        chain
    }

    /// Add a predicate. It is evaluated before the terminating [`TrueFilter`].
    pub fn and<P: ParticlePredicate + 'static>(mut self, predicate: P) -> Self {
        let tail = self.predicates.len().saturating_sub(1);
        self.predicates.insert(tail, Box::new(predicate));
        self
    }

    /// Names of the predicates in evaluation order.
    pub fn names(&self) -> Vec<&'static str> {
        self.predicates.iter().map(|p| p.name()).collect()
    }

    /// True if every predicate accepts the particle.
    #[inline]
    pub fn eligible(&self, particle: &Particle) -> bool {
        self.predicates.iter().all(|p| p.eligible(particle))
    }

    /// Full radiation test: the particle accelerated and passes the chain.
    #[inline]
    pub fn radiates(&self, particle: &Particle) -> bool {
        particle.has_accelerated() && self.eligible(particle)
    }
}

impl Default for FilterChain {
    fn default() -> Self {
        Self::new()
    }
}
