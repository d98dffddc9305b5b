//! Macro-particle record and relativistic kinematics.
//!
//! Particles are owned by the particle storage; the radiation kernel only
//! reads them. Momentum, mass and charge refer to one real particle, the
//! weighting gives how many real particles the macro-particle stands for.

use bytemuck::{Pod, Zeroable};

use crate::constants::SPEED_OF_LIGHT;
use crate::vector::Float3;

/// A simulation macro-particle.
#[derive(Debug, Clone, Copy, PartialEq, Default, Pod, Zeroable)]
#[repr(C)]
pub struct Particle {
    /// Position inside its cell, as a fraction of the cell extent per axis.
    pub in_cell: Float3,
    /// Momentum at the current step [kg m/s].
    pub momentum: Float3,
    /// Momentum at the previous step [kg m/s].
    pub momentum_prev: Float3,
    /// Rest mass [kg].
    pub mass: f64,
    /// Charge [C].
    pub charge: f64,
    /// Number of real particles represented.
    pub weighting: f64,
    /// Linear cell index inside the super-cell (x fastest).
    pub cell_index: u32,
    /// Explicit radiation flag (non-zero = marked).
    pub radiation_flag: u32,
}

impl Particle {
    /// Create a particle at rest in cell 0 with weighting 1.
    pub fn new(mass: f64, charge: f64) -> Self {
        Self {
            mass,
            charge,
            weighting: 1.0,
            ..Self::default()
        }
    }

    /// Place the particle in a cell of its super-cell.
    pub fn at_cell(mut self, cell_index: u32, in_cell: Float3) -> Self {
        self.cell_index = cell_index;
        self.in_cell = in_cell;
        self
    }

    /// Set previous and current momentum.
    pub fn with_momentum(mut self, previous: Float3, now: Float3) -> Self {
        self.momentum_prev = previous;
        self.momentum = now;
        self
    }

    /// Set weighting.
    pub fn with_weighting(mut self, weighting: f64) -> Self {
        self.weighting = weighting;
        self
    }

    /// Set the explicit radiation flag.
    pub fn with_radiation_flag(mut self, flag: bool) -> Self {
        self.radiation_flag = flag as u32;
        self
    }

    /// True if the momentum changed during the step.
    ///
    /// Particles that did not accelerate emit nothing.
    #[inline]
    pub fn has_accelerated(&self) -> bool {
        self.momentum != self.momentum_prev
    }

    /// Lorentz factor at the current step.
    #[inline]
    pub fn gamma(&self) -> f64 {
        lorentz_factor(self.momentum, self.mass)
    }

    /// Velocity over c at the current step.
    #[inline]
    pub fn beta(&self) -> Float3 {
        beta(self.momentum, self.mass)
    }

    /// Velocity over c at the previous step.
    #[inline]
    pub fn beta_prev(&self) -> Float3 {
        beta(self.momentum_prev, self.mass)
    }
}

/// Lorentz factor γ = √(1 + u²), u = p / (m c).
#[inline]
pub fn lorentz_factor(momentum: Float3, mass: f64) -> f64 {
    let u = momentum / (mass * SPEED_OF_LIGHT);
    (1.0 + u.norm_squared()).sqrt()
}

/// Normalized velocity β = u / γ.
#[inline]
pub fn beta(momentum: Float3, mass: f64) -> Float3 {
    let u = momentum / (mass * SPEED_OF_LIGHT);
    u / (1.0 + u.norm_squared()).sqrt()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::ELECTRON_MASS;

    #[test]
    fn test_at_rest() {
        let p = Particle::new(ELECTRON_MASS, -1.0);
        assert_eq!(p.gamma(), 1.0);
        assert_eq!(p.beta(), Float3::ZERO);
        assert!(!p.has_accelerated());
    }

    #[test]
    fn test_relativistic_beta() {
        // u = 1 along x: gamma = sqrt(2), beta = 1/sqrt(2)
        let p_x = Float3::new(ELECTRON_MASS * SPEED_OF_LIGHT, 0.0, 0.0);
        let p = Particle::new(ELECTRON_MASS, -1.0).with_momentum(Float3::ZERO, p_x);

        assert!((p.gamma() - 2f64.sqrt()).abs() < 1e-12);
        assert!((p.beta().x - 1.0 / 2f64.sqrt()).abs() < 1e-12);
        assert_eq!(p.beta_prev(), Float3::ZERO);
        assert!(p.has_accelerated());
    }

    #[test]
    fn test_beta_below_one() {
        let p_x = Float3::new(1.0e3 * ELECTRON_MASS * SPEED_OF_LIGHT, 0.0, 0.0);
        let b = beta(p_x, ELECTRON_MASS);
        assert!(b.norm() < 1.0);
        assert!(b.norm() > 0.999);
    }

    #[test]
    fn test_builder_fields() {
        let p = Particle::new(1.0, 2.0)
            .at_cell(5, Float3::splat(0.5))
            .with_weighting(3.0)
            .with_radiation_flag(true);
        assert_eq!(p.cell_index, 5);
        assert_eq!(p.weighting, 3.0);
        assert_eq!(p.radiation_flag, 1);
        assert_eq!(std::mem::size_of::<Particle>(), 104);
    }
}
