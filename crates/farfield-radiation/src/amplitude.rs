//! Radiated amplitude and the relativistic radiation formula.
//!
//! The far-field spectrum of an accelerated charge observed along the unit
//! vector `n` is
//!
//! ```text
//! d²I/dω dΩ ∝ | ∫ n × ((n − β) × β̇) / (1 − β·n)² · exp(iω(t − n·r/c)) dt |²
//! ```
//!
//! Each step contributes one term of the time integral. [`compute`] evaluates
//! the real vector part of that term (charge and time step included) and the
//! retarded time; the phase `exp(iω t_ret)` is applied per frequency by
//! [`Amplitude::from_phase`].

use std::iter::Sum;
use std::ops::{Add, AddAssign};

use num_complex::Complex64;

use crate::constants::SPEED_OF_LIGHT;
use crate::particle::beta;
use crate::vector::Float3;

/// Complex 3-vector amplitude for one direction and frequency.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Amplitude {
    /// X component.
    pub x: Complex64,
    /// Y component.
    pub y: Complex64,
    /// Z component.
    pub z: Complex64,
}

impl Amplitude {
    /// Zero amplitude.
    pub const ZERO: Amplitude = Amplitude {
        x: Complex64::new(0.0, 0.0),
        y: Complex64::new(0.0, 0.0),
        z: Complex64::new(0.0, 0.0),
    };

    /// Create from components.
    pub fn new(x: Complex64, y: Complex64, z: Complex64) -> Self {
        Self { x, y, z }
    }

    /// Rotate a real vector by `exp(i · phase)`.
    #[inline]
    pub fn from_phase(vector: Float3, phase: f64) -> Self {
        let rotation = Complex64::from_polar(1.0, phase);
        Self {
            x: rotation * vector.x,
            y: rotation * vector.y,
            z: rotation * vector.z,
        }
    }

    /// Scale every component.
    #[inline]
    pub fn scale(&self, factor: f64) -> Self {
        Self {
            x: self.x * factor,
            y: self.y * factor,
            z: self.z * factor,
        }
    }

    /// |Ax|² + |Ay|² + |Az|².
    #[inline]
    pub fn intensity(&self) -> f64 {
        self.x.norm_sqr() + self.y.norm_sqr() + self.z.norm_sqr()
    }

    /// Components as real/imaginary pairs.
    pub fn to_parts(&self) -> [f64; 6] {
        [self.x.re, self.x.im, self.y.re, self.y.im, self.z.re, self.z.im]
    }

    /// Rebuild from real/imaginary pairs.
    pub fn from_parts(parts: [f64; 6]) -> Self {
        Self {
            x: Complex64::new(parts[0], parts[1]),
            y: Complex64::new(parts[2], parts[3]),
            z: Complex64::new(parts[4], parts[5]),
        }
    }

    /// Check if every component is exactly zero.
    pub fn is_zero(&self) -> bool {
        *self == Self::ZERO
    }
}

impl Add for Amplitude {
    type Output = Amplitude;

    #[inline]
    fn add(self, rhs: Amplitude) -> Amplitude {
        Amplitude {
            x: self.x + rhs.x,
            y: self.y + rhs.y,
            z: self.z + rhs.z,
        }
    }
}

impl AddAssign for Amplitude {
    #[inline]
    fn add_assign(&mut self, rhs: Amplitude) {
        self.x += rhs.x;
        self.y += rhs.y;
        self.z += rhs.z;
    }
}

impl Sum for Amplitude {
    fn sum<I: Iterator<Item = Amplitude>>(iter: I) -> Amplitude {
        iter.fold(Amplitude::ZERO, |acc, a| acc + a)
    }
}

/// Kinematic input of the radiation formula for one particle.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RadiatingParticle {
    /// Global position [m].
    pub position: Float3,
    /// Momentum at the previous step.
    pub momentum_old: Float3,
    /// Momentum at the current step.
    pub momentum_now: Float3,
    /// Rest mass [kg].
    pub mass: f64,
    /// Charge [C].
    pub charge: f64,
}

impl RadiatingParticle {
    /// Velocity over c at the current step.
    #[inline]
    pub fn beta(&self) -> Float3 {
        beta(self.momentum_now, self.mass)
    }

    /// Velocity over c at the previous step.
    #[inline]
    pub fn beta_old(&self) -> Float3 {
        beta(self.momentum_old, self.mass)
    }

    /// 1 − β·n at the current step.
    #[inline]
    pub fn one_minus_beta_n(&self, n: Float3) -> f64 {
        1.0 - self.beta().dot(n)
    }

    /// Real amplitude vector and retarded time for direction `n`.
    #[inline]
    pub fn amplitude(&self, n: Float3, dt: f64, time: f64) -> (Float3, f64) {
        compute(
            self.position,
            self.momentum_old,
            self.momentum_now,
            self.mass,
            self.charge,
            n,
            dt,
            time,
        )
    }
}

/// Evaluate the radiation formula for one particle and one direction.
///
/// Returns `(vector, t_ret)` with
/// `vector = q·dt · n × ((n − β) × β̇) / (1 − β·n)²`, `β̇ = (β_now − β_old)/dt`
/// and `t_ret = time − n·r/c`.
///
/// The denominator is not guarded. Directions almost parallel to the velocity
/// of an ultra-relativistic particle produce very large or non-finite values.
#[allow(clippy::too_many_arguments)]
#[inline]
pub fn compute(
    position: Float3,
    momentum_old: Float3,
    momentum_now: Float3,
    mass: f64,
    charge: f64,
    n: Float3,
    dt: f64,
    time: f64,
) -> (Float3, f64) {
    let beta_now = beta(momentum_now, mass);
    let beta_old = beta(momentum_old, mass);
    let beta_dot = (beta_now - beta_old) / dt;

    let one_minus_beta_n = 1.0 - beta_now.dot(n);
    let factor = charge * dt / (one_minus_beta_n * one_minus_beta_n);

    let vector = n.cross((n - beta_now).cross(beta_dot)) * factor;
    let t_ret = time - n.dot(position) / SPEED_OF_LIGHT;

    (vector, t_ret)
}
