//! Physical constants (SI).

use std::f64::consts::PI;

/// Speed of light in vacuum [m/s].
pub const SPEED_OF_LIGHT: f64 = 299_792_458.0;

/// Vacuum permittivity [F/m].
pub const EPS0: f64 = 8.854_187_812_8e-12;

/// Elementary charge [C].
pub const ELEMENTARY_CHARGE: f64 = 1.602_176_634e-19;

/// Electron charge [C].
pub const ELECTRON_CHARGE: f64 = -ELEMENTARY_CHARGE;

/// Electron rest mass [kg].
pub const ELECTRON_MASS: f64 = 9.109_383_701_5e-31;

/// Prefactor turning |amplitude|² into d²I/(dω dΩ) [J s].
///
/// The charge is already part of the amplitude, so only
/// 1 / (16 π³ ε₀ c) remains.
pub const INTENSITY_PREFACTOR: f64 = 1.0 / (16.0 * PI * PI * PI * EPS0 * SPEED_OF_LIGHT);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prefactor_magnitude() {
        // 1 / (16 * pi^3 * 8.854e-12 * 2.998e8) ~ 0.759
        assert!((INTENSITY_PREFACTOR - 0.759).abs() < 0.001);
    }
}
