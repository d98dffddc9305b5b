//! Three-component real vector.

use std::ops::{Add, AddAssign, Div, Index, Mul, Neg, Sub};

use bytemuck::{Pod, Zeroable};
use serde::{Deserialize, Serialize};

/// Real 3-vector with GPU-compatible layout.
#[derive(Debug, Clone, Copy, PartialEq, Default, Pod, Zeroable, Serialize, Deserialize)]
#[repr(C)]
pub struct Float3 {
    /// X component.
    pub x: f64,
    /// Y component.
    pub y: f64,
    /// Z component.
    pub z: f64,
}

impl Float3 {
    /// Zero vector.
    pub const ZERO: Float3 = Float3::new(0.0, 0.0, 0.0);

    /// Create a new vector.
    pub const fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }

    /// Vector with all components equal to `v`.
    pub const fn splat(v: f64) -> Self {
        Self::new(v, v, v)
    }

    /// Dot product.
    #[inline]
    pub fn dot(&self, other: Float3) -> f64 {
        self.x * other.x + self.y * other.y + self.z * other.z
    }

    /// Cross product.
    #[inline]
    pub fn cross(&self, other: Float3) -> Float3 {
        Float3::new(
            self.y * other.z - self.z * other.y,
            self.z * other.x - self.x * other.z,
            self.x * other.y - self.y * other.x,
        )
    }

    /// Squared Euclidean norm.
    #[inline]
    pub fn norm_squared(&self) -> f64 {
        self.dot(*self)
    }

    /// Euclidean norm.
    #[inline]
    pub fn norm(&self) -> f64 {
        self.norm_squared().sqrt()
    }

    /// Unit vector in the same direction. The zero vector stays zero.
    #[inline]
    pub fn normalized(&self) -> Float3 {
        let n = self.norm();
        if n > 0.0 {
            *self / n
        } else {
            *self
        }
    }

    /// Component-wise product.
    #[inline]
    pub fn hadamard(&self, other: Float3) -> Float3 {
        Float3::new(self.x * other.x, self.y * other.y, self.z * other.z)
    }

    /// Components as an array.
    #[inline]
    pub fn to_array(self) -> [f64; 3] {
        [self.x, self.y, self.z]
    }
}

impl From<[f64; 3]> for Float3 {
    fn from(v: [f64; 3]) -> Self {
        Float3::new(v[0], v[1], v[2])
    }
}

impl Index<usize> for Float3 {
    type Output = f64;

    fn index(&self, axis: usize) -> &f64 {
        match axis {
            0 => &self.x,
            1 => &self.y,
            2 => &self.z,
            _ => panic!("axis {} out of range for Float3", axis),
        }
    }
}

impl Add for Float3 {
    type Output = Float3;

    #[inline]
    fn add(self, rhs: Float3) -> Float3 {
        Float3::new(self.x + rhs.x, self.y + rhs.y, self.z + rhs.z)
    }
}

impl AddAssign for Float3 {
    #[inline]
    fn add_assign(&mut self, rhs: Float3) {
        *self = *self + rhs;
    }
}

impl Sub for Float3 {
    type Output = Float3;

    #[inline]
    fn sub(self, rhs: Float3) -> Float3 {
        Float3::new(self.x - rhs.x, self.y - rhs.y, self.z - rhs.z)
    }
}

impl Mul<f64> for Float3 {
    type Output = Float3;

    #[inline]
    fn mul(self, rhs: f64) -> Float3 {
        Float3::new(self.x * rhs, self.y * rhs, self.z * rhs)
    }
}

impl Div<f64> for Float3 {
    type Output = Float3;

    #[inline]
    fn div(self, rhs: f64) -> Float3 {
        Float3::new(self.x / rhs, self.y / rhs, self.z / rhs)
    }
}

impl Neg for Float3 {
    type Output = Float3;

    #[inline]
    fn neg(self) -> Float3 {
        Float3::new(-self.x, -self.y, -self.z)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cross_right_handed() {
        let x = Float3::new(1.0, 0.0, 0.0);
        let y = Float3::new(0.0, 1.0, 0.0);
        assert_eq!(x.cross(y), Float3::new(0.0, 0.0, 1.0));
        assert_eq!(y.cross(x), Float3::new(0.0, 0.0, -1.0));
    }

    #[test]
    fn test_normalized() {
        let v = Float3::new(3.0, 0.0, 4.0).normalized();
        assert!((v.norm() - 1.0).abs() < 1e-15);
        assert_eq!(Float3::ZERO.normalized(), Float3::ZERO);
    }

    #[test]
    fn test_pod_layout() {
        assert_eq!(std::mem::size_of::<Float3>(), 24);
        let v = Float3::new(1.0, 2.0, 3.0);
        let bytes = bytemuck::bytes_of(&v);
        assert_eq!(bytes.len(), 24);
        assert_eq!(v[1], 2.0);
    }
}
