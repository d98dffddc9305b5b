//! Output buffer of accumulated amplitudes.
//!
//! One [`Amplitude`] per (direction, frequency) pair, row-major with the
//! direction as the outer index. Every component is an [`AtomicF64`] so that
//! all execution groups can add into the buffer concurrently.

use std::sync::atomic::Ordering;

use farfield_core::AtomicF64;

use crate::amplitude::Amplitude;
use crate::constants::INTENSITY_PREFACTOR;
use crate::error::{RadiationError, Result};

const PARTS: usize = 6;

/// Shared (direction, frequency) → amplitude table.
#[derive(Debug)]
pub struct AmplitudeBuffer {
    num_directions: usize,
    n_omega: usize,
    values: Vec<AtomicF64>,
}

impl AmplitudeBuffer {
    /// Create a zeroed buffer.
    pub fn new(num_directions: usize, n_omega: usize) -> Self {
        let values = (0..num_directions * n_omega * PARTS)
            .map(|_| AtomicF64::new(0.0))
            .collect();
        Self {
            num_directions,
            n_omega,
            values,
        }
    }

    /// Number of directions (rows).
    pub fn num_directions(&self) -> usize {
        self.num_directions
    }

    /// Number of frequencies (columns).
    pub fn n_omega(&self) -> usize {
        self.n_omega
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.num_directions * self.n_omega
    }

    /// Check if the buffer has no entries.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Linear index of an entry.
    #[inline]
    pub fn index(&self, direction: usize, frequency: usize) -> usize {
        debug_assert!(direction < self.num_directions && frequency < self.n_omega);
        direction * self.n_omega + frequency
    }

    #[inline]
    fn parts(&self, direction: usize, frequency: usize) -> &[AtomicF64] {
        let start = self.index(direction, frequency) * PARTS;
        &self.values[start..start + PARTS]
    }

    /// Atomically add an amplitude to an entry.
    #[inline]
    pub fn add(&self, direction: usize, frequency: usize, amplitude: Amplitude) {
        for (slot, value) in self
            .parts(direction, frequency)
            .iter()
            .zip(amplitude.to_parts())
        {
            slot.fetch_add(value, Ordering::Relaxed);
        }
    }

    /// Current value of an entry.
    pub fn get(&self, direction: usize, frequency: usize) -> Amplitude {
        let mut parts = [0.0; PARTS];
        for (out, slot) in parts.iter_mut().zip(self.parts(direction, frequency)) {
            *out = slot.load(Ordering::Relaxed);
        }
        Amplitude::from_parts(parts)
    }

    /// Copy of every entry in row-major order.
    pub fn snapshot(&self) -> Vec<Amplitude> {
        (0..self.num_directions)
            .flat_map(|d| (0..self.n_omega).map(move |f| (d, f)))
            .map(|(d, f)| self.get(d, f))
            .collect()
    }

    /// Zero every entry.
    pub fn reset(&self) {
        for slot in &self.values {
            slot.store(0.0, Ordering::Relaxed);
        }
    }

    /// Radiated energy per unit frequency and solid angle, `|A|² / (16π³ε₀c)`.
    pub fn spectral_intensity(&self, direction: usize, frequency: usize) -> f64 {
        self.get(direction, frequency).intensity() * INTENSITY_PREFACTOR
    }

    /// Add every entry of this buffer into `target`.
    pub fn accumulate_into(&self, target: &AmplitudeBuffer) -> Result<()> {
        if target.num_directions != self.num_directions {
            return Err(RadiationError::mismatch(
                "buffer directions",
                self.num_directions,
                target.num_directions,
            ));
        }
        if target.n_omega != self.n_omega {
            return Err(RadiationError::mismatch(
                "buffer frequencies",
                self.n_omega,
                target.n_omega,
            ));
        }

        for (src, dst) in self.values.iter().zip(&target.values) {
            dst.fetch_add(src.load(Ordering::Relaxed), Ordering::Relaxed);
        }
        Ok(())
    }
}
