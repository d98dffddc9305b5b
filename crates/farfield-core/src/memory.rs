//! Block-shared scratch memory and floating-point atomics.
//!
//! [`SharedArena`] models a block-local array filled through an atomic
//! counter: every thread that has something to publish takes the next free
//! slot with a fetch-and-increment. Indices are dense (`0..k` for `k`
//! publishers) with no ordering guarantee between threads.

use std::sync::atomic::{AtomicU32, AtomicU64, Ordering};

/// Fixed-capacity block-local array with atomic slot allocation.
///
/// Capacity equals the block width. Each thread allocates at most one slot per
/// phase, so the counter can never pass capacity.
#[derive(Debug)]
pub struct SharedArena<T> {
    slots: Vec<T>,
    counter: AtomicU32,
}

impl<T: Copy + Default> SharedArena<T> {
    /// Create an arena with `capacity` slots.
    pub fn new(capacity: usize) -> Self {
        Self {
            slots: vec![T::default(); capacity],
            counter: AtomicU32::new(0),
        }
    }

    /// Number of slots.
    #[inline]
    pub fn capacity(&self) -> usize {
        self.slots.len()
    }

    /// Reset the counter to zero. Slot contents are left as they are.
    #[inline]
    pub fn reset(&self) {
        self.counter.store(0, Ordering::Relaxed);
    }

    /// Claim the next free slot. Returns the pre-increment counter value.
    #[inline]
    pub fn allocate(&self) -> u32 {
        let index = self.counter.fetch_add(1, Ordering::Relaxed);
        debug_assert!(
            (index as usize) < self.slots.len(),
            "shared arena overflow: slot {} of {}",
            index,
            self.slots.len()
        );
        index
    }

    /// Store a value at a slot previously returned by [`allocate`](Self::allocate).
    #[inline]
    pub fn write(&mut self, index: u32, value: T) {
        self.slots[index as usize] = value;
    }

    /// Allocate a slot and store `value` in it.
    #[inline]
    pub fn push(&mut self, value: T) -> u32 {
        let index = self.allocate();
        self.write(index, value);
        index
    }

    /// Number of allocated slots.
    #[inline]
    pub fn len(&self) -> usize {
        self.counter.load(Ordering::Relaxed) as usize
    }

    /// Check if no slot has been allocated.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Allocated slots.
    #[inline]
    pub fn as_slice(&self) -> &[T] {
        &self.slots[..self.len()]
    }
}

/// `f64` with atomic accumulation.
///
/// Stored as the bit pattern of an `AtomicU64`; additions retry a
/// compare-exchange until they win.
#[derive(Debug, Default)]
#[repr(transparent)]
pub struct AtomicF64 {
    bits: AtomicU64,
}

impl AtomicF64 {
    /// Create a new atomic float.
    pub fn new(value: f64) -> Self {
        Self {
            bits: AtomicU64::new(value.to_bits()),
        }
    }

    /// Load the current value.
    #[inline]
    pub fn load(&self, order: Ordering) -> f64 {
        f64::from_bits(self.bits.load(order))
    }

    /// Store a value.
    #[inline]
    pub fn store(&self, value: f64, order: Ordering) {
        self.bits.store(value.to_bits(), order);
    }

    /// Atomically add `value` and return the previous value.
    #[inline]
    pub fn fetch_add(&self, value: f64, order: Ordering) -> f64 {
        let mut current = self.bits.load(Ordering::Relaxed);
        loop {
            let next = (f64::from_bits(current) + value).to_bits();
            match self
                .bits
                .compare_exchange_weak(current, next, order, Ordering::Relaxed)
            {
                Ok(previous) => return f64::from_bits(previous),
                Err(actual) => current = actual,
            }
        }
    }
}
