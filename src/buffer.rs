//! Amortized append-only storage for motion and timing histories.
//!
//! A [`GrowableBuffer`] keeps its logical length separate from its reserved
//! capacity. When an append would overflow the reservation, the buffer
//! reserves `ceil(growth_factor * required)` slots in one step, so a run of
//! `n` single appends costs `O(log n)` reallocations.

use std::ops::Index;

use serde::ser::{Serialize, Serializer};

use crate::error::GcodeError;

/// Growth factor used by [`GrowableBuffer::new`].
pub const DEFAULT_GROWTH_FACTOR: f64 = 2.0;

#[derive(Debug, Clone)]
pub struct GrowableBuffer<T> {
    data: Vec<T>,
    capacity: usize,
    growth_factor: f64,
    reallocations: usize,
}

impl<T> GrowableBuffer<T> {
    /// Creates an empty buffer that doubles its reservation when full.
    pub fn new() -> Self {
        GrowableBuffer {
            data: Vec::new(),
            capacity: 0,
            growth_factor: DEFAULT_GROWTH_FACTOR,
            reallocations: 0,
        }
    }

    /// Creates an empty buffer with a custom growth factor.
    ///
    /// Returns [`GcodeError::InvalidGrowthFactor`] unless `growth_factor > 1`.
    pub fn with_growth_factor(growth_factor: f64) -> Result<Self, GcodeError> {
        // NaN fails this comparison too.
        if !(growth_factor > 1.0) {
            return Err(GcodeError::InvalidGrowthFactor(growth_factor));
        }
        Ok(GrowableBuffer {
            growth_factor,
            ..Self::new()
        })
    }

    /// Creates an empty buffer with room for `capacity` elements reserved up front.
    pub fn with_capacity(capacity: usize) -> Self {
        GrowableBuffer {
            data: Vec::with_capacity(capacity),
            capacity,
            ..Self::new()
        }
    }

    /// Appends a single element.
    pub fn append(&mut self, value: T) {
        self.reserve_for(self.data.len() + 1);
        self.data.push(value);
    }

    /// Number of logical elements.
    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Reserved slots; never shrinks.
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// How many times the reservation has been grown.
    pub fn reallocations(&self) -> usize {
        self.reallocations
    }

    pub fn growth_factor(&self) -> f64 {
        self.growth_factor
    }

    /// Checked read. Indices at or past [`len`](Self::len) fail with
    /// [`GcodeError::IndexOutOfRange`], even when they fall inside the
    /// reserved capacity.
    pub fn get(&self, index: usize) -> Result<&T, GcodeError> {
        self.data.get(index).ok_or(GcodeError::IndexOutOfRange {
            index,
            len: self.data.len(),
        })
    }

    /// The most recently appended element.
    pub fn last(&self) -> Option<&T> {
        self.data.last()
    }

    /// Logical contents; unused capacity is never exposed.
    pub fn as_slice(&self) -> &[T] {
        &self.data
    }

    pub fn iter(&self) -> std::slice::Iter<'_, T> {
        self.data.iter()
    }

    fn reserve_for(&mut self, required: usize) {
        if required <= self.capacity {
            return;
        }
        let grown = (self.growth_factor * required as f64).ceil() as usize;
        let new_capacity = grown.max(required);
        self.data.reserve_exact(new_capacity - self.data.len());
        self.capacity = new_capacity;
        self.reallocations += 1;
    }
}

impl<T: Clone> GrowableBuffer<T> {
    /// Appends every element of `values`, growing at most once.
    pub fn append_slice(&mut self, values: &[T]) {
        if values.is_empty() {
            return;
        }
        self.reserve_for(self.data.len() + values.len());
        self.data.extend_from_slice(values);
    }
}

impl<T> Default for GrowableBuffer<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Index<usize> for GrowableBuffer<T> {
    type Output = T;

    /// Panics when `index >= len()`; use [`GrowableBuffer::get`] for a checked read.
    fn index(&self, index: usize) -> &T {
        &self.as_slice()[index]
    }
}

impl<'a, T> IntoIterator for &'a GrowableBuffer<T> {
    type Item = &'a T;
    type IntoIter = std::slice::Iter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl<T: Serialize> Serialize for GrowableBuffer<T> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_seq(self.as_slice())
    }
}
