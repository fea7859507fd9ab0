//! Fixed-capacity FIFO history used for the RSI and trend lookbacks.

use std::collections::VecDeque;

/// Ordered oldest → newest. Pushing into a full window evicts the oldest entry.
#[derive(Debug, Clone, PartialEq)]
pub struct BoundedWindow<T> {
    capacity: usize,
    values: VecDeque<T>,
}

impl<T: Clone> BoundedWindow<T> {
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity,
            values: VecDeque::with_capacity(capacity),
        }
    }

    /// Rebuild a window from stored values; the window is full by definition.
    pub fn from_full(values: Vec<T>) -> Self {
        Self {
            capacity: values.len(),
            values: values.into(),
        }
    }

    pub fn push(&mut self, value: T) {
        if self.capacity == 0 {
            return;
        }
        if self.values.len() == self.capacity {
            self.values.pop_front();
        }
        self.values.push_back(value);
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn is_full(&self) -> bool {
        self.values.len() == self.capacity
    }

    pub fn latest(&self) -> Option<&T> {
        self.values.back()
    }

    pub fn iter(&self) -> impl Iterator<Item = &T> {
        self.values.iter()
    }

    pub fn to_vec(&self) -> Vec<T> {
        self.values.iter().cloned().collect()
    }
}
