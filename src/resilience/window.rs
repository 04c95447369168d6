//! Fixed-capacity record of recent call outcomes.

use std::collections::VecDeque;

/// The last `capacity` outcomes, oldest first. Payloads are not kept.
#[derive(Debug, Clone)]
pub struct RollingWindow {
    outcomes: VecDeque<bool>,
    capacity: usize,
}

impl RollingWindow {
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            outcomes: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    /// Append an outcome, evicting the oldest once full.
    pub fn record(&mut self, success: bool) {
        if self.outcomes.len() == self.capacity {
            self.outcomes.pop_front();
        }
        self.outcomes.push_back(success);
    }

    pub fn len(&self) -> usize {
        self.outcomes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.outcomes.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn failures(&self) -> usize {
        self.outcomes.iter().filter(|success| !**success).count()
    }

    /// Failures divided by recorded outcomes; 0.0 when empty.
    pub fn failure_ratio(&self) -> f64 {
        if self.outcomes.is_empty() {
            return 0.0;
        }
        self.failures() as f64 / self.outcomes.len() as f64
    }

    pub fn clear(&mut self) {
        self.outcomes.clear();
    }
}
