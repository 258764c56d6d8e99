//! Fixed-capacity circular buffer with a running sum.
//!
//! Slots are indexed modulo capacity, so a push is O(1) no matter how large
//! the window is. The sum is updated with `incoming - evicted`, which leaves it
//! bit-identical when a value is replaced by an equal one.

#[derive(Debug, Clone)]
pub struct RollingWindow {
    slots: Vec<f64>,
    head: usize,
    len: usize,
    sum: f64,
}

impl RollingWindow {
    pub fn new(capacity: usize) -> Self {
        debug_assert!(capacity > 0, "window capacity must be positive");
        Self {
            slots: vec![0.0; capacity.max(1)],
            head: 0,
            len: 0,
            sum: 0.0,
        }
    }

    pub fn capacity(&self) -> usize {
        self.slots.len()
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn is_full(&self) -> bool {
        self.len == self.slots.len()
    }

    /// Push a value, returning the one that fell out of a full window.
    pub fn push(&mut self, value: f64) -> Option<f64> {
        let evicted = if self.is_full() {
            let old = self.slots[self.head];
            self.sum += value - old;
            Some(old)
        } else {
            self.sum += value;
            self.len += 1;
            None
        };
        self.slots[self.head] = value;
        self.head = (self.head + 1) % self.slots.len();
        evicted
    }

    pub fn sum(&self) -> f64 {
        self.sum
    }

    /// Arithmetic mean, only once the window is full.
    pub fn mean(&self) -> Option<f64> {
        if self.is_full() {
            Some(self.sum / self.slots.len() as f64)
        } else {
            None
        }
    }

    /// Value pushed `steps_back` pushes ago; 0 is the newest.
    pub fn back(&self, steps_back: usize) -> Option<f64> {
        if steps_back >= self.len {
            return None;
        }
        let cap = self.slots.len();
        Some(self.slots[(self.head + cap - 1 - steps_back) % cap])
    }

    pub fn newest(&self) -> Option<f64> {
        self.back(0)
    }

    pub fn clear(&mut self) {
        self.head = 0;
        self.len = 0;
        self.sum = 0.0;
    }
}
