use std::collections::VecDeque;

/// Fixed-capacity rolling history of one metric stream — useful for
/// sparkline and graph rendering.
///
/// Values are kept oldest-first; pushing at capacity evicts exactly one
/// oldest value, so `len() <= capacity` holds at all times.
#[derive(Debug, Clone)]
pub struct RollingWindow<T> {
    values: VecDeque<T>,
    capacity: usize,
}

impl<T> RollingWindow<T> {
    /// Create an empty window. `capacity` must be at least 1.
    pub fn new(capacity: usize) -> Self {
        assert!(capacity > 0, "window capacity must be positive");
        Self {
            values: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    /// Push a new value, evicting the oldest if at capacity.
    pub fn push(&mut self, value: T) {
        if self.values.len() == self.capacity {
            self.values.pop_front();
        }
        self.values.push_back(value);
    }

    /// Values oldest-first.
    pub fn values(&self) -> impl Iterator<Item = &T> {
        self.values.iter()
    }

    /// The most recently pushed value, if any.
    pub fn last(&self) -> Option<&T> {
        self.values.back()
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

    pub fn capacity(&self) -> usize {
        self.capacity
    }
}

impl<T: Clone> RollingWindow<T> {
    /// Copy out the window contents, oldest-first.
    pub fn to_vec(&self) -> Vec<T> {
        self.values.iter().cloned().collect()
    }
}

/// A max/min pair reported by [`ExtremaTracker::snapshot`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Extrema {
    pub max: f64,
    pub min: f64,
}

impl Extrema {
    /// `Some((max, min))` once at least one valid value was observed.
    #[must_use]
    pub fn observed(&self) -> Option<(f64, f64)> {
        (self.max >= self.min).then_some((self.max, self.min))
    }
}

/// Running max/min of a metric across the whole session.
///
/// Unlike [`RollingWindow`] this is unbounded: extrema only widen, never
/// reset, for the lifetime of the process.
#[derive(Debug, Clone)]
pub struct ExtremaTracker {
    max: f64,
    min: f64,
}

impl Default for ExtremaTracker {
    fn default() -> Self {
        Self::new()
    }
}

impl ExtremaTracker {
    pub fn new() -> Self {
        Self {
            max: f64::NEG_INFINITY,
            min: f64::INFINITY,
        }
    }

    /// Widen the extrema to include `value`.
    ///
    /// NaN is ignored: a single NaN would otherwise poison every later
    /// max/min comparison.
    pub fn observe(&mut self, value: f64) {
        if value.is_nan() {
            return;
        }
        if value > self.max {
            self.max = value;
        }
        if value < self.min {
            self.min = value;
        }
    }

    pub fn snapshot(&self) -> Extrema {
        Extrema {
            max: self.max,
            min: self.min,
        }
    }
}
