//! Dirty tracking against a committed baseline

/// Tracks unsaved changes by comparison with the last committed snapshot
///
/// Holds no cached flag: every query compares `current` with the baseline, so
/// a change anywhere in the snapshot is always seen.
#[derive(Debug, Clone)]
pub struct DirtyTracker<T> {
    baseline: T,
}

impl<T: Clone + PartialEq> DirtyTracker<T> {
    /// Start tracking with `initial` as the baseline
    #[inline]
    #[must_use]
    pub fn new(initial: &T) -> Self {
        Self {
            baseline: initial.clone(),
        }
    }

    /// Last committed snapshot
    #[inline]
    #[must_use]
    pub fn baseline(&self) -> &T {
        &self.baseline
    }

    /// Whether `current` differs from the baseline
    #[inline]
    #[must_use]
    pub fn is_dirty(&self, current: &T) -> bool {
        *current != self.baseline
    }

    /// Make `current` the new baseline
    #[inline]
    pub fn commit(&mut self, current: &T) {
        self.baseline = current.clone();
    }

    /// Copy of the baseline to replace the current value with
    #[inline]
    #[must_use]
    pub fn rollback(&self) -> T {
        self.baseline.clone()
    }
}
