//! Running numeric summary of a derived field.

/// Accumulates count, sum, min, and max of a sequence of values.
///
/// An empty summary has count 0, sum 0.0, and infinite sentinels for min
/// and max; callers that care should check `count()` first.
#[derive(Debug, Clone, PartialEq)]
pub struct Summary {
    count: u64,
    sum: f64,
    min: f64,
    max: f64,
}

impl Summary {
    pub fn new() -> Summary {
        Summary {
            count: 0,
            sum: 0.0,
            min: f64::INFINITY,
            max: f64::NEG_INFINITY,
        }
    }

    pub fn add(&mut self, value: f64) {
        self.count += 1;
        self.sum += value;
        self.min = self.min.min(value);
        self.max = self.max.max(value);
    }

    pub fn count(&self) -> u64 {
        self.count
    }

    pub fn sum(&self) -> f64 {
        self.sum
    }

    pub fn min(&self) -> f64 {
        self.min
    }

    pub fn max(&self) -> f64 {
        self.max
    }

    /// Arithmetic mean, or 0.0 for an empty summary.
    pub fn mean(&self) -> f64 {
        if self.count == 0 {
            0.0
        } else {
            self.sum / self.count as f64
        }
    }
}

impl Default for Summary {
    fn default() -> Summary {
        Summary::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_summary_accumulates() {
        let mut s = Summary::new();
        s.add(5000.55);
        s.add(6600.55);
        s.add(3211.23);
        assert_eq!(s.count(), 3);
        assert!((s.sum() - 14812.33).abs() < 1e-9);
        assert_eq!(s.min(), 3211.23);
        assert_eq!(s.max(), 6600.55);
        assert!((s.mean() - 14812.33 / 3.0).abs() < 1e-9);
    }

    #[test]
    fn test_empty_summary() {
        let s = Summary::new();
        assert_eq!(s.count(), 0);
        assert_eq!(s.sum(), 0.0);
        assert_eq!(s.mean(), 0.0);
        assert_eq!(s.min(), f64::INFINITY);
        assert_eq!(s.max(), f64::NEG_INFINITY);
    }

    #[test]
    fn test_single_value() {
        let mut s = Summary::new();
        s.add(42.0);
        assert_eq!(s.min(), 42.0);
        assert_eq!(s.max(), 42.0);
        assert_eq!(s.mean(), 42.0);
    }
}
