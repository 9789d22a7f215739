/// Streaming mean and variance (Welford), mergeable across workers with
/// Chan et al.'s pairwise update.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct RunningStats {
    count: u64,
    mean: f64,
    m2: f64,
}

impl RunningStats {
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub fn push(&mut self, value: f64) {
        self.count += 1;
        let delta = value - self.mean;
        self.mean += delta / self.count as f64;
        self.m2 += delta * (value - self.mean);
    }

    pub fn merge(&mut self, other: &RunningStats) {
        if other.count == 0 {
            return;
        }
        if self.count == 0 {
            *self = *other;
            return;
        }
        let count = self.count + other.count;
        let delta = other.mean - self.mean;
        let weight = other.count as f64 / count as f64;
        self.mean += delta * weight;
        self.m2 += other.m2 + delta * delta * self.count as f64 * weight;
        self.count = count;
    }

    pub fn count(&self) -> u64 {
        self.count
    }

    /// Zero when empty.
    pub fn mean(&self) -> f64 {
        self.mean
    }

    /// Unbiased sample variance; NaN below two observations.
    pub fn variance(&self) -> f64 {
        if self.count < 2 {
            return f64::NAN;
        }
        self.m2 / (self.count - 1) as f64
    }

    /// Standard error of the mean, `sqrt(variance / n)`. Infinite below two
    /// observations since the spread is unknown.
    pub fn standard_error(&self) -> f64 {
        if self.count < 2 {
            return f64::INFINITY;
        }
        (self.variance() / self.count as f64).sqrt()
    }
}

impl Extend<f64> for RunningStats {
    fn extend<I: IntoIterator<Item = f64>>(&mut self, iter: I) {
        for value in iter {
            self.push(value);
        }
    }
}

impl FromIterator<f64> for RunningStats {
    fn from_iter<I: IntoIterator<Item = f64>>(iter: I) -> Self {
        let mut stats = RunningStats::new();
        stats.extend(iter);
        stats
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn matches_two_pass_statistics() {
        let data = [2.0, 4.0, 4.0, 4.0, 5.0, 5.0, 7.0, 9.0];
        let stats: RunningStats = data.iter().copied().collect();
        assert_eq!(stats.count(), 8);
        assert_relative_eq!(stats.mean(), 5.0, max_relative = 1e-14);
        assert_relative_eq!(stats.variance(), 32.0 / 7.0, max_relative = 1e-14);
        assert_relative_eq!(stats.standard_error(), (32.0 / 7.0 / 8.0_f64).sqrt(), max_relative = 1e-14);
    }

    #[test]
    fn merge_equals_single_pass() {
        let data: Vec<f64> = (0..1000).map(|i| ((i * 37) % 101) as f64 * 0.25 + 1e6).collect();
        let whole: RunningStats = data.iter().copied().collect();

        let mut merged = RunningStats::new();
        for chunk in data.chunks(137) {
            merged.merge(&chunk.iter().copied().collect::<RunningStats>());
        }

        assert_eq!(merged.count(), whole.count());
        assert_relative_eq!(merged.mean(), whole.mean(), max_relative = 1e-12);
        assert_relative_eq!(merged.variance(), whole.variance(), max_relative = 1e-9);
    }

    #[test]
    fn merge_with_empty_is_identity() {
        let stats: RunningStats = [1.0, 2.0, 3.0].into_iter().collect();
        let mut left = RunningStats::new();
        left.merge(&stats);
        assert_eq!(left, stats);

        let mut right = stats;
        right.merge(&RunningStats::new());
        assert_eq!(right, stats);
    }

    #[test]
    fn degenerate_counts() {
        let empty = RunningStats::new();
        assert_eq!(empty.count(), 0);
        assert!(empty.variance().is_nan());
        assert_eq!(empty.standard_error(), f64::INFINITY);

        let single: RunningStats = [4.2].into_iter().collect();
        assert_eq!(single.mean(), 4.2);
        assert_eq!(single.standard_error(), f64::INFINITY);
    }

    #[test]
    fn constant_data_has_zero_variance() {
        let stats: RunningStats = std::iter::repeat(3.5).take(500).collect();
        assert_eq!(stats.variance(), 0.0);
        assert_eq!(stats.standard_error(), 0.0);
    }
}
