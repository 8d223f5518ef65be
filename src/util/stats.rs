use std::fmt::Display;

/// Running summary of a set of counts.
#[derive(Clone, Debug, PartialEq)]
pub struct Stats {
    pub count: usize,
    pub min: usize,
    pub max: usize,
    pub avg: f32,
    pub sum: usize,
}

impl Stats {
    pub fn add_sample(&mut self, value: usize) {
        self.count += 1;
        self.sum += value;
        self.min = self.min.min(value);
        self.max = self.max.max(value);
        self.avg += (value as f32 - self.avg) / (self.count as f32);
    }

    /// Difference between the largest and smallest sample, zero if empty.
    pub fn spread(&self) -> usize {
        self.max.saturating_sub(self.min)
    }
}

impl Default for Stats {
    fn default() -> Self {
        Stats {
            count: 0,
            min: usize::MAX,
            max: 0,
            avg: 0.0,
            sum: 0,
        }
    }
}

impl FromIterator<usize> for Stats {
    fn from_iter<I: IntoIterator<Item = usize>>(iter: I) -> Self {
        let mut stats = Stats::default();
        stats.extend(iter);
        stats
    }
}

impl Extend<usize> for Stats {
    fn extend<I: IntoIterator<Item = usize>>(&mut self, iter: I) {
        for value in iter {
            self.add_sample(value);
        }
    }
}

impl Display for Stats {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.count == 0 {
            return write!(f, "no samples");
        }
        write!(
            f,
            "{} - {}; avg {:.1}; {} samples",
            self.min, self.max, self.avg, self.count
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert2::assert;

    #[test]
    fn collect_samples() {
        let s: Stats = [20, 10, 30].into_iter().collect();
        assert!(s.count == 3);
        assert!(s.min == 10);
        assert!(s.max == 30);
        assert!(s.sum == 60);
        assert!(s.avg == 20.0);
        assert!(s.spread() == 20);
    }

    #[test]
    fn empty() {
        let s = Stats::default();
        assert!(s.spread() == 0);
        assert!(s.to_string() == "no samples");
    }

    #[test]
    fn display_format() {
        let s: Stats = [42].into_iter().collect();
        let output = s.to_string();
        assert!(output.contains("42 - 42"));
        assert!(output.contains("avg 42.0"));
        assert!(output.contains("1 samples"));
    }
}
