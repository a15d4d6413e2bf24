//! Descriptive statistics over latency and throughput samples.
//!
//! Percentiles interpolate linearly between closest ranks, the same
//! definition NumPy uses by default, so p50 of an even-sized sample is the
//! midpoint of the two middle values.

/// A sorted, non-empty sample.
#[derive(Debug, Clone, PartialEq)]
pub struct Samples {
    sorted: Vec<f64>,
}

impl Samples {
    /// Sort the values; `None` when there are none.
    pub fn new(mut values: Vec<f64>) -> Option<Self> {
        if values.is_empty() {
            return None;
        }
        values.sort_by(f64::total_cmp);
        Some(Self { sorted: values })
    }

    pub fn sum(&self) -> f64 {
        self.sorted.iter().sum()
    }

    /// Clamped to `min..=max`; summation rounding can drift just outside.
    pub fn mean(&self) -> f64 {
        (self.sum() / self.sorted.len() as f64).clamp(self.min(), self.max())
    }

    pub fn median(&self) -> f64 {
        self.percentile(50.0)
    }

    pub fn min(&self) -> f64 {
        self.sorted[0]
    }

    pub fn max(&self) -> f64 {
        self.sorted[self.sorted.len() - 1]
    }

    /// `p` in `0..=100`; out-of-range values are clamped.
    pub fn percentile(&self, p: f64) -> f64 {
        percentile(&self.sorted, p)
    }
}

/// Linear-interpolation percentile of a sorted slice. Returns 0.0 when empty.
pub fn percentile(sorted: &[f64], p: f64) -> f64 {
    match sorted.len() {
        0 => 0.0,
        1 => sorted[0],
        n => {
            let rank = (p.clamp(0.0, 100.0) / 100.0) * (n - 1) as f64;
            let lo = rank.floor() as usize;
            let hi = rank.ceil() as usize;
            let frac = rank - lo as f64;
            (sorted[lo] + (sorted[hi] - sorted[lo]) * frac).clamp(sorted[lo], sorted[hi])
        }
    }
}
