//! Median-then-mean weight filter with a stability flag.
//!
//! Load-cell outliers are sparse spikes, so each raw sample first goes through
//! a median of the last N samples; the last M medians are then averaged.
use crate::config::FilterCfg;
use crate::fixed_point::{abs_diff_i32_u32, avg2_round_nearest_i32};
use crate::util::div_round_nearest_i64;
use std::collections::VecDeque;

/// One filtered reading in centigrams.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FilteredWeight {
    pub value_cg: i32,
    /// The smoothing window is full and its spread is below the tolerance.
    pub stable: bool,
}

impl FilteredWeight {
    pub fn stable(value_cg: i32) -> Self {
        Self {
            value_cg,
            stable: true,
        }
    }

    pub fn settling(value_cg: i32) -> Self {
        Self {
            value_cg,
            stable: false,
        }
    }
}

#[derive(Debug, Clone)]
pub struct WeightFilter {
    cfg: FilterCfg,
    raw: VecDeque<i32>,
    medians: VecDeque<i32>,
    // Scratch buffer for the median so `ingest` never allocates after warm-up
    scratch: Vec<i32>,
}

impl WeightFilter {
    pub fn new(cfg: FilterCfg) -> Self {
        let cfg = FilterCfg {
            median_window: cfg.median_window.max(1),
            smoothing_window: cfg.smoothing_window.max(1),
            stability_tolerance_cg: cfg.stability_tolerance_cg.max(1),
        };
        Self {
            raw: VecDeque::with_capacity(cfg.median_window),
            medians: VecDeque::with_capacity(cfg.smoothing_window),
            scratch: Vec::with_capacity(cfg.median_window),
            cfg,
        }
    }

    pub fn cfg(&self) -> &FilterCfg {
        &self.cfg
    }

    /// Feed one calibrated sample (cg) and return the current filtered reading.
    pub fn ingest(&mut self, sample_cg: i32) -> FilteredWeight {
        if self.raw.len() == self.cfg.median_window {
            self.raw.pop_front();
        }
        self.raw.push_back(sample_cg);

        let median = self.median();
        if self.medians.len() == self.cfg.smoothing_window {
            self.medians.pop_front();
        }
        self.medians.push_back(median);

        let sum: i64 = self.medians.iter().map(|&m| i64::from(m)).sum();
        let value_cg = div_round_nearest_i64(sum, self.medians.len() as i64);
        FilteredWeight {
            value_cg,
            stable: self.window_is_stable(),
        }
    }

    /// Forget all buffered samples.
    pub fn reset(&mut self) {
        self.raw.clear();
        self.medians.clear();
    }

    fn median(&mut self) -> i32 {
        self.scratch.clear();
        self.scratch.extend(self.raw.iter().copied());
        self.scratch.sort_unstable();
        let n = self.scratch.len();
        let mid = n / 2;
        if n % 2 == 1 {
            self.scratch[mid]
        } else {
            avg2_round_nearest_i32(self.scratch[mid - 1], self.scratch[mid])
        }
    }

    fn window_is_stable(&self) -> bool {
        if self.medians.len() < self.cfg.smoothing_window {
            return false;
        }
        let (mut lo, mut hi) = (i32::MAX, i32::MIN);
        for &m in &self.medians {
            lo = lo.min(m);
            hi = hi.max(m);
        }
        abs_diff_i32_u32(hi, lo) < self.cfg.stability_tolerance_cg.unsigned_abs()
    }
}

impl Default for WeightFilter {
    fn default() -> Self {
        Self::new(FilterCfg::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn filter(n: usize, m: usize) -> WeightFilter {
        WeightFilter::new(FilterCfg {
            median_window: n,
            smoothing_window: m,
            stability_tolerance_cg: 200,
        })
    }

    #[test]
    fn spike_is_rejected_by_median() {
        let mut f = filter(5, 1);
        for v in [1000, 1000, 90_000, 1000, 1000] {
            f.ingest(v);
        }
        assert_eq!(f.ingest(1000).value_cg, 1000);
    }

    #[test]
    fn even_median_window_rounds_middle_pair() {
        let mut f = filter(4, 1);
        f.ingest(10);
        f.ingest(11);
        f.ingest(20);
        assert_eq!(f.ingest(21).value_cg, 16);
    }

    #[test]
    fn not_stable_until_smoothing_window_full() {
        let mut f = filter(1, 3);
        assert!(!f.ingest(500).stable);
        assert!(!f.ingest(500).stable);
        assert!(f.ingest(500).stable);
    }

    #[test]
    fn spread_at_tolerance_is_unstable() {
        let mut f = filter(1, 2);
        f.ingest(0);
        let w = f.ingest(200);
        assert!(!w.stable);
        assert_eq!(w.value_cg, 100);
        assert!(f.ingest(399).stable);
    }

    #[test]
    fn reset_clears_history() {
        let mut f = filter(3, 3);
        for _ in 0..6 {
            f.ingest(700);
        }
        f.reset();
        let w = f.ingest(100);
        assert_eq!(w, FilteredWeight::settling(100));
    }

    #[test]
    fn zero_windows_are_clamped() {
        let mut f = filter(0, 0);
        assert_eq!(f.ingest(42), FilteredWeight::stable(42));
    }
}
