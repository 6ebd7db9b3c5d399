use carafe_core::{FilterCfg, FilteredWeight, WeightFilter};
use proptest::prelude::*;
use rstest::rstest;

fn cfg(n: usize, m: usize) -> FilterCfg {
    FilterCfg {
        median_window: n,
        smoothing_window: m,
        stability_tolerance_cg: 200,
    }
}

#[rstest]
#[case(1, 1)]
#[case(5, 3)]
#[case(4, 2)]
#[case(9, 5)]
fn constant_signal_is_stable_after_warm_up(#[case] n: usize, #[case] m: usize) {
    let mut f = WeightFilter::new(cfg(n, m));
    let mut last = None;
    for _ in 0..m {
        last = Some(f.ingest(123_456));
    }
    assert_eq!(last, Some(FilteredWeight::stable(123_456)));
}

#[test]
fn step_settles_after_median_and_smoothing_delay() {
    let mut f = WeightFilter::new(cfg(5, 3));
    for _ in 0..10 {
        f.ingest(0);
    }
    let mut out = Vec::new();
    for _ in 0..8 {
        out.push(f.ingest(10_000));
    }
    // median flips on the third new sample, the mean needs three medians
    assert_eq!(out[1], FilteredWeight::stable(0));
    assert!(!out[2].stable);
    assert_eq!(out[4], FilteredWeight::stable(10_000));
}

proptest! {
    // Filtering a constant converges to that constant and stays there.
    #[test]
    fn constant_signal_is_idempotent(
        c in -2_000_000i32..2_000_000,
        n in 1usize..12,
        m in 1usize..8,
        extra in 0usize..40,
        prefix in proptest::collection::vec(-2_000_000i32..2_000_000, 0..20),
    ) {
        let mut f = WeightFilter::new(cfg(n, m));
        for p in prefix {
            f.ingest(p);
        }
        // flush any history
        for _ in 0..(n + m) {
            f.ingest(c);
        }
        for _ in 0..=extra {
            prop_assert_eq!(f.ingest(c), FilteredWeight::stable(c));
        }
    }

    // Output never leaves the range of the inputs currently in the windows.
    #[test]
    fn output_is_bounded_by_inputs(
        samples in proptest::collection::vec(-1_000_000i32..1_000_000, 1..200),
    ) {
        let mut f = WeightFilter::new(cfg(5, 3));
        let lo = *samples.iter().min().unwrap_or(&0);
        let hi = *samples.iter().max().unwrap_or(&0);
        for s in samples {
            let w = f.ingest(s);
            prop_assert!(w.value_cg >= lo && w.value_cg <= hi);
        }
    }
}
