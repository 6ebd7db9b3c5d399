//! Raw counts → calibrated centigrams → filtered weight → domain events.
use crate::calibration::Calibration;
use crate::config::{DetectorCfg, FilterCfg};
use crate::detector::{DomainEvent, EventDetector, ScaleState};
use crate::filter::{FilteredWeight, WeightFilter};

/// The per-sample work done on the sampler thread.
#[derive(Debug, Clone)]
pub struct WeightPipeline {
    calibration: Calibration,
    filter: WeightFilter,
    detector: EventDetector,
    last: Option<FilteredWeight>,
}

impl WeightPipeline {
    pub fn new(calibration: Calibration, filter: FilterCfg, detector: DetectorCfg) -> Self {
        Self {
            calibration,
            filter: WeightFilter::new(filter),
            detector: EventDetector::new(detector),
            last: None,
        }
    }

    pub fn calibration(&self) -> &Calibration {
        &self.calibration
    }

    /// Replace the tare zero; the filter restarts since old samples are off by the shift.
    pub fn set_zero_counts(&mut self, zero_counts: i32) {
        self.calibration = self.calibration.with_zero(zero_counts);
        self.filter.reset();
        self.last = None;
    }

    pub fn process(&mut self, raw: i32) -> Option<DomainEvent> {
        let cg = self.calibration.to_cg(raw);
        let w = self.filter.ingest(cg);
        self.last = Some(w);
        self.detector.observe(w)
    }

    pub fn last(&self) -> Option<FilteredWeight> {
        self.last
    }

    pub fn state(&self) -> ScaleState {
        self.detector.state()
    }
}

impl Default for WeightPipeline {
    fn default() -> Self {
        Self::new(
            Calibration::default(),
            FilterCfg::default(),
            DetectorCfg::default(),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn noisy_lift_emits_single_removal() {
        let mut p = WeightPipeline::default();
        let mut events = Vec::new();
        // default calibration: 1 count = 1 cg
        let trace = std::iter::repeat_n(500_000, 10)
            .chain([420_000, 150_000, 30_000, 31_000, 700_000])
            .chain(std::iter::repeat_n(30_000, 10));
        for raw in trace {
            events.extend(p.process(raw));
        }
        assert_eq!(events, vec![DomainEvent::PotRemoved]);
        assert_eq!(
            p.state(),
            ScaleState::PotAbsent {
                baseline_cg: 500_000
            }
        );
    }

    #[test]
    fn retare_resets_filter() {
        let mut p = WeightPipeline::default();
        for _ in 0..8 {
            p.process(1000);
        }
        p.set_zero_counts(1000);
        assert!(p.last().is_none());
        p.process(1000);
        assert_eq!(p.last(), Some(FilteredWeight::settling(0)));
    }
}
