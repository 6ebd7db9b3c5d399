//! Pot present/absent state machine over stable filtered readings.
//!
//! Only stable readings move the machine, which is what keeps a pot wobbling
//! near the threshold from emitting a burst of events. Every emitted event
//! corresponds to exactly one state change.
use crate::config::DetectorCfg;
use crate::filter::FilteredWeight;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScaleState {
    /// `reference_cg` is the last stable weight seen with the pot in place,
    /// `None` until the first stable reading.
    PotPresent { reference_cg: Option<i32> },
    /// `baseline_cg` is the stable weight just before the pot was lifted.
    PotAbsent { baseline_cg: i32 },
}

impl Default for ScaleState {
    fn default() -> Self {
        Self::PotPresent { reference_cg: None }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DomainEvent {
    PotRemoved,
    /// The pot came back lighter than it left by `volume_cg`.
    MugServed { volume_cg: i32 },
    /// The pot came back within the mug threshold of its departure weight.
    PotReturned,
}

#[derive(Debug, Clone)]
pub struct EventDetector {
    cfg: DetectorCfg,
    state: ScaleState,
}

impl EventDetector {
    pub fn new(cfg: DetectorCfg) -> Self {
        Self {
            cfg,
            state: ScaleState::default(),
        }
    }

    pub fn state(&self) -> ScaleState {
        self.state
    }

    pub fn cfg(&self) -> &DetectorCfg {
        &self.cfg
    }

    pub fn observe(&mut self, w: FilteredWeight) -> Option<DomainEvent> {
        if !w.stable {
            return None;
        }
        let current = w.value_cg;
        match self.state {
            ScaleState::PotPresent { reference_cg } => {
                if let Some(reference) = reference_cg
                    && drop_cg(reference, current) >= i64::from(self.cfg.pot_threshold_cg)
                {
                    self.state = ScaleState::PotAbsent {
                        baseline_cg: reference,
                    };
                    tracing::debug!(baseline_cg = reference, current_cg = current, "pot removed");
                    return Some(DomainEvent::PotRemoved);
                }
                self.state = ScaleState::PotPresent {
                    reference_cg: Some(current),
                };
                None
            }
            ScaleState::PotAbsent { baseline_cg } => {
                let delta = drop_cg(baseline_cg, current);
                // A loss up to the mug threshold is drip or noise, not a pour
                if delta <= i64::from(self.cfg.mug_threshold_cg) {
                    self.state = ScaleState::PotPresent {
                        reference_cg: Some(current),
                    };
                    tracing::debug!(baseline_cg, current_cg = current, "pot returned");
                    Some(DomainEvent::PotReturned)
                } else if delta < i64::from(self.cfg.pot_threshold_cg) {
                    self.state = ScaleState::PotPresent {
                        reference_cg: Some(current),
                    };
                    let volume_cg = i32::try_from(delta).unwrap_or(i32::MAX);
                    tracing::debug!(baseline_cg, current_cg = current, volume_cg, "mug served");
                    Some(DomainEvent::MugServed { volume_cg })
                } else {
                    None
                }
            }
        }
    }
}

impl Default for EventDetector {
    fn default() -> Self {
        Self::new(DetectorCfg::default())
    }
}

#[inline]
fn drop_cg(from: i32, to: i32) -> i64 {
    i64::from(from) - i64::from(to)
}
