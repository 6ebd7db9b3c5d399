use carafe_core::{
    DetectorCfg, DomainEvent, EventDetector, FilterCfg, FilteredWeight, ScaleState,
    WeightPipeline,
};
use proptest::prelude::*;

const G: i32 = 100; // centigrams per gram

fn detector(pot_g: i32, mug_g: i32) -> EventDetector {
    EventDetector::new(DetectorCfg {
        pot_threshold_cg: pot_g * G,
        mug_threshold_cg: mug_g * G,
    })
}

fn feed(d: &mut EventDetector, grams: &[i32]) -> Vec<DomainEvent> {
    grams
        .iter()
        .filter_map(|&g| d.observe(FilteredWeight::stable(g * G)))
        .collect()
}

#[test]
fn scenario_a_lift_records_baseline() {
    let mut d = detector(80, 20);
    let events = feed(&mut d, &[5000, 5000, 5000, 300]);
    assert_eq!(events, vec![DomainEvent::PotRemoved]);
    assert_eq!(
        d.state(),
        ScaleState::PotAbsent {
            baseline_cg: 5000 * G
        }
    );
}

#[test]
fn scenario_b_lighter_return_is_a_mug() {
    let mut d = detector(1000, 20);
    assert_eq!(feed(&mut d, &[5000, 300, 300]), vec![DomainEvent::PotRemoved]);
    let events = feed(&mut d, &[4900]);
    assert_eq!(
        events,
        vec![DomainEvent::MugServed {
            volume_cg: 100 * G
        }]
    );
    assert_eq!(
        d.state(),
        ScaleState::PotPresent {
            reference_cg: Some(4900 * G)
        }
    );
}

#[test]
fn return_at_departure_weight_is_pot_returned() {
    let mut d = detector(80, 20);
    let events = feed(&mut d, &[2000, 0, 2000]);
    assert_eq!(events, vec![DomainEvent::PotRemoved, DomainEvent::PotReturned]);
}

#[test]
fn successive_mugs_use_the_new_reference() {
    let mut d = detector(500, 15);
    let events = feed(&mut d, &[3000, 0, 2750, 2750, 0, 2500]);
    assert_eq!(
        events,
        vec![
            DomainEvent::PotRemoved,
            DomainEvent::MugServed { volume_cg: 250 * G },
            DomainEvent::PotRemoved,
            DomainEvent::MugServed { volume_cg: 250 * G },
        ]
    );
}

#[test]
fn scenario_a_through_the_noisy_pipeline() {
    let mut p = WeightPipeline::new(
        Default::default(),
        FilterCfg::default(),
        DetectorCfg::default(),
    );
    let mut events = Vec::new();
    for raw in std::iter::repeat_n(5000 * G, 8).chain(std::iter::repeat_n(300 * G, 8)) {
        events.extend(p.process(raw));
    }
    assert_eq!(events, vec![DomainEvent::PotRemoved]);
    assert_eq!(
        p.state(),
        ScaleState::PotAbsent {
            baseline_cg: 5000 * G
        }
    );
}

#[test]
fn slightly_light_return_rearms_for_the_next_lift() {
    let mut p = WeightPipeline::default();
    let mut events = Vec::new();
    for grams in [2000, 300, 1999, 300, 1960] {
        for raw in std::iter::repeat_n(grams * G, 10) {
            events.extend(p.process(raw));
        }
    }
    assert_eq!(
        events,
        vec![
            DomainEvent::PotRemoved,
            DomainEvent::PotReturned,
            DomainEvent::PotRemoved,
            DomainEvent::MugServed { volume_cg: 39 * G },
        ]
    );
}

fn reading() -> impl Strategy<Value = FilteredWeight> {
    (0i32..600_000, any::<bool>()).prop_map(|(value_cg, stable)| FilteredWeight { value_cg, stable })
}

proptest! {
    // A dip that never climbs back within the pot threshold fires exactly one PotRemoved.
    #[test]
    fn dip_fires_exactly_one_removal(
        baseline in 100_000i32..500_000,
        dips in proptest::collection::vec((0i32..=1_000_000, any::<bool>()), 1..60),
    ) {
        let mut d = EventDetector::new(DetectorCfg::default());
        let pot = DetectorCfg::default().pot_threshold_cg;
        d.observe(FilteredWeight::stable(baseline));
        let mut events = Vec::new();
        // first stable dip reading guarantees the transition
        events.extend(d.observe(FilteredWeight::stable(baseline - pot)));
        for (x, stable) in dips {
            // stable readings stay at or below baseline - pot; noise can be anything
            let value_cg = if stable { (baseline - pot) * (x % 1001) / 1000 } else { x };
            events.extend(d.observe(FilteredWeight { value_cg, stable }));
        }
        prop_assert_eq!(events, vec![DomainEvent::PotRemoved]);
    }

    // Removal and return events strictly alternate, whatever the trace.
    #[test]
    fn removals_alternate_with_returns(trace in proptest::collection::vec(reading(), 0..300)) {
        let mut d = EventDetector::new(DetectorCfg::default());
        let mut absent = false;
        for w in trace {
            let before = d.state();
            match d.observe(w) {
                Some(DomainEvent::PotRemoved) => {
                    prop_assert!(!absent);
                    absent = true;
                }
                Some(DomainEvent::MugServed { volume_cg }) => {
                    prop_assert!(absent);
                    prop_assert!(volume_cg > DetectorCfg::default().mug_threshold_cg);
                    prop_assert!(volume_cg < DetectorCfg::default().pot_threshold_cg);
                    absent = false;
                }
                Some(DomainEvent::PotReturned) => {
                    prop_assert!(absent);
                    absent = false;
                }
                None => {
                    // no event without a state change between present and absent
                    prop_assert_eq!(
                        matches!(before, ScaleState::PotAbsent { .. }),
                        matches!(d.state(), ScaleState::PotAbsent { .. })
                    );
                }
            }
        }
    }
}
