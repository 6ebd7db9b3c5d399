//! Mapping from the TOML schema (`carafe_config`) onto runtime config.
use crate::calibration::Calibration;
use crate::config::{DetectorCfg, FilterCfg, SamplerCfg, SessionCfg, UiCfg};
use crate::fixed_point::grams_to_cg;
use std::time::Duration;

impl From<&carafe_config::FilterCfg> for FilterCfg {
    fn from(c: &carafe_config::FilterCfg) -> Self {
        Self {
            median_window: c.median_window.max(1),
            smoothing_window: c.smoothing_window.max(1),
            stability_tolerance_cg: grams_to_cg(c.stability_tolerance_g).max(1),
        }
    }
}

impl From<&carafe_config::DetectorCfg> for DetectorCfg {
    fn from(c: &carafe_config::DetectorCfg) -> Self {
        Self {
            pot_threshold_cg: grams_to_cg(c.pot_threshold_g),
            mug_threshold_cg: grams_to_cg(c.mug_threshold_g),
        }
    }
}

impl From<&carafe_config::SessionCfg> for SessionCfg {
    fn from(c: &carafe_config::SessionCfg) -> Self {
        Self {
            lookback: Duration::from_secs(c.lookback_s),
        }
    }
}

impl From<&carafe_config::UiCfg> for UiCfg {
    fn from(c: &carafe_config::UiCfg) -> Self {
        Self {
            inactivity_timeout: Duration::from_secs(c.inactivity_timeout_s),
            session_timeout: c.session_timeout_s.map(Duration::from_secs),
            notice: Duration::from_millis(c.notice_ms),
            preempt_on_pot_events: c.preempt_on_pot_events,
        }
    }
}

impl From<&carafe_config::CalibrationCfg> for Calibration {
    fn from(c: &carafe_config::CalibrationCfg) -> Self {
        Self {
            gain_g_per_count: f64::from(c.gain_g_per_count),
            zero_counts: c.zero_counts,
            offset_g: f64::from(c.offset_g),
        }
    }
}

impl From<&carafe_config::Config> for SamplerCfg {
    fn from(c: &carafe_config::Config) -> Self {
        Self {
            read_timeout: Duration::from_millis(c.hardware.sensor_read_timeout_ms),
            fault_after: c.hardware.fault_after.max(1),
            tare_samples: c
                .calibration
                .tare_on_start
                .then_some(c.calibration.tare_samples),
            ..SamplerCfg::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_map_onto_runtime_defaults() {
        let cfg = carafe_config::load_toml(
            r#"
            [pins]
            hx711_dt = 5
            hx711_sck = 6
            encoder_clk = 17
            encoder_dt = 27
            encoder_button = 22
            red_button = 23
            expander_interrupt = 24
            "#,
        )
        .unwrap();
        assert_eq!(FilterCfg::from(&cfg.filter), FilterCfg::default());
        assert_eq!(DetectorCfg::from(&cfg.detector), DetectorCfg::default());
        assert_eq!(SessionCfg::from(&cfg.session), SessionCfg::default());
        assert_eq!(UiCfg::from(&cfg.ui), UiCfg::default());
        let sampler = SamplerCfg::from(&cfg);
        assert_eq!(sampler.tare_samples, Some(10));
        assert_eq!(sampler.fault_after, 20);
    }
}
