//! Runtime configuration for the station engine.
//!
//! These are the structs consumed by the filter, detector, session and
//! workers. They are separate from the TOML schema in `carafe_config`; see
//! `conversions` for the mapping.
use std::time::Duration;

/// Filter configuration for signal conditioning.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FilterCfg {
    /// Raw samples in the median window (N).
    pub median_window: usize,
    /// Medians averaged by the smoothing stage (M).
    pub smoothing_window: usize,
    /// A full M-window is stable when `max - min` is below this (cg).
    pub stability_tolerance_cg: i32,
}

impl Default for FilterCfg {
    fn default() -> Self {
        Self {
            median_window: 5,
            smoothing_window: 3,
            stability_tolerance_cg: 200,
        }
    }
}

/// Thresholds of the pot present/absent state machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DetectorCfg {
    pub pot_threshold_cg: i32,
    pub mug_threshold_cg: i32,
}

impl Default for DetectorCfg {
    fn default() -> Self {
        Self {
            pot_threshold_cg: 8_000,
            mug_threshold_cg: 2_000,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionCfg {
    /// Presses this recent before a served mug become pre-claims.
    pub lookback: Duration,
}

impl Default for SessionCfg {
    fn default() -> Self {
        Self {
            lookback: Duration::from_secs(15),
        }
    }
}

/// Sampler thread behaviour.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SamplerCfg {
    /// Max wait for one raw sample.
    pub read_timeout: Duration,
    /// Consecutive failed reads before a `ScaleFault` is raised.
    pub fault_after: u32,
    /// Samples averaged for the startup tare; `None` keeps the configured zero.
    pub tare_samples: Option<u32>,
    /// Pause after a failed read before trying again.
    pub retry_backoff: Duration,
}

impl Default for SamplerCfg {
    fn default() -> Self {
        Self {
            read_timeout: Duration::from_millis(150),
            fault_after: 20,
            tare_samples: None,
            retry_backoff: Duration::from_millis(10),
        }
    }
}

/// Dispatcher timing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UiCfg {
    pub inactivity_timeout: Duration,
    /// Override of `inactivity_timeout` while a served mug awaits claims.
    pub session_timeout: Option<Duration>,
    pub notice: Duration,
    pub preempt_on_pot_events: bool,
}

impl Default for UiCfg {
    fn default() -> Self {
        Self {
            inactivity_timeout: Duration::from_secs(15),
            session_timeout: Some(Duration::from_secs(5)),
            notice: Duration::from_millis(1500),
            preempt_on_pot_events: true,
        }
    }
}
