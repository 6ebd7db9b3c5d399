#![cfg_attr(all(not(debug_assertions), not(test)), deny(warnings))]
#![cfg_attr(
    all(not(debug_assertions), not(test)),
    deny(clippy::all, clippy::pedantic, clippy::nursery)
)]
#![allow(clippy::module_name_repetitions, clippy::missing_errors_doc)]
//! Config schema for the coffee station.
//!
//! - `Config` and its sections are deserialized from TOML and validated.
//! - Every section except `[pins]` is optional and falls back to defaults.
//! - Calibration is accepted as given (gain/zero), never fitted here.
use serde::Deserialize;
use std::path::{Path, PathBuf};

#[derive(Debug, Deserialize)]
pub struct Pins {
    pub hx711_dt: u8,
    pub hx711_sck: u8,
    pub encoder_clk: u8,
    pub encoder_dt: u8,
    pub encoder_button: u8,
    pub red_button: u8,
    /// Open-drain interrupt line of the button expander
    pub expander_interrupt: u8,
}

#[derive(Debug, Deserialize, Clone, Copy)]
#[serde(default)]
pub struct CalibrationCfg {
    /// grams per count
    pub gain_g_per_count: f32,
    /// tare zero in raw counts
    pub zero_counts: i32,
    /// additive offset in grams (rarely needed; default 0.0)
    pub offset_g: f32,
    /// Re-measure `zero_counts` from the first samples at startup
    pub tare_on_start: bool,
    /// Number of samples averaged for the startup tare
    pub tare_samples: u32,
}

impl Default for CalibrationCfg {
    fn default() -> Self {
        Self {
            // HX711 at gain 128 with a 5 kg cell: ~305.8 counts per gram
            gain_g_per_count: 1.0 / 305.834,
            zero_counts: 0,
            offset_g: 0.0,
            tare_on_start: true,
            tare_samples: 10,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct FilterCfg {
    /// Raw samples fed to the median stage
    pub median_window: usize,
    /// Medians averaged by the smoothing stage
    pub smoothing_window: usize,
    /// Max spread (g) of the smoothing window for a reading to count as stable
    pub stability_tolerance_g: f32,
}

impl Default for FilterCfg {
    fn default() -> Self {
        Self {
            median_window: 5,
            smoothing_window: 3,
            stability_tolerance_g: 2.0,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct DetectorCfg {
    /// Weight drop (g) from the last stable reading that means the pot left
    pub pot_threshold_g: f32,
    /// Smallest weight loss (g) between departure and return counted as a mug
    pub mug_threshold_g: f32,
}

impl Default for DetectorCfg {
    fn default() -> Self {
        Self {
            pot_threshold_g: 80.0,
            mug_threshold_g: 20.0,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct SessionCfg {
    /// Button presses this recent (s) before a served mug are pre-claims; 0 disables
    pub lookback_s: u64,
}

impl Default for SessionCfg {
    fn default() -> Self {
        Self { lookback_s: 15 }
    }
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct UiCfg {
    /// Inactivity (s) before a Timeout event is dispatched to the active page
    pub inactivity_timeout_s: u64,
    /// Shorter inactivity (s) for a pending mug; falls back to `inactivity_timeout_s`
    pub session_timeout_s: Option<u64>,
    /// How long transient notices stay on screen (ms)
    pub notice_ms: u64,
    /// Settle the active page when the pot leaves or a mug is served elsewhere in the menu
    pub preempt_on_pot_events: bool,
}

impl Default for UiCfg {
    fn default() -> Self {
        Self {
            inactivity_timeout_s: 15,
            session_timeout_s: Some(5),
            notice_ms: 1500,
            preempt_on_pot_events: true,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct Hardware {
    /// Max time to wait for HX711 data-ready (DT low) before failing
    pub sensor_read_timeout_ms: u64,
    /// Consecutive failed reads before the scale is reported as faulty
    pub fault_after: u32,
    pub display_i2c_addr: u16,
    pub display_cols: u8,
    pub expander_i2c_addr: u16,
}

impl Default for Hardware {
    fn default() -> Self {
        Self {
            sensor_read_timeout_ms: 150,
            fault_after: 20,
            display_i2c_addr: 0x27,
            display_cols: 16,
            expander_i2c_addr: 0x20,
        }
    }
}

#[derive(Debug, Deserialize, Default)]
#[serde(default)]
pub struct Storage {
    /// SQLite database; entries are kept in memory only when unset
    pub db_path: Option<PathBuf>,
}

#[derive(Debug, Deserialize, Default)]
#[serde(default)]
pub struct SystemCfg {
    /// Actually run `shutdown` from the menu (otherwise log only)
    pub allow_power: bool,
}

#[derive(Debug, Deserialize, Default)]
#[serde(default)]
pub struct Logging {
    pub file: Option<String>,  // path to .log (JSON lines)
    pub level: Option<String>, // "info","debug"
    /// Log rotation policy: "never" | "daily" | "hourly" (default: never)
    pub rotation: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct Config {
    pub pins: Pins,
    #[serde(default)]
    pub calibration: CalibrationCfg,
    #[serde(default)]
    pub filter: FilterCfg,
    #[serde(default)]
    pub detector: DetectorCfg,
    #[serde(default)]
    pub session: SessionCfg,
    #[serde(default)]
    pub ui: UiCfg,
    #[serde(default)]
    pub hardware: Hardware,
    #[serde(default)]
    pub storage: Storage,
    #[serde(default)]
    pub system: SystemCfg,
    #[serde(default)]
    pub logging: Logging,
}

pub fn load_toml(s: &str) -> Result<Config, toml::de::Error> {
    toml::from_str::<Config>(s)
}

/// Read, parse, and validate a config file.
pub fn load_file(path: &Path) -> eyre::Result<Config> {
    let text = std::fs::read_to_string(path)
        .map_err(|e| eyre::eyre!("read config {:?}: {}", path, e))?;
    let cfg = load_toml(&text).map_err(|e| eyre::eyre!("invalid configuration: {}", e))?;
    cfg.validate()?;
    Ok(cfg)
}

#[inline]
fn positive(x: f32) -> bool {
    x.is_finite() && x > 0.0
}

impl Config {
    pub fn validate(&self) -> eyre::Result<()> {
        // Calibration
        let gain = self.calibration.gain_g_per_count;
        if !gain.is_finite() || gain == 0.0 {
            eyre::bail!("calibration.gain_g_per_count must be finite and non-zero");
        }
        if !self.calibration.offset_g.is_finite() {
            eyre::bail!("calibration.offset_g must be finite");
        }
        if self.calibration.tare_on_start && self.calibration.tare_samples == 0 {
            eyre::bail!("calibration.tare_samples must be >= 1 when tare_on_start is set");
        }

        // Filter
        if self.filter.median_window == 0 {
            eyre::bail!("filter.median_window must be >= 1");
        }
        if self.filter.smoothing_window == 0 {
            eyre::bail!("filter.smoothing_window must be >= 1");
        }
        if !positive(self.filter.stability_tolerance_g) {
            eyre::bail!("filter.stability_tolerance_g must be > 0");
        }

        // Detector
        if !positive(self.detector.mug_threshold_g) {
            eyre::bail!("detector.mug_threshold_g must be > 0");
        }
        if !positive(self.detector.pot_threshold_g) {
            eyre::bail!("detector.pot_threshold_g must be > 0");
        }
        if self.detector.mug_threshold_g >= self.detector.pot_threshold_g {
            eyre::bail!("detector.mug_threshold_g must be < detector.pot_threshold_g");
        }

        // Session
        if self.session.lookback_s > 60 * 60 {
            eyre::bail!("session.lookback_s is unreasonably large (>1h)");
        }

        // UI
        if self.ui.inactivity_timeout_s == 0 {
            eyre::bail!("ui.inactivity_timeout_s must be >= 1");
        }
        if self.ui.session_timeout_s == Some(0) {
            eyre::bail!("ui.session_timeout_s must be >= 1");
        }
        if self.ui.notice_ms > 60 * 1000 {
            eyre::bail!("ui.notice_ms is unreasonably large (>1min)");
        }

        // Hardware
        if self.hardware.sensor_read_timeout_ms == 0 {
            eyre::bail!("hardware.sensor_read_timeout_ms must be >= 1");
        }
        if self.hardware.fault_after == 0 {
            eyre::bail!("hardware.fault_after must be >= 1");
        }
        if self.hardware.display_cols < 8 {
            eyre::bail!("hardware.display_cols must be >= 8");
        }

        // Logging
        if let Some(rot) = self.logging.rotation.as_deref()
            && !matches!(rot, "never" | "daily" | "hourly")
        {
            eyre::bail!("logging.rotation must be one of never|daily|hourly");
        }

        Ok(())
    }
}
