//! Device assembly and the station run loop.

use carafe_config::Config;
use carafe_core::runner::NamedInput;
use carafe_core::{
    Calibration, DetectorCfg, FilterCfg, PressLog, SamplerCfg, SessionCfg, SharedDisplay, Station,
    UiCfg, WeightPipeline,
};
use carafe_hardware::{ConsoleDisplay, DryRunSystem, KeyboardInput, SimHandle, SimulatedScale};
use carafe_store::{MemoryLedger, SqliteLedger};
use carafe_traits::{Display, Ledger, MonotonicClock, Scale, SystemControl};
use carafe_ui::text::ENTER_SLOT;
use carafe_ui::{Dispatcher, PageCtx};
use eyre::WrapErr;
use std::sync::atomic::AtomicBool;

/// A full pot in the simulation, grams (glass carafe plus ~1.2 l of coffee).
const SIM_POT_G: f64 = 1800.0;

/// Everything that talks to the outside world.
pub struct Devices {
    pub scale: Box<dyn Scale + Send>,
    pub display: Box<dyn Display + Send>,
    pub inputs: Vec<NamedInput>,
    pub system: Box<dyn SystemControl>,
}

/// Simulated load cell reporting counts at the configured calibration.
pub fn simulated_scale(cfg: &Config) -> (SimulatedScale, SimHandle) {
    let (scale, handle) =
        SimulatedScale::new(f64::from(cfg.calibration.gain_g_per_count), SIM_POT_G);
    let scale = scale
        .with_zero_counts(cfg.calibration.zero_counts)
        .with_jitter_counts(2);
    // Test hook: fail the first N reads
    if let Some(n) = std::env::var("CARAFE_TEST_SIM_FAIL")
        .ok()
        .and_then(|v| v.parse::<u32>().ok())
    {
        handle.fail(n);
    }
    (scale, handle)
}

fn simulated(cfg: &Config) -> Devices {
    let (scale, handle) = simulated_scale(cfg);
    let display =
        ConsoleDisplay::new(usize::from(cfg.hardware.display_cols)).with_glyph(ENTER_SLOT, '<');
    let keyboard: NamedInput = ("keyboard", Box::new(KeyboardInput::stdin(Some(handle))));
    tracing::info!("{}", carafe_hardware::keyboard::HELP);
    Devices {
        scale: Box::new(scale),
        display: Box::new(display),
        inputs: vec![keyboard],
        system: Box::new(DryRunSystem::default()),
    }
}

#[cfg(feature = "hardware")]
fn hardware(cfg: &Config) -> eyre::Result<Devices> {
    use carafe_hardware::{Encoder, HardwareScale, Lcd, Mcp23017Buttons, ShellSystem};

    let pins = &cfg.pins;
    let hw = &cfg.hardware;
    let scale = HardwareScale::new(pins.hx711_dt, pins.hx711_sck).wrap_err("open hx711")?;
    let display =
        Lcd::new(hw.display_i2c_addr, usize::from(hw.display_cols)).wrap_err("open lcd")?;
    let buttons = Mcp23017Buttons::new(hw.expander_i2c_addr, pins.expander_interrupt)
        .wrap_err("open button expander")?;
    let encoder = Encoder::new(
        pins.encoder_clk,
        pins.encoder_dt,
        pins.encoder_button,
        pins.red_button,
    )
    .wrap_err("open encoder pins")?;
    let buttons: NamedInput = ("buttons", Box::new(buttons));
    let encoder: NamedInput = ("encoder", Box::new(encoder));
    Ok(Devices {
        scale: Box::new(scale),
        display: Box::new(display),
        inputs: vec![buttons, encoder],
        system: Box::new(ShellSystem::new(cfg.system.allow_power)),
    })
}

pub fn devices(cfg: &Config, sim: bool) -> eyre::Result<Devices> {
    if sim {
        return Ok(simulated(cfg));
    }
    #[cfg(feature = "hardware")]
    {
        hardware(cfg)
    }
    #[cfg(not(feature = "hardware"))]
    {
        eyre::bail!("built without hardware support; use `run --sim`")
    }
}

/// The scale alone, for checks that do not need the UI.
pub fn scale_only(cfg: &Config) -> eyre::Result<Box<dyn Scale + Send>> {
    #[cfg(feature = "hardware")]
    {
        let scale = carafe_hardware::HardwareScale::new(cfg.pins.hx711_dt, cfg.pins.hx711_sck)
            .wrap_err("open hx711")?;
        Ok(Box::new(scale))
    }
    #[cfg(not(feature = "hardware"))]
    {
        Ok(Box::new(simulated_scale(cfg).0))
    }
}

/// SQLite ledger at `storage.db_path`, or an in-memory one when unset.
pub fn open_ledger(cfg: &Config) -> eyre::Result<Box<dyn Ledger>> {
    match &cfg.storage.db_path {
        Some(path) => {
            let ledger = SqliteLedger::open(path)
                .wrap_err_with(|| format!("open ledger {}", path.display()))?;
            tracing::info!(path = %path.display(), "ledger opened");
            Ok(Box::new(ledger))
        }
        None => {
            tracing::warn!("storage.db_path not set; served mugs are kept in memory only");
            Ok(Box::new(MemoryLedger::new()))
        }
    }
}

/// Run until `shutdown` is raised.
pub fn run(cfg: &Config, sim: bool, shutdown: &AtomicBool) -> eyre::Result<()> {
    let Devices {
        scale,
        display,
        inputs,
        system,
    } = devices(cfg, sim)?;
    let ledger = open_ledger(cfg)?;
    let clock = MonotonicClock::new();

    let session = SessionCfg::from(&cfg.session);
    let ctx = PageCtx::new(ledger, system, PressLog::new(session.lookback));
    let cols = usize::from(cfg.hardware.display_cols);
    let mut dispatcher = Dispatcher::new(
        ctx,
        SharedDisplay::new(display),
        clock,
        UiCfg::from(&cfg.ui),
        cols,
    );
    dispatcher.start()?;

    let pipeline = WeightPipeline::new(
        Calibration::from(&cfg.calibration),
        FilterCfg::from(&cfg.filter),
        DetectorCfg::from(&cfg.detector),
    );
    let station = Station::start(scale, pipeline, SamplerCfg::from(cfg), inputs, clock);
    tracing::info!(sim, inputs = ?station.input_names(), "coffee station running");

    dispatcher.run(station.events(), shutdown);

    tracing::info!(stalled_ms = station.sampler_stalled_ms(), "shutdown requested");
    drop(station);
    Ok(())
}
