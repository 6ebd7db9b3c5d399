//! Simulated load cell with a coffee pot standing on it.
//!
//! `SimulatedScale` is handed to the sampler; the paired `SimHandle` stays
//! with whoever drives the simulation (keyboard commands, tests) and lifts,
//! pours and returns the pot.
use carafe_traits::{BoxError, Scale};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use crate::error::HwError;

#[derive(Debug)]
struct SimState {
    /// Pot plus contents, grams
    pot_g: f64,
    on_scale: bool,
    /// Reads still to fail before the cell "recovers"
    failing: u32,
    /// Flips every read to add a +/- jitter
    tick: bool,
}

fn lock(state: &Mutex<SimState>) -> MutexGuard<'_, SimState> {
    state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

pub struct SimulatedScale {
    state: Arc<Mutex<SimState>>,
    gain_g_per_count: f64,
    zero_counts: i32,
    jitter_counts: i32,
    period: Duration,
}

impl SimulatedScale {
    /// A scale holding a pot of `pot_g` grams, reporting counts at `gain_g_per_count`.
    pub fn new(gain_g_per_count: f64, pot_g: f64) -> (Self, SimHandle) {
        let state = Arc::new(Mutex::new(SimState {
            pot_g,
            on_scale: true,
            failing: 0,
            tick: false,
        }));
        let scale = Self {
            state: state.clone(),
            gain_g_per_count,
            zero_counts: 0,
            jitter_counts: 0,
            period: Duration::from_millis(100),
        };
        (scale, SimHandle { state })
    }

    /// Raw counts reported for an empty plate.
    pub fn with_zero_counts(mut self, zero_counts: i32) -> Self {
        self.zero_counts = zero_counts;
        self
    }

    /// Alternating +/- noise added to every reading.
    pub fn with_jitter_counts(mut self, jitter_counts: i32) -> Self {
        self.jitter_counts = jitter_counts;
        self
    }

    /// Time one conversion takes (an HX711 runs at 10 SPS by default).
    pub fn with_period(mut self, period: Duration) -> Self {
        self.period = period;
        self
    }

    fn counts_for(&self, grams: f64) -> i32 {
        let counts = (grams / self.gain_g_per_count).round();
        self.zero_counts
            .saturating_add(counts.clamp(f64::from(i32::MIN), f64::from(i32::MAX)) as i32)
    }
}

impl Scale for SimulatedScale {
    fn read(&mut self, timeout: Duration) -> Result<i32, BoxError> {
        if self.period > timeout {
            std::thread::sleep(timeout);
            return Err(Box::new(HwError::DataReadyTimeout));
        }
        std::thread::sleep(self.period);

        let (grams, tick) = {
            let mut st = lock(&self.state);
            if st.failing > 0 {
                st.failing -= 1;
                return Err(Box::new(HwError::Timeout));
            }
            st.tick = !st.tick;
            let grams = if st.on_scale { st.pot_g } else { 0.0 };
            (grams, st.tick)
        };
        let jitter = if tick { self.jitter_counts } else { -self.jitter_counts };
        let raw = self.counts_for(grams).saturating_add(jitter);
        tracing::trace!(raw, grams, "simulated sample");
        Ok(raw)
    }
}

/// Remote control for a `SimulatedScale`.
#[derive(Debug, Clone)]
pub struct SimHandle {
    state: Arc<Mutex<SimState>>,
}

impl SimHandle {
    /// Take the pot off the plate.
    pub fn lift(&self) {
        lock(&self.state).on_scale = false;
        tracing::info!("sim: pot lifted");
    }

    /// Put the pot back after `poured_g` grams went into a mug.
    pub fn put_back(&self, poured_g: f64) {
        let mut st = lock(&self.state);
        st.pot_g = (st.pot_g - poured_g.max(0.0)).max(0.0);
        st.on_scale = true;
        tracing::info!(poured_g, pot_g = st.pot_g, "sim: pot returned");
    }

    /// Refill the pot to `pot_g` grams.
    pub fn fill(&self, pot_g: f64) {
        lock(&self.state).pot_g = pot_g.max(0.0);
        tracing::info!(pot_g, "sim: pot filled");
    }

    /// Make the next `reads` reads fail with a timeout.
    pub fn fail(&self, reads: u32) {
        lock(&self.state).failing = reads;
        tracing::info!(reads, "sim: injecting read failures");
    }

    pub fn pot_on_scale(&self) -> bool {
        lock(&self.state).on_scale
    }

    /// Grams currently resting on the plate.
    pub fn grams(&self) -> f64 {
        let st = lock(&self.state);
        if st.on_scale { st.pot_g } else { 0.0 }
    }
}
