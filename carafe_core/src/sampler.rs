//! Background scale sampling.
//!
//! Spawns a thread that owns the `Scale`, runs the weight pipeline on every
//! raw sample and pushes the resulting events into the station queue. It also
//! tracks the last-ok timestamp and turns a run of failed reads into a
//! `ScaleFault` event (and the first good read after it into `ScaleRecovered`).
//!
//! Safety: Each `Sampler` spawns exactly one thread that is automatically
//! shut down when the `Sampler` is dropped, preventing thread leaks.
use crate::calibration::measure_zero;
use crate::config::SamplerCfg;
use crate::event::{Event, Stamped};
use crate::hw_error::map_hw_error;
use crate::pipeline::WeightPipeline;
use carafe_traits::Scale;
use carafe_traits::clock::Clock;
use crossbeam_channel as xch;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};

pub struct Sampler {
    last_ok: Arc<AtomicU64>,
    /// Milliseconds since spawn on the sampler's own clock.
    elapsed_ms: Box<dyn Fn() -> u64 + Send + Sync>,
    /// Shutdown flag for immediate response (atomic for lock-free check)
    shutdown: Arc<AtomicBool>,
    /// Join handle for graceful thread cleanup
    join_handle: Option<std::thread::JoinHandle<()>>,
}

impl Sampler {
    /// Event-driven sampler: relies on the sensor's own data-ready timing and
    /// only pauses after a failed read.
    pub fn spawn<S, C>(
        mut scale: S,
        mut pipeline: WeightPipeline,
        cfg: SamplerCfg,
        clock: C,
        tx: xch::Sender<Stamped>,
    ) -> Self
    where
        S: Scale + Send + 'static,
        C: Clock + Clone + Send + Sync + 'static,
    {
        let shutdown = Arc::new(AtomicBool::new(false));
        let shutdown_clone = shutdown.clone();
        let last_ok = Arc::new(AtomicU64::new(0));
        let last_ok_clone = last_ok.clone();
        let epoch = clock.now();
        let stall_clock = clock.clone();

        let join_handle = std::thread::spawn(move || {
            if let Some(n) = cfg.tare_samples {
                match measure_zero(&mut scale, n, cfg.read_timeout) {
                    Ok(zero) => pipeline.set_zero_counts(zero),
                    Err(e) => tracing::warn!(error = %e, "startup tare failed; keeping configured zero"),
                }
            }

            let mut failures: u32 = 0;
            let mut faulted = false;
            loop {
                // Immediate shutdown check (lock-free atomic)
                if shutdown_clone.load(Ordering::Relaxed) {
                    tracing::debug!("Sampler thread received shutdown signal");
                    break;
                }

                let mut out = Vec::with_capacity(2);
                match scale.read(cfg.read_timeout) {
                    Ok(raw) => {
                        last_ok_clone.store(clock.ms_since(epoch), Ordering::Relaxed);
                        if faulted {
                            tracing::info!(failures, "scale recovered");
                            out.push(Event::ScaleRecovered);
                            faulted = false;
                        }
                        failures = 0;
                        if let Some(ev) = pipeline.process(raw) {
                            tracing::info!(event = ?ev, "weight event");
                            out.push(ev.into());
                        }
                    }
                    Err(e) => {
                        failures = failures.saturating_add(1);
                        let err = map_hw_error(e.as_ref());
                        tracing::trace!(error = %err, failures, "scale read failed");
                        if !faulted && failures >= cfg.fault_after {
                            faulted = true;
                            tracing::error!(error = %err, failures, "scale fault");
                            out.push(Event::ScaleFault(err.to_string()));
                        }
                    }
                }

                let at = clock.now();
                // If send fails, consumer is gone; exit gracefully
                if out
                    .into_iter()
                    .any(|event| tx.send(Stamped { at, event }).is_err())
                {
                    tracing::debug!("Sampler consumer disconnected, exiting thread");
                    break;
                }

                // Only back off after errors; a healthy read blocks on data-ready
                if failures > 0 && !shutdown_clone.load(Ordering::Relaxed) {
                    clock.sleep(cfg.retry_backoff);
                }
            }
            tracing::trace!("Sampler thread exiting cleanly");
        });

        Self {
            last_ok,
            elapsed_ms: Box::new(move || stall_clock.ms_since(epoch)),
            shutdown,
            join_handle: Some(join_handle),
        }
    }

    /// Milliseconds since the last successful read, given `now_ms` on this sampler's clock.
    pub fn stalled_for(&self, now_ms: u64) -> u64 {
        now_ms.saturating_sub(self.last_ok.load(Ordering::Relaxed))
    }

    /// Milliseconds since the last successful read, measured on the sampler's clock.
    pub fn stalled_ms(&self) -> u64 {
        self.stalled_for((self.elapsed_ms)())
    }
}

impl Drop for Sampler {
    fn drop(&mut self) {
        self.shutdown.store(true, Ordering::Relaxed);

        // The thread exits between reads, or once the current read returns
        // (bounded by the sensor timeout).
        if let Some(handle) = self.join_handle.take() {
            match handle.join() {
                Ok(()) => {
                    tracing::trace!("Sampler thread joined successfully");
                }
                Err(e) => {
                    // Thread panicked; log but don't propagate (we're in Drop)
                    tracing::warn!(?e, "Sampler thread panicked during shutdown");
                }
            }
        }
    }
}
