//! One polling thread per input collaborator.
//!
//! Transient device errors are retried with bounded exponential backoff and
//! are never forwarded to the dispatcher; only decoded inputs are.
use crate::event::Stamped;
use crate::hw_error::map_hw_error;
use crate::util::backoff;
use carafe_traits::InputDevice;
use carafe_traits::clock::Clock;
use crossbeam_channel as xch;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

const BACKOFF_BASE: Duration = Duration::from_millis(10);
const BACKOFF_MAX: Duration = Duration::from_secs(1);

pub struct InputPoller {
    name: &'static str,
    shutdown: Arc<AtomicBool>,
    join_handle: Option<std::thread::JoinHandle<()>>,
}

impl InputPoller {
    pub fn spawn<D, C>(
        name: &'static str,
        mut device: D,
        poll_timeout: Duration,
        clock: C,
        tx: xch::Sender<Stamped>,
    ) -> Self
    where
        D: InputDevice + Send + 'static,
        C: Clock + Send + 'static,
    {
        let shutdown = Arc::new(AtomicBool::new(false));
        let shutdown_clone = shutdown.clone();

        let join_handle = std::thread::spawn(move || {
            let mut errors: u32 = 0;
            while !shutdown_clone.load(Ordering::Relaxed) {
                match device.poll(poll_timeout) {
                    Ok(Some(input)) => {
                        errors = 0;
                        tracing::trace!(device = name, ?input, "input");
                        if tx.send(Stamped::new(clock.now(), input)).is_err() {
                            tracing::debug!(device = name, "input consumer disconnected");
                            break;
                        }
                    }
                    Ok(None) => errors = 0,
                    Err(e) => {
                        let err = map_hw_error(e.as_ref());
                        if errors == 0 {
                            tracing::warn!(device = name, error = %err, "input device error; retrying");
                        }
                        let pause = backoff(errors, BACKOFF_BASE, BACKOFF_MAX);
                        errors = errors.saturating_add(1);
                        clock.sleep(pause);
                    }
                }
            }
            tracing::trace!(device = name, "input poller exiting");
        });

        Self {
            name,
            shutdown,
            join_handle: Some(join_handle),
        }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }
}

impl Drop for InputPoller {
    fn drop(&mut self) {
        self.shutdown.store(true, Ordering::Relaxed);
        if let Some(handle) = self.join_handle.take()
            && let Err(e) = handle.join()
        {
            tracing::warn!(device = self.name, ?e, "input poller panicked during shutdown");
        }
    }
}
