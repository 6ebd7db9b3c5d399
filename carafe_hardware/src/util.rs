use std::time::{Duration, Instant};

use crate::error::{HwError, Result};

/// Wait until `is_high` turns false (the line went low) or `timeout` expires.
///
/// Sleeps `poll_interval` between checks instead of spinning. The HX711 pulls
/// DT low once a conversion is ready, which at 10 SPS can take ~100 ms.
pub fn wait_until_low_with_timeout(
    mut is_high: impl FnMut() -> bool,
    timeout: Duration,
    poll_interval: Duration,
) -> Result<()> {
    let deadline = Instant::now() + timeout;
    while is_high() {
        if Instant::now() >= deadline {
            return Err(HwError::DataReadyTimeout);
        }
        std::thread::sleep(poll_interval);
    }
    Ok(())
}

/// True when `last` is missing or at least `window` ago; updates `last` on acceptance.
pub fn debounce(last: &mut Option<Instant>, now: Instant, window: Duration) -> bool {
    match *last {
        Some(prev) if now.saturating_duration_since(prev) < window => false,
        _ => {
            *last = Some(now);
            true
        }
    }
}
