//! Linear raw-count to centigram conversion and startup tare.
use crate::error::StationError;
use crate::fixed_point::quantize_to_cg_i32;
use crate::hw_error::map_hw_error;
use carafe_traits::Scale;
use std::time::Duration;

/// Simple linear calibration from raw scale counts to grams.
/// grams = gain_g_per_count * (raw - zero_counts) + offset_g
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Calibration {
    pub gain_g_per_count: f64,
    pub zero_counts: i32,
    pub offset_g: f64,
}

impl Calibration {
    pub fn to_grams(&self, raw: i32) -> f64 {
        let delta = i64::from(raw) - i64::from(self.zero_counts);
        self.gain_g_per_count * delta as f64 + self.offset_g
    }

    /// Convert raw counts directly to centigrams, rounded to nearest.
    ///
    /// A load cell behind an HX711 yields a few hundred counts per gram, so the
    /// gain is far below one centigram per count and cannot be quantized first.
    /// The product is taken in `f64` and rounded once.
    pub fn to_cg(&self, raw: i32) -> i32 {
        quantize_to_cg_i32(self.to_grams(raw))
    }

    pub fn with_zero(self, zero_counts: i32) -> Self {
        Self {
            zero_counts,
            ..self
        }
    }
}

impl Default for Calibration {
    fn default() -> Self {
        Self {
            gain_g_per_count: 0.01, // 1 count = 0.01 g (centigram), matches sim
            zero_counts: 0,
            offset_g: 0.0,
        }
    }
}

/// Average `samples` raw readings to obtain the tare zero in counts.
///
/// Individual failed reads are tolerated up to `samples` extra attempts; the
/// last error is returned when not enough readings could be collected.
pub fn measure_zero<S: Scale + ?Sized>(
    scale: &mut S,
    samples: u32,
    timeout: Duration,
) -> Result<i32, StationError> {
    let wanted = samples.max(1);
    let mut sum: i64 = 0;
    let mut got: u32 = 0;
    let mut last_err = StationError::Timeout;
    for _ in 0..wanted.saturating_mul(2) {
        match scale.read(timeout) {
            Ok(raw) => {
                sum += i64::from(raw);
                got += 1;
                if got == wanted {
                    let zero = crate::util::div_round_nearest_i64(sum, i64::from(got));
                    tracing::info!(zero_counts = zero, samples = got, "tare measured");
                    return Ok(zero);
                }
            }
            Err(e) => {
                last_err = map_hw_error(e.as_ref());
                tracing::debug!(error = %last_err, "tare read failed");
            }
        }
    }
    Err(last_err)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mocks::ScriptedScale;

    #[test]
    fn to_cg_handles_sub_centigram_gain() {
        let cal = Calibration {
            gain_g_per_count: 1.0 / 305.834,
            zero_counts: 1000,
            offset_g: 0.0,
        };
        // 5 kg above zero
        let raw = 1000 + 1_529_170;
        assert_eq!(cal.to_cg(raw), 500_000);
        assert_eq!(cal.to_cg(1000), 0);
    }

    #[test]
    fn offset_is_applied_after_gain() {
        let cal = Calibration {
            offset_g: 1.5,
            ..Calibration::default()
        };
        assert_eq!(cal.to_cg(100), 250);
    }

    #[test]
    fn measure_zero_averages_good_reads() {
        let mut scale = ScriptedScale::from_results(vec![
            Ok(100),
            Err("glitch".into()),
            Ok(102),
            Ok(104),
        ]);
        let zero = measure_zero(&mut scale, 3, Duration::from_millis(1)).unwrap();
        assert_eq!(zero, 102);
    }

    #[test]
    fn measure_zero_gives_up_after_bounded_attempts() {
        let mut scale = ScriptedScale::from_results(vec![]);
        let err = measure_zero(&mut scale, 2, Duration::from_millis(1)).unwrap_err();
        assert_eq!(err, StationError::Timeout);
    }
}
