//! Small arithmetic and retry helpers shared by the workers.
use std::time::Duration;

/// Integer division rounded to nearest, ties away from zero.
/// `den` must be positive; the result is clamped to the `i32` range.
#[inline]
pub fn div_round_nearest_i64(num: i64, den: i64) -> i32 {
    debug_assert!(den > 0, "div_round_nearest_i64: non-positive denominator");
    let den = den.max(1);
    let half = den / 2;
    let q = if num >= 0 {
        (num + half) / den
    } else {
        (num - half) / den
    };
    q.clamp(i64::from(i32::MIN), i64::from(i32::MAX)) as i32
}

/// Exponential backoff for worker retry loops: `base * 2^attempt`, capped at `max`.
#[inline]
pub fn backoff(attempt: u32, base: Duration, max: Duration) -> Duration {
    let factor = 1u32.checked_shl(attempt.min(16)).unwrap_or(u32::MAX);
    base.saturating_mul(factor).min(max)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn div_rounds_half_away_from_zero() {
        assert_eq!(div_round_nearest_i64(5, 2), 3);
        assert_eq!(div_round_nearest_i64(-5, 2), -3);
        assert_eq!(div_round_nearest_i64(4, 3), 1);
        assert_eq!(div_round_nearest_i64(300, 3), 100);
    }

    #[test]
    fn backoff_doubles_then_caps() {
        let base = Duration::from_millis(10);
        let max = Duration::from_millis(100);
        assert_eq!(backoff(0, base, max), Duration::from_millis(10));
        assert_eq!(backoff(2, base, max), Duration::from_millis(40));
        assert_eq!(backoff(10, base, max), max);
        assert_eq!(backoff(u32::MAX, base, max), max);
    }
}
