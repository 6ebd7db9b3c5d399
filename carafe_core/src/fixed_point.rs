//! Fixed-point centigram arithmetic helpers.
//!
//! Operating in centigrams (`i32`, 1 cg = 0.01 g) keeps every threshold and
//! the served volume in a single integer unit.

/// Average of two i32 values, rounded to nearest with ties away from zero.
/// Uses 64-bit intermediates; cannot overflow.
#[inline]
pub fn avg2_round_nearest_i32(a: i32, b: i32) -> i32 {
    let s = (a as i64) + (b as i64);
    if s >= 0 {
        ((s + 1) / 2) as i32
    } else {
        ((s - 1) / 2) as i32
    }
}

/// Quantize a floating-point grams value to integer centigrams (cg), rounding to nearest
/// and clamping to the `i32` range. Non-finite values (NaN/±Inf) map to 0.
#[inline]
pub fn quantize_to_cg_i32(x_g: f64) -> i32 {
    if !x_g.is_finite() {
        return 0;
    }
    let scaled = (x_g * 100.0).round();
    if scaled >= i32::MAX as f64 {
        i32::MAX
    } else if scaled <= i32::MIN as f64 {
        i32::MIN
    } else {
        scaled as i32
    }
}

/// Absolute difference of two i32 values as u32 without overflow.
///
/// For any `i32` inputs, `|a - b| <= u32::MAX`, so the cast is always lossless.
#[inline]
pub fn abs_diff_i32_u32(a: i32, b: i32) -> u32 {
    let diff = (a as i64) - (b as i64);
    diff.unsigned_abs() as u32
}

/// Shorthand: convert configured grams (f32) to centigrams via rounding.
#[inline]
pub fn grams_to_cg(g: f32) -> i32 {
    quantize_to_cg_i32(f64::from(g))
}
