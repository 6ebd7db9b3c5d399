//! Fixed-width text for the character display.
use carafe_traits::ButtonId;

/// Custom character slot holding the "enter" arrow.
pub const ENTER_SLOT: u8 = 0;

/// 5x8 bitmap of the "enter" arrow (↵).
pub const ENTER_GLYPH: [u8; 8] = [0x10, 0x10, 0x10, 0x14, 0x12, 0x1F, 0x02, 0x04];

/// The character that prints the glyph in [`ENTER_SLOT`].
pub const ENTER: char = '\u{0}';

/// Truncate `s` to `cols` characters.
pub fn fit(s: &str, cols: usize) -> String {
    s.chars().take(cols).collect()
}

/// Whole grams from centigrams, rounded to nearest.
pub fn grams(cg: i64) -> i64 {
    if cg >= 0 { (cg + 50) / 100 } else { (cg - 50) / 100 }
}

pub fn mugs(n: u32) -> String {
    if n == 1 {
        "1 mug".to_string()
    } else {
        format!("{n} mugs")
    }
}

/// Litres from centigrams of coffee (1 g ≈ 1 mL), two decimals.
pub fn litres(cg: i64) -> String {
    format!("{:.2} L", cg as f64 / 100_000.0)
}

/// Fallback label for a button nobody has named.
pub fn button_label(id: ButtonId) -> String {
    format!("#{id}")
}
