//! Terminal stand-in for the character LCD.
use carafe_traits::{BoxError, Display};
use std::io::{self, Write};

use crate::error::HwError;

/// Draws each screen as a framed box on a writer (stdout by default).
pub struct ConsoleDisplay<W = io::Stdout> {
    out: W,
    cols: usize,
    backlight: bool,
    /// Printable stand-ins for the custom glyph slots 0..=7
    glyphs: [Option<char>; 8],
}

impl ConsoleDisplay<io::Stdout> {
    pub fn new(cols: usize) -> Self {
        Self::with_writer(io::stdout(), cols)
    }
}

impl<W: Write> ConsoleDisplay<W> {
    pub fn with_writer(out: W, cols: usize) -> Self {
        Self {
            out,
            cols,
            backlight: true,
            glyphs: [None; 8],
        }
    }

    /// Print `ch` wherever the glyph in `slot` appears.
    pub fn with_glyph(mut self, slot: u8, ch: char) -> Self {
        if let Some(g) = self.glyphs.get_mut(usize::from(slot)) {
            *g = Some(ch);
        }
        self
    }

    pub fn into_inner(self) -> W {
        self.out
    }

    fn printable(&self, line: &str) -> String {
        let mut s: String = line
            .chars()
            .map(|c| match u8::try_from(u32::from(c)) {
                Ok(slot) if slot < 8 => self.glyphs[usize::from(slot)].unwrap_or('?'),
                _ if c.is_control() => '?',
                _ => c,
            })
            .take(self.cols)
            .collect();
        let len = s.chars().count();
        s.extend(std::iter::repeat_n(' ', self.cols.saturating_sub(len)));
        s
    }

    fn draw(&mut self, lines: &[String; 2]) -> io::Result<()> {
        let (edge, side) = if self.backlight { ('-', '|') } else { ('.', ':') };
        let border: String = std::iter::repeat_n(edge, self.cols).collect();
        let top = self.printable(&lines[0]);
        let bottom = self.printable(&lines[1]);
        writeln!(self.out, "+{border}+")?;
        writeln!(self.out, "{side}{top}{side}")?;
        writeln!(self.out, "{side}{bottom}{side}")?;
        writeln!(self.out, "+{border}+")?;
        self.out.flush()
    }
}

impl<W: Write> Display for ConsoleDisplay<W> {
    fn render(&mut self, lines: &[String; 2]) -> Result<(), BoxError> {
        self.draw(lines).map_err(|e| Box::new(HwError::Io(e)) as BoxError)
    }

    fn set_backlight(&mut self, on: bool) -> Result<(), BoxError> {
        self.backlight = on;
        Ok(())
    }

    fn define_char(&mut self, slot: u8, _bitmap: [u8; 8]) -> Result<(), BoxError> {
        if slot >= 8 {
            return Err(format!("glyph slot {slot} out of range").into());
        }
        tracing::debug!(slot, "console display: custom glyph registered");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lines(a: &str, b: &str) -> [String; 2] {
        [a.to_string(), b.to_string()]
    }

    #[test]
    fn pads_and_truncates_to_width() {
        let mut d = ConsoleDisplay::with_writer(Vec::new(), 8);
        d.render(&lines("Hello !", "a very long line")).unwrap();
        let out = String::from_utf8(d.into_inner()).unwrap();
        assert_eq!(
            out,
            "+--------+\n|Hello ! |\n|a very l|\n+--------+\n"
        );
    }

    #[test]
    fn glyph_slots_use_their_stand_in() {
        let mut d = ConsoleDisplay::with_writer(Vec::new(), 4).with_glyph(0, '>');
        d.render(&lines("A\u{0}", "\u{1}")).unwrap();
        let out = String::from_utf8(d.into_inner()).unwrap();
        assert!(out.contains("|A>  |"), "{out}");
        assert!(out.contains("|?   |"), "{out}");
    }

    #[test]
    fn backlight_off_changes_the_frame() {
        let mut d = ConsoleDisplay::with_writer(Vec::new(), 2);
        d.set_backlight(false).unwrap();
        d.render(&lines("", "")).unwrap();
        let out = String::from_utf8(d.into_inner()).unwrap();
        assert_eq!(out, "+..+\n:  :\n:  :\n+..+\n");
    }

    #[test]
    fn rejects_out_of_range_slot() {
        let mut d = ConsoleDisplay::with_writer(Vec::new(), 16);
        assert!(d.define_char(8, [0; 8]).is_err());
        assert!(d.define_char(7, [0; 8]).is_ok());
    }
}
