//! HD44780 character LCD driven through a PCF8574 I2C backpack (4-bit mode).
//!
//! Backpack wiring: P0 = RS, P1 = RW, P2 = E, P3 = backlight, P4..P7 = D4..D7.
use carafe_traits::{BoxError, Display};
use rppal::i2c::I2c;
use std::thread::sleep;
use std::time::Duration;

use crate::error::Result;

const RS: u8 = 0x01;
const EN: u8 = 0x04;
const BACKLIGHT: u8 = 0x08;

const CMD_CLEAR: u8 = 0x01;
const CMD_ENTRY_LEFT: u8 = 0x06;
const CMD_DISPLAY_ON: u8 = 0x0C;
const CMD_FUNCTION_4BIT_2LINE: u8 = 0x28;
const CMD_SET_CGRAM: u8 = 0x40;
const CMD_SET_DDRAM: u8 = 0x80;

const ROW_OFFSETS: [u8; 2] = [0x00, 0x40];

pub struct Lcd {
    i2c: I2c,
    cols: usize,
    backlight: u8,
    /// What each row currently shows, to skip unchanged rows
    shown: [Option<Vec<u8>>; 2],
}

impl Lcd {
    pub fn new(addr: u16, cols: usize) -> Result<Self> {
        let mut i2c = I2c::new()?;
        i2c.set_slave_address(addr)?;
        let mut lcd = Self {
            i2c,
            cols,
            backlight: BACKLIGHT,
            shown: [None, None],
        };
        lcd.init()?;
        Ok(lcd)
    }

    fn init(&mut self) -> Result<()> {
        sleep(Duration::from_millis(50));
        // Force 8-bit mode three times, then switch to 4-bit
        for _ in 0..3 {
            self.write_nibble(0x30, 0)?;
            sleep(Duration::from_millis(5));
        }
        self.write_nibble(0x20, 0)?;
        self.command(CMD_FUNCTION_4BIT_2LINE)?;
        self.command(CMD_DISPLAY_ON)?;
        self.command(CMD_CLEAR)?;
        sleep(Duration::from_millis(2));
        self.command(CMD_ENTRY_LEFT)?;
        tracing::debug!(cols = self.cols, "lcd initialised");
        Ok(())
    }

    fn expander_write(&mut self, byte: u8) -> Result<()> {
        self.i2c.write(&[byte | self.backlight])?;
        Ok(())
    }

    fn write_nibble(&mut self, high_nibble: u8, mode: u8) -> Result<()> {
        let data = (high_nibble & 0xF0) | mode;
        self.expander_write(data | EN)?;
        sleep(Duration::from_micros(1));
        self.expander_write(data)?;
        sleep(Duration::from_micros(50));
        Ok(())
    }

    fn send(&mut self, byte: u8, mode: u8) -> Result<()> {
        self.write_nibble(byte & 0xF0, mode)?;
        self.write_nibble(byte << 4, mode)
    }

    fn command(&mut self, cmd: u8) -> Result<()> {
        self.send(cmd, 0)
    }

    fn data(&mut self, byte: u8) -> Result<()> {
        self.send(byte, RS)
    }

    fn write_row(&mut self, row: usize, text: &str) -> Result<()> {
        let bytes = encode_row(text, self.cols);
        if self.shown[row].as_deref() == Some(bytes.as_slice()) {
            return Ok(());
        }
        self.command(CMD_SET_DDRAM | ROW_OFFSETS[row])?;
        for &b in &bytes {
            self.data(b)?;
        }
        self.shown[row] = Some(bytes);
        Ok(())
    }
}

/// Map text to LCD character codes: glyph slots pass through, non-ASCII becomes `?`.
fn encode_row(text: &str, cols: usize) -> Vec<u8> {
    let mut out: Vec<u8> = text
        .chars()
        .take(cols)
        .map(|c| match u8::try_from(u32::from(c)) {
            Ok(b) if b < 8 || (0x20..0x7F).contains(&b) => b,
            _ => b'?',
        })
        .collect();
    out.resize(cols, b' ');
    out
}

impl Display for Lcd {
    fn render(&mut self, lines: &[String; 2]) -> std::result::Result<(), BoxError> {
        for (row, text) in lines.iter().enumerate() {
            self.write_row(row, text)?;
        }
        Ok(())
    }

    fn set_backlight(&mut self, on: bool) -> std::result::Result<(), BoxError> {
        self.backlight = if on { BACKLIGHT } else { 0 };
        self.expander_write(0)?;
        Ok(())
    }

    fn define_char(&mut self, slot: u8, bitmap: [u8; 8]) -> std::result::Result<(), BoxError> {
        if slot >= 8 {
            return Err(format!("glyph slot {slot} out of range").into());
        }
        self.command(CMD_SET_CGRAM | (slot << 3))?;
        for row in bitmap {
            self.data(row)?;
        }
        // CGRAM writes move the address counter; force a full redraw
        self.shown = [None, None];
        Ok(())
    }
}
