//! Sixteen person buttons on an MCP23017 I/O expander.
//!
//! Every pin is a pulled-up input compared against DEFVAL = 0xFF, so pressing
//! a button (pulling it low) asserts the mirrored, open-drain INT line.
use carafe_traits::{BoxError, ButtonId, Input, InputDevice};
use rppal::gpio::{Gpio, InputPin, Trigger};
use rppal::i2c::I2c;
use std::time::{Duration, Instant};

use crate::error::{HwError, Result};
use crate::util::debounce;

// Register addresses with IOCON.BANK = 0
const IODIRA: u8 = 0x00;
const GPINTENA: u8 = 0x04;
const DEFVALA: u8 = 0x06;
const INTCONA: u8 = 0x08;
const IOCON: u8 = 0x0A;
const GPPUA: u8 = 0x0C;
const INTFA: u8 = 0x0E;
const INTCAPA: u8 = 0x10;
const GPIOA: u8 = 0x12;

const IOCON_MIRROR: u8 = 0x40;
const IOCON_ODR: u8 = 0x04;

const DEBOUNCE: Duration = Duration::from_millis(200);

pub struct Mcp23017Buttons {
    i2c: I2c,
    interrupt: InputPin,
    last_press: [Option<Instant>; 16],
}

impl Mcp23017Buttons {
    pub fn new(addr: u16, interrupt_pin: u8) -> Result<Self> {
        let mut i2c = I2c::new()?;
        i2c.set_slave_address(addr)?;
        // Port A/B register pairs are adjacent with BANK = 0
        for (reg, value) in [
            (IOCON, IOCON_MIRROR | IOCON_ODR),
            (IODIRA, 0xFF),
            (GPPUA, 0xFF),
            (DEFVALA, 0xFF),
            (INTCONA, 0xFF),
            (GPINTENA, 0xFF),
        ] {
            i2c.write(&[reg, value, value])?;
        }

        let mut interrupt = Gpio::new()?.get(interrupt_pin)?.into_input_pullup();
        interrupt.set_interrupt(Trigger::FallingEdge)?;

        let mut dev = Self {
            i2c,
            interrupt,
            last_press: [None; 16],
        };
        // Clear anything latched before we started listening
        dev.read_pair(GPIOA)?;
        tracing::debug!(addr, interrupt_pin, "mcp23017 ready");
        Ok(dev)
    }

    fn read_pair(&mut self, reg: u8) -> Result<u16> {
        let mut buf = [0u8; 2];
        self.i2c.write_read(&[reg], &mut buf)?;
        Ok(u16::from_le_bytes(buf))
    }

    fn pressed_button(&mut self) -> Result<Option<ButtonId>> {
        let flags = self.read_pair(INTFA)?;
        let captured = self.read_pair(INTCAPA)?;
        // Reading GPIO releases the interrupt
        self.read_pair(GPIOA)?;
        Ok(pressed_from(flags, captured))
    }
}

/// First flagged pin whose captured level is low (A0 = 0 .. B7 = 15).
fn pressed_from(flags: u16, captured: u16) -> Option<ButtonId> {
    let pressed = flags & !captured;
    if pressed == 0 {
        return None;
    }
    ButtonId::try_from(pressed.trailing_zeros()).ok()
}

impl InputDevice for Mcp23017Buttons {
    fn poll(&mut self, timeout: Duration) -> std::result::Result<Option<Input>, BoxError> {
        let deadline = Instant::now() + timeout;
        loop {
            let remaining = deadline.saturating_duration_since(Instant::now());
            if remaining.is_zero() {
                return Ok(None);
            }
            if self
                .interrupt
                .poll_interrupt(true, Some(remaining))
                .map_err(HwError::from)?
                .is_none()
            {
                return Ok(None);
            }
            let Some(id) = self.pressed_button()? else {
                continue;
            };
            if debounce(&mut self.last_press[usize::from(id)], Instant::now(), DEBOUNCE) {
                tracing::debug!(button = id, "person button");
                return Ok(Some(Input::Person(id)));
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lowest_pressed_pin_wins() {
        // B1 flagged and low
        assert_eq!(pressed_from(0x0200, 0xFDFF), Some(9));
        // A2 and B0 both low: port A first
        assert_eq!(pressed_from(0x0104, 0xFEFB), Some(2));
    }

    #[test]
    fn release_edges_are_not_presses() {
        // A3 flagged but captured high (released)
        assert_eq!(pressed_from(0x0008, 0xFFFF), None);
        assert_eq!(pressed_from(0, 0), None);
    }
}
