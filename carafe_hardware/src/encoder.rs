//! Rotary encoder (CLK/DT, pulled down) with its push button and the red
//! cancel button (both pulled up, active low), all on Pi GPIO.
use carafe_traits::{BoxError, Input, InputDevice};
use rppal::gpio::{Gpio, InputPin, Level, Trigger};
use std::time::{Duration, Instant};

use crate::error::{HwError, Result};
use crate::quadrature::Quadrature;
use crate::util::debounce;

const BUTTON_DEBOUNCE: Duration = Duration::from_millis(50);

pub struct Encoder {
    gpio: Gpio,
    clk: InputPin,
    dt: InputPin,
    press: InputPin,
    red: InputPin,
    decoder: Quadrature,
    last_press: Option<Instant>,
    last_red: Option<Instant>,
}

impl Encoder {
    pub fn new(clk_pin: u8, dt_pin: u8, press_pin: u8, red_pin: u8) -> Result<Self> {
        let gpio = Gpio::new()?;
        let mut clk = gpio.get(clk_pin)?.into_input_pulldown();
        let mut dt = gpio.get(dt_pin)?.into_input_pulldown();
        let mut press = gpio.get(press_pin)?.into_input_pullup();
        let mut red = gpio.get(red_pin)?.into_input_pullup();
        clk.set_interrupt(Trigger::Both)?;
        dt.set_interrupt(Trigger::Both)?;
        press.set_interrupt(Trigger::FallingEdge)?;
        red.set_interrupt(Trigger::FallingEdge)?;
        Ok(Self {
            gpio,
            clk,
            dt,
            press,
            red,
            decoder: Quadrature::new(),
            last_press: None,
            last_red: None,
        })
    }

    /// Turn one edge into an input, if it completes one.
    fn on_edge(&mut self, pin: u8, level: Level) -> Option<Input> {
        let now = Instant::now();
        if pin == self.clk.pin() || pin == self.dt.pin() {
            let (clk, dt) = (self.clk.is_high(), self.dt.is_high());
            return self.decoder.update(clk, dt).map(Input::Turn);
        }
        if level != Level::Low {
            return None;
        }
        if pin == self.press.pin() && debounce(&mut self.last_press, now, BUTTON_DEBOUNCE) {
            return Some(Input::Press);
        }
        if pin == self.red.pin() && debounce(&mut self.last_red, now, BUTTON_DEBOUNCE) {
            return Some(Input::Red);
        }
        None
    }
}

impl InputDevice for Encoder {
    fn poll(&mut self, timeout: Duration) -> std::result::Result<Option<Input>, BoxError> {
        let deadline = Instant::now() + timeout;
        loop {
            let remaining = deadline.saturating_duration_since(Instant::now());
            if remaining.is_zero() {
                return Ok(None);
            }
            let fired = self
                .gpio
                .poll_interrupts(
                    &[&self.clk, &self.dt, &self.press, &self.red],
                    true,
                    Some(remaining),
                )
                .map_err(HwError::from)?
                .map(|(pin, level)| (pin.pin(), level));
            let Some((pin, level)) = fired else {
                return Ok(None);
            };
            if let Some(input) = self.on_edge(pin, level) {
                tracing::trace!(?input, "encoder input");
                return Ok(Some(input));
            }
        }
    }
}
