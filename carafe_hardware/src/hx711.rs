use carafe_traits::{BoxError, Scale};
use rppal::gpio::{Gpio, InputPin, OutputPin};
use std::time::Duration;
use tracing::trace;

use crate::error::{HwError, Result};
use crate::util::wait_until_low_with_timeout;

/// Extra SCK pulses after the 24 data bits: 1 = channel A, gain 128.
pub const GAIN_128_PULSES: u8 = 1;

pub struct Hx711 {
    dt: InputPin,
    sck: OutputPin,
    gain_pulses: u8,
}

impl Hx711 {
    pub fn new(dt: InputPin, mut sck: OutputPin, gain_pulses: u8) -> Self {
        sck.set_low(); // clock idle low; held high >60 us powers the chip down
        Self {
            dt,
            sck,
            gain_pulses,
        }
    }

    pub fn read_with_timeout(&mut self, timeout: Duration) -> Result<i32> {
        // DT goes low when a conversion is ready
        let dt = &self.dt;
        wait_until_low_with_timeout(|| dt.is_high(), timeout, Duration::from_micros(200))?;

        let mut value: i32 = 0;
        for _ in 0..24 {
            self.sck.set_high();
            spin_delay();
            value = (value << 1) | i32::from(self.dt.is_high());
            self.sck.set_low();
            spin_delay();
        }

        // Selects gain/channel of the next conversion
        for _ in 0..self.gain_pulses {
            self.sck.set_high();
            spin_delay();
            self.sck.set_low();
            spin_delay();
        }

        // Sign extend 24-bit two's complement
        if (value & 0x80_0000) != 0 {
            value |= !0xFF_FFFF;
        }
        trace!(raw = value, "hx711 raw read");
        Ok(value)
    }
}

#[inline(always)]
fn spin_delay() {
    std::hint::spin_loop();
}

/// The load cell under the coffee pot.
pub struct HardwareScale {
    hx711: Hx711,
    retries: u32,
}

impl HardwareScale {
    pub fn new(dt_pin: u8, sck_pin: u8) -> Result<Self> {
        let gpio = Gpio::new()?;
        let dt = gpio.get(dt_pin)?.into_input();
        let sck = gpio.get(sck_pin)?.into_output();
        Ok(Self {
            hx711: Hx711::new(dt, sck, GAIN_128_PULSES),
            retries: 3,
        })
    }
}

impl Scale for HardwareScale {
    fn read(&mut self, timeout: Duration) -> std::result::Result<i32, BoxError> {
        let mut attempts = 0;
        loop {
            match self.hx711.read_with_timeout(timeout) {
                Ok(raw) => return Ok(raw),
                Err(HwError::DataReadyTimeout | HwError::Timeout) if attempts < self.retries => {
                    attempts += 1;
                    tracing::debug!(retries = attempts, "hx711 not ready, retrying");
                }
                Err(e) => return Err(Box::new(e)),
            }
        }
    }
}
