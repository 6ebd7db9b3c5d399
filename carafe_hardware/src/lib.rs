//! Devices of the coffee station.
//!
//! The simulation side (scale, console display, keyboard, system control) is
//! always built; the Raspberry Pi drivers need the `hardware` feature.
pub mod console;
pub mod error;
pub mod keyboard;
pub mod quadrature;
pub mod sim;
pub mod system;
pub mod util;

#[cfg(feature = "hardware")]
pub mod encoder;
#[cfg(feature = "hardware")]
pub mod expander;
#[cfg(feature = "hardware")]
pub mod hx711;
#[cfg(feature = "hardware")]
pub mod lcd;

pub use console::ConsoleDisplay;
pub use keyboard::KeyboardInput;
pub use sim::{SimHandle, SimulatedScale};
pub use system::{DryRunSystem, ShellSystem};

#[cfg(feature = "hardware")]
pub use encoder::Encoder;
#[cfg(feature = "hardware")]
pub use expander::Mcp23017Buttons;
#[cfg(feature = "hardware")]
pub use hx711::HardwareScale;
#[cfg(feature = "hardware")]
pub use lcd::Lcd;

#[cfg(test)]
mod tests {
    use super::*;
    use carafe_traits::Scale;
    use std::time::Duration;

    #[test]
    fn simulated_scale_follows_the_pot() {
        let (scale, handle) = SimulatedScale::new(0.01, 1000.0);
        let mut scale = scale.with_period(Duration::ZERO);
        let t = Duration::from_millis(100);
        assert_eq!(scale.read(t).unwrap(), 100_000);
        handle.lift();
        assert_eq!(scale.read(t).unwrap(), 0);
        handle.put_back(250.0);
        assert_eq!(scale.read(t).unwrap(), 75_000);
    }
}
