//! Collaborator boundaries for the coffee station.
//!
//! Everything that touches hardware, storage, or the host system sits behind
//! one of these traits so the core and the UI can run against simulations.
pub mod clock;

pub use clock::{Clock, MonotonicClock};

use std::time::{Duration, SystemTime};

/// Error type crossing every trait boundary.
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Identifier of a person button on the expander (0..=15).
pub type ButtonId = u8;

/// Number of person buttons wired to the expander.
pub const BUTTON_COUNT: u8 = 16;

pub trait Scale {
    /// Block until the amplifier has a sample or `timeout` expires; returns raw counts.
    fn read(&mut self, timeout: Duration) -> Result<i32, BoxError>;
}

/// Rotation direction reported by the encoder.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Direction {
    Clockwise,
    CounterClockwise,
}

impl Direction {
    /// Signed step for index arithmetic.
    pub fn step(self) -> isize {
        match self {
            Direction::Clockwise => 1,
            Direction::CounterClockwise => -1,
        }
    }
}

/// A single edge from one of the input collaborators.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Input {
    Person(ButtonId),
    Red,
    Turn(Direction),
    Press,
}

pub trait InputDevice {
    /// Wait up to `timeout` for the next input edge. `Ok(None)` means nothing happened.
    fn poll(&mut self, timeout: Duration) -> Result<Option<Input>, BoxError>;
}

/// Write-only two-line character display.
pub trait Display {
    fn render(&mut self, lines: &[String; 2]) -> Result<(), BoxError>;
    fn set_backlight(&mut self, on: bool) -> Result<(), BoxError>;
    /// Program a custom glyph; `slot` is 0..=7 and the glyph is printed as `char::from(slot)`.
    fn define_char(&mut self, slot: u8, bitmap: [u8; 8]) -> Result<(), BoxError>;
}

/// One committed share of a served mug.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LedgerEntry {
    pub user: ButtonId,
    /// Amount in centigrams (1 cg = 0.01 g).
    pub amount_cg: i32,
    pub at: SystemTime,
}

impl LedgerEntry {
    pub fn grams(&self) -> f32 {
        self.amount_cg as f32 / 100.0
    }
}

/// Aggregate over a set of ledger entries.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Totals {
    pub count: u32,
    pub amount_cg: i64,
}

impl Totals {
    pub fn grams(&self) -> f64 {
        self.amount_cg as f64 / 100.0
    }
}

/// Persistence collaborator.
pub trait Ledger {
    fn append(&mut self, entry: &LedgerEntry) -> Result<(), BoxError>;
    fn set_name(&mut self, button: ButtonId, name: &str) -> Result<(), BoxError>;
    /// Most recent name given to `button`, if any.
    fn name(&self, button: ButtonId) -> Result<Option<String>, BoxError>;
    /// Entries of `button` for the current local day.
    fn today(&self, button: ButtonId) -> Result<Totals, BoxError>;
    /// All entries ever recorded.
    fn totals(&self) -> Result<Totals, BoxError>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PowerAction {
    Halt,
    Reboot,
}

/// Host operations exposed to the menu.
pub trait SystemControl {
    fn host_addresses(&self) -> Result<String, BoxError>;
    fn power(&self, action: PowerAction) -> Result<(), BoxError>;
}

impl<T: Scale + ?Sized> Scale for Box<T> {
    fn read(&mut self, timeout: Duration) -> Result<i32, BoxError> {
        (**self).read(timeout)
    }
}

impl<T: InputDevice + ?Sized> InputDevice for Box<T> {
    fn poll(&mut self, timeout: Duration) -> Result<Option<Input>, BoxError> {
        (**self).poll(timeout)
    }
}

impl<T: Display + ?Sized> Display for Box<T> {
    fn render(&mut self, lines: &[String; 2]) -> Result<(), BoxError> {
        (**self).render(lines)
    }
    fn set_backlight(&mut self, on: bool) -> Result<(), BoxError> {
        (**self).set_backlight(on)
    }
    fn define_char(&mut self, slot: u8, bitmap: [u8; 8]) -> Result<(), BoxError> {
        (**self).define_char(slot, bitmap)
    }
}

impl<T: Ledger + ?Sized> Ledger for Box<T> {
    fn append(&mut self, entry: &LedgerEntry) -> Result<(), BoxError> {
        (**self).append(entry)
    }
    fn set_name(&mut self, button: ButtonId, name: &str) -> Result<(), BoxError> {
        (**self).set_name(button, name)
    }
    fn name(&self, button: ButtonId) -> Result<Option<String>, BoxError> {
        (**self).name(button)
    }
    fn today(&self, button: ButtonId) -> Result<Totals, BoxError> {
        (**self).today(button)
    }
    fn totals(&self) -> Result<Totals, BoxError> {
        (**self).totals()
    }
}

impl<T: SystemControl + ?Sized> SystemControl for Box<T> {
    fn host_addresses(&self) -> Result<String, BoxError> {
        (**self).host_addresses()
    }
    fn power(&self, action: PowerAction) -> Result<(), BoxError> {
        (**self).power(action)
    }
}
