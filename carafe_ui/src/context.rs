//! Collaborators and per-dispatch state handed to every page.
use carafe_core::{PressLog, Screen};
use carafe_traits::{ButtonId, Ledger, SystemControl};
use std::time::{Instant, SystemTime};

pub struct PageCtx {
    pub ledger: Box<dyn Ledger>,
    pub system: Box<dyn SystemControl>,
    /// Unclaimed person-button presses, consumed when a mug is served.
    pub presses: PressLog,
    /// Arrival time of the event being handled.
    pub now: Instant,
    /// Wall-clock time of the event being handled, used to stamp entries.
    pub wall: SystemTime,
    backlight: bool,
    notice: Option<Screen>,
}

impl PageCtx {
    pub fn new(ledger: Box<dyn Ledger>, system: Box<dyn SystemControl>, presses: PressLog) -> Self {
        Self {
            ledger,
            system,
            presses,
            now: Instant::now(),
            wall: SystemTime::now(),
            backlight: true,
            notice: None,
        }
    }

    /// Show a transient two-line message before the next page render.
    pub fn notify(&mut self, top: impl Into<String>, bottom: impl Into<String>) {
        self.notice = Some(Screen::new(top, bottom));
    }

    pub fn take_notice(&mut self) -> Option<Screen> {
        self.notice.take()
    }

    pub fn set_backlight(&mut self, on: bool) {
        self.backlight = on;
    }

    pub fn backlight(&self) -> bool {
        self.backlight
    }

    /// Name given to `button`, or its number when unnamed or unreadable.
    pub fn display_name(&self, button: ButtonId) -> String {
        match self.ledger.name(button) {
            Ok(Some(name)) => name,
            Ok(None) => crate::text::button_label(button),
            Err(e) => {
                tracing::warn!(button, error = %e, "name lookup failed");
                crate::text::button_label(button)
            }
        }
    }
}
