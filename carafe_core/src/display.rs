//! Serialized access to the single physical display.
//!
//! A screen update is the backlight state plus both lines. It is written
//! under one guard so two producers can never interleave partial writes.
use crate::error::StationError;
use crate::hw_error::map_hw_error;
use carafe_traits::Display;
use std::sync::{Arc, Mutex, MutexGuard};

/// Everything shown by one update.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Screen {
    pub lines: [String; 2],
    pub backlight: bool,
}

impl Screen {
    pub fn new(top: impl Into<String>, bottom: impl Into<String>) -> Self {
        Self {
            lines: [top.into(), bottom.into()],
            backlight: true,
        }
    }

    pub fn dark(mut self) -> Self {
        self.backlight = false;
        self
    }
}

pub struct SharedDisplay<D> {
    inner: Arc<Mutex<D>>,
}

impl<D> Clone for SharedDisplay<D> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<D: Display> SharedDisplay<D> {
    pub fn new(device: D) -> Self {
        Self {
            inner: Arc::new(Mutex::new(device)),
        }
    }

    /// Write one full screen update under a single guard.
    pub fn show(&self, screen: &Screen) -> Result<(), StationError> {
        let mut dev = self.lock();
        dev.set_backlight(screen.backlight)
            .and_then(|()| dev.render(&screen.lines))
            .map_err(|e| StationError::Display(map_hw_error(e.as_ref()).to_string()))
    }

    pub fn define_char(&self, slot: u8, bitmap: [u8; 8]) -> Result<(), StationError> {
        self.lock()
            .define_char(slot, bitmap)
            .map_err(|e| StationError::Display(map_hw_error(e.as_ref()).to_string()))
    }

    /// Run `f` with exclusive access to the device.
    pub fn with<R>(&self, f: impl FnOnce(&mut D) -> R) -> R {
        f(&mut self.lock())
    }

    fn lock(&self) -> MutexGuard<'_, D> {
        self.inner.lock().unwrap_or_else(|poisoned| {
            tracing::warn!("display lock poisoned; recovering");
            self.inner.clear_poison();
            poisoned.into_inner()
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mocks::RecordingDisplay;

    #[test]
    fn show_writes_backlight_then_lines() {
        let rec = RecordingDisplay::default();
        let shared = SharedDisplay::new(rec.clone());
        shared.show(&Screen::new("Hello", "world").dark()).unwrap();
        assert_eq!(rec.screens(), vec![Screen::new("Hello", "world").dark()]);
    }

    #[test]
    fn poisoned_lock_is_recovered() {
        let rec = RecordingDisplay::default();
        let shared = SharedDisplay::new(rec.clone());
        let s2 = shared.clone();
        let _ = std::thread::spawn(move || {
            s2.with(|_| panic!("writer died mid-update"));
        })
        .join();
        shared.show(&Screen::new("still", "alive")).unwrap();
        assert_eq!(rec.screens().last(), Some(&Screen::new("still", "alive")));
    }

    #[test]
    fn device_errors_are_typed() {
        let rec = RecordingDisplay::failing();
        let shared = SharedDisplay::new(rec);
        let err = shared.show(&Screen::new("a", "b")).unwrap_err();
        assert!(matches!(err, StationError::Display(_)));
    }
}
