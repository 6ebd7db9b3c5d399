//! Test and helper mocks for carafe_core and its dependents.
use crate::display::Screen;
use carafe_traits::{BoxError, Display, Input, InputDevice, Scale};
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// A scale that always errors on read.
pub struct NoopScale;

impl Scale for NoopScale {
    fn read(&mut self, _timeout: Duration) -> Result<i32, BoxError> {
        Err(Box::new(std::io::Error::other("noop scale")))
    }
}

/// Replays a fixed list of read results, then reports timeouts.
#[derive(Debug, Default)]
pub struct ScriptedScale {
    script: VecDeque<Result<i32, String>>,
    repeat_last: Option<i32>,
}

impl ScriptedScale {
    pub fn from_results(script: Vec<Result<i32, String>>) -> Self {
        Self {
            script: script.into(),
            repeat_last: None,
        }
    }

    /// Raw readings; the final value keeps being returned once the list runs out.
    pub fn holding(values: impl IntoIterator<Item = i32>) -> Self {
        let script: VecDeque<_> = values.into_iter().map(Ok).collect();
        let repeat_last = script.back().and_then(|r| r.as_ref().ok().copied());
        Self {
            script,
            repeat_last,
        }
    }

    /// Keep returning `v` once the script is exhausted.
    pub fn then_hold(mut self, v: i32) -> Self {
        self.repeat_last = Some(v);
        self
    }
}

impl Scale for ScriptedScale {
    fn read(&mut self, _timeout: Duration) -> Result<i32, BoxError> {
        match self.script.pop_front() {
            Some(Ok(v)) => Ok(v),
            Some(Err(e)) => Err(e.into()),
            None => match self.repeat_last {
                Some(v) => Ok(v),
                None => Err("scripted scale: read timeout".into()),
            },
        }
    }
}

/// Yields queued inputs, one per poll, then `None` until more are pushed.
#[derive(Debug, Clone, Default)]
pub struct ScriptedInput {
    queue: Arc<Mutex<VecDeque<Result<Input, String>>>>,
}

impl ScriptedInput {
    pub fn push(&self, input: Input) {
        if let Ok(mut q) = self.queue.lock() {
            q.push_back(Ok(input));
        }
    }

    pub fn push_error(&self, msg: &str) {
        if let Ok(mut q) = self.queue.lock() {
            q.push_back(Err(msg.to_string()));
        }
    }
}

impl InputDevice for ScriptedInput {
    fn poll(&mut self, timeout: Duration) -> Result<Option<Input>, BoxError> {
        let next = self.queue.lock().ok().and_then(|mut q| q.pop_front());
        match next {
            Some(Ok(input)) => Ok(Some(input)),
            Some(Err(e)) => Err(e.into()),
            None => {
                std::thread::sleep(timeout.min(Duration::from_millis(5)));
                Ok(None)
            }
        }
    }
}

#[derive(Debug, Default)]
struct Recording {
    backlight: bool,
    screens: Vec<Screen>,
    glyphs: Vec<(u8, [u8; 8])>,
    fail: bool,
}

/// Display that records every full update; clones share the recording.
#[derive(Debug, Clone, Default)]
pub struct RecordingDisplay {
    state: Arc<Mutex<Recording>>,
}

impl RecordingDisplay {
    /// A display whose every write fails.
    pub fn failing() -> Self {
        let d = Self::default();
        d.set_failing(true);
        d
    }

    pub fn set_failing(&self, fail: bool) {
        if let Ok(mut s) = self.state.lock() {
            s.fail = fail;
        }
    }

    pub fn screens(&self) -> Vec<Screen> {
        self.state
            .lock()
            .map(|s| s.screens.clone())
            .unwrap_or_default()
    }

    pub fn last(&self) -> Option<Screen> {
        self.state.lock().ok().and_then(|s| s.screens.last().cloned())
    }

    pub fn glyphs(&self) -> Vec<(u8, [u8; 8])> {
        self.state
            .lock()
            .map(|s| s.glyphs.clone())
            .unwrap_or_default()
    }

    fn with<R>(&self, f: impl FnOnce(&mut Recording) -> Result<R, BoxError>) -> Result<R, BoxError> {
        let mut s = self
            .state
            .lock()
            .map_err(|_| -> BoxError { "recording poisoned".into() })?;
        if s.fail {
            return Err("display i2c nack".into());
        }
        f(&mut s)
    }
}

impl Display for RecordingDisplay {
    fn render(&mut self, lines: &[String; 2]) -> Result<(), BoxError> {
        self.with(|s| {
            let screen = Screen {
                lines: lines.clone(),
                backlight: s.backlight,
            };
            s.screens.push(screen);
            Ok(())
        })
    }

    fn set_backlight(&mut self, on: bool) -> Result<(), BoxError> {
        self.with(|s| {
            s.backlight = on;
            Ok(())
        })
    }

    fn define_char(&mut self, slot: u8, bitmap: [u8; 8]) -> Result<(), BoxError> {
        self.with(|s| {
            s.glyphs.push((slot, bitmap));
            Ok(())
        })
    }
}
