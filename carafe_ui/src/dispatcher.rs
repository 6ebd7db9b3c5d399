//! The single consumer of the station queue.
//!
//! All page and session state lives here, on one thread. Producers only
//! send `Stamped` events; the display is the one shared resource and is
//! written through `SharedDisplay`.
use crate::context::PageCtx;
use crate::page::{Page, PageFault};
use crate::text::{ENTER_GLYPH, ENTER_SLOT, fit};
use carafe_core::display::{Screen, SharedDisplay};
use carafe_core::{Event, Stamped, StationError, UiCfg};
use carafe_traits::Display;
use carafe_traits::clock::Clock;
use crossbeam_channel as xch;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};

/// Upper bound on one blocking wait, so the shutdown flag is seen promptly.
const MAX_WAIT: Duration = Duration::from_millis(100);

pub struct Dispatcher<D, C> {
    page: Page,
    ctx: PageCtx,
    display: SharedDisplay<D>,
    clock: C,
    cfg: UiCfg,
    cols: usize,
    last_activity: Instant,
    notice_until: Option<Instant>,
}

impl<D: Display, C: Clock> Dispatcher<D, C> {
    pub fn new(ctx: PageCtx, display: SharedDisplay<D>, clock: C, cfg: UiCfg, cols: usize) -> Self {
        let now = clock.now();
        Self {
            page: Page::Home,
            ctx,
            display,
            clock,
            cfg,
            cols: cols.max(1),
            last_activity: now,
            notice_until: None,
        }
    }

    pub fn page(&self) -> &Page {
        &self.page
    }

    pub fn ctx(&self) -> &PageCtx {
        &self.ctx
    }

    /// Program the custom glyphs and draw the initial page.
    pub fn start(&mut self) -> Result<(), StationError> {
        self.display.define_char(ENTER_SLOT, ENTER_GLYPH)?;
        self.last_activity = self.clock.now();
        self.show(&self.page.render(&self.ctx))
    }

    /// Handle one event: update the page, reset the inactivity timer, redraw.
    pub fn dispatch(&mut self, stamped: Stamped) {
        let Stamped { at, event } = stamped;
        self.ctx.now = at;
        self.ctx.wall = self.clock.system_time();
        tracing::debug!(event = event.kind(), page = self.page.name(), "dispatch");

        if event != Event::Timeout {
            self.ctx.set_backlight(true);
        }
        if let Event::PersonButton(id) = event
            && !self.page.consumes_presses()
        {
            self.ctx.presses.record(id, at);
        }

        match &event {
            Event::ScaleFault(msg) => {
                self.settle();
                self.page = Page::Fault(msg.clone());
            }
            ev if self.preempts(ev) => {
                tracing::info!(event = ev.kind(), page = self.page.name(), "pot event preempts page");
                self.settle();
                self.page = Page::MugServing;
                if matches!(ev, Event::MugServed { .. }) {
                    self.apply(ev);
                }
            }
            ev => self.apply(ev),
        }

        self.last_activity = self.clock.now();
        self.redraw();
    }

    /// Fire the inactivity timeout or expire a notice if their time has come.
    pub fn tick(&mut self) {
        let now = self.clock.now();
        if let Some(until) = self.notice_until
            && now >= until
        {
            self.notice_until = None;
            self.redraw();
        }
        if now.saturating_duration_since(self.last_activity) >= self.page.timeout(&self.cfg) {
            tracing::debug!(page = self.page.name(), "inactivity timeout");
            self.dispatch(Stamped::new(now, Event::Timeout));
        }
    }

    /// When the next `tick` has something to do.
    pub fn next_deadline(&self) -> Instant {
        let timeout = self.last_activity + self.page.timeout(&self.cfg);
        match self.notice_until {
            Some(until) => until.min(timeout),
            None => timeout,
        }
    }

    /// Drain `events` until the channel closes or `shutdown` is set.
    pub fn run(&mut self, events: &xch::Receiver<Stamped>, shutdown: &AtomicBool) {
        while !shutdown.load(Ordering::Relaxed) {
            let wait = self
                .next_deadline()
                .saturating_duration_since(self.clock.now())
                .min(MAX_WAIT);
            match events.recv_timeout(wait) {
                Ok(ev) => self.dispatch(ev),
                Err(xch::RecvTimeoutError::Timeout) => {}
                Err(xch::RecvTimeoutError::Disconnected) => {
                    tracing::warn!("event queue closed");
                    break;
                }
            }
            self.tick();
        }
        tracing::info!(page = self.page.name(), "dispatcher stopped");
    }

    fn preempts(&self, ev: &Event) -> bool {
        if !self.cfg.preempt_on_pot_events {
            return false;
        }
        match ev {
            Event::PotRemoved => !matches!(self.page, Page::Home | Page::MugServing),
            Event::MugServed { .. } => !matches!(self.page, Page::MugServing),
            _ => false,
        }
    }

    /// Let the active page finish its work as if it had timed out.
    fn settle(&mut self) {
        if matches!(self.page, Page::Home) {
            return;
        }
        self.apply(&Event::Timeout);
    }

    fn apply(&mut self, ev: &Event) {
        match self.page.handle(ev, &mut self.ctx) {
            Ok(None) => {}
            Ok(Some(next)) => {
                tracing::debug!(from = self.page.name(), to = next.name(), "page transition");
                self.page = next;
            }
            Err(fault) => self.recover(fault),
        }
    }

    fn recover(&mut self, fault: PageFault) {
        tracing::error!(page = self.page.name(), error = %fault, "page fault; returning home");
        // A half-finished page must not leave its notice behind
        let _ = self.ctx.take_notice();
        self.page = Page::Home;
    }

    fn redraw(&mut self) {
        let screen = match self.ctx.take_notice() {
            Some(notice) => {
                self.notice_until = Some(self.clock.now() + self.cfg.notice);
                notice
            }
            None if self.notice_until.is_some() => return,
            None => self.page.render(&self.ctx),
        };
        let screen = Screen {
            backlight: self.ctx.backlight(),
            ..screen
        };
        if let Err(e) = self.show(&screen) {
            tracing::warn!(error = %e, "display update failed");
        }
    }

    fn show(&self, screen: &Screen) -> Result<(), StationError> {
        let fitted = Screen {
            lines: [fit(&screen.lines[0], self.cols), fit(&screen.lines[1], self.cols)],
            backlight: screen.backlight,
        };
        self.display.show(&fitted)
    }
}
