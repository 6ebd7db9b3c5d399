//! The pages and their transitions.
//!
//! `handle` returns `Ok(None)` to stay (and redraw), `Ok(Some(p))` to replace
//! the active page, `Err(_)` when the page could not do its job; the
//! dispatcher logs the fault and returns to `Home`. Any (page, event) pair not
//! matched below stays on the page.
use crate::context::PageCtx;
use crate::text::{self, ENTER};
use carafe_core::display::Screen;
use carafe_core::{AssignmentSession, Event, Removal, UiCfg};
use carafe_traits::{ButtonId, Ledger, PowerAction, SystemControl, Totals};
use std::time::Duration;
use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum PageFault {
    #[error("storage: {0}")]
    Storage(String),
    #[error("system: {0}")]
    System(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MenuItem {
    NameButton,
    Stats,
    Hostname,
    Shutdown,
    Restart,
}

impl MenuItem {
    pub fn label(self) -> &'static str {
        match self {
            MenuItem::NameButton => "Name a button",
            MenuItem::Stats => "Stats",
            MenuItem::Hostname => "Host name",
            MenuItem::Shutdown => "Shutdown",
            MenuItem::Restart => "Restart",
        }
    }
}

pub const MENU: [MenuItem; 5] = [
    MenuItem::NameButton,
    MenuItem::Stats,
    MenuItem::Hostname,
    MenuItem::Shutdown,
    MenuItem::Restart,
];

/// Letters offered by the name dial, followed by "enter".
const DIAL_LEN: usize = 27;

/// Name being typed on the NameButton page.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NameEntry {
    pub button: Option<ButtonId>,
    pub name: String,
    /// Dial position: 0..=25 are A..Z, 26 is "enter".
    pub cursor: usize,
}

impl NameEntry {
    pub const MAX_LEN: usize = 15;

    fn selected(&self) -> Option<char> {
        u8::try_from(self.cursor)
            .ok()
            .filter(|&c| c < 26)
            .map(|c| char::from(b'A' + c))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Page {
    Home,
    Menu { highlight: usize },
    NameButton(NameEntry),
    Stats(Totals),
    Person { button: ButtonId },
    MugServing,
    MugServed(AssignmentSession),
    Hostname(String),
    Restart { action: PowerAction },
    Fault(String),
}

impl Page {
    pub fn name(&self) -> &'static str {
        match self {
            Page::Home => "home",
            Page::Menu { .. } => "menu",
            Page::NameButton(_) => "name_button",
            Page::Stats(_) => "stats",
            Page::Person { .. } => "person",
            Page::MugServing => "mug_serving",
            Page::MugServed(_) => "mug_served",
            Page::Hostname(_) => "hostname",
            Page::Restart { .. } => "restart",
            Page::Fault(_) => "fault",
        }
    }

    /// Inactivity before `Timeout` is dispatched to this page.
    pub fn timeout(&self, cfg: &UiCfg) -> Duration {
        match self {
            Page::MugServed(_) => cfg.session_timeout.unwrap_or(cfg.inactivity_timeout),
            _ => cfg.inactivity_timeout,
        }
    }

    /// Person buttons pressed on this page are claims, not lookback presses.
    pub fn consumes_presses(&self) -> bool {
        matches!(self, Page::MugServed(_) | Page::NameButton(_))
    }

    pub fn handle(&mut self, ev: &Event, ctx: &mut PageCtx) -> Result<Option<Page>, PageFault> {
        match self {
            Page::Home => Ok(match ev {
                Event::EncoderTurn(_) => Some(Page::Menu { highlight: 0 }),
                Event::PersonButton(id) => Some(Page::Person { button: *id }),
                Event::PotRemoved => Some(Page::MugServing),
                Event::Timeout => {
                    ctx.set_backlight(false);
                    None
                }
                _ => None,
            }),
            Page::Menu { highlight } => match ev {
                Event::EncoderTurn(dir) => {
                    *highlight = step(*highlight, dir.step(), MENU.len());
                    Ok(None)
                }
                Event::EncoderPress => open_item(MENU[*highlight % MENU.len()], ctx).map(Some),
                Event::RedButton => Ok(Some(back(ctx))),
                Event::Timeout => Ok(Some(Page::Home)),
                _ => Ok(None),
            },
            Page::NameButton(entry) => match ev {
                Event::PersonButton(id) => {
                    entry.button = Some(*id);
                    Ok(None)
                }
                Event::EncoderTurn(dir) => {
                    entry.cursor = step(entry.cursor, dir.step(), DIAL_LEN);
                    Ok(None)
                }
                Event::EncoderPress => Ok(press_dial(entry, ctx)),
                Event::RedButton => Ok(Some(back(ctx))),
                Event::Timeout => Ok(Some(Page::Home)),
                _ => Ok(None),
            },
            Page::Person { button } => match ev {
                Event::PersonButton(id) => {
                    *button = *id;
                    Ok(None)
                }
                Event::RedButton => Ok(Some(back(ctx))),
                Event::Timeout => Ok(Some(Page::Home)),
                _ => Ok(None),
            },
            Page::MugServing => Ok(match ev {
                Event::MugServed { volume_cg } => Some(Page::MugServed(AssignmentSession::open(
                    *volume_cg,
                    ctx.now,
                    &mut ctx.presses,
                ))),
                Event::PotReturned => Some(Page::Home),
                _ => None,
            }),
            Page::MugServed(session) => Ok(match ev {
                Event::PersonButton(id) => {
                    session.add_claimant(*id);
                    None
                }
                Event::RedButton => match session.remove_last() {
                    Removal::Removed { .. } => None,
                    Removal::Cancelled => {
                        tracing::info!(volume_cg = session.volume_cg(), "mug cancelled");
                        ctx.notify("Mug cancelled", "");
                        Some(Page::Home)
                    }
                },
                Event::EncoderPress | Event::Timeout => {
                    commit(session, ctx);
                    Some(Page::Home)
                }
                _ => None,
            }),
            Page::Restart { action } => match ev {
                Event::EncoderPress => {
                    let action = *action;
                    ctx.notify(power_label(action), "...");
                    ctx.system
                        .power(action)
                        .map_err(|e| PageFault::System(e.to_string()))?;
                    Ok(Some(Page::Home))
                }
                Event::RedButton => Ok(Some(back(ctx))),
                Event::Timeout => Ok(Some(Page::Home)),
                _ => Ok(None),
            },
            Page::Stats(_) | Page::Hostname(_) => Ok(match ev {
                Event::RedButton => Some(back(ctx)),
                Event::Timeout => Some(Page::Home),
                _ => None,
            }),
            Page::Fault(_) => Ok(match ev {
                Event::RedButton
                | Event::EncoderPress
                | Event::PersonButton(_)
                | Event::Timeout
                | Event::ScaleRecovered => Some(Page::Home),
                _ => None,
            }),
        }
    }

    pub fn render(&self, ctx: &PageCtx) -> Screen {
        match self {
            Page::Home => Screen::new("Hello !", ""),
            Page::Menu { highlight } => {
                Screen::new("Menu...", MENU[*highlight % MENU.len()].label())
            }
            Page::NameButton(entry) => match entry.button {
                None => Screen::new("Which button ?", ""),
                Some(id) => {
                    let dial = entry.selected().unwrap_or(ENTER);
                    Screen::new(format!("{id} - Name ?"), format!("{}{dial}", entry.name))
                }
            },
            Page::Stats(t) => Screen::new(text::mugs(t.count), text::litres(t.amount_cg)),
            Page::Person { button } => {
                let today = ctx.ledger.today(*button).unwrap_or_else(|e| {
                    tracing::warn!(button, error = %e, "daily totals unavailable");
                    Totals::default()
                });
                Screen::new(
                    format!("{}:", ctx.display_name(*button)),
                    format!(
                        "Today: {} - {} g",
                        text::mugs(today.count),
                        text::grams(today.amount_cg)
                    ),
                )
            }
            Page::MugServing => Screen::new("Serving...", ""),
            Page::MugServed(session) => {
                let names = session
                    .claimants()
                    .iter()
                    .map(|&id| ctx.display_name(id))
                    .collect::<Vec<_>>()
                    .join(" + ");
                Screen::new(
                    format!("{} g - Whose ?", text::grams(i64::from(session.volume_cg()))),
                    names,
                )
            }
            Page::Hostname(addrs) => Screen::new("Host name:", addrs.clone()),
            Page::Restart { action } => {
                Screen::new(format!("{} ?", power_label(*action)), "Press to confirm")
            }
            Page::Fault(msg) => Screen::new("Scale fault", msg.clone()),
        }
    }
}

fn step(i: usize, delta: isize, len: usize) -> usize {
    let len = len.max(1) as isize;
    (i as isize + delta).rem_euclid(len) as usize
}

fn back(ctx: &mut PageCtx) -> Page {
    ctx.notify("Back ...", "");
    Page::Home
}

fn power_label(action: PowerAction) -> &'static str {
    match action {
        PowerAction::Halt => "Shutdown",
        PowerAction::Reboot => "Restart",
    }
}

fn open_item(item: MenuItem, ctx: &mut PageCtx) -> Result<Page, PageFault> {
    Ok(match item {
        MenuItem::NameButton => Page::NameButton(NameEntry::default()),
        MenuItem::Stats => Page::Stats(
            ctx.ledger
                .totals()
                .map_err(|e| PageFault::Storage(e.to_string()))?,
        ),
        MenuItem::Hostname => Page::Hostname(match ctx.system.host_addresses() {
            Ok(addrs) => addrs,
            Err(e) => {
                tracing::warn!(error = %e, "host address lookup failed");
                format!("Error: {e}")
            }
        }),
        MenuItem::Shutdown => Page::Restart {
            action: PowerAction::Halt,
        },
        MenuItem::Restart => Page::Restart {
            action: PowerAction::Reboot,
        },
    })
}

fn press_dial(entry: &mut NameEntry, ctx: &mut PageCtx) -> Option<Page> {
    match (entry.selected(), entry.button) {
        (Some(letter), _) => {
            if entry.name.len() < NameEntry::MAX_LEN {
                entry.name.push(letter);
            }
            entry.cursor = 0;
            None
        }
        (None, Some(button)) if !entry.name.is_empty() => {
            match ctx.ledger.set_name(button, &entry.name) {
                Ok(()) => {
                    tracing::info!(button, name = %entry.name, "button named");
                    ctx.notify("Name saved:", entry.name.clone());
                }
                Err(e) => {
                    tracing::error!(button, error = %e, "saving name failed");
                    ctx.notify("Not saved", entry.name.clone());
                }
            }
            Some(Page::Menu { highlight: 0 })
        }
        // "enter" before a button and a name were chosen
        (None, _) => None,
    }
}

fn commit(session: &mut AssignmentSession, ctx: &mut PageCtx) {
    let entries = match session.commit(ctx.wall) {
        Ok(entries) => entries,
        Err(e) => {
            tracing::info!(volume_cg = session.volume_cg(), reason = %e, "mug cancelled");
            ctx.notify("Mug cancelled", "");
            return;
        }
    };
    let mut failed = 0usize;
    for entry in &entries {
        if let Err(e) = ctx.ledger.append(entry) {
            failed += 1;
            tracing::error!(user = entry.user, amount_cg = entry.amount_cg, error = %e, "ledger append failed");
        }
    }
    tracing::info!(
        volume_cg = session.volume_cg(),
        claimants = entries.len(),
        failed,
        "mug committed"
    );
    if failed == 0 {
        ctx.notify("OK !", "");
    } else {
        ctx.notify("Not saved", format!("{failed}/{} entries", entries.len()));
    }
}
