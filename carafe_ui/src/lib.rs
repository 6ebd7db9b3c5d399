#![cfg_attr(all(not(debug_assertions), not(test)), deny(warnings))]
#![cfg_attr(
    all(not(debug_assertions), not(test)),
    deny(clippy::all, clippy::pedantic, clippy::nursery)
)]
#![allow(clippy::module_name_repetitions, clippy::missing_errors_doc)]
#![cfg_attr(not(test), deny(clippy::unwrap_used, clippy::expect_used))]
//! Page state machine for the station's two-line display.
//!
//! Exactly one [`Page`] is active. The [`Dispatcher`] feeds it every event
//! from the station queue in arrival order, synthesizes `Timeout` after a
//! period of inactivity, applies the transition the page asks for and
//! renders the result through the shared display.
pub mod context;
pub mod dispatcher;
pub mod page;
pub mod text;

pub use context::PageCtx;
pub use dispatcher::Dispatcher;
pub use page::{MENU, MenuItem, NameEntry, Page, PageFault};
