#![cfg_attr(all(not(debug_assertions), not(test)), deny(warnings))]
#![cfg_attr(
    all(not(debug_assertions), not(test)),
    deny(clippy::all, clippy::pedantic, clippy::nursery)
)]
#![allow(clippy::module_name_repetitions, clippy::missing_errors_doc)]
#![cfg_attr(not(test), deny(clippy::unwrap_used, clippy::expect_used))]
//! Weight-stream processing and claim assignment for the coffee station
//! (hardware-agnostic).
//!
//! All hardware interactions go through the `carafe_traits` collaborators.
//!
//! ## Architecture
//!
//! - **Calibration**: linear raw→centigram conversion (`calibration`)
//! - **Filtering**: median-of-N then mean-of-M with a stability flag (`filter`)
//! - **Detection**: pot present/absent state machine on stable readings (`detector`)
//! - **Assignment**: press lookback log and claimant sessions (`session`)
//! - **Threads**: sampler and input pollers feeding one event queue (`sampler`,
//!   `inputs`, `runner`)
//! - **Display**: serialized access to the single character display (`display`)
//!
//! ## Fixed-Point Arithmetic
//!
//! Internals operate in **centigrams** (cg, 1 cg = 0.01 g) using `i32` so that
//! comparisons against thresholds and the volume split are exact.

pub mod calibration;
pub mod config;
pub mod conversions;
pub mod detector;
pub mod display;
pub mod error;
pub mod event;
pub mod filter;
pub mod fixed_point;
pub mod hw_error;
pub mod inputs;
pub mod mocks;
pub mod pipeline;
pub mod runner;
pub mod sampler;
pub mod session;
pub mod util;

pub use calibration::Calibration;
pub use config::{DetectorCfg, FilterCfg, SamplerCfg, SessionCfg, UiCfg};
pub use detector::{DomainEvent, EventDetector, ScaleState};
pub use display::{Screen, SharedDisplay};
pub use error::{Result, SessionError, StationError};
pub use event::{Event, Stamped};
pub use filter::{FilteredWeight, WeightFilter};
pub use pipeline::WeightPipeline;
pub use runner::Station;
pub use session::{AssignmentSession, PressLog, Removal};
