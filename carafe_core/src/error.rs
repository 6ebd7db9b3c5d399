use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum StationError {
    #[error("hardware error: {0}")]
    Hardware(String),
    #[error("hardware fault: {0}")]
    HardwareFault(String),
    #[error("configuration error: {0}")]
    Config(String),
    #[error("timeout waiting for sensor")]
    Timeout,
    #[error("invalid state: {0}")]
    State(String),
    #[error("display error: {0}")]
    Display(String),
    #[error("storage error: {0}")]
    Storage(String),
}

/// Why an assignment session could not be committed.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum SessionError {
    #[error("session has no claimants")]
    NoClaimants,
    #[error("session was cancelled")]
    Cancelled,
}

pub type Result<T> = eyre::Result<T>;
pub use eyre::Report;
