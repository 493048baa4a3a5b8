use crate::core::ports::StoreError;
use crate::core::work_day::ClockError;
use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ServiceError {
    /// Rejected before touching any state.
    #[error("invalid request: {0}")]
    Validation(String),

    /// The requested transition is illegal from the current state. Surfaced
    /// to the caller, never retried automatically.
    #[error(transparent)]
    Conflict(#[from] ClockError),

    #[error(transparent)]
    Store(#[from] StoreError),
}
