use thiserror::Error;

use crate::domain::HouseholdId;

/// Errors raised by the engine core and its registry.
#[derive(Debug, Error)]
pub enum EngineError {
    #[error("Unknown household: {0}")]
    UnknownHousehold(HouseholdId),
    #[error("Household id {0} is outside the simulation namespace")]
    ReservedId(HouseholdId),
    #[error("Duplicate household id: {0}")]
    DuplicateHousehold(HouseholdId),
    #[error("Invalid household: {0}")]
    InvalidHousehold(String),
    #[error("Non-finite value in {0}")]
    NonFinite(&'static str),
}

impl From<validator::ValidationErrors> for EngineError {
    fn from(e: validator::ValidationErrors) -> Self {
        EngineError::InvalidHousehold(e.to_string())
    }
}

pub type EngineResult<T> = std::result::Result<T, EngineError>;

/// Reject NaN/inf before it leaks into prices or scores.
pub fn ensure_finite(value: f64, what: &'static str) -> EngineResult<f64> {
    if value.is_finite() {
        Ok(value)
    } else {
        Err(EngineError::NonFinite(what))
    }
}
