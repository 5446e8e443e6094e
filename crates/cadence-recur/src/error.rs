use thiserror::Error;

use crate::expand::timezone::ConversionError;

/// Recurrence parsing, validation and expansion errors
#[derive(Error, Debug)]
pub enum RecurError {
    #[error("Invalid recurrence rule: {0}")]
    InvalidRule(String),

    #[error("Invalid date range: {0}")]
    InvalidRange(String),

    #[error(transparent)]
    Timezone(#[from] ConversionError),

    #[error(transparent)]
    CoreError(#[from] cadence_core::error::CoreError),
}

impl RecurError {
    /// Returns true for errors caused by a malformed rule rather than a bad query.
    #[must_use]
    pub const fn is_invalid_rule(&self) -> bool {
        matches!(self, Self::InvalidRule(_))
    }
}

pub type RecurResult<T> = std::result::Result<T, RecurError>;
