use thiserror::Error;

/// Persistence gateway errors
#[derive(Error, Debug)]
pub enum DbError {
    #[error("Store unavailable: {0}")]
    Unavailable(String),

    #[error("Store operation timed out")]
    Timeout,

    /// A uniqueness constraint rejected the write.
    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error(transparent)]
    CoreError(#[from] cadence_core::error::CoreError),
}

impl DbError {
    /// Returns true for failures of the store itself rather than of the request.
    #[must_use]
    pub const fn is_unavailable(&self) -> bool {
        matches!(self, Self::Unavailable(_) | Self::Timeout)
    }
}

pub type DbResult<T> = std::result::Result<T, DbError>;
