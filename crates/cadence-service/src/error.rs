use cadence_db::error::DbError;
use cadence_recur::error::RecurError;
use chrono::NaiveDate;
use thiserror::Error;
use uuid::Uuid;

/// Service layer errors
#[derive(Error, Debug)]
pub enum ServiceError {
    #[error("Invalid recurrence rule: {0}")]
    InvalidRule(String),

    #[error("Invalid date range: {0}")]
    InvalidRange(String),

    #[error("Event {event_id} has no live occurrence on {date}")]
    OccurrenceNotFound { event_id: Uuid, date: NaiveDate },

    #[error("Event {event_id} already has a forward override on {date}")]
    OverrideConflict { event_id: Uuid, date: NaiveDate },

    /// Retryable gateway failure, including timeouts.
    #[error("Database unavailable: {0}")]
    DatabaseUnavailable(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error(transparent)]
    CoreError(#[from] cadence_core::error::CoreError),
}

impl ServiceError {
    /// Returns true if the caller may retry the same request later.
    #[must_use]
    pub const fn is_retryable(&self) -> bool {
        matches!(self, Self::DatabaseUnavailable(_))
    }

    /// Returns true if the request itself was at fault.
    #[must_use]
    pub const fn is_client_error(&self) -> bool {
        matches!(
            self,
            Self::InvalidRule(_)
                | Self::InvalidRange(_)
                | Self::OccurrenceNotFound { .. }
                | Self::OverrideConflict { .. }
                | Self::NotFound(_)
                | Self::InvalidInput(_)
                | Self::Conflict(_)
        )
    }
}

impl From<RecurError> for ServiceError {
    fn from(err: RecurError) -> Self {
        match err {
            RecurError::InvalidRule(message) => Self::InvalidRule(message),
            RecurError::InvalidRange(message) => Self::InvalidRange(message),
            RecurError::Timezone(err) => Self::InvalidInput(err.to_string()),
            RecurError::CoreError(err) => Self::CoreError(err),
        }
    }
}

impl From<DbError> for ServiceError {
    fn from(err: DbError) -> Self {
        match err {
            DbError::Unavailable(_) | DbError::Timeout => {
                Self::DatabaseUnavailable(err.to_string())
            }
            DbError::NotFound(what) => Self::NotFound(what),
            DbError::Conflict(message) => Self::Conflict(message),
            DbError::CoreError(err) => Self::CoreError(err),
        }
    }
}

pub type ServiceResult<T> = std::result::Result<T, ServiceError>;
