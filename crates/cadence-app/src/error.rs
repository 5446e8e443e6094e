use salvo::Response;
use salvo::http::StatusCode;
use salvo::writing::Json;
use serde::Serialize;
use thiserror::Error;

use cadence_core::error::CoreError;
use cadence_db::error::DbError;
use cadence_service::error::ServiceError;

/// Application-level errors (HTTP layer)
#[derive(Error, Debug)]
pub enum AppError {
    #[error(transparent)]
    ServiceError(#[from] ServiceError),

    #[error(transparent)]
    DatabaseError(#[from] DbError),

    #[error(transparent)]
    CoreError(#[from] CoreError),

    /// Malformed path, query or body.
    #[error("Bad request: {0}")]
    BadRequest(String),
}

pub type AppResult<T> = std::result::Result<T, AppError>;

/// ## Summary
/// Error response payload
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

impl AppError {
    /// HTTP status reported for this error.
    #[must_use]
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::CoreError(err) if err.is_client_error() => StatusCode::BAD_REQUEST,
            Self::CoreError(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::DatabaseError(err) => match err {
                DbError::NotFound(_) => StatusCode::NOT_FOUND,
                DbError::Conflict(_) => StatusCode::CONFLICT,
                DbError::Unavailable(_) | DbError::Timeout => StatusCode::SERVICE_UNAVAILABLE,
                DbError::CoreError(_) => StatusCode::INTERNAL_SERVER_ERROR,
            },
            Self::ServiceError(err) => match err {
                ServiceError::InvalidRule(_)
                | ServiceError::InvalidRange(_)
                | ServiceError::InvalidInput(_) => StatusCode::BAD_REQUEST,
                ServiceError::OccurrenceNotFound { .. } | ServiceError::NotFound(_) => {
                    StatusCode::NOT_FOUND
                }
                ServiceError::OverrideConflict { .. } | ServiceError::Conflict(_) => {
                    StatusCode::CONFLICT
                }
                ServiceError::DatabaseUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
                ServiceError::CoreError(_) => StatusCode::INTERNAL_SERVER_ERROR,
            },
        }
    }

    /// ## Summary
    /// Writes the status and a JSON `{"error": ...}` body.
    ///
    /// Internal failures are logged and reported without details.
    pub fn render(&self, res: &mut Response) {
        let status = self.status_code();
        let error = if status == StatusCode::INTERNAL_SERVER_ERROR {
            tracing::error!(error = %self, "Request failed");
            "Internal server error".to_string()
        } else {
            if status == StatusCode::SERVICE_UNAVAILABLE {
                tracing::warn!(error = %self, "Gateway unavailable");
            } else {
                tracing::debug!(error = %self, %status, "Request rejected");
            }
            self.to_string()
        };
        res.status_code(status);
        res.render(Json(ErrorResponse { error }));
    }
}

/// ## Summary
/// Renders a handler result: `status` with a JSON body on success, the
/// mapped error otherwise.
pub fn respond<T: Serialize + Send>(res: &mut Response, status: StatusCode, result: AppResult<T>) {
    match result {
        Ok(body) => {
            res.status_code(status);
            res.render(Json(body));
        }
        Err(err) => err.render(res),
    }
}
