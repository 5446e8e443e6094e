use thiserror::Error;

/// Failures shared by every layer: bad settings and request state that a
/// hoop should have provided.
#[derive(Error, Debug)]
pub enum CoreError {
    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// A handler ran without a value its router hoops inject.
    #[error("Request state missing: {0}")]
    MissingState(&'static str),
}

impl CoreError {
    /// Whether the caller, not the server, is at fault.
    #[must_use]
    pub const fn is_client_error(&self) -> bool {
        matches!(self, Self::InvalidInput(_))
    }
}

pub type CoreResult<T> = std::result::Result<T, CoreError>;
