use thiserror::Error;

/// Failures surfaced by board operations. The HTTP layer maps each variant to
/// a status code.
#[derive(Error, Debug)]
pub enum CoreError {
    /// Missing or malformed field.
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Bad credentials.
    #[error("Authentication failed")]
    Unauthenticated,

    /// The actor does not own or author the target.
    #[error("Forbidden: {0}")]
    Forbidden(&'static str),

    /// Referenced image, comment or user does not exist.
    #[error("{0} not found")]
    NotFound(&'static str),

    /// A uniqueness constraint rejected the write.
    #[error("Conflict: {0}")]
    Conflict(String),

    /// Unexpected store failure.
    #[error("Internal error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl CoreError {
    pub(crate) fn invalid(msg: impl Into<String>) -> Self {
        Self::InvalidInput(msg.into())
    }

    /// Turn a store error into `Conflict` when it is a uniqueness violation.
    pub(crate) fn from_write(err: anyhow::Error, conflict: &str) -> Self {
        if pinboard_db::is_unique_violation(&err) {
            Self::Conflict(conflict.to_string())
        } else {
            Self::Internal(err)
        }
    }
}

/// Convenience alias used throughout the crate.
pub type Result<T> = std::result::Result<T, CoreError>;
