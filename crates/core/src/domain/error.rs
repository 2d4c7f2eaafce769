use thiserror::Error;

/// Client-facing failures of the domain read and write paths.
///
/// The display string is the `message` sent to the client.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DomainError {
    #[error("{0}")]
    Validation(String),
    #[error("{0} not found")]
    NotFound(&'static str),
    #[error("Not authorized")]
    Unauthorized,
    #[error("{0}")]
    Forbidden(String),
    #[error("{0}")]
    Conflict(String),
}

impl DomainError {
    pub fn validation(message: impl Into<String>) -> Self {
        DomainError::Validation(message.into())
    }

    /// Maps the error to its HTTP status code.
    pub fn status_code(&self) -> u16 {
        match self {
            DomainError::Validation(_) => 400,
            DomainError::NotFound(_) => 404,
            DomainError::Unauthorized => 401,
            DomainError::Forbidden(_) => 403,
            DomainError::Conflict(_) => 409,
        }
    }
}
