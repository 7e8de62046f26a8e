// src/error.rs

use thiserror::Error;

/// Engine-wide error enum.
/// Every variant is a definite precondition failure except `Internal`,
/// which wraps storage faults. Callers map the variants to responses.
#[derive(Debug, Error)]
pub enum EngineError {
    /// A quiz, student, module, question or attempt does not exist.
    #[error("not found: {0}")]
    NotFound(String),

    /// A submission or authoring request is malformed.
    #[error("bad request: {0}")]
    BadRequest(String),

    /// Submit was called without an open attempt.
    #[error("invalid session: {0}")]
    InvalidSession(String),

    /// The question bank cannot satisfy the requested mix.
    #[error("not enough questions available: requested {requested}, found {available}")]
    InsufficientQuestions { requested: usize, available: usize },

    /// Name collision, or a change to something already referenced by an attempt.
    #[error("conflict: {0}")]
    Conflict(String),

    #[error("internal error: {0}")]
    Internal(String),
}

impl EngineError {
    /// Short machine-readable tag for the variant.
    pub fn kind(&self) -> &'static str {
        match self {
            EngineError::NotFound(_) => "not_found",
            EngineError::BadRequest(_) => "bad_request",
            EngineError::InvalidSession(_) => "invalid_session",
            EngineError::InsufficientQuestions { .. } => "insufficient_questions",
            EngineError::Conflict(_) => "conflict",
            EngineError::Internal(_) => "internal",
        }
    }
}

/// Converts `sqlx::Error` into `EngineError::Internal`.
/// Allows using `?` operator on database queries.
impl From<sqlx::Error> for EngineError {
    fn from(err: sqlx::Error) -> Self {
        tracing::error!("Database error: {:?}", err);
        EngineError::Internal(err.to_string())
    }
}

impl From<validator::ValidationErrors> for EngineError {
    fn from(err: validator::ValidationErrors) -> Self {
        EngineError::BadRequest(err.to_string())
    }
}
