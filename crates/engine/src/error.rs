//! The module contains the error the engine can throw.
//!
//! Every variant carries a human-readable message and maps to a stable,
//! machine-readable [`kind`](EngineError::kind):
//!
//! - [`Validation`] malformed or missing input, nothing was mutated.
//! - [`Forbidden`] the principal cannot access the budget or cannot write.
//! - [`KeyNotFound`] the entity does not exist inside the accessible scope.
//! - [`Consistency`] an invariant would be violated; the whole operation is
//!   rolled back.
//!
//!  [`Validation`]: EngineError::Validation
//!  [`Forbidden`]: EngineError::Forbidden
//!  [`KeyNotFound`]: EngineError::KeyNotFound
//!  [`Consistency`]: EngineError::Consistency
use sea_orm::DbErr;
use thiserror::Error;

/// Engine custom errors.
#[derive(Error, Debug)]
pub enum EngineError {
    #[error("Invalid input: {0}")]
    Validation(String),
    #[error("Forbidden: {0}")]
    Forbidden(String),
    #[error("\"{0}\" key not found!")]
    KeyNotFound(String),
    #[error("\"{0}\" already present!")]
    ExistingKey(String),
    #[error("Invalid month transition: {0}")]
    InvalidTransition(String),
    #[error("Consistency violation: {0}")]
    Consistency(String),
    #[error("Invalid cursor: {0}")]
    InvalidCursor(String),
    #[error(transparent)]
    Database(#[from] DbErr),
}

impl EngineError {
    /// Machine-readable error kind, stable across releases.
    #[must_use]
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Validation(_) | Self::InvalidCursor(_) => "validation",
            Self::Forbidden(_) => "forbidden",
            Self::KeyNotFound(_) => "not_found",
            Self::ExistingKey(_) => "conflict",
            Self::InvalidTransition(_) => "invalid_transition",
            Self::Consistency(_) => "consistency",
            Self::Database(_) => "database",
        }
    }
}

impl PartialEq for EngineError {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Validation(a), Self::Validation(b)) => a == b,
            (Self::Forbidden(a), Self::Forbidden(b)) => a == b,
            (Self::KeyNotFound(a), Self::KeyNotFound(b)) => a == b,
            (Self::ExistingKey(a), Self::ExistingKey(b)) => a == b,
            (Self::InvalidTransition(a), Self::InvalidTransition(b)) => a == b,
            (Self::Consistency(a), Self::Consistency(b)) => a == b,
            (Self::InvalidCursor(a), Self::InvalidCursor(b)) => a == b,
            (Self::Database(a), Self::Database(b)) => a.to_string() == b.to_string(),
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kinds_are_stable() {
        assert_eq!(EngineError::Validation("x".into()).kind(), "validation");
        assert_eq!(EngineError::InvalidCursor("x".into()).kind(), "validation");
        assert_eq!(EngineError::Forbidden("x".into()).kind(), "forbidden");
        assert_eq!(EngineError::KeyNotFound("x".into()).kind(), "not_found");
        assert_eq!(EngineError::Consistency("x".into()).kind(), "consistency");
        assert_eq!(
            EngineError::InvalidTransition("x".into()).kind(),
            "invalid_transition"
        );
    }
}
