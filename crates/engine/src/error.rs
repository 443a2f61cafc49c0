//! The module contains the errors the engine can return.
//!
//! Every error maps to a stable [`ErrorKind`] so callers can translate it to
//! their own transport codes without parsing messages:
//!
//! - [`Validation`] and [`InvalidId`] reject malformed input before any
//!   mutation.
//! - [`KeyNotFound`] is returned for entities that do not exist or are not
//!   visible to the caller.
//! - [`Unauthorized`] is returned when the caller can see the entity but lacks
//!   the role needed for the operation.
//! - [`InsufficientFunds`] is the transfer precondition.
//! - [`Database`] wraps storage failures; the surrounding unit of work is
//!   rolled back.
//!
//!  [`Validation`]: EngineError::Validation
//!  [`InvalidId`]: EngineError::InvalidId
//!  [`KeyNotFound`]: EngineError::KeyNotFound
//!  [`Unauthorized`]: EngineError::Unauthorized
//!  [`InsufficientFunds`]: EngineError::InsufficientFunds
//!  [`Database`]: EngineError::Database
use sea_orm::DbErr;
use serde::Serialize;
use thiserror::Error;

/// Engine custom errors.
#[derive(Error, Debug)]
pub enum EngineError {
    #[error("Validation failed: {0}")]
    Validation(String),
    #[error("Invalid id: {0}")]
    InvalidId(String),
    #[error("\"{0}\" key not found!")]
    KeyNotFound(String),
    #[error("Unauthorized: {0}")]
    Unauthorized(String),
    #[error("Insufficient funds: {0}")]
    InsufficientFunds(String),
    #[error(transparent)]
    Database(#[from] DbErr),
}

/// Stable, transport-independent error code.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    Validation,
    NotFound,
    Unauthorized,
    InsufficientFunds,
    Storage,
}

impl ErrorKind {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Validation => "validation",
            Self::NotFound => "not_found",
            Self::Unauthorized => "unauthorized",
            Self::InsufficientFunds => "insufficient_funds",
            Self::Storage => "storage",
        }
    }
}

impl EngineError {
    #[must_use]
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Validation(_) | Self::InvalidId(_) => ErrorKind::Validation,
            Self::KeyNotFound(_) => ErrorKind::NotFound,
            Self::Unauthorized(_) => ErrorKind::Unauthorized,
            Self::InsufficientFunds(_) => ErrorKind::InsufficientFunds,
            Self::Database(_) => ErrorKind::Storage,
        }
    }
}

impl PartialEq for EngineError {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Validation(a), Self::Validation(b)) => a == b,
            (Self::InvalidId(a), Self::InvalidId(b)) => a == b,
            (Self::KeyNotFound(a), Self::KeyNotFound(b)) => a == b,
            (Self::Unauthorized(a), Self::Unauthorized(b)) => a == b,
            (Self::InsufficientFunds(a), Self::InsufficientFunds(b)) => a == b,
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
        assert_eq!(
            EngineError::Validation("x".to_string()).kind(),
            ErrorKind::Validation
        );
        assert_eq!(
            EngineError::InvalidId("x".to_string()).kind(),
            ErrorKind::Validation
        );
        assert_eq!(
            EngineError::KeyNotFound("x".to_string()).kind(),
            ErrorKind::NotFound
        );
        assert_eq!(
            EngineError::Unauthorized("x".to_string()).kind(),
            ErrorKind::Unauthorized
        );
        assert_eq!(
            EngineError::InsufficientFunds("x".to_string()).kind(),
            ErrorKind::InsufficientFunds
        );
        assert_eq!(
            EngineError::Database(DbErr::Custom("boom".to_string())).kind(),
            ErrorKind::Storage
        );
    }

    #[test]
    fn kind_codes() {
        assert_eq!(ErrorKind::NotFound.as_str(), "not_found");
        assert_eq!(ErrorKind::InsufficientFunds.as_str(), "insufficient_funds");
    }
}
