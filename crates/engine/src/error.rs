//! The module contains the error the engine can throw.
//!
//! The errors are:
//!
//! - [`Validation`] thrown when the input of an operation is malformed.
//! - [`InvalidScope`] thrown when a series-wide change targets a record that
//!   does not belong to a series.
//! - [`NotFound`] thrown when an item is not found.
//! - [`Persistence`] thrown when the underlying store fails.
//!
//!  [`Validation`]: EngineError::Validation
//!  [`InvalidScope`]: EngineError::InvalidScope
//!  [`NotFound`]: EngineError::NotFound
//!  [`Persistence`]: EngineError::Persistence
use sea_orm::DbErr;
use thiserror::Error;

/// Engine custom errors.
#[derive(Error, Debug)]
pub enum EngineError {
    #[error("Validation error: {0}")]
    Validation(String),
    #[error("Invalid scope: {0}")]
    InvalidScope(String),
    #[error("\"{0}\" not found!")]
    NotFound(String),
    #[error(transparent)]
    Persistence(#[from] DbErr),
}

impl PartialEq for EngineError {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Validation(a), Self::Validation(b)) => a == b,
            (Self::InvalidScope(a), Self::InvalidScope(b)) => a == b,
            (Self::NotFound(a), Self::NotFound(b)) => a == b,
            (Self::Persistence(a), Self::Persistence(b)) => a.to_string() == b.to_string(),
            _ => false,
        }
    }
}
