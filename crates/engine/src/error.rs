//! The module contains the error the engine can throw.
//!
//! The errors are:
//!
//! - [`ExistingKey`] thrown when a telegram id is already registered.
//! - [`EmailTaken`] thrown when an email already belongs to another user.
//! - [`InvalidEmail`] thrown when an email does not look like one.
//!
//!  [`ExistingKey`]: EngineError::ExistingKey
//!  [`EmailTaken`]: EngineError::EmailTaken
//!  [`InvalidEmail`]: EngineError::InvalidEmail
use sea_orm::DbErr;
use thiserror::Error;

/// Engine custom errors.
#[derive(Error, Debug)]
pub enum EngineError {
    #[error("\"{0}\" already present!")]
    ExistingKey(String),
    #[error("\"{0}\" is already registered")]
    EmailTaken(String),
    #[error("Invalid email: {0}")]
    InvalidEmail(String),
    #[error(transparent)]
    Database(#[from] DbErr),
}

impl PartialEq for EngineError {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::ExistingKey(a), Self::ExistingKey(b)) => a == b,
            (Self::EmailTaken(a), Self::EmailTaken(b)) => a == b,
            (Self::InvalidEmail(a), Self::InvalidEmail(b)) => a == b,
            (Self::Database(a), Self::Database(b)) => a.to_string() == b.to_string(),
            _ => false,
        }
    }
}
