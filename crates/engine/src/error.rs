//! The module contains the errors the engine can throw.
//!
//! The errors are:
//!
//! - [`Validation`] thrown when a submitted entry has missing or invalid
//!   fields; it carries the offending field names.
//! - [`InvalidPath`] thrown when a report path cannot be resolved.
//! - [`Store`] thrown when the remote data service fails on a path with no
//!   fallback left.
//!
//!  [`Validation`]: EngineError::Validation
//!  [`InvalidPath`]: EngineError::InvalidPath
//!  [`Store`]: EngineError::Store
use thiserror::Error;

use crate::store::StoreError;

/// Engine custom errors.
#[derive(Error, Debug)]
pub enum EngineError {
    #[error("Missing or invalid fields")]
    Validation(Vec<&'static str>),
    #[error("Invalid path: {0}")]
    InvalidPath(String),
    #[error(transparent)]
    Store(#[from] StoreError),
}

impl PartialEq for EngineError {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Validation(a), Self::Validation(b)) => a == b,
            (Self::InvalidPath(a), Self::InvalidPath(b)) => a == b,
            (Self::Store(a), Self::Store(b)) => a.to_string() == b.to_string(),
            _ => false,
        }
    }
}
