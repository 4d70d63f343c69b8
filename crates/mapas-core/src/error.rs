//! # Error Types
//!
//! Errors shared across the workspace. Domain-specific errors live next to
//! the domain (`mapas_state::RegistrationError`) and wrap these.

use thiserror::Error;

/// Failure reported by a storage collaborator.
///
/// Propagated to callers unmodified; the domain never retries.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PersistenceError {
    /// The backing store could not be reached or refused the write.
    #[error("storage unavailable: {0}")]
    Unavailable(String),

    /// The record to update or delete does not exist in the store.
    #[error("record not found: {0}")]
    Missing(String),
}

/// Failure building a canonical URL.
#[derive(Error, Debug)]
pub enum UrlError {
    #[error("invalid base url {url:?}: {source}")]
    InvalidBase {
        url: String,
        #[source]
        source: url::ParseError,
    },

    #[error("base url {0:?} cannot carry a path")]
    CannotBeABase(String),
}
