//! Error taxonomy for the reminder engine.
//!
//! Three failure families with three different recovery paths: resolution
//! failures go back to the user, store failures abort the current scheduler
//! cycle, and not-found is a plain client error. Delivery failure is not an
//! error value at all: the notifier reports `false` and the tier is retried
//! on the next poll.

use thiserror::Error;

/// A natural-language phrase could not be turned into a future instant.
///
/// Surfaced to the caller as a user-correctable error; the resolver never
/// defaults silently outside its two documented fallbacks.
#[derive(Debug, Error)]
pub enum ResolveError {
    #[error("could not build a valid calendar date from '{phrase}'")]
    InvalidDate { phrase: String },
}

/// A query or update against the persistence store failed.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("database error: {0}")]
    Database(String),

    #[error("malformed reminder id '{0}'")]
    BadId(String),
}

/// Errors surfaced by the reminder service API.
#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("reminder not found")]
    NotFound,

    #[error("title must not be empty")]
    EmptyTitle,

    #[error(transparent)]
    Resolve(#[from] ResolveError),

    #[error(transparent)]
    Store(#[from] StoreError),
}
