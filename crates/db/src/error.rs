//! Typed error type for the db crate.

use thiserror::Error;

/// Errors from the persistence layer. Driver errors pass through untouched.
#[derive(Debug, Error)]
pub enum DbError {
    #[error("sqlx error: {0}")]
    Sqlx(#[from] sqlx::Error),

    /// A lookup that must return a row found none; names the entity.
    #[error("{0} not found")]
    NotFound(&'static str),

    #[error("migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),
}
