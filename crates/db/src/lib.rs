//! `db` crate — persistence layer for workflow sharing.
//!
//! Provides a connection pool, typed row structs, the global role / scope
//! model, and repository functions for the sharing schema. Every operation
//! hands `sqlx` errors back to the caller unchanged.

pub mod error;
pub mod pool;
pub mod repository;
pub mod models;
pub mod scope;

pub use pool::DbPool;
pub use error::DbError;
pub use scope::{GlobalRole, Scope};
