//! Repository functions — one function per database operation.
//!
//! Reads take a `&DbPool`. Writes that callers may want to group take a
//! `&mut PgConnection` instead, so a transaction opened by the caller
//! (`&mut *tx`) can be passed straight through. No business logic here.

pub mod workflows;
pub mod users;
pub mod roles;
pub mod shared_workflows;
