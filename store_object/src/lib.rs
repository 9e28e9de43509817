//! Store Object - storage seam for shopdb
//!
//! This crate provides the shared [`Connection`] handle every model and the
//! lifecycle manager hold, the [`StoreBackend`] trait it dispatches to, a
//! PostgreSQL backend over a `sqlx` pool, an in-memory backend, and SQL
//! identifier validation.

pub mod backend;
pub mod connection;
pub mod errors;
pub mod prelude;
pub mod validation;

pub use backend::{MemoryBackend, PgBackend, StoreBackend};
pub use connection::Connection;
pub use errors::StoreError;
pub use validation::{ValidatedFieldName, ValidatedTableName, ValidationError};

pub use sqlx::PgPool;
