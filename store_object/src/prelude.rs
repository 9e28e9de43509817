//! Convenience re-exports for common store-object usage

pub use crate::backend::{MemoryBackend, PgBackend, StoreBackend};
pub use crate::connection::Connection;
pub use crate::errors::StoreError;
pub use crate::validation::{ValidatedFieldName, ValidatedTableName, ValidationError};

pub use async_trait::async_trait;
pub use sqlx::PgPool;
