//! Storage backends
//!
//! Everything the bootstrap layer asks of the store goes through
//! [`StoreBackend`]: authenticate, look up tables, create a missing table,
//! count rows.

mod memory;
mod postgres;

pub use memory::MemoryBackend;
pub use postgres::PgBackend;

use crate::errors::StoreError;
use async_trait::async_trait;
use std::fmt::Debug;

#[async_trait]
pub trait StoreBackend: Send + Sync + Debug {
    /// Short backend name for diagnostics
    fn kind(&self) -> &'static str;

    /// Borrow a connection from the pool and prove the credentials work
    async fn authenticate(&self) -> Result<(), StoreError>;

    /// Return the subset of `tables` that exist in the store
    async fn existing_tables(&self, tables: &[String]) -> Result<Vec<String>, StoreError>;

    /// Execute a `CREATE TABLE IF NOT EXISTS` statement. Any other statement
    /// is rejected with [`StoreError::StructuralChangeRejected`].
    async fn create_table(&self, table: &str, ddl: &str) -> Result<(), StoreError>;

    /// `SELECT COUNT(*)` over a table
    async fn count(&self, table: &str) -> Result<i64, StoreError>;

    /// The underlying `sqlx` pool, for backends that have one
    fn pg_pool(&self) -> Option<&sqlx::PgPool> {
        None
    }
}

/// Reject anything that is not an additive `CREATE TABLE IF NOT EXISTS`
pub(crate) fn ensure_create_only(table: &str, ddl: &str) -> Result<(), StoreError> {
    let normalized = ddl.trim_start().to_ascii_uppercase();
    let additive = normalized.starts_with("CREATE TABLE IF NOT EXISTS ")
        && !normalized.contains(';')
        && !normalized.contains(" DROP ")
        && !normalized.contains(" ALTER ");
    if additive {
        Ok(())
    } else {
        Err(StoreError::StructuralChangeRejected {
            table: table.to_string(),
            reason: "only CREATE TABLE IF NOT EXISTS is allowed".to_string(),
        })
    }
}
