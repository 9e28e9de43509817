//! The shared connection handle

use crate::backend::{PgBackend, StoreBackend};
use crate::errors::StoreError;
use config::{DatabaseConfig, PoolSettings};
use std::fmt;
use std::sync::Arc;

/// Handle to the one pooled store connection of the process.
///
/// Cloning is cheap and every clone refers to the same backend and pool;
/// models and the lifecycle manager all hold clones of a single `Connection`.
#[derive(Clone)]
pub struct Connection {
    backend: Arc<dyn StoreBackend>,
}

impl Connection {
    pub fn new(backend: Arc<dyn StoreBackend>) -> Self {
        Self { backend }
    }

    /// Lazily connecting PostgreSQL pool. Requires a Tokio runtime.
    pub fn postgres(config: &DatabaseConfig, settings: &PoolSettings, log_statements: bool) -> Self {
        Self::new(Arc::new(PgBackend::connect_lazy(
            config,
            settings,
            log_statements,
        )))
    }

    pub fn kind(&self) -> &'static str {
        self.backend.kind()
    }

    /// Whether both handles point at the same backend instance
    pub fn same_as(&self, other: &Connection) -> bool {
        Arc::ptr_eq(&self.backend, &other.backend)
    }

    pub fn pg_pool(&self) -> Option<&sqlx::PgPool> {
        self.backend.pg_pool()
    }

    pub async fn authenticate(&self) -> Result<(), StoreError> {
        self.backend.authenticate().await
    }

    pub async fn existing_tables(&self, tables: &[String]) -> Result<Vec<String>, StoreError> {
        self.backend.existing_tables(tables).await
    }

    pub async fn create_table(&self, table: &str, ddl: &str) -> Result<(), StoreError> {
        self.backend.create_table(table, ddl).await
    }

    pub async fn count(&self, table: &str) -> Result<i64, StoreError> {
        self.backend.count(table).await
    }
}

impl fmt::Debug for Connection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Connection")
            .field("backend", &self.backend.kind())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::MemoryBackend;

    #[test]
    fn test_clones_share_backend() {
        let connection = Connection::new(Arc::new(MemoryBackend::new()));
        let clone = connection.clone();
        let other = Connection::new(Arc::new(MemoryBackend::new()));

        assert!(connection.same_as(&clone));
        assert!(!connection.same_as(&other));
        assert_eq!(connection.kind(), "memory");
        assert!(connection.pg_pool().is_none());
    }
}
