use super::{ensure_create_only, StoreBackend};
use crate::errors::StoreError;
use crate::validation::ValidatedTableName;
use async_trait::async_trait;
use config::{DatabaseConfig, PoolSettings};
use sqlx::postgres::{PgConnectOptions, PgPoolOptions};
use sqlx::{ConnectOptions, PgPool};
use tracing::debug;

/// PostgreSQL backend over a lazily connecting `sqlx` pool
#[derive(Debug, Clone)]
pub struct PgBackend {
    pool: PgPool,
}

impl PgBackend {
    /// Build the pool without opening a connection. The first query
    /// (normally authentication during startup) opens it.
    ///
    /// Must be called from within a Tokio runtime.
    pub fn connect_lazy(
        config: &DatabaseConfig,
        settings: &PoolSettings,
        log_statements: bool,
    ) -> Self {
        let pool = PgPoolOptions::new()
            .max_connections(settings.max_connections)
            .min_connections(settings.min_connections)
            .acquire_timeout(settings.acquire_timeout())
            .idle_timeout(settings.idle_timeout())
            .connect_lazy_with(Self::connect_options(config, log_statements));

        debug!(
            url = %config.redacted_connection_string(),
            max_connections = settings.max_connections,
            log_statements,
            "Configured lazy PostgreSQL pool"
        );

        Self { pool }
    }

    /// Per-connection options. Statement logging stays on only when asked for.
    fn connect_options(config: &DatabaseConfig, log_statements: bool) -> PgConnectOptions {
        let options = PgConnectOptions::new()
            .host(&config.host)
            .port(config.port)
            .database(&config.database)
            .username(&config.username)
            .password(&config.password);

        if log_statements {
            options
        } else {
            options.disable_statement_logging()
        }
    }
}

#[async_trait]
impl StoreBackend for PgBackend {
    fn kind(&self) -> &'static str {
        "postgres"
    }

    async fn authenticate(&self) -> Result<(), StoreError> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }

    async fn existing_tables(&self, tables: &[String]) -> Result<Vec<String>, StoreError> {
        let found: Vec<String> = sqlx::query_scalar(
            "SELECT table_name::text FROM information_schema.tables \
             WHERE table_schema = current_schema() AND table_name = ANY($1)",
        )
        .bind(tables)
        .fetch_all(&self.pool)
        .await?;
        Ok(found)
    }

    async fn create_table(&self, table: &str, ddl: &str) -> Result<(), StoreError> {
        ValidatedTableName::new(table)?;
        ensure_create_only(table, ddl)?;
        sqlx::query(ddl)
            .execute(&self.pool)
            .await
            .map_err(|e| StoreError::from(e).on_table(table))?;
        Ok(())
    }

    async fn count(&self, table: &str) -> Result<i64, StoreError> {
        let table = ValidatedTableName::new(table)?;
        let sql = format!("SELECT COUNT(*) FROM {}", table);
        let count: i64 = sqlx::query_scalar(&sql)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| StoreError::from(e).on_table(table.as_str()))?;
        Ok(count)
    }

    fn pg_pool(&self) -> Option<&PgPool> {
        Some(&self.pool)
    }
}
