use crate::validation::ValidationError;
use thiserror::Error;

/// Failures talking to the backing store
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Store unreachable: {0}")]
    Unreachable(String),

    #[error("Authentication failed: {0}")]
    Authentication(String),

    #[error("Timed out waiting for a pooled connection")]
    PoolTimeout,

    #[error("Connection pool is closed")]
    PoolClosed,

    #[error("Query failed on {table}: {cause}")]
    QueryFailed { table: String, cause: String },

    #[error("Refusing structural statement on {table}: {reason}")]
    StructuralChangeRejected { table: String, reason: String },

    #[error("Invalid identifier: {0}")]
    InvalidIdentifier(#[from] ValidationError),

    #[error("Database error: {0}")]
    Database(String),
}

impl StoreError {
    /// Attach the table a query was issued against
    pub fn on_table(self, table: &str) -> Self {
        match self {
            StoreError::Database(cause) => StoreError::QueryFailed {
                table: table.to_string(),
                cause,
            },
            other => other,
        }
    }
}

impl From<sqlx::Error> for StoreError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::PoolTimedOut => StoreError::PoolTimeout,
            sqlx::Error::PoolClosed => StoreError::PoolClosed,
            sqlx::Error::Io(e) => StoreError::Unreachable(e.to_string()),
            sqlx::Error::Tls(e) => StoreError::Unreachable(e.to_string()),
            sqlx::Error::Database(db_err) => {
                // 28000 invalid_authorization_specification, 28P01 invalid_password
                let is_auth = matches!(db_err.code().as_deref(), Some("28000") | Some("28P01"));
                if is_auth {
                    StoreError::Authentication(db_err.message().to_string())
                } else {
                    StoreError::Database(db_err.message().to_string())
                }
            }
            other => StoreError::Database(other.to_string()),
        }
    }
}
