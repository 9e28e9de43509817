//! Error types for the shopdb crate
//!
//! Store-level failures are caught by the operation that issued them and
//! converted into one of these, or into a `bool`/`Option` for the
//! non-throwing lifecycle calls.

use crate::associations::AssociationKind;
use store_object::{StoreError, ValidationError};
use thiserror::Error;

/// Authentication or network failure talking to the store
pub type ConnectionError = StoreError;

/// Fatal startup misconfiguration. Never retried.
#[derive(Error, Debug)]
pub enum ConfigurationError {
    #[error("Model already registered: {0}")]
    DuplicateModel(String),

    #[error("Model not registered: {0}")]
    UnknownModel(String),

    #[error("{model} declares an association to unregistered model {target}")]
    UnknownPeer { model: String, target: String },

    #[error("{model} declares {kind:?} {target} on {foreign_key} more than once")]
    DuplicateAssociation {
        model: String,
        kind: AssociationKind,
        target: String,
        foreign_key: String,
    },

    #[error("Associations have already been wired")]
    AlreadyWired,

    #[error("Associations have not been wired yet")]
    NotWired,

    #[error("Cannot register {0}: the registry is frozen after wiring")]
    RegistryFrozen(String),

    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),
}

/// An entity descriptor factory rejected its own definition
#[derive(Error, Debug)]
pub enum DescriptorError {
    #[error("Invalid identifier in {table}: {source}")]
    InvalidIdentifier {
        table: String,
        #[source]
        source: ValidationError,
    },

    #[error("{0} declares no primary key")]
    MissingPrimaryKey(String),

    #[error("{0} declares more than one primary key")]
    MultiplePrimaryKeys(String),

    #[error("{table} declares column {field} twice")]
    DuplicateField { table: String, field: String },
}

/// Failure of [`ModelRegistry::register`](crate::registry::ModelRegistry::register)
#[derive(Error, Debug)]
pub enum RegistryError {
    #[error(transparent)]
    Configuration(#[from] ConfigurationError),

    #[error(transparent)]
    Descriptor(#[from] DescriptorError),
}

/// Startup cannot proceed
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StartupError {
    #[error("Could not connect to the database")]
    ConnectionUnavailable,

    #[error("Database already initialized")]
    AlreadyInitialized,

    #[error("Database initialization already in progress")]
    InProgress,
}

/// Non-destructive structural verification failed. Logged, never fatal.
#[derive(Error, Debug)]
pub enum VerificationError {
    #[error("Missing tables: {}", .0.join(", "))]
    MissingTables(Vec<String>),

    #[error("Store failure during verification: {0}")]
    Store(#[from] StoreError),
}

/// A single count query failed, so no summary is produced
#[derive(Error, Debug)]
pub enum StatsError {
    #[error("Counting {entity} failed: {source}")]
    Count {
        entity: String,
        #[source]
        source: StoreError,
    },
}

/// Umbrella error for [`Database`](crate::core::Database) construction
#[derive(Error, Debug)]
pub enum ShopDbError {
    #[error(transparent)]
    Configuration(#[from] ConfigurationError),

    #[error(transparent)]
    Descriptor(#[from] DescriptorError),

    #[error(transparent)]
    Startup(#[from] StartupError),

    #[error(transparent)]
    Store(#[from] StoreError),
}

impl From<RegistryError> for ShopDbError {
    fn from(err: RegistryError) -> Self {
        match err {
            RegistryError::Configuration(e) => ShopDbError::Configuration(e),
            RegistryError::Descriptor(e) => ShopDbError::Descriptor(e),
        }
    }
}

impl From<config::ConfigError> for ShopDbError {
    fn from(err: config::ConfigError) -> Self {
        ShopDbError::Configuration(err.into())
    }
}
