//! # shopdb
//!
//! Data-access bootstrap for a small e-commerce backend: a registry of
//! entity schema handles sharing one pooled PostgreSQL connection, a
//! one-time association wiring pass, and a connection lifecycle that
//! authenticates, verifies the schema without touching existing structure,
//! and reports row counts.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use shopdb::prelude::*;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = AppConfig::from_env()?;
//!     let database = Database::bootstrap(config).await?;
//!
//!     database.initialize().await?;
//!
//!     if let Some(stats) = database.get_database_stats().await {
//!         println!("{} orders, {} order lines", stats.orders, stats.order_lines);
//!     }
//!     Ok(())
//! }
//! ```

/// Conditional debug logging macros
/// These macros only compile in code when the `debug-logging` feature is enabled
#[cfg(feature = "debug-logging")]
#[macro_export]
macro_rules! debug_log {
    ($($arg:tt)*) => {
        tracing::debug!($($arg)*)
    };
}

#[cfg(not(feature = "debug-logging"))]
#[macro_export]
macro_rules! debug_log {
    ($($arg:tt)*) => {};
}

#[cfg(feature = "debug-logging")]
#[macro_export]
macro_rules! trace_log {
    ($($arg:tt)*) => {
        tracing::trace!($($arg)*)
    };
}

#[cfg(not(feature = "debug-logging"))]
#[macro_export]
macro_rules! trace_log {
    ($($arg:tt)*) => {};
}

pub mod associations;
pub mod core;
pub mod errors;
pub mod lifecycle;
pub mod migration;
pub mod model;
pub mod models;
pub mod prelude;
pub mod registry;
pub mod stats;

// Re-export the main public types for convenience
pub use associations::{wire_all, Associable, Association, AssociationKind, AssociationScope, WiringReport};
pub use crate::core::Database;
pub use errors::{
    ConfigurationError, ConnectionError, DescriptorError, RegistryError, ShopDbError,
    StartupError, StatsError, VerificationError,
};
pub use lifecycle::{ConnectionLifecycle, LifecycleSettings, LifecycleState};
pub use migration::VerificationReport;
pub use model::{FieldDef, Model, ModelBuilder};
pub use registry::{ModelRegistry, Models};
pub use stats::{DatabaseStats, StatsReporter};

// Re-export centralized config
pub use config::{AppConfig, DatabaseConfig, PoolSettings, RunMode};

// Re-export internal crates used in the public API
pub use signal_system;
pub use store_object;
pub use type_mapping;

pub use sqlx;
