//! Core shopdb functionality
//!
//! [`Database`] ties the pieces together: one shared connection, the wired
//! model registry, the lifecycle manager and the diagnostic signal manager.

use std::sync::Arc;

use config::AppConfig;
use signal_system::SignalManager;
use store_object::Connection;

use crate::associations::WiringReport;
use crate::errors::ShopDbError;
use crate::lifecycle::{ConnectionLifecycle, LifecycleSettings, LifecycleState};
use crate::registry::{ModelRegistry, Models};
use crate::stats::DatabaseStats;

/// Main coordinator handed to the host application
#[derive(Debug)]
pub struct Database {
    registry: Arc<ModelRegistry>,
    models: Models,
    lifecycle: ConnectionLifecycle,
    signals: Arc<SignalManager>,
    wiring: WiringReport,
}

impl Database {
    /// Build the pooled PostgreSQL connection and the wired registry.
    ///
    /// The pool connects lazily; nothing touches the network until
    /// [`initialize`](Self::initialize) or [`test_connection`](Self::test_connection).
    pub async fn bootstrap(config: AppConfig) -> Result<Self, ShopDbError> {
        config.validate()?;
        let connection = Connection::postgres(
            &config.database,
            &config.pool,
            config.mode.logs_statements(),
        );
        Self::with_connection(connection, LifecycleSettings::from_config(&config))
    }

    /// Build over an existing connection, e.g. one backed by `MemoryBackend`
    pub fn with_connection(
        connection: Connection,
        settings: LifecycleSettings,
    ) -> Result<Self, ShopDbError> {
        Self::with_signals(connection, settings, Arc::new(SignalManager::with_tracing()))
    }

    /// Like [`with_connection`](Self::with_connection) with caller-provided signals
    pub fn with_signals(
        connection: Connection,
        settings: LifecycleSettings,
        signals: Arc<SignalManager>,
    ) -> Result<Self, ShopDbError> {
        let (registry, wiring) = ModelRegistry::storefront(connection, &signals)?;
        let registry = Arc::new(registry);
        let models = Models::from_registry(&registry)?;
        let lifecycle = ConnectionLifecycle::new(registry.clone(), settings, signals.clone())?;

        Ok(Self {
            registry,
            models,
            lifecycle,
            signals,
            wiring,
        })
    }

    pub async fn initialize(&self) -> Result<(), ShopDbError> {
        Ok(self.lifecycle.initialize().await?)
    }

    pub async fn test_connection(&self) -> bool {
        self.lifecycle.test_connection().await
    }

    pub async fn get_database_stats(&self) -> Option<DatabaseStats> {
        self.lifecycle.get_database_stats().await
    }

    pub fn registry(&self) -> &ModelRegistry {
        &self.registry
    }

    pub fn models(&self) -> &Models {
        &self.models
    }

    pub fn lifecycle(&self) -> &ConnectionLifecycle {
        &self.lifecycle
    }

    pub fn signals(&self) -> &Arc<SignalManager> {
        &self.signals
    }

    pub fn wiring(&self) -> &WiringReport {
        &self.wiring
    }

    pub fn state(&self) -> LifecycleState {
        self.lifecycle.state()
    }

    pub fn connection(&self) -> &Connection {
        self.registry.connection()
    }
}
