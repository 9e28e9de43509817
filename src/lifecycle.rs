//! Connection lifecycle
//!
//! `Unconnected -> Authenticating -> Ready`, or `-> Failed` when the store
//! cannot be reached. A failed start may be retried.

use std::sync::{Arc, Mutex, MutexGuard};

use config::{AppConfig, RunMode};
use serde::Serialize;
use signal_system::{DatabaseEvent, EventType, SignalManager};
use store_object::Connection;

use crate::errors::{ConfigurationError, StartupError};
use crate::registry::{ModelRegistry, Models};
use crate::stats::{DatabaseStats, StatsReporter};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum LifecycleState {
    Unconnected,
    Authenticating,
    Ready,
    Failed,
}

/// What `initialize` does once the store answers
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LifecycleSettings {
    pub mode: RunMode,
    /// Create expected tables that do not exist yet during verification
    pub sync_create_missing: bool,
}

impl LifecycleSettings {
    pub fn from_config(config: &AppConfig) -> Self {
        Self {
            mode: config.mode,
            sync_create_missing: config.sync_create_missing,
        }
    }

    pub fn development() -> Self {
        Self {
            mode: RunMode::Development,
            sync_create_missing: false,
        }
    }

    pub fn production() -> Self {
        Self {
            mode: RunMode::Production,
            sync_create_missing: false,
        }
    }

    pub fn with_sync_create_missing(mut self, enabled: bool) -> Self {
        self.sync_create_missing = enabled;
        self
    }
}

pub struct ConnectionLifecycle {
    pub(crate) registry: Arc<ModelRegistry>,
    pub(crate) settings: LifecycleSettings,
    pub(crate) signals: Arc<SignalManager>,
    stats: StatsReporter,
    state: Mutex<LifecycleState>,
}

impl ConnectionLifecycle {
    /// Lifecycle over a wired registry
    pub fn new(
        registry: Arc<ModelRegistry>,
        settings: LifecycleSettings,
        signals: Arc<SignalManager>,
    ) -> Result<Self, ConfigurationError> {
        let models = Models::from_registry(&registry)?;
        Ok(Self {
            stats: StatsReporter::new(models, signals.clone()),
            registry,
            settings,
            signals,
            state: Mutex::new(LifecycleState::Unconnected),
        })
    }

    pub fn state(&self) -> LifecycleState {
        *self.lock_state()
    }

    pub fn settings(&self) -> &LifecycleSettings {
        &self.settings
    }

    pub fn connection(&self) -> &Connection {
        self.registry.connection()
    }

    pub fn stats(&self) -> &StatsReporter {
        &self.stats
    }

    /// Authenticate against the store. Failures are logged and reported as `false`.
    pub async fn test_connection(&self) -> bool {
        match self.connection().authenticate().await {
            Ok(()) => {
                self.signals.emit(
                    DatabaseEvent::new(EventType::ConnectionEstablished)
                        .with_detail("Database connection established")
                        .with_payload("backend", self.connection().kind()),
                );
                true
            }
            Err(e) => {
                self.signals.emit(
                    DatabaseEvent::new(EventType::ConnectionFailed)
                        .with_detail(e.to_string())
                        .with_payload("backend", self.connection().kind()),
                );
                false
            }
        }
    }

    /// Bring the store into service.
    ///
    /// Development mode additionally verifies the schema and reports row
    /// counts; neither can fail the start. Production mode issues no
    /// structural calls at all.
    pub async fn initialize(&self) -> Result<(), StartupError> {
        let mut attempt = self.begin()?;

        self.signals.emit(
            DatabaseEvent::new(EventType::InitializeStarted)
                .with_payload("mode", self.settings.mode.to_string()),
        );

        if !self.test_connection().await {
            return Err(StartupError::ConnectionUnavailable);
        }

        if self.settings.mode.is_development() {
            if let Err(e) = self.verify_schema().await {
                self.signals.emit(
                    DatabaseEvent::new(EventType::VerificationFailed).with_detail(e.to_string()),
                );
            }
            self.stats.get_database_stats().await;
        }

        attempt.succeed();
        self.signals.emit(
            DatabaseEvent::new(EventType::InitializeCompleted)
                .with_payload("mode", self.settings.mode.to_string()),
        );
        Ok(())
    }

    pub async fn get_database_stats(&self) -> Option<DatabaseStats> {
        self.stats.get_database_stats().await
    }

    fn begin(&self) -> Result<Attempt<'_>, StartupError> {
        let mut state = self.lock_state();
        match *state {
            LifecycleState::Ready => Err(StartupError::AlreadyInitialized),
            LifecycleState::Authenticating => Err(StartupError::InProgress),
            LifecycleState::Unconnected | LifecycleState::Failed => {
                *state = LifecycleState::Authenticating;
                Ok(Attempt {
                    lifecycle: self,
                    succeeded: false,
                })
            }
        }
    }

    fn lock_state(&self) -> MutexGuard<'_, LifecycleState> {
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl std::fmt::Debug for ConnectionLifecycle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConnectionLifecycle")
            .field("state", &self.state())
            .field("settings", &self.settings)
            .field("connection", self.connection())
            .finish()
    }
}

/// An `initialize` call in flight. Settles the state to `Failed` unless
/// marked successful, including when the future is dropped mid-way.
struct Attempt<'a> {
    lifecycle: &'a ConnectionLifecycle,
    succeeded: bool,
}

impl Attempt<'_> {
    fn succeed(&mut self) {
        self.succeeded = true;
    }
}

impl Drop for Attempt<'_> {
    fn drop(&mut self) {
        *self.lifecycle.lock_state() = if self.succeeded {
            LifecycleState::Ready
        } else {
            LifecycleState::Failed
        };
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use store_object::MemoryBackend;

    fn lifecycle(backend: MemoryBackend, settings: LifecycleSettings) -> ConnectionLifecycle {
        let connection = Connection::new(Arc::new(backend));
        let signals = Arc::new(SignalManager::new());
        let (registry, _) = ModelRegistry::storefront(connection, &signals).unwrap();
        ConnectionLifecycle::new(Arc::new(registry), settings, signals).unwrap()
    }

    #[test]
    fn test_settings_from_config() {
        let config = AppConfig::from_lookup(|name| match name {
            "DB_HOST" => Some("localhost".to_string()),
            "DB_NAME" => Some("shop".to_string()),
            "DB_USER" => Some("shop".to_string()),
            "DB_PASS" => Some(String::new()),
            "APP_ENV" => Some("production".to_string()),
            "DB_SYNC_CREATE_MISSING" => Some("true".to_string()),
            _ => None,
        })
        .unwrap();

        let settings = LifecycleSettings::from_config(&config);
        assert_eq!(settings.mode, RunMode::Production);
        assert!(settings.sync_create_missing);
    }

    #[test]
    fn test_requires_wired_registry() {
        let connection = Connection::new(Arc::new(MemoryBackend::new()));
        let registry = ModelRegistry::new(connection);
        let result = ConnectionLifecycle::new(
            Arc::new(registry),
            LifecycleSettings::production(),
            Arc::new(SignalManager::new()),
        );
        assert!(matches!(result, Err(ConfigurationError::NotWired)));
    }

    #[tokio::test]
    async fn test_failed_start_can_be_retried() {
        let backend = Arc::new(MemoryBackend::unreachable());
        let connection = Connection::new(backend.clone());
        let signals = Arc::new(SignalManager::new());
        let (registry, _) = ModelRegistry::storefront(connection, &signals).unwrap();
        let lifecycle =
            ConnectionLifecycle::new(Arc::new(registry), LifecycleSettings::production(), signals)
                .unwrap();

        assert_eq!(lifecycle.state(), LifecycleState::Unconnected);
        assert_eq!(
            lifecycle.initialize().await,
            Err(StartupError::ConnectionUnavailable)
        );
        assert_eq!(lifecycle.state(), LifecycleState::Failed);

        backend.set_reachable(true);
        assert_eq!(lifecycle.initialize().await, Ok(()));
        assert_eq!(lifecycle.state(), LifecycleState::Ready);
        assert_eq!(
            lifecycle.initialize().await,
            Err(StartupError::AlreadyInitialized)
        );
    }

    #[tokio::test]
    async fn test_production_start_only_authenticates() {
        let lifecycle = lifecycle(MemoryBackend::new(), LifecycleSettings::production());
        assert!(lifecycle.initialize().await.is_ok());
        assert_eq!(lifecycle.state(), LifecycleState::Ready);
    }
}
