use super::{ensure_create_only, StoreBackend};
use crate::errors::StoreError;
use async_trait::async_trait;
use std::collections::{BTreeMap, BTreeSet};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Mutex, MutexGuard};
use std::time::Duration;

/// In-process backend keeping table names and row counts in memory.
///
/// Useful for running the bootstrap sequence without a database. Every call
/// is counted so callers can assert what the lifecycle asked of the store.
#[derive(Debug)]
pub struct MemoryBackend {
    state: Mutex<MemoryState>,
    count_delay: Option<Duration>,
    authenticate_calls: AtomicUsize,
    inspect_calls: AtomicUsize,
    structural_calls: AtomicUsize,
    count_calls: AtomicUsize,
    counts_in_flight: AtomicUsize,
    max_counts_in_flight: AtomicUsize,
}

#[derive(Debug)]
struct MemoryState {
    reachable: bool,
    tables: BTreeMap<String, MemoryTable>,
    failing_counts: BTreeSet<String>,
    failing_creates: BTreeSet<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MemoryTable {
    pub rows: i64,
    /// Statement that created the table, `None` when it was seeded
    pub ddl: Option<String>,
}

impl MemoryBackend {
    pub fn new() -> Self {
        Self {
            state: Mutex::new(MemoryState {
                reachable: true,
                tables: BTreeMap::new(),
                failing_counts: BTreeSet::new(),
                failing_creates: BTreeSet::new(),
            }),
            count_delay: None,
            authenticate_calls: AtomicUsize::new(0),
            inspect_calls: AtomicUsize::new(0),
            structural_calls: AtomicUsize::new(0),
            count_calls: AtomicUsize::new(0),
            counts_in_flight: AtomicUsize::new(0),
            max_counts_in_flight: AtomicUsize::new(0),
        }
    }

    /// Backend whose every call fails as if the host could not be reached
    pub fn unreachable() -> Self {
        let backend = Self::new();
        backend.set_reachable(false);
        backend
    }

    /// Seed an existing table holding `rows` rows
    pub fn with_table(self, table: &str, rows: i64) -> Self {
        self.set_rows(table, rows);
        self
    }

    /// Make every count query sleep before answering
    pub fn with_count_delay(mut self, delay: Duration) -> Self {
        self.count_delay = Some(delay);
        self
    }

    pub fn set_reachable(&self, reachable: bool) {
        self.lock().reachable = reachable;
    }

    pub fn set_rows(&self, table: &str, rows: i64) {
        self.lock()
            .tables
            .entry(table.to_string())
            .and_modify(|t| t.rows = rows)
            .or_insert(MemoryTable { rows, ddl: None });
    }

    /// Make count queries against `table` fail
    pub fn fail_counts_for(&self, table: &str) {
        self.lock().failing_counts.insert(table.to_string());
    }

    /// Make table creation for `table` fail
    pub fn fail_creates_for(&self, table: &str) {
        self.lock().failing_creates.insert(table.to_string());
    }

    /// Counts currently running
    pub fn counts_in_flight(&self) -> usize {
        self.counts_in_flight.load(Ordering::SeqCst)
    }

    /// Table names with their definitions, for before/after comparisons
    pub fn schema_snapshot(&self) -> BTreeMap<String, Option<String>> {
        self.lock()
            .tables
            .iter()
            .map(|(name, table)| (name.clone(), table.ddl.clone()))
            .collect()
    }

    pub fn table_names(&self) -> Vec<String> {
        self.lock().tables.keys().cloned().collect()
    }

    pub fn authenticate_calls(&self) -> usize {
        self.authenticate_calls.load(Ordering::SeqCst)
    }

    /// Table lookups issued (verification reads)
    pub fn inspect_calls(&self) -> usize {
        self.inspect_calls.load(Ordering::SeqCst)
    }

    /// Structural statements issued (table creation)
    pub fn structural_calls(&self) -> usize {
        self.structural_calls.load(Ordering::SeqCst)
    }

    pub fn count_calls(&self) -> usize {
        self.count_calls.load(Ordering::SeqCst)
    }

    /// Highest number of count queries observed running at once
    pub fn max_concurrent_counts(&self) -> usize {
        self.max_counts_in_flight.load(Ordering::SeqCst)
    }

    fn lock(&self) -> MutexGuard<'_, MemoryState> {
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn ensure_reachable(&self) -> Result<(), StoreError> {
        if self.lock().reachable {
            Ok(())
        } else {
            Err(StoreError::Unreachable("connection refused".to_string()))
        }
    }
}

impl Default for MemoryBackend {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl StoreBackend for MemoryBackend {
    fn kind(&self) -> &'static str {
        "memory"
    }

    async fn authenticate(&self) -> Result<(), StoreError> {
        self.authenticate_calls.fetch_add(1, Ordering::SeqCst);
        self.ensure_reachable()
    }

    async fn existing_tables(&self, tables: &[String]) -> Result<Vec<String>, StoreError> {
        self.inspect_calls.fetch_add(1, Ordering::SeqCst);
        self.ensure_reachable()?;
        let state = self.lock();
        Ok(tables
            .iter()
            .filter(|t| state.tables.contains_key(t.as_str()))
            .cloned()
            .collect())
    }

    async fn create_table(&self, table: &str, ddl: &str) -> Result<(), StoreError> {
        self.structural_calls.fetch_add(1, Ordering::SeqCst);
        self.ensure_reachable()?;
        ensure_create_only(table, ddl)?;
        let mut state = self.lock();
        if state.failing_creates.contains(table) {
            return Err(StoreError::QueryFailed {
                table: table.to_string(),
                cause: "permission denied for schema public".to_string(),
            });
        }
        state
            .tables
            .entry(table.to_string())
            .or_insert_with(|| MemoryTable {
                rows: 0,
                ddl: Some(ddl.to_string()),
            });
        Ok(())
    }

    async fn count(&self, table: &str) -> Result<i64, StoreError> {
        self.count_calls.fetch_add(1, Ordering::SeqCst);
        let _in_flight = InFlight::enter(&self.counts_in_flight, &self.max_counts_in_flight);

        if let Some(delay) = self.count_delay {
            tokio::time::sleep(delay).await;
        }

        let result = self.ensure_reachable().and_then(|_| {
            let state = self.lock();
            if state.failing_counts.contains(table) {
                return Err(StoreError::QueryFailed {
                    table: table.to_string(),
                    cause: "count query failed".to_string(),
                });
            }
            state
                .tables
                .get(table)
                .map(|t| t.rows)
                .ok_or_else(|| StoreError::QueryFailed {
                    table: table.to_string(),
                    cause: format!("relation \"{}\" does not exist", table),
                })
        });

        result
    }
}

/// Marks one count as running until dropped, even if the future is cancelled
struct InFlight<'a> {
    running: &'a AtomicUsize,
}

impl<'a> InFlight<'a> {
    fn enter(running: &'a AtomicUsize, high_water: &AtomicUsize) -> Self {
        let now = running.fetch_add(1, Ordering::SeqCst) + 1;
        high_water.fetch_max(now, Ordering::SeqCst);
        Self { running }
    }
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        self.running.fetch_sub(1, Ordering::SeqCst);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_unreachable_fails_every_call() {
        let backend = MemoryBackend::unreachable().with_table("users", 1);
        assert!(matches!(
            backend.authenticate().await,
            Err(StoreError::Unreachable(_))
        ));
        assert!(backend.count("users").await.is_err());
        assert_eq!(backend.authenticate_calls(), 1);
    }

    #[tokio::test]
    async fn test_create_table_never_replaces_existing() {
        let backend = MemoryBackend::new().with_table("users", 3);
        backend
            .create_table("users", "CREATE TABLE IF NOT EXISTS users (id UUID)")
            .await
            .unwrap();
        assert_eq!(backend.count("users").await.unwrap(), 3);
        assert_eq!(backend.schema_snapshot()["users"], None);
        assert_eq!(backend.structural_calls(), 1);
    }

    #[tokio::test]
    async fn test_existing_tables_filters() {
        let backend = MemoryBackend::new().with_table("users", 0);
        let found = backend
            .existing_tables(&["users".to_string(), "orders".to_string()])
            .await
            .unwrap();
        assert_eq!(found, vec!["users".to_string()]);
        assert_eq!(backend.inspect_calls(), 1);
    }

    #[tokio::test]
    async fn test_failing_and_missing_counts() {
        let backend = MemoryBackend::new().with_table("orders", 5);
        backend.fail_counts_for("orders");
        assert!(matches!(
            backend.count("orders").await,
            Err(StoreError::QueryFailed { .. })
        ));
        assert!(backend.count("missing").await.is_err());
        assert_eq!(backend.count_calls(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancelled_count_leaves_no_count_running() {
        let backend = MemoryBackend::new()
            .with_table("orders", 5)
            .with_count_delay(Duration::from_secs(1));

        let cancelled =
            tokio::time::timeout(Duration::from_millis(10), backend.count("orders")).await;
        assert!(cancelled.is_err());
        assert_eq!(backend.counts_in_flight(), 0);

        assert_eq!(backend.count("orders").await.unwrap(), 5);
        assert_eq!(backend.max_concurrent_counts(), 1);
        assert_eq!(backend.counts_in_flight(), 0);
    }

    #[tokio::test]
    async fn test_failing_create_leaves_schema_alone() {
        let backend = MemoryBackend::new();
        backend.fail_creates_for("orders");
        assert!(backend
            .create_table("orders", "CREATE TABLE IF NOT EXISTS orders (id UUID)")
            .await
            .is_err());
        assert!(backend.table_names().is_empty());
        assert_eq!(backend.structural_calls(), 1);
    }
}
