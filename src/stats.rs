//! Row-count statistics
//!
//! One count per storefront entity, issued concurrently over the shared
//! connection pool.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use signal_system::{DatabaseEvent, EventType, SignalManager};

use crate::errors::StatsError;
use crate::model::Model;
use crate::registry::Models;

/// Row counts per entity
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DatabaseStats {
    pub users: i64,
    pub products: i64,
    pub categories: i64,
    pub orders: i64,
    pub order_lines: i64,
}

impl DatabaseStats {
    pub fn total(&self) -> i64 {
        self.users + self.products + self.categories + self.orders + self.order_lines
    }
}

#[derive(Debug, Clone)]
pub struct StatsReporter {
    models: Models,
    signals: Arc<SignalManager>,
}

impl StatsReporter {
    pub fn new(models: Models, signals: Arc<SignalManager>) -> Self {
        Self { models, signals }
    }

    /// Count every entity. The first failing count fails the whole call.
    pub async fn collect(&self) -> Result<DatabaseStats, StatsError> {
        let (users, products, categories, orders, order_lines) = tokio::try_join!(
            count(&self.models.users),
            count(&self.models.products),
            count(&self.models.categories),
            count(&self.models.orders),
            count(&self.models.order_lines),
        )?;

        Ok(DatabaseStats {
            users,
            products,
            categories,
            orders,
            order_lines,
        })
    }

    /// Like [`collect`](Self::collect), with failures logged and turned into `None`
    pub async fn get_database_stats(&self) -> Option<DatabaseStats> {
        match self.collect().await {
            Ok(stats) => {
                let mut event = DatabaseEvent::new(EventType::StatsCollected)
                    .with_payload("total", stats.total());
                if let Ok(serde_json::Value::Object(counts)) = serde_json::to_value(stats) {
                    for (key, value) in counts {
                        event = event.with_payload(key, value);
                    }
                }
                self.signals.emit(event);
                Some(stats)
            }
            Err(StatsError::Count { entity, source }) => {
                self.signals.emit(
                    DatabaseEvent::new(EventType::StatsFailed)
                        .with_entity(entity)
                        .with_detail(source.to_string()),
                );
                None
            }
        }
    }
}

async fn count(model: &Model) -> Result<i64, StatsError> {
    model.count().await.map_err(|source| StatsError::Count {
        entity: model.name().to_string(),
        source,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_serializes_camel_case() {
        let stats = DatabaseStats {
            users: 3,
            products: 10,
            categories: 2,
            orders: 5,
            order_lines: 12,
        };

        let json = serde_json::to_value(stats).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "users": 3,
                "products": 10,
                "categories": 2,
                "orders": 5,
                "orderLines": 12
            })
        );
        assert_eq!(stats.total(), 32);
    }
}
