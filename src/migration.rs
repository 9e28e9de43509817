//! Non-destructive schema verification
//!
//! Confirms that every registered entity has its table. Existing structure
//! is never dropped or altered; missing tables are created with
//! `CREATE TABLE IF NOT EXISTS` only when the lifecycle settings allow it.

use serde::Serialize;
use signal_system::{DatabaseEvent, EventType};

use crate::errors::VerificationError;
use crate::lifecycle::ConnectionLifecycle;

/// Outcome of a verification pass
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct VerificationReport {
    /// Tables the registry expects, in registration order
    pub expected: Vec<String>,
    /// Expected tables that already existed
    pub found: Vec<String>,
    /// Expected tables that did not exist
    pub missing: Vec<String>,
    /// Missing tables created during this pass
    pub created: Vec<String>,
}

impl VerificationReport {
    pub fn is_complete(&self) -> bool {
        self.missing.len() == self.created.len()
    }
}

impl ConnectionLifecycle {
    pub async fn verify_schema(&self) -> Result<VerificationReport, VerificationError> {
        let expected: Vec<String> = self
            .registry
            .iter()
            .map(|m| m.table_name().to_string())
            .collect();

        self.signals.emit(
            DatabaseEvent::new(EventType::VerificationStarted)
                .with_payload("tables", expected.len()),
        );

        let existing = self.connection().existing_tables(&expected).await?;
        let (found, missing): (Vec<String>, Vec<String>) = expected
            .iter()
            .cloned()
            .partition(|table| existing.contains(table));

        let mut report = VerificationReport {
            expected,
            found,
            missing,
            created: Vec::new(),
        };

        if !report.missing.is_empty() && self.settings.sync_create_missing {
            for model in self
                .registry
                .iter()
                .filter(|m| report.missing.iter().any(|t| t == m.table_name()))
            {
                let ddl = model.create_table_sql();
                debug_log!("Creating missing table {}: {}", model.table_name(), ddl);
                if let Err(e) = self.connection().create_table(model.table_name(), &ddl).await {
                    self.report_created(&report.created);
                    return Err(e.into());
                }
                report.created.push(model.table_name().to_string());
            }

            self.report_created(&report.created);
        }

        if !report.is_complete() {
            return Err(VerificationError::MissingTables(report.missing));
        }

        self.signals.emit(
            DatabaseEvent::new(EventType::VerificationPassed)
                .with_payload("found", report.found.len())
                .with_payload("created", report.created.len()),
        );
        Ok(report)
    }

    fn report_created(&self, created: &[String]) {
        if created.is_empty() {
            return;
        }
        self.signals.emit(
            DatabaseEvent::new(EventType::TablesCreated)
                .with_detail(created.join(", "))
                .with_payload("created", created.len()),
        );
    }
}
