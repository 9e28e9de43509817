//! Bootstrap event types and definitions
//!
//! This module defines the structure of the diagnostic events
//! that flow through the signal system.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// What happened
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EventType {
    AssociationsStarted,
    AssociationsDeclared,
    /// An entity has no association capability
    AssociationsMissing,
    /// A belongs-to edge has no matching has-many/has-one edge on the peer
    MissingInverse,
    AssociationsCompleted,
    InitializeStarted,
    ConnectionEstablished,
    ConnectionFailed,
    VerificationStarted,
    VerificationPassed,
    VerificationFailed,
    TablesCreated,
    StatsCollected,
    StatsFailed,
    InitializeCompleted,
}

/// Severity used by subscribers that forward events to a logger
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum EventLevel {
    Debug,
    Info,
    Warn,
    Error,
}

impl EventType {
    pub fn level(self) -> EventLevel {
        match self {
            EventType::AssociationsDeclared => EventLevel::Debug,
            EventType::AssociationsMissing
            | EventType::MissingInverse
            | EventType::VerificationFailed => EventLevel::Warn,
            EventType::ConnectionFailed | EventType::StatsFailed => EventLevel::Error,
            _ => EventLevel::Info,
        }
    }
}

/// Diagnostic event
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseEvent {
    pub event_type: EventType,
    /// Entity the event refers to, if any
    pub entity: Option<String>,
    /// Human readable detail, usually an error message
    pub detail: Option<String>,
    /// Structured data (counts, table names, ...)
    pub payload: BTreeMap<String, serde_json::Value>,
    /// Event timestamp (UTC)
    pub timestamp: chrono::DateTime<chrono::Utc>,
}

impl DatabaseEvent {
    pub fn new(event_type: EventType) -> Self {
        Self {
            event_type,
            entity: None,
            detail: None,
            payload: BTreeMap::new(),
            timestamp: chrono::Utc::now(),
        }
    }

    pub fn with_entity(mut self, entity: impl Into<String>) -> Self {
        self.entity = Some(entity.into());
        self
    }

    pub fn with_detail(mut self, detail: impl Into<String>) -> Self {
        self.detail = Some(detail.into());
        self
    }

    pub fn with_payload(mut self, key: impl Into<String>, value: impl Into<serde_json::Value>) -> Self {
        self.payload.insert(key.into(), value.into());
        self
    }

    pub fn level(&self) -> EventLevel {
        self.event_type.level()
    }
}
