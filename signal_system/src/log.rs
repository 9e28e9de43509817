//! `tracing` subscriber for bootstrap events

use crate::event::{DatabaseEvent, EventLevel};
use tracing::{debug, error, info, warn};

/// Forward an event to `tracing` at the level its type implies.
pub fn log_event(event: &DatabaseEvent) {
    let entity = event.entity.as_deref().unwrap_or("-");
    let detail = event.detail.as_deref().unwrap_or("");
    let payload = if event.payload.is_empty() {
        String::new()
    } else {
        serde_json::to_string(&event.payload).unwrap_or_default()
    };

    match event.level() {
        EventLevel::Debug => debug!(
            event = ?event.event_type,
            entity,
            payload = %payload,
            "{}",
            detail
        ),
        EventLevel::Info => info!(
            event = ?event.event_type,
            entity,
            payload = %payload,
            "{}",
            detail
        ),
        EventLevel::Warn => warn!(
            event = ?event.event_type,
            entity,
            payload = %payload,
            "{}",
            detail
        ),
        EventLevel::Error => error!(
            event = ?event.event_type,
            entity,
            payload = %payload,
            "{}",
            detail
        ),
    }
}
