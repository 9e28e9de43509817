#![allow(dead_code)]

use std::sync::{Arc, Mutex};

use shopdb::prelude::*;

/// Backend holding the storefront tables with known row counts
pub fn seeded_backend() -> MemoryBackend {
    MemoryBackend::new()
        .with_table("users", 3)
        .with_table("products", 10)
        .with_table("categories", 2)
        .with_table("orders", 5)
        .with_table("order_lines", 12)
}

/// Signal manager recording every event it sees
pub fn recording_signals() -> (Arc<SignalManager>, Arc<Mutex<Vec<DatabaseEvent>>>) {
    let signals = Arc::new(SignalManager::new());
    let events = Arc::new(Mutex::new(Vec::new()));
    let sink = events.clone();
    signals.add_callback(move |event: &DatabaseEvent| {
        sink.lock().unwrap().push(event.clone());
    });
    (signals, events)
}

pub fn event_types(events: &Mutex<Vec<DatabaseEvent>>) -> Vec<EventType> {
    events.lock().unwrap().iter().map(|e| e.event_type).collect()
}

pub fn database(backend: Arc<MemoryBackend>, settings: LifecycleSettings) -> Database {
    Database::with_connection(Connection::new(backend), settings).unwrap()
}

pub fn recorded_database(
    backend: Arc<MemoryBackend>,
    settings: LifecycleSettings,
) -> (Database, Arc<Mutex<Vec<DatabaseEvent>>>) {
    let (signals, events) = recording_signals();
    let database = Database::with_signals(Connection::new(backend), settings, signals).unwrap();
    (database, events)
}
