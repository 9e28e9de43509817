use crate::event::{DatabaseEvent, EventType};
use crate::types::EventCallback;
use std::sync::{Arc, RwLock};

/// Signal manager for bootstrap diagnostics
pub struct SignalManager {
    callbacks: RwLock<Vec<EventCallback>>,
}

impl std::fmt::Debug for SignalManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SignalManager")
            .field("callback_count", &self.callback_count())
            .finish()
    }
}

impl SignalManager {
    pub fn new() -> Self {
        Self {
            callbacks: RwLock::new(Vec::new()),
        }
    }

    /// Manager with the `tracing` subscriber already attached
    pub fn with_tracing() -> Self {
        let manager = Self::new();
        manager.add_callback(crate::log::log_event);
        manager
    }

    /// Add event callback
    pub fn add_callback<F>(&self, callback: F)
    where
        F: Fn(&DatabaseEvent) + Send + Sync + 'static,
    {
        if let Ok(mut callbacks) = self.callbacks.write() {
            callbacks.push(Arc::new(callback));
        }
    }

    /// Emit event to all subscribers
    pub fn emit(&self, event: DatabaseEvent) {
        // Clone the list so a callback may register further callbacks
        let callbacks: Vec<EventCallback> = match self.callbacks.read() {
            Ok(callbacks) => callbacks.clone(),
            Err(_) => return,
        };
        for callback in callbacks.iter() {
            callback(&event);
        }
    }

    /// Shorthand for events that carry nothing but their type
    pub fn notify(&self, event_type: EventType) {
        self.emit(DatabaseEvent::new(event_type));
    }

    /// Clear all callbacks
    pub fn clear_callbacks(&self) {
        if let Ok(mut callbacks) = self.callbacks.write() {
            callbacks.clear();
        }
    }

    /// Get number of registered callbacks
    pub fn callback_count(&self) -> usize {
        self.callbacks.read().map(|c| c.len()).unwrap_or(0)
    }
}

impl Default for SignalManager {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    #[test]
    fn test_emit_reaches_every_callback_in_order() {
        let manager = SignalManager::new();
        let seen = Arc::new(Mutex::new(Vec::new()));

        for id in 0..2 {
            let seen = seen.clone();
            manager.add_callback(move |event| {
                seen.lock().unwrap().push((id, event.event_type));
            });
        }

        manager.notify(EventType::InitializeStarted);

        assert_eq!(
            *seen.lock().unwrap(),
            vec![
                (0, EventType::InitializeStarted),
                (1, EventType::InitializeStarted)
            ]
        );
    }

    #[test]
    fn test_clear_callbacks() {
        let manager = SignalManager::with_tracing();
        assert_eq!(manager.callback_count(), 1);
        manager.clear_callbacks();
        assert_eq!(manager.callback_count(), 0);
        manager.notify(EventType::StatsFailed);
    }
}
