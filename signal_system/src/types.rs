//! Type definitions for signal system

use crate::event::DatabaseEvent;
use std::sync::Arc;

/// Event callback invoked synchronously for every emitted event
pub type EventCallback = Arc<dyn Fn(&DatabaseEvent) + Send + Sync>;
