//! Convenience re-exports for common signal-system usage

pub use crate::event::{DatabaseEvent, EventLevel, EventType};
pub use crate::log::log_event;
pub use crate::manager::SignalManager;
pub use crate::types::EventCallback;

