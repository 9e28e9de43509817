//! Signal system for bootstrap diagnostics
//!
//! Registry wiring and the connection lifecycle report what they do as
//! [`DatabaseEvent`]s. Subscribers decide how those events are logged, so the
//! control flow never calls a logger directly.

pub mod event;
pub mod log;
pub mod manager;
pub mod prelude;
pub mod types;

pub use event::{DatabaseEvent, EventLevel, EventType};
pub use log::log_event;
pub use manager::SignalManager;
pub use types::EventCallback;
