//! Convenience re-exports for common shopdb usage
//!
//! ```rust
//! use shopdb::prelude::*;
//! ```

pub use crate::associations::{Associable, Association, AssociationKind, AssociationScope};
pub use crate::core::Database;
pub use crate::errors::{ConfigurationError, DescriptorError, ShopDbError, StartupError};
pub use crate::lifecycle::{LifecycleSettings, LifecycleState};
pub use crate::model::{FieldDef, Model};
pub use crate::registry::{ModelRegistry, Models};
pub use crate::stats::DatabaseStats;

pub use config::{AppConfig, DatabaseConfig, PoolSettings, RunMode};

pub use signal_system::prelude::*;
pub use store_object::prelude::*;
pub use type_mapping::{ColumnType, DataTypes};
