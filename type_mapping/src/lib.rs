//! Unified type mapping between Rust types and PostgreSQL
//!
//! Entity descriptors receive a [`DataTypes`] value and use it to declare
//! column types; the same mapping renders those columns as DDL.

pub mod sql;
pub mod types;

pub use sql::{is_optional_type, rust_type_to_column_type};
pub use types::{ColumnType, DataTypes};
