//! Column type definitions
//!
//! [`ColumnType`] is the vocabulary entity descriptors use for their columns,
//! [`DataTypes`] is the capability handed to descriptor factories to build them.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Column types supported by entity descriptors
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ColumnType {
    Uuid,
    /// Bounded text; `None` renders as unbounded `VARCHAR`
    String(Option<u32>),
    Text,
    SmallInt,
    Integer,
    BigInt,
    /// Fixed precision number: precision, scale
    Decimal(u8, u8),
    Real,
    Double,
    Boolean,
    Date,
    Timestamp,
    Json,
    /// Text restricted to a closed set of values
    Enum(Vec<String>),
    TextArray,
}

impl ColumnType {
    /// PostgreSQL type used in `CREATE TABLE`
    pub fn pg_type(&self) -> String {
        match self {
            ColumnType::Uuid => "UUID".to_string(),
            ColumnType::String(Some(len)) => format!("VARCHAR({})", len),
            ColumnType::String(None) => "VARCHAR".to_string(),
            ColumnType::Text | ColumnType::Enum(_) => "TEXT".to_string(),
            ColumnType::SmallInt => "SMALLINT".to_string(),
            ColumnType::Integer => "INTEGER".to_string(),
            ColumnType::BigInt => "BIGINT".to_string(),
            ColumnType::Decimal(precision, scale) => format!("NUMERIC({},{})", precision, scale),
            ColumnType::Real => "REAL".to_string(),
            ColumnType::Double => "DOUBLE PRECISION".to_string(),
            ColumnType::Boolean => "BOOLEAN".to_string(),
            ColumnType::Date => "DATE".to_string(),
            ColumnType::Timestamp => "TIMESTAMP WITH TIME ZONE".to_string(),
            ColumnType::Json => "JSONB".to_string(),
            ColumnType::TextArray => "TEXT[]".to_string(),
        }
    }

    /// Extra column constraint implied by the type, if any
    pub fn check_constraint(&self, column: &str) -> Option<String> {
        match self {
            ColumnType::Enum(values) if !values.is_empty() => {
                let quoted: Vec<String> = values
                    .iter()
                    .map(|v| format!("'{}'", v.replace('\'', "''")))
                    .collect();
                Some(format!("CHECK ({} IN ({}))", column, quoted.join(", ")))
            }
            _ => None,
        }
    }
}

impl fmt::Display for ColumnType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.pg_type())
    }
}

/// Type-mapping capability passed to every descriptor factory
#[derive(Debug, Clone, Copy, Default)]
pub struct DataTypes;

impl DataTypes {
    pub fn new() -> Self {
        Self
    }

    pub fn uuid(&self) -> ColumnType {
        ColumnType::Uuid
    }

    pub fn string(&self, max_len: u32) -> ColumnType {
        ColumnType::String(Some(max_len))
    }

    pub fn text(&self) -> ColumnType {
        ColumnType::Text
    }

    pub fn integer(&self) -> ColumnType {
        ColumnType::Integer
    }

    pub fn big_int(&self) -> ColumnType {
        ColumnType::BigInt
    }

    pub fn decimal(&self, precision: u8, scale: u8) -> ColumnType {
        ColumnType::Decimal(precision, scale)
    }

    pub fn boolean(&self) -> ColumnType {
        ColumnType::Boolean
    }

    pub fn date(&self) -> ColumnType {
        ColumnType::Date
    }

    pub fn timestamp(&self) -> ColumnType {
        ColumnType::Timestamp
    }

    pub fn json(&self) -> ColumnType {
        ColumnType::Json
    }

    pub fn enumeration(&self, values: &[&str]) -> ColumnType {
        ColumnType::Enum(values.iter().map(|v| v.to_string()).collect())
    }

    /// Map a Rust type name (`"i64"`, `"Option<String>"`, ...) to a column type
    pub fn from_rust_type(&self, rust_type: &str) -> ColumnType {
        crate::sql::rust_type_to_column_type(rust_type)
    }
}
