//! SQL type conversion utilities
//!
//! This module handles conversion between Rust type names
//! and their column type equivalents.

use crate::types::ColumnType;

/// Map Rust type names to column types for DDL generation
pub fn rust_type_to_column_type(rust_type: &str) -> ColumnType {
    // Normalize type string by removing all whitespace for consistent matching
    let normalized = rust_type.replace(' ', "");
    let inner = strip_option(&normalized);
    match inner {
        "Uuid" | "uuid::Uuid" => ColumnType::Uuid,
        "String" | "&str" => ColumnType::String(None),
        "i8" | "i16" => ColumnType::SmallInt,
        "i32" | "u16" => ColumnType::Integer,
        "i64" | "u32" => ColumnType::BigInt,
        "u64" => ColumnType::Decimal(20, 0), // PostgreSQL doesn't have native u64
        "f32" => ColumnType::Real,
        "f64" => ColumnType::Double,
        "bool" => ColumnType::Boolean,
        "chrono::DateTime<chrono::Utc>" | "DateTime<Utc>" | "chrono::NaiveDateTime" => {
            ColumnType::Timestamp
        }
        "chrono::NaiveDate" | "NaiveDate" => ColumnType::Date,
        "rust_decimal::Decimal" | "Decimal" => ColumnType::Decimal(28, 10),
        "serde_json::Value" | "Value" => ColumnType::Json,
        "Vec<String>" => ColumnType::TextArray,
        _ => ColumnType::String(None), // default fallback
    }
}

fn strip_option(normalized: &str) -> &str {
    normalized
        .strip_prefix("Option<")
        .and_then(|rest| rest.strip_suffix('>'))
        .unwrap_or(normalized)
}

/// Check if a Rust type is Optional (nullable in SQL)
pub fn is_optional_type(rust_type: &str) -> bool {
    let normalized = rust_type.replace(' ', "");
    strip_option(&normalized).len() != normalized.len()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_optional_types_map_like_inner_type() {
        assert_eq!(rust_type_to_column_type("Option<i64>"), ColumnType::BigInt);
        assert_eq!(rust_type_to_column_type("Option < Uuid >"), ColumnType::Uuid);
        assert_eq!(
            rust_type_to_column_type("Option<chrono::DateTime<chrono::Utc>>"),
            ColumnType::Timestamp
        );
        assert!(is_optional_type("Option<String>"));
        assert!(!is_optional_type("String"));
        assert!(is_optional_type("Option < i32 >"));
    }

    #[test]
    fn test_option_prefixed_names_are_not_optional() {
        assert!(!is_optional_type("OptionalFlag"));
        assert!(!is_optional_type("Options"));
        assert_eq!(
            rust_type_to_column_type("OptionalFlag"),
            ColumnType::String(None)
        );
    }

    #[test]
    fn test_unknown_types_fall_back_to_varchar() {
        assert_eq!(
            rust_type_to_column_type("my::CustomType"),
            ColumnType::String(None)
        );
    }
}
