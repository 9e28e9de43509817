//! Validation module
//!
//! Table and column names end up interpolated into DDL and count queries, so
//! every identifier an entity descriptor declares goes through here first.

use std::fmt;
use thiserror::Error;

/// PostgreSQL identifier length limit
const MAX_IDENTIFIER_LENGTH: usize = 63;

/// Validation errors for database identifiers
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ValidationError {
    #[error("Invalid characters in name '{0}': only alphanumeric characters and underscores are allowed")]
    InvalidCharacters(String),

    #[error("Name '{name}' is too long: {length} characters (max {max_length})")]
    TooLong {
        name: String,
        length: usize,
        max_length: usize,
    },

    #[error("Name cannot be empty")]
    Empty,

    #[error("Name '{0}' must start with a letter or underscore")]
    InvalidStartCharacter(String),

    #[error("Name '{0}' is a reserved SQL keyword")]
    ReservedKeyword(String),
}

/// A validated table name that is safe to use in SQL queries
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ValidatedTableName(String);

impl ValidatedTableName {
    pub fn new(name: &str) -> Result<Self, ValidationError> {
        validate_identifier(name)?;
        Ok(Self(name.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ValidatedTableName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A validated column name that is safe to use in SQL queries
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ValidatedFieldName(String);

impl ValidatedFieldName {
    pub fn new(name: &str) -> Result<Self, ValidationError> {
        validate_identifier(name)?;
        Ok(Self(name.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ValidatedFieldName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Common validation logic for SQL identifiers
fn validate_identifier(name: &str) -> Result<(), ValidationError> {
    let first_char = name.chars().next().ok_or(ValidationError::Empty)?;

    if name.len() > MAX_IDENTIFIER_LENGTH {
        return Err(ValidationError::TooLong {
            name: name.to_string(),
            length: name.len(),
            max_length: MAX_IDENTIFIER_LENGTH,
        });
    }

    if !first_char.is_ascii_alphabetic() && first_char != '_' {
        return Err(ValidationError::InvalidStartCharacter(name.to_string()));
    }

    if !name.chars().all(|c| c.is_ascii_alphanumeric() || c == '_') {
        return Err(ValidationError::InvalidCharacters(name.to_string()));
    }

    if is_reserved_keyword(name) {
        return Err(ValidationError::ReservedKeyword(name.to_string()));
    }

    Ok(())
}

fn is_reserved_keyword(name: &str) -> bool {
    const RESERVED_KEYWORDS: &[&str] = &[
        "ALL", "ALTER", "AND", "ANY", "AS", "ASC", "BETWEEN", "BY", "CASE", "CHECK", "COLUMN",
        "CONSTRAINT", "CREATE", "CROSS", "DEFAULT", "DELETE", "DESC", "DISTINCT", "DROP", "ELSE",
        "END", "EXISTS", "FALSE", "FOREIGN", "FROM", "FULL", "GRANT", "GROUP", "HAVING", "IN",
        "INDEX", "INNER", "INSERT", "INTO", "IS", "JOIN", "KEY", "LEFT", "LIKE", "LIMIT", "NOT",
        "NULL", "OFFSET", "ON", "OR", "ORDER", "OUTER", "PRIMARY", "REFERENCES", "RETURNING",
        "RIGHT", "SELECT", "SET", "TABLE", "THEN", "TO", "TRUE", "UNION", "UNIQUE", "UPDATE",
        "USER", "USING", "VALUES", "WHEN", "WHERE", "WITH",
    ];

    RESERVED_KEYWORDS.contains(&name.to_ascii_uppercase().as_str())
}
