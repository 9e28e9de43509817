//! Schema handles
//!
//! A [`Model`] is what an entity descriptor factory returns: table name,
//! columns, the shared connection, and optionally an [`Associable`]
//! capability. Relationship edges are attached once, by the wiring engine.

use std::collections::HashSet;
use std::fmt;
use std::sync::{Arc, OnceLock};

use store_object::{Connection, StoreError, ValidatedFieldName, ValidatedTableName};
use type_mapping::{is_optional_type, ColumnType, DataTypes};

use crate::associations::{Associable, Association};
use crate::errors::DescriptorError;

/// One column of an entity
#[derive(Debug, Clone, PartialEq)]
pub struct FieldDef {
    pub name: String,
    pub column_type: ColumnType,
    pub nullable: bool,
    pub primary_key: bool,
    pub unique: bool,
}

impl FieldDef {
    pub fn new(name: &str, column_type: ColumnType) -> Self {
        Self {
            name: name.to_string(),
            column_type,
            nullable: false,
            primary_key: false,
            unique: false,
        }
    }

    /// Column described by its Rust type name; `Option<..>` makes it nullable
    pub fn typed(name: &str, types: &DataTypes, rust_type: &str) -> Self {
        let mut field = Self::new(name, types.from_rust_type(rust_type));
        field.nullable = is_optional_type(rust_type);
        field
    }

    pub fn primary_key(mut self) -> Self {
        self.primary_key = true;
        self
    }

    pub fn nullable(mut self) -> Self {
        self.nullable = true;
        self
    }

    pub fn unique(mut self) -> Self {
        self.unique = true;
        self
    }

    fn column_sql(&self) -> String {
        let mut sql = format!("{} {}", self.name, self.column_type.pg_type());
        if self.primary_key {
            sql.push_str(" PRIMARY KEY");
        } else if !self.nullable {
            sql.push_str(" NOT NULL");
        }
        if self.unique && !self.primary_key {
            sql.push_str(" UNIQUE");
        }
        if let Some(check) = self.column_type.check_constraint(&self.name) {
            sql.push(' ');
            sql.push_str(&check);
        }
        sql
    }
}

/// Schema handle for one entity
pub struct Model {
    name: String,
    table: ValidatedTableName,
    fields: Vec<FieldDef>,
    connection: Connection,
    associable: Option<Arc<dyn Associable>>,
    associations: OnceLock<Vec<Association>>,
}

impl Model {
    /// Start describing the entity stored in `table`
    pub fn define(table: &str, connection: &Connection) -> ModelBuilder {
        ModelBuilder {
            table: table.to_string(),
            connection: connection.clone(),
            fields: Vec::new(),
            associable: None,
        }
    }

    /// Registry name, assigned on registration
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn table_name(&self) -> &str {
        self.table.as_str()
    }

    pub fn fields(&self) -> &[FieldDef] {
        &self.fields
    }

    pub fn field(&self, name: &str) -> Option<&FieldDef> {
        self.fields.iter().find(|f| f.name == name)
    }

    pub fn primary_key(&self) -> &FieldDef {
        // The builder guarantees exactly one primary key
        &self.fields[self
            .fields
            .iter()
            .position(|f| f.primary_key)
            .unwrap_or_default()]
    }

    pub fn connection(&self) -> &Connection {
        &self.connection
    }

    pub fn associable(&self) -> Option<&dyn Associable> {
        self.associable.as_deref()
    }

    /// Relationship edges declared by this entity; empty before wiring
    pub fn associations(&self) -> &[Association] {
        self.associations.get().map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn association_to(&self, peer: &str) -> Option<&Association> {
        self.associations().iter().find(|a| a.target == peer)
    }

    pub fn is_wired(&self) -> bool {
        self.associations.get().is_some()
    }

    /// Additive DDL for this entity. Never drops or alters anything.
    pub fn create_table_sql(&self) -> String {
        let columns: Vec<String> = self.fields.iter().map(FieldDef::column_sql).collect();
        format!(
            "CREATE TABLE IF NOT EXISTS {} ({})",
            self.table,
            columns.join(", ")
        )
    }

    /// Number of rows currently stored for this entity
    pub async fn count(&self) -> Result<i64, StoreError> {
        self.connection.count(self.table.as_str()).await
    }

    pub(crate) fn set_name(&mut self, name: &str) {
        self.name = name.to_string();
    }

    /// Returns `false` if edges were already attached
    pub(crate) fn attach_associations(&self, edges: Vec<Association>) -> bool {
        self.associations.set(edges).is_ok()
    }
}

impl fmt::Debug for Model {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Model")
            .field("name", &self.name)
            .field("table", &self.table)
            .field("fields", &self.fields.len())
            .field("associable", &self.associable.is_some())
            .field("associations", &self.associations())
            .finish()
    }
}

/// Builder returned by [`Model::define`]
pub struct ModelBuilder {
    table: String,
    connection: Connection,
    fields: Vec<FieldDef>,
    associable: Option<Arc<dyn Associable>>,
}

impl ModelBuilder {
    pub fn field(mut self, field: FieldDef) -> Self {
        self.fields.push(field);
        self
    }

    /// Give the entity an association capability
    pub fn associations<A>(mut self, associable: A) -> Self
    where
        A: Associable + 'static,
    {
        self.associable = Some(Arc::new(associable));
        self
    }

    pub fn build(self) -> Result<Model, DescriptorError> {
        let table = ValidatedTableName::new(&self.table).map_err(|source| {
            DescriptorError::InvalidIdentifier {
                table: self.table.clone(),
                source,
            }
        })?;

        let mut seen = HashSet::new();
        for field in &self.fields {
            ValidatedFieldName::new(&field.name).map_err(|source| {
                DescriptorError::InvalidIdentifier {
                    table: self.table.clone(),
                    source,
                }
            })?;
            if !seen.insert(field.name.as_str()) {
                return Err(DescriptorError::DuplicateField {
                    table: self.table.clone(),
                    field: field.name.clone(),
                });
            }
        }

        match self.fields.iter().filter(|f| f.primary_key).count() {
            0 => return Err(DescriptorError::MissingPrimaryKey(self.table)),
            1 => {}
            _ => return Err(DescriptorError::MultiplePrimaryKeys(self.table)),
        }

        Ok(Model {
            name: self.table,
            table,
            fields: self.fields,
            connection: self.connection,
            associable: self.associable,
            associations: OnceLock::new(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use store_object::MemoryBackend;

    fn connection() -> Connection {
        Connection::new(Arc::new(MemoryBackend::new().with_table("widgets", 4)))
    }

    #[test]
    fn test_create_table_sql_is_additive() {
        let types = DataTypes::new();
        let model = Model::define("widgets", &connection())
            .field(FieldDef::new("id", types.uuid()).primary_key())
            .field(FieldDef::new("sku", types.string(64)).unique())
            .field(FieldDef::new("note", types.text()).nullable())
            .field(FieldDef::new("state", types.enumeration(&["new", "old"])))
            .build()
            .unwrap();

        assert_eq!(
            model.create_table_sql(),
            "CREATE TABLE IF NOT EXISTS widgets (id UUID PRIMARY KEY, \
             sku VARCHAR(64) NOT NULL UNIQUE, note TEXT, \
             state TEXT NOT NULL CHECK (state IN ('new', 'old')))"
        );
        assert_eq!(model.primary_key().name, "id");
        assert_eq!(model.name(), "widgets");
    }

    #[test]
    fn test_typed_fields_follow_rust_types() {
        let types = DataTypes::new();
        let quantity = FieldDef::typed("quantity", &types, "i32");
        let note = FieldDef::typed("note", &types, "Option<String>");

        assert_eq!(quantity.column_type, ColumnType::Integer);
        assert!(!quantity.nullable);
        assert_eq!(note.column_type, ColumnType::String(None));
        assert!(note.nullable);

        let flag = FieldDef::typed("flag", &types, "OptionalFlag");
        assert!(!flag.nullable);
    }

    #[test]
    fn test_build_rejects_bad_descriptors() {
        let types = DataTypes::new();

        let missing_pk = Model::define("widgets", &connection())
            .field(FieldDef::new("name", types.text()))
            .build();
        assert!(matches!(missing_pk, Err(DescriptorError::MissingPrimaryKey(_))));

        let two_pks = Model::define("widgets", &connection())
            .field(FieldDef::new("id", types.uuid()).primary_key())
            .field(FieldDef::new("alt_id", types.uuid()).primary_key())
            .build();
        assert!(matches!(two_pks, Err(DescriptorError::MultiplePrimaryKeys(_))));

        let bad_table = Model::define("select", &connection())
            .field(FieldDef::new("id", types.uuid()).primary_key())
            .build();
        assert!(matches!(
            bad_table,
            Err(DescriptorError::InvalidIdentifier { .. })
        ));

        let duplicate = Model::define("widgets", &connection())
            .field(FieldDef::new("id", types.uuid()).primary_key())
            .field(FieldDef::new("id", types.text()))
            .build();
        assert!(matches!(duplicate, Err(DescriptorError::DuplicateField { .. })));
    }

    #[tokio::test]
    async fn test_count_goes_through_shared_connection() {
        let types = DataTypes::new();
        let connection = connection();
        let model = Model::define("widgets", &connection)
            .field(FieldDef::new("id", types.uuid()).primary_key())
            .build()
            .unwrap();

        assert!(model.connection().same_as(&connection));
        assert_eq!(model.count().await.unwrap(), 4);
    }

    #[test]
    fn test_associations_attach_once() {
        let types = DataTypes::new();
        let model = Model::define("widgets", &connection())
            .field(FieldDef::new("id", types.uuid()).primary_key())
            .build()
            .unwrap();

        assert!(!model.is_wired());
        assert!(model.associations().is_empty());
        assert!(model.attach_associations(Vec::new()));
        assert!(!model.attach_associations(Vec::new()));
        assert!(model.is_wired());
    }
}
