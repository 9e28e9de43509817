use store_object::Connection;
use type_mapping::DataTypes;

use super::{CATEGORY, ORDER_LINE};
use crate::associations::{Associable, AssociationScope};
use crate::errors::{ConfigurationError, DescriptorError};
use crate::model::{FieldDef, Model};

pub const TABLE: &str = "products";

pub fn descriptor(connection: &Connection, types: &DataTypes) -> Result<Model, DescriptorError> {
    Model::define(TABLE, connection)
        .field(FieldDef::new("id", types.uuid()).primary_key())
        .field(FieldDef::new("sku", types.string(64)).unique())
        .field(FieldDef::new("name", types.string(255)))
        .field(FieldDef::new("description", types.text()).nullable())
        .field(FieldDef::new("price", types.decimal(10, 2)))
        .field(FieldDef::new("stock", types.integer()))
        .field(FieldDef::new("active", types.boolean()))
        .field(FieldDef::new("category_id", types.uuid()).nullable())
        .field(FieldDef::new("created_at", types.timestamp()))
        .field(FieldDef::new("updated_at", types.timestamp()))
        .associations(ProductAssociations)
        .build()
}

pub struct ProductAssociations;

impl Associable for ProductAssociations {
    fn associate(&self, scope: &mut AssociationScope<'_>) -> Result<(), ConfigurationError> {
        scope.belongs_to(CATEGORY, "category_id")?;
        scope.has_many(ORDER_LINE, "product_id")
    }
}
