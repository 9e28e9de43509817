use store_object::Connection;
use type_mapping::DataTypes;

use super::PRODUCT;
use crate::associations::{Associable, AssociationScope};
use crate::errors::{ConfigurationError, DescriptorError};
use crate::model::{FieldDef, Model};

pub const TABLE: &str = "categories";

pub fn descriptor(connection: &Connection, types: &DataTypes) -> Result<Model, DescriptorError> {
    Model::define(TABLE, connection)
        .field(FieldDef::new("id", types.uuid()).primary_key())
        .field(FieldDef::new("name", types.string(120)))
        .field(FieldDef::new("slug", types.string(120)).unique())
        .field(FieldDef::typed("description", types, "Option<String>"))
        .field(FieldDef::new("created_at", types.timestamp()))
        .field(FieldDef::new("updated_at", types.timestamp()))
        .associations(CategoryAssociations)
        .build()
}

pub struct CategoryAssociations;

impl Associable for CategoryAssociations {
    fn associate(&self, scope: &mut AssociationScope<'_>) -> Result<(), ConfigurationError> {
        scope.has_many(PRODUCT, "category_id")
    }
}
