use store_object::Connection;
use type_mapping::DataTypes;

use super::{ORDER, PRODUCT};
use crate::associations::{Associable, AssociationScope};
use crate::errors::{ConfigurationError, DescriptorError};
use crate::model::{FieldDef, Model};

pub const TABLE: &str = "order_lines";

pub fn descriptor(connection: &Connection, types: &DataTypes) -> Result<Model, DescriptorError> {
    Model::define(TABLE, connection)
        .field(FieldDef::new("id", types.uuid()).primary_key())
        .field(FieldDef::new("order_id", types.uuid()))
        .field(FieldDef::new("product_id", types.uuid()))
        .field(FieldDef::typed("quantity", types, "i32"))
        .field(FieldDef::new("unit_price", types.decimal(10, 2)))
        .associations(OrderLineAssociations)
        .build()
}

pub struct OrderLineAssociations;

impl Associable for OrderLineAssociations {
    fn associate(&self, scope: &mut AssociationScope<'_>) -> Result<(), ConfigurationError> {
        scope.belongs_to(ORDER, "order_id")?;
        scope.belongs_to(PRODUCT, "product_id")
    }
}
