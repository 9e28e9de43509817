use store_object::Connection;
use type_mapping::DataTypes;

use super::{ORDER_LINE, USER};
use crate::associations::{Associable, AssociationScope};
use crate::errors::{ConfigurationError, DescriptorError};
use crate::model::{FieldDef, Model};

pub const TABLE: &str = "orders";

pub const STATUSES: &[&str] = &["pending", "paid", "shipped", "delivered", "cancelled"];

pub fn descriptor(connection: &Connection, types: &DataTypes) -> Result<Model, DescriptorError> {
    Model::define(TABLE, connection)
        .field(FieldDef::new("id", types.uuid()).primary_key())
        .field(FieldDef::new("user_id", types.uuid()))
        .field(FieldDef::new("status", types.enumeration(STATUSES)))
        .field(FieldDef::new("total", types.decimal(12, 2)))
        .field(FieldDef::new("shipping_address", types.json()).nullable())
        .field(FieldDef::new("placed_at", types.timestamp()))
        .field(FieldDef::new("updated_at", types.timestamp()))
        .associations(OrderAssociations)
        .build()
}

pub struct OrderAssociations;

impl Associable for OrderAssociations {
    fn associate(&self, scope: &mut AssociationScope<'_>) -> Result<(), ConfigurationError> {
        scope.belongs_to(USER, "user_id")?;
        scope.has_many(ORDER_LINE, "order_id")
    }
}
