use store_object::Connection;
use type_mapping::DataTypes;

use super::ORDER;
use crate::associations::{Associable, AssociationScope};
use crate::errors::{ConfigurationError, DescriptorError};
use crate::model::{FieldDef, Model};

pub const TABLE: &str = "users";

pub const ROLES: &[&str] = &["customer", "admin"];

pub fn descriptor(connection: &Connection, types: &DataTypes) -> Result<Model, DescriptorError> {
    Model::define(TABLE, connection)
        .field(FieldDef::new("id", types.uuid()).primary_key())
        .field(FieldDef::new("email", types.string(255)).unique())
        .field(FieldDef::new("password_hash", types.string(255)))
        .field(FieldDef::new("first_name", types.string(100)).nullable())
        .field(FieldDef::new("last_name", types.string(100)).nullable())
        .field(FieldDef::new("role", types.enumeration(ROLES)))
        .field(FieldDef::new("created_at", types.timestamp()))
        .field(FieldDef::new("updated_at", types.timestamp()))
        .associations(UserAssociations)
        .build()
}

pub struct UserAssociations;

impl Associable for UserAssociations {
    fn associate(&self, scope: &mut AssociationScope<'_>) -> Result<(), ConfigurationError> {
        scope.has_many(ORDER, "user_id")
    }
}
