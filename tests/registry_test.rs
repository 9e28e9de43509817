//! Registry population and association wiring

mod common;

use std::sync::Arc;

use shopdb::models;
use shopdb::prelude::*;
use shopdb::{wire_all, RegistryError};

fn connection() -> Connection {
    Connection::new(Arc::new(common::seeded_backend()))
}

#[test]
fn test_storefront_registers_all_entities_in_order() {
    let (registry, report) = ModelRegistry::storefront(connection(), &SignalManager::new()).unwrap();

    assert_eq!(
        registry.names(),
        vec!["Product", "Category", "Order", "OrderLine", "User"]
    );
    assert!(registry.is_wired());
    assert_eq!(report.wired.len(), 5);
    assert!(report.without_associations.is_empty());
    assert!(report.unpaired.is_empty());
    assert_eq!(report.edge_count(&registry), 8);
}

#[test]
fn test_every_declared_peer_resolves() {
    let (registry, _) = ModelRegistry::storefront(connection(), &SignalManager::new()).unwrap();

    for model in registry.iter() {
        for edge in model.associations() {
            let peer = registry
                .get(&edge.target)
                .unwrap_or_else(|| panic!("{} points at missing {}", model.name(), edge.target));
            assert_eq!(peer.table_name(), edge.target_table);
        }
    }

    let product = registry.get(models::PRODUCT).unwrap();
    let category = product.association_to(models::CATEGORY).unwrap();
    assert_eq!(category.kind, AssociationKind::BelongsTo);
    assert_eq!(category.foreign_key, "category_id");

    let order_line = registry.get(models::ORDER_LINE).unwrap();
    assert_eq!(order_line.associations().len(), 2);
    assert!(order_line
        .associations()
        .iter()
        .all(|a| a.kind == AssociationKind::BelongsTo));

    let user = registry.get(models::USER).unwrap();
    let orders = user.association_to(models::ORDER).unwrap();
    assert_eq!(orders.kind, AssociationKind::HasMany);
    assert_eq!(orders.target_table, "orders");
}

#[test]
fn test_wiring_is_independent_of_registration_order() {
    let signals = SignalManager::new();
    let (forward, _) = ModelRegistry::storefront(connection(), &signals).unwrap();

    let mut reversed = ModelRegistry::new(connection());
    for &(name, factory) in models::DESCRIPTORS.iter().rev() {
        reversed.register(name, factory).unwrap();
    }
    wire_all(&mut reversed, &signals).unwrap();

    for model in forward.iter() {
        let other = reversed.get(model.name()).unwrap();
        assert_eq!(model.associations(), other.associations());
    }
}

#[test]
fn test_duplicate_registration_is_rejected_and_first_kept() {
    let mut registry = ModelRegistry::new(connection());
    registry
        .register(models::USER, models::user::descriptor)
        .unwrap();

    let err = registry
        .register(models::USER, models::product::descriptor)
        .unwrap_err();
    assert!(matches!(
        err,
        RegistryError::Configuration(ConfigurationError::DuplicateModel(_))
    ));
    assert_eq!(registry.len(), 1);
    assert_eq!(registry.get(models::USER).unwrap().table_name(), "users");
}

#[test]
fn test_all_models_share_one_connection() {
    let connection = connection();
    let (registry, _) = ModelRegistry::storefront(connection.clone(), &SignalManager::new()).unwrap();
    assert!(registry.iter().all(|m| m.connection().same_as(&connection)));
}

#[test]
fn test_second_wiring_pass_fails_and_keeps_graph() {
    let (mut registry, _) = ModelRegistry::storefront(connection(), &SignalManager::new()).unwrap();
    let before: Vec<Association> = registry
        .iter()
        .flat_map(|m| m.associations().to_vec())
        .collect();

    let err = wire_all(&mut registry, &SignalManager::new()).unwrap_err();
    assert!(matches!(err, ConfigurationError::AlreadyWired));

    let after: Vec<Association> = registry
        .iter()
        .flat_map(|m| m.associations().to_vec())
        .collect();
    assert_eq!(before, after);
}

struct DeclaresTwice;

impl Associable for DeclaresTwice {
    fn associate(&self, scope: &mut AssociationScope<'_>) -> Result<(), ConfigurationError> {
        scope.belongs_to(models::USER, "user_id")?;
        scope.belongs_to(models::USER, "user_id")
    }
}

struct PointsNowhere;

impl Associable for PointsNowhere {
    fn associate(&self, scope: &mut AssociationScope<'_>) -> Result<(), ConfigurationError> {
        scope.has_many("Coupon", "coupon_id")
    }
}

struct OneSided;

impl Associable for OneSided {
    fn associate(&self, scope: &mut AssociationScope<'_>) -> Result<(), ConfigurationError> {
        scope.belongs_to(models::USER, "reviewer_id")
    }
}

fn review<A>(associable: A) -> impl FnOnce(&Connection, &DataTypes) -> Result<Model, DescriptorError>
where
    A: Associable + 'static,
{
    move |connection, types| {
        Model::define("reviews", connection)
            .field(FieldDef::new("id", types.uuid()).primary_key())
            .field(FieldDef::new("user_id", types.uuid()))
            .field(FieldDef::new("reviewer_id", types.uuid()))
            .associations(associable)
            .build()
    }
}

/// Entity with a primary key only and no association capability
fn bare(table: &'static str) -> impl FnOnce(&Connection, &DataTypes) -> Result<Model, DescriptorError> {
    move |connection, types| {
        Model::define(table, connection)
            .field(FieldDef::new("id", types.uuid()).primary_key())
            .build()
    }
}

#[test]
fn test_duplicate_association_fails_without_committing() {
    let mut registry = ModelRegistry::new(connection());
    registry.register(models::USER, bare("users")).unwrap();
    registry.register("Review", review(DeclaresTwice)).unwrap();

    let err = wire_all(&mut registry, &SignalManager::new()).unwrap_err();
    assert!(matches!(
        err,
        ConfigurationError::DuplicateAssociation { ref model, kind: AssociationKind::BelongsTo, .. }
            if model == "Review"
    ));
    assert!(!registry.is_wired());
    assert!(registry.iter().all(|m| !m.is_wired()));
}

#[test]
fn test_unknown_peer_is_a_configuration_error() {
    let mut registry = ModelRegistry::new(connection());
    registry.register("Review", review(PointsNowhere)).unwrap();

    let err = wire_all(&mut registry, &SignalManager::new()).unwrap_err();
    assert!(matches!(
        err,
        ConfigurationError::UnknownPeer { ref target, .. } if target == "Coupon"
    ));
    assert!(!registry.is_wired());
}

#[test]
fn test_missing_capability_and_inverse_are_reported() {
    let (signals, events) = common::recording_signals();
    let mut registry = ModelRegistry::new(connection());
    registry.register("Review", review(OneSided)).unwrap();
    registry.register(models::USER, bare("users")).unwrap();
    registry.register("Tag", bare("tags")).unwrap();

    let report = wire_all(&mut registry, &signals).unwrap();
    assert_eq!(report.wired, vec!["Review"]);
    assert_eq!(report.without_associations, vec!["User", "Tag"]);
    assert_eq!(report.unpaired.len(), 1);
    assert_eq!(report.unpaired[0].foreign_key, "reviewer_id");

    let types = common::event_types(&events);
    assert_eq!(
        types.iter().filter(|t| **t == EventType::AssociationsMissing).count(),
        2
    );
    assert!(types.contains(&EventType::MissingInverse));
    assert_eq!(types.first(), Some(&EventType::AssociationsStarted));
    assert_eq!(types.last(), Some(&EventType::AssociationsCompleted));
}

#[test]
fn test_models_view() {
    let (registry, _) = ModelRegistry::storefront(connection(), &SignalManager::new()).unwrap();
    let models = Models::from_registry(&registry).unwrap();

    assert_eq!(models.users.table_name(), "users");
    assert_eq!(models.products.table_name(), "products");
    assert_eq!(models.categories.table_name(), "categories");
    assert_eq!(models.orders.table_name(), "orders");
    assert_eq!(models.order_lines.table_name(), "order_lines");
}
