//! Association wiring
//!
//! Entities declare their relationships through the [`Associable`]
//! capability. [`wire_all`] runs every declaration against the fully
//! populated registry, so declaration order across entities does not matter.

use serde::Serialize;
use signal_system::{DatabaseEvent, EventType, SignalManager};

use crate::errors::ConfigurationError;
use crate::model::Model;
use crate::registry::ModelRegistry;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum AssociationKind {
    BelongsTo,
    HasMany,
    HasOne,
}

impl AssociationKind {
    fn is_owning_side(self) -> bool {
        matches!(self, AssociationKind::HasMany | AssociationKind::HasOne)
    }
}

/// A directed relationship edge from `source` to `target`
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Association {
    pub kind: AssociationKind,
    pub source: String,
    pub target: String,
    pub target_table: String,
    /// Column holding the key; lives on the `BelongsTo` side's table
    pub foreign_key: String,
}

impl Association {
    /// Whether `other` is the opposite edge of `self`
    pub fn is_inverse_of(&self, other: &Association) -> bool {
        self.source == other.target
            && self.target == other.source
            && self.foreign_key == other.foreign_key
            && (self.kind == AssociationKind::BelongsTo) == other.kind.is_owning_side()
            && (other.kind == AssociationKind::BelongsTo) == self.kind.is_owning_side()
    }
}

/// Capability of an entity to declare relationships
pub trait Associable: Send + Sync {
    fn associate(&self, scope: &mut AssociationScope<'_>) -> Result<(), ConfigurationError>;
}

/// What an entity sees while declaring its associations: read access to the
/// whole registry plus a list of the edges declared so far.
pub struct AssociationScope<'a> {
    registry: &'a ModelRegistry,
    source: &'a str,
    declared: Vec<Association>,
}

impl<'a> AssociationScope<'a> {
    pub fn new(registry: &'a ModelRegistry, source: &'a str) -> Self {
        Self {
            registry,
            source,
            declared: Vec::new(),
        }
    }

    /// Name of the entity declaring
    pub fn source(&self) -> &str {
        self.source
    }

    /// Look up a peer entity by name
    pub fn peer(&self, name: &str) -> Result<&'a Model, ConfigurationError> {
        self.registry
            .get(name)
            .ok_or_else(|| ConfigurationError::UnknownPeer {
                model: self.source.to_string(),
                target: name.to_string(),
            })
    }

    pub fn belongs_to(&mut self, target: &str, foreign_key: &str) -> Result<(), ConfigurationError> {
        self.declare(AssociationKind::BelongsTo, target, foreign_key)
    }

    pub fn has_many(&mut self, target: &str, foreign_key: &str) -> Result<(), ConfigurationError> {
        self.declare(AssociationKind::HasMany, target, foreign_key)
    }

    pub fn has_one(&mut self, target: &str, foreign_key: &str) -> Result<(), ConfigurationError> {
        self.declare(AssociationKind::HasOne, target, foreign_key)
    }

    pub fn declared(&self) -> &[Association] {
        &self.declared
    }

    fn declare(
        &mut self,
        kind: AssociationKind,
        target: &str,
        foreign_key: &str,
    ) -> Result<(), ConfigurationError> {
        let peer = self.peer(target)?;

        let duplicate = self
            .declared
            .iter()
            .any(|a| a.kind == kind && a.target == target && a.foreign_key == foreign_key);
        if duplicate {
            return Err(ConfigurationError::DuplicateAssociation {
                model: self.source.to_string(),
                kind,
                target: target.to_string(),
                foreign_key: foreign_key.to_string(),
            });
        }

        self.declared.push(Association {
            kind,
            source: self.source.to_string(),
            target: target.to_string(),
            target_table: peer.table_name().to_string(),
            foreign_key: foreign_key.to_string(),
        });
        Ok(())
    }

    fn into_declared(self) -> Vec<Association> {
        self.declared
    }
}

/// Outcome of a wiring pass
#[derive(Debug, Clone, Default, Serialize)]
pub struct WiringReport {
    /// Entities whose association capability ran
    pub wired: Vec<String>,
    /// Entities without an association capability
    pub without_associations: Vec<String>,
    /// Edges whose opposite side was never declared
    pub unpaired: Vec<Association>,
}

impl WiringReport {
    pub fn edge_count(&self, registry: &ModelRegistry) -> usize {
        registry.iter().map(|m| m.associations().len()).sum()
    }
}

/// Run every entity's association capability against the registry.
///
/// Runs once per registry: a second call fails with
/// [`ConfigurationError::AlreadyWired`]. Edges are committed only when every
/// entity's declarations succeeded.
pub fn wire_all(
    registry: &mut ModelRegistry,
    signals: &SignalManager,
) -> Result<WiringReport, ConfigurationError> {
    if registry.is_wired() {
        return Err(ConfigurationError::AlreadyWired);
    }

    signals.emit(
        DatabaseEvent::new(EventType::AssociationsStarted)
            .with_detail("Establishing associations between models")
            .with_payload("models", registry.len()),
    );

    let mut report = WiringReport::default();
    let mut pending: Vec<(String, Vec<Association>)> = Vec::with_capacity(registry.len());

    for model in registry.iter() {
        match model.associable() {
            Some(associable) => {
                let mut scope = AssociationScope::new(registry, model.name());
                associable.associate(&mut scope)?;
                let edges = scope.into_declared();

                signals.emit(
                    DatabaseEvent::new(EventType::AssociationsDeclared)
                        .with_entity(model.name())
                        .with_payload("edges", edges.len()),
                );
                report.wired.push(model.name().to_string());
                pending.push((model.name().to_string(), edges));
            }
            None => {
                signals.emit(
                    DatabaseEvent::new(EventType::AssociationsMissing)
                        .with_entity(model.name())
                        .with_detail("Model defines no associations"),
                );
                report.without_associations.push(model.name().to_string());
                pending.push((model.name().to_string(), Vec::new()));
            }
        }
    }

    for (name, edges) in pending {
        registry.attach_associations(&name, edges)?;
    }
    registry.mark_wired();

    report.unpaired = registry.unpaired_associations();
    for edge in &report.unpaired {
        signals.emit(
            DatabaseEvent::new(EventType::MissingInverse)
                .with_entity(edge.source.as_str())
                .with_detail(format!(
                    "{:?} {} on {} has no inverse declared by {}",
                    edge.kind, edge.target, edge.foreign_key, edge.target
                )),
        );
    }

    signals.emit(
        DatabaseEvent::new(EventType::AssociationsCompleted)
            .with_payload("wired", report.wired.len())
            .with_payload("edges", report.edge_count(registry))
            .with_payload("unpaired", report.unpaired.len()),
    );

    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn edge(kind: AssociationKind, source: &str, target: &str, fk: &str) -> Association {
        Association {
            kind,
            source: source.to_string(),
            target: target.to_string(),
            target_table: target.to_lowercase(),
            foreign_key: fk.to_string(),
        }
    }

    #[test]
    fn test_inverse_pairs() {
        let belongs = edge(AssociationKind::BelongsTo, "Product", "Category", "category_id");
        let has_many = edge(AssociationKind::HasMany, "Category", "Product", "category_id");
        let has_one = edge(AssociationKind::HasOne, "Category", "Product", "category_id");

        assert!(belongs.is_inverse_of(&has_many));
        assert!(has_many.is_inverse_of(&belongs));
        assert!(belongs.is_inverse_of(&has_one));
        assert!(!has_many.is_inverse_of(&has_one));
        assert!(!belongs.is_inverse_of(&belongs));
    }

    #[test]
    fn test_inverse_requires_same_key() {
        let belongs = edge(AssociationKind::BelongsTo, "Order", "User", "user_id");
        let has_many = edge(AssociationKind::HasMany, "User", "Order", "buyer_id");
        assert!(!belongs.is_inverse_of(&has_many));
    }
}
