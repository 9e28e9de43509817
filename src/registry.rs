//! Model registry
//!
//! Holds every entity's schema handle under a unique name, in registration
//! order, next to the one shared [`Connection`]. A registry is a plain value:
//! build it, wire it once, then share it read-only.

use std::collections::HashMap;
use std::sync::Arc;

use signal_system::SignalManager;
use store_object::Connection;
use type_mapping::DataTypes;

use crate::associations::{wire_all, Association, WiringReport};
use crate::errors::{ConfigurationError, DescriptorError, RegistryError};
use crate::model::Model;
use crate::models;

/// Entity descriptor factory
pub type DescriptorFactory = fn(&Connection, &DataTypes) -> Result<Model, DescriptorError>;

pub struct ModelRegistry {
    connection: Connection,
    types: DataTypes,
    models: Vec<Arc<Model>>,
    index: HashMap<String, usize>,
    wired: bool,
}

impl ModelRegistry {
    pub fn new(connection: Connection) -> Self {
        Self {
            connection,
            types: DataTypes::new(),
            models: Vec::new(),
            index: HashMap::new(),
            wired: false,
        }
    }

    /// Registry holding the five storefront entities, already wired
    pub fn storefront(
        connection: Connection,
        signals: &SignalManager,
    ) -> Result<(Self, WiringReport), RegistryError> {
        let mut registry = Self::new(connection);
        for &(name, factory) in models::DESCRIPTORS {
            registry.register(name, factory)?;
        }
        let report = wire_all(&mut registry, signals)?;
        Ok((registry, report))
    }

    /// Instantiate an entity through its descriptor factory and store it
    /// under `name`.
    ///
    /// The factory receives the shared connection and the type-mapping
    /// capability. A duplicate name leaves the registry unchanged.
    pub fn register<F>(&mut self, name: &str, factory: F) -> Result<&Model, RegistryError>
    where
        F: FnOnce(&Connection, &DataTypes) -> Result<Model, DescriptorError>,
    {
        if self.wired {
            return Err(ConfigurationError::RegistryFrozen(name.to_string()).into());
        }
        if self.index.contains_key(name) {
            return Err(ConfigurationError::DuplicateModel(name.to_string()).into());
        }

        let mut model = factory(&self.connection, &self.types)?;
        model.set_name(name);

        debug_log!(
            "Registered model {} (table {}, {} fields)",
            name,
            model.table_name(),
            model.fields().len()
        );

        let position = self.models.len();
        self.index.insert(name.to_string(), position);
        self.models.push(Arc::new(model));
        Ok(self.models[position].as_ref())
    }

    pub fn get(&self, name: &str) -> Option<&Model> {
        self.index.get(name).map(|&i| self.models[i].as_ref())
    }

    /// Like [`get`](Self::get) but with a typed error
    pub fn require(&self, name: &str) -> Result<&Model, ConfigurationError> {
        self.get(name)
            .ok_or_else(|| ConfigurationError::UnknownModel(name.to_string()))
    }

    /// Shared handle to a registered model
    pub fn shared(&self, name: &str) -> Result<Arc<Model>, ConfigurationError> {
        self.index
            .get(name)
            .map(|&i| self.models[i].clone())
            .ok_or_else(|| ConfigurationError::UnknownModel(name.to_string()))
    }

    pub fn contains(&self, name: &str) -> bool {
        self.index.contains_key(name)
    }

    /// Models in registration order
    pub fn iter(&self) -> impl Iterator<Item = &Model> {
        self.models.iter().map(|m| m.as_ref())
    }

    pub fn names(&self) -> Vec<&str> {
        self.iter().map(Model::name).collect()
    }

    pub fn len(&self) -> usize {
        self.models.len()
    }

    pub fn is_empty(&self) -> bool {
        self.models.is_empty()
    }

    pub fn connection(&self) -> &Connection {
        &self.connection
    }

    pub fn is_wired(&self) -> bool {
        self.wired
    }

    /// Edges with no opposite edge declared on the peer
    pub fn unpaired_associations(&self) -> Vec<Association> {
        let mut unpaired = Vec::new();
        for model in self.iter() {
            for edge in model.associations() {
                let paired = self
                    .get(&edge.target)
                    .map(|peer| peer.associations().iter().any(|e| e.is_inverse_of(edge)))
                    .unwrap_or(false);
                if !paired {
                    unpaired.push(edge.clone());
                }
            }
        }
        unpaired
    }

    pub(crate) fn attach_associations(
        &self,
        name: &str,
        edges: Vec<Association>,
    ) -> Result<(), ConfigurationError> {
        let model = self.require(name)?;
        trace_log!("Attaching {} associations to {}", edges.len(), name);
        if model.attach_associations(edges) {
            Ok(())
        } else {
            Err(ConfigurationError::AlreadyWired)
        }
    }

    pub(crate) fn mark_wired(&mut self) {
        self.wired = true;
    }
}

impl std::fmt::Debug for ModelRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ModelRegistry")
            .field("connection", &self.connection)
            .field("models", &self.names())
            .field("wired", &self.wired)
            .finish()
    }
}

/// Typed view over the storefront entities of a wired registry
#[derive(Debug, Clone)]
pub struct Models {
    pub products: Arc<Model>,
    pub categories: Arc<Model>,
    pub orders: Arc<Model>,
    pub order_lines: Arc<Model>,
    pub users: Arc<Model>,
}

impl Models {
    pub fn from_registry(registry: &ModelRegistry) -> Result<Self, ConfigurationError> {
        if !registry.is_wired() {
            return Err(ConfigurationError::NotWired);
        }

        Ok(Self {
            products: registry.shared(models::PRODUCT)?,
            categories: registry.shared(models::CATEGORY)?,
            orders: registry.shared(models::ORDER)?,
            order_lines: registry.shared(models::ORDER_LINE)?,
            users: registry.shared(models::USER)?,
        })
    }
}
