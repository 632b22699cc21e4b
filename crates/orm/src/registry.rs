//! Immutable registry of bound models
//!
//! Models are bound and added to a [`ModelRegistryBuilder`], every associate
//! hook runs once all models are present, and [`ModelRegistryBuilder::build`]
//! places every foreign key on the table that holds it and freezes the
//! result. Each model is reachable by its global id and by its lower-cased
//! identity.

use std::collections::BTreeMap;
use std::sync::Arc;

use crate::error::{ModelError, ModelResult};
use crate::model::Model;
use crate::relationships::context::key_of;
use crate::relationships::{
    Association, AssociationContext, ForeignKey, PivotTable, RelationshipType,
};

/// Frozen set of bound models
#[derive(Debug, Default, Clone)]
pub struct ModelRegistry {
    by_global_id: BTreeMap<String, Arc<Model>>,
    by_identity: BTreeMap<String, Arc<Model>>,
}

impl ModelRegistry {
    pub fn builder() -> ModelRegistryBuilder {
        ModelRegistryBuilder::new()
    }

    /// Look up a model by global id
    pub fn get(&self, global_id: &str) -> Option<&Arc<Model>> {
        self.by_global_id.get(global_id)
    }

    /// Look up a model by identity; input is lower-cased first
    pub fn get_by_identity(&self, identity: &str) -> Option<&Arc<Model>> {
        self.by_identity.get(&identity.to_lowercase())
    }

    /// Models bound to the named connection
    pub fn for_connection(&self, connection: &str) -> Vec<Arc<Model>> {
        self.by_global_id
            .values()
            .filter(|m| m.connection() == connection)
            .cloned()
            .collect()
    }

    pub fn global_ids(&self) -> impl Iterator<Item = &str> {
        self.by_global_id.keys().map(String::as_str)
    }

    pub fn identities(&self) -> impl Iterator<Item = &str> {
        self.by_identity.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.by_global_id.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_global_id.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Arc<Model>)> {
        self.by_global_id.iter().map(|(k, v)| (k.as_str(), v))
    }
}

/// Collects bound models and their associations
#[derive(Debug, Default)]
pub struct ModelRegistryBuilder {
    models: BTreeMap<String, Model>,
    pending: BTreeMap<String, Vec<Association>>,
}

impl ModelRegistryBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a bound model under its global id
    pub fn insert(&mut self, global_id: impl Into<String>, model: Model) -> ModelResult<()> {
        let global_id = global_id.into();
        if self.models.contains_key(&global_id) {
            return Err(ModelError::Configuration(format!(
                "Model '{}' is already registered",
                global_id
            )));
        }
        self.models.insert(global_id, model);
        Ok(())
    }

    pub fn contains(&self, global_id: &str) -> bool {
        self.models.contains_key(global_id)
    }

    pub fn len(&self) -> usize {
        self.models.len()
    }

    pub fn is_empty(&self) -> bool {
        self.models.is_empty()
    }

    /// Run the associate hook of one model against every bound model.
    ///
    /// Models without a hook are left alone.
    pub fn associate(&mut self, global_id: &str) -> ModelResult<()> {
        let model = self.models.get(global_id).ok_or_else(|| {
            ModelError::Relationship(format!("Model '{}' is not registered", global_id))
        })?;

        let hook = match model.associate_hook() {
            Some(hook) => Arc::clone(hook),
            None => return Ok(()),
        };

        let ctx = AssociationContext::new(model, &self.models);
        let associations = hook(&ctx)?;

        for association in &associations {
            if association.other_key.as_deref() == Some(association.foreign_key.as_str()) {
                return Err(ModelError::Relationship(format!(
                    "Model '{}' association '{}' uses '{}' for both pivot keys; rename one with with_foreign_key or with_other_key",
                    global_id, association.name, association.foreign_key
                )));
            }
        }

        tracing::debug!(
            "Model '{}' declared {} association(s)",
            global_id,
            associations.len()
        );
        self.pending
            .entry(global_id.to_string())
            .or_default()
            .extend(associations);
        Ok(())
    }

    /// Run every associate hook, in global id order
    pub fn associate_all(&mut self) -> ModelResult<()> {
        let ids: Vec<String> = self.models.keys().cloned().collect();
        for id in ids {
            self.associate(&id)?;
        }
        Ok(())
    }

    /// Freeze the registry
    pub fn build(mut self) -> ModelRegistry {
        for (global_id, associations) in std::mem::take(&mut self.pending) {
            if let Some(model) = self.models.get_mut(&global_id) {
                model.set_associations(associations);
            }
        }
        self.link_keys();

        let mut registry = ModelRegistry::default();
        for (global_id, model) in self.models {
            let model = Arc::new(model);
            let identity = global_id.to_lowercase();
            if let Some(previous) = registry.by_identity.insert(identity.clone(), Arc::clone(&model)) {
                tracing::warn!(
                    "Models '{}' and '{}' share identity '{}'; keeping '{}'",
                    previous.name(),
                    global_id,
                    identity,
                    global_id
                );
            }
            registry.by_global_id.insert(global_id, model);
        }

        registry
    }

    /// Put each association's foreign key on the table that holds it.
    ///
    /// Belongs-to keys go on the source, has-one/has-many keys on the target
    /// and many-to-many keys on a pivot owned by the source. A model's own
    /// keys come before keys other models put on it.
    fn link_keys(&mut self) {
        let mut owned: Vec<(String, ForeignKey)> = Vec::new();
        let mut inbound: Vec<(String, ForeignKey)> = Vec::new();
        let mut pivots: Vec<(String, PivotTable)> = Vec::new();

        for (global_id, model) in &self.models {
            for association in model.associations() {
                match association.relationship_type {
                    RelationshipType::ManyToMany => {
                        let (Some(through), Some(other_key)) =
                            (&association.through, &association.other_key)
                        else {
                            continue;
                        };
                        let Some(target) = self.models.get(&association.target) else {
                            continue;
                        };
                        let (target_pk, target_type) = key_of(target);
                        let source_key = ForeignKey {
                            column: association.foreign_key.clone(),
                            column_type: association.key_type.clone(),
                            references_table: model.table_name().to_string(),
                            references_column: association.target_key.clone(),
                        };
                        let target_key = ForeignKey {
                            column: other_key.clone(),
                            column_type: target_type,
                            references_table: association.target_table.clone(),
                            references_column: target_pk,
                        };
                        pivots.push((
                            global_id.clone(),
                            PivotTable {
                                table_name: through.clone(),
                                keys: [source_key, target_key],
                            },
                        ));
                    }
                    kind if kind.owns_foreign_key() => owned.push((
                        global_id.clone(),
                        ForeignKey {
                            column: association.foreign_key.clone(),
                            column_type: association.key_type.clone(),
                            references_table: association.target_table.clone(),
                            references_column: association.target_key.clone(),
                        },
                    )),
                    _ => inbound.push((
                        association.target.clone(),
                        ForeignKey {
                            column: association.foreign_key.clone(),
                            column_type: association.key_type.clone(),
                            references_table: model.table_name().to_string(),
                            references_column: association.target_key.clone(),
                        },
                    )),
                }
            }
        }

        for (owner, key) in owned.into_iter().chain(inbound) {
            if let Some(model) = self.models.get_mut(&owner) {
                model.add_foreign_key(key);
            }
        }
        for (owner, pivot) in pivots {
            if let Some(model) = self.models.get_mut(&owner) {
                model.add_pivot(pivot);
            }
        }
    }
}
