//! The view of the registry handed to associate hooks

use std::collections::BTreeMap;

use crate::error::{ModelError, ModelResult};
use crate::model::Model;
use crate::relationships::{Association, RelationshipType};
use crate::schema::{FieldDefinition, FieldType};

/// Read access to every bound model, scoped to the model whose hook is running
pub struct AssociationContext<'a> {
    source: &'a Model,
    models: &'a BTreeMap<String, Model>,
}

impl<'a> AssociationContext<'a> {
    pub(crate) fn new(source: &'a Model, models: &'a BTreeMap<String, Model>) -> Self {
        Self { source, models }
    }

    /// The model declaring associations
    pub fn source(&self) -> &Model {
        self.source
    }

    /// Look up a bound model by global id
    pub fn model(&self, global_id: &str) -> Option<&Model> {
        self.models.get(global_id)
    }

    pub fn model_names(&self) -> impl Iterator<Item = &str> {
        self.models.keys().map(String::as_str)
    }

    /// The source holds a foreign key to `target`
    pub fn belongs_to(&self, target: &str) -> ModelResult<Association> {
        let target_model = self.target(target)?;
        let (target_key, key_type) = key_of(target_model);
        Ok(Association {
            relationship_type: RelationshipType::BelongsTo,
            name: target.to_lowercase(),
            source: self.source.name().to_string(),
            target: target.to_string(),
            target_table: target_model.table_name().to_string(),
            foreign_key: format!("{}_id", target.to_lowercase()),
            target_key,
            key_type,
            through: None,
            other_key: None,
        })
    }

    /// `target` holds a foreign key to the source, at most one row
    pub fn has_one(&self, target: &str) -> ModelResult<Association> {
        self.inverse(RelationshipType::HasOne, target)
    }

    /// `target` holds a foreign key to the source
    pub fn has_many(&self, target: &str) -> ModelResult<Association> {
        self.inverse(RelationshipType::HasMany, target)
    }

    /// Many-to-many through a pivot table, named `<a>_<b>` by default.
    ///
    /// The pivot holds `<source>_id` and `<target>_id`; a self-referencing
    /// association has to rename one of them.
    pub fn belongs_to_many(&self, target: &str, through: Option<&str>) -> ModelResult<Association> {
        let mut association = self.inverse(RelationshipType::ManyToMany, target)?;
        let through = match through {
            Some(table) => table.to_string(),
            None => {
                let mut tables = [
                    self.source.table_name().to_string(),
                    association.target_table.clone(),
                ];
                tables.sort();
                tables.join("_")
            }
        };
        association.through = Some(through);
        association.other_key = Some(format!("{}_id", target.to_lowercase()));
        Ok(association)
    }

    fn inverse(&self, relationship_type: RelationshipType, target: &str) -> ModelResult<Association> {
        let target_model = self.target(target)?;
        let (target_key, key_type) = key_of(self.source);
        Ok(Association {
            relationship_type,
            name: target.to_lowercase(),
            source: self.source.name().to_string(),
            target: target.to_string(),
            target_table: target_model.table_name().to_string(),
            foreign_key: format!("{}_id", self.source.name().to_lowercase()),
            target_key,
            key_type,
            through: None,
            other_key: None,
        })
    }

    fn target(&self, target: &str) -> ModelResult<&Model> {
        self.models.get(target).ok_or_else(|| {
            ModelError::Relationship(format!(
                "Model '{}' references unknown model '{}'",
                self.source.name(),
                target
            ))
        })
    }
}

/// Name and type of the column a foreign key to `model` refers to
pub(crate) fn key_of(model: &Model) -> (String, FieldType) {
    match model.primary_key() {
        Some(FieldDefinition {
            name, field_type, ..
        }) => (name.clone(), field_type.clone()),
        None => ("id".to_string(), FieldType::Integer),
    }
}
