use std::fmt;
use std::sync::Arc;

use serde_json::{json, Map, Value as JsonValue};

use crate::error::{ModelError, ModelResult};
use crate::model::definition::{
    AssociateHook, ClassMethod, DefineOptions, InstanceMethod, MethodTable, ModelDefinition,
};
use crate::model::ModelInstance;
use crate::relationships::{Association, ForeignKey, PivotTable};
use crate::schema::{FieldDefinition, FieldType, ModelSchema};
use crate::security::validate_identifier;

/// A model definition bound to a named connection.
///
/// Immutable once the registry that owns it is built.
pub struct Model {
    name: String,
    table_name: String,
    connection: String,
    schema: ModelSchema,
    options: DefineOptions,
    class_methods: MethodTable<ClassMethod>,
    instance_methods: MethodTable<InstanceMethod>,
    associate: Option<AssociateHook>,
    associations: Vec<Association>,
    foreign_keys: Vec<ForeignKey>,
    pivots: Vec<PivotTable>,
}

impl Model {
    /// Bind a definition to a connection.
    ///
    /// A schema without a primary key gets an auto-incrementing `id` column.
    pub fn bind(definition: ModelDefinition, connection: &str) -> ModelResult<Self> {
        validate_identifier(&definition.table_name).map_err(|e| {
            ModelError::Schema(format!(
                "Model '{}' table name: {}",
                definition.name, e
            ))
        })?;

        let mut schema = definition.schema;
        schema.validate(&definition.name)?;

        if schema.primary_key().is_none() {
            let id = FieldDefinition::new("id", FieldType::Integer)
                .primary_key()
                .auto_increment();
            if schema.has_field("id") {
                return Err(ModelError::Schema(format!(
                    "Model '{}' has an 'id' field that is not its primary key",
                    definition.name
                )));
            }
            schema = schema
                .fields()
                .iter()
                .cloned()
                .fold(ModelSchema::new().field(id), ModelSchema::field);
        }

        tracing::debug!(
            "Bound model '{}' to connection '{}' (table '{}')",
            definition.name,
            connection,
            definition.table_name
        );

        Ok(Self {
            name: definition.name,
            table_name: definition.table_name,
            connection: connection.to_string(),
            schema,
            options: definition.options,
            class_methods: definition.class_methods,
            instance_methods: definition.instance_methods,
            associate: definition.associate,
            associations: Vec::new(),
            foreign_keys: Vec::new(),
            pivots: Vec::new(),
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn table_name(&self) -> &str {
        &self.table_name
    }

    /// Name of the connection this model is bound to
    pub fn connection(&self) -> &str {
        &self.connection
    }

    pub fn schema(&self) -> &ModelSchema {
        &self.schema
    }

    pub fn options(&self) -> &DefineOptions {
        &self.options
    }

    /// The primary key field; always present after binding
    pub fn primary_key(&self) -> Option<&FieldDefinition> {
        self.schema.primary_key()
    }

    pub fn associations(&self) -> &[Association] {
        &self.associations
    }

    pub fn association(&self, name: &str) -> Option<&Association> {
        self.associations.iter().find(|a| a.name == name)
    }

    pub fn associate_hook(&self) -> Option<&AssociateHook> {
        self.associate.as_ref()
    }

    pub(crate) fn set_associations(&mut self, associations: Vec<Association>) {
        self.associations = associations;
    }

    /// Foreign keys on this model's table, from its own belongs-to
    /// associations and from has-one/has-many associations pointing at it
    pub fn foreign_keys(&self) -> &[ForeignKey] {
        &self.foreign_keys
    }

    /// Join tables of this model's many-to-many associations
    pub fn pivots(&self) -> &[PivotTable] {
        &self.pivots
    }

    /// A second association over the same column keeps the first key
    pub(crate) fn add_foreign_key(&mut self, foreign_key: ForeignKey) {
        if !self.foreign_keys.iter().any(|k| k.column == foreign_key.column) {
            self.foreign_keys.push(foreign_key);
        }
    }

    pub(crate) fn add_pivot(&mut self, pivot: PivotTable) {
        if !self.pivots.iter().any(|p| p.table_name == pivot.table_name) {
            self.pivots.push(pivot);
        }
    }

    /// Every column of the table: schema fields, timestamps and
    /// foreign keys not already declared
    pub fn columns(&self) -> Vec<FieldDefinition> {
        let mut columns: Vec<FieldDefinition> = self.schema.fields().to_vec();

        if self.options.timestamps {
            for name in ["created_at", "updated_at"] {
                if !self.schema.has_field(name) {
                    columns.push(FieldDefinition::new(name, FieldType::DateTime));
                }
            }
        }

        for key in &self.foreign_keys {
            if columns.iter().any(|c| c.name == key.column) {
                continue;
            }
            columns.push(FieldDefinition::new(key.column.clone(), key.column_type.clone()));
        }

        columns
    }

    pub fn has_class_method(&self, name: &str) -> bool {
        self.class_methods.contains_key(name)
    }

    pub fn has_instance_method(&self, name: &str) -> bool {
        self.instance_methods.contains_key(name)
    }

    pub fn class_method_names(&self) -> Vec<&str> {
        self.class_methods.keys().map(String::as_str).collect()
    }

    /// Invoke a class-level method
    pub fn call(&self, method: &str, args: JsonValue) -> ModelResult<JsonValue> {
        let handler = self
            .class_methods
            .get(method)
            .ok_or_else(|| ModelError::MethodNotFound {
                model: self.name.clone(),
                method: method.to_string(),
            })?;
        handler(self, args)
    }

    pub(crate) fn instance_method(&self, method: &str) -> ModelResult<&InstanceMethod> {
        self.instance_methods
            .get(method)
            .ok_or_else(|| ModelError::MethodNotFound {
                model: self.name.clone(),
                method: method.to_string(),
            })
    }

    /// Build an instance from attributes. Keys that are not columns are dropped.
    pub fn build(self: &Arc<Self>, attributes: Map<String, JsonValue>) -> ModelInstance {
        let columns = self.columns();
        let attributes = attributes
            .into_iter()
            .filter(|(key, _)| columns.iter().any(|c| &c.name == key))
            .collect();
        ModelInstance::new(Arc::clone(self), attributes)
    }

    /// Description of the bound model as JSON
    pub fn describe(&self) -> JsonValue {
        json!({
            "name": self.name,
            "tableName": self.table_name,
            "connection": self.connection,
            "columns": self.columns().iter().map(|c| c.name.clone()).collect::<Vec<_>>(),
            "schema": self.schema.to_json(),
            "associations": self.associations.iter().map(|a| a.name.clone()).collect::<Vec<_>>(),
        })
    }
}

impl fmt::Debug for Model {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Model")
            .field("name", &self.name)
            .field("table_name", &self.table_name)
            .field("connection", &self.connection)
            .field("fields", &self.schema.fields().len())
            .field("class_methods", &self.class_methods.keys().collect::<Vec<_>>())
            .field("instance_methods", &self.instance_methods.keys().collect::<Vec<_>>())
            .field("associations", &self.associations)
            .finish()
    }
}
