//! Model definitions and their behavior tables

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use serde_json::Value as JsonValue;

use crate::error::ModelResult;
use crate::model::{Model, ModelInstance};
use crate::relationships::{Association, AssociationContext};
use crate::schema::ModelSchema;

/// Model-level method, called as `Model::call(name, args)`
pub type ClassMethod = Arc<dyn Fn(&Model, JsonValue) -> ModelResult<JsonValue> + Send + Sync>;

/// Instance-level method, called as `ModelInstance::call(name, args)`
pub type InstanceMethod =
    Arc<dyn Fn(&ModelInstance, JsonValue) -> ModelResult<JsonValue> + Send + Sync>;

/// Hook run once every model is bound, returning the model's associations
pub type AssociateHook =
    Arc<dyn Fn(&AssociationContext<'_>) -> ModelResult<Vec<Association>> + Send + Sync>;

/// Named methods
pub type MethodTable<F> = BTreeMap<String, F>;

/// Options applied when a definition is bound
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DefineOptions {
    /// Add `created_at` / `updated_at` columns
    pub timestamps: bool,
}

impl Default for DefineOptions {
    fn default() -> Self {
        Self { timestamps: true }
    }
}

/// Everything needed to bind one model: schema and behavior, fixed before binding
#[derive(Clone)]
pub struct ModelDefinition {
    pub(crate) name: String,
    pub(crate) table_name: String,
    pub(crate) schema: ModelSchema,
    pub(crate) options: DefineOptions,
    pub(crate) class_methods: MethodTable<ClassMethod>,
    pub(crate) instance_methods: MethodTable<InstanceMethod>,
    pub(crate) associate: Option<AssociateHook>,
}

impl ModelDefinition {
    pub fn builder(name: impl Into<String>, schema: ModelSchema) -> ModelDefinitionBuilder {
        ModelDefinitionBuilder::new(name, schema)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn table_name(&self) -> &str {
        &self.table_name
    }

    pub fn schema(&self) -> &ModelSchema {
        &self.schema
    }

    pub fn options(&self) -> &DefineOptions {
        &self.options
    }

    pub fn has_class_method(&self, name: &str) -> bool {
        self.class_methods.contains_key(name)
    }

    pub fn has_instance_method(&self, name: &str) -> bool {
        self.instance_methods.contains_key(name)
    }
}

impl fmt::Debug for ModelDefinition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ModelDefinition")
            .field("name", &self.name)
            .field("table_name", &self.table_name)
            .field("fields", &self.schema.fields().len())
            .field("class_methods", &self.class_methods.keys().collect::<Vec<_>>())
            .field("instance_methods", &self.instance_methods.keys().collect::<Vec<_>>())
            .field("associate", &self.associate.is_some())
            .finish()
    }
}

/// Builder composing a [`ModelDefinition`]
pub struct ModelDefinitionBuilder {
    name: String,
    table_name: Option<String>,
    schema: ModelSchema,
    options: DefineOptions,
    class_methods: MethodTable<ClassMethod>,
    instance_methods: MethodTable<InstanceMethod>,
    associate: Option<AssociateHook>,
}

impl ModelDefinitionBuilder {
    pub fn new(name: impl Into<String>, schema: ModelSchema) -> Self {
        Self {
            name: name.into(),
            table_name: None,
            schema,
            options: DefineOptions::default(),
            class_methods: MethodTable::new(),
            instance_methods: MethodTable::new(),
            associate: None,
        }
    }

    /// Override the table name (defaults to the lower-cased model name)
    pub fn table_name(mut self, table_name: impl Into<String>) -> Self {
        self.table_name = Some(table_name.into());
        self
    }

    pub fn options(mut self, options: DefineOptions) -> Self {
        self.options = options;
        self
    }

    pub fn timestamps(mut self, enabled: bool) -> Self {
        self.options.timestamps = enabled;
        self
    }

    pub fn class_method<F>(mut self, name: impl Into<String>, method: F) -> Self
    where
        F: Fn(&Model, JsonValue) -> ModelResult<JsonValue> + Send + Sync + 'static,
    {
        self.class_methods.insert(name.into(), Arc::new(method));
        self
    }

    pub fn class_methods(mut self, methods: MethodTable<ClassMethod>) -> Self {
        self.class_methods.extend(methods);
        self
    }

    pub fn instance_method<F>(mut self, name: impl Into<String>, method: F) -> Self
    where
        F: Fn(&ModelInstance, JsonValue) -> ModelResult<JsonValue> + Send + Sync + 'static,
    {
        self.instance_methods.insert(name.into(), Arc::new(method));
        self
    }

    pub fn instance_methods(mut self, methods: MethodTable<InstanceMethod>) -> Self {
        self.instance_methods.extend(methods);
        self
    }

    pub fn associate<F>(mut self, hook: F) -> Self
    where
        F: Fn(&AssociationContext<'_>) -> ModelResult<Vec<Association>> + Send + Sync + 'static,
    {
        self.associate = Some(Arc::new(hook));
        self
    }

    pub fn associate_hook(mut self, hook: Option<AssociateHook>) -> Self {
        self.associate = hook;
        self
    }

    /// Install built-in methods, then let custom methods overwrite same-named ones
    pub fn build(self) -> ModelDefinition {
        let mut class_methods = builtin_class_methods();
        class_methods.extend(self.class_methods);

        let mut instance_methods = builtin_instance_methods();
        instance_methods.extend(self.instance_methods);

        let table_name = self
            .table_name
            .unwrap_or_else(|| self.name.to_lowercase());

        ModelDefinition {
            name: self.name,
            table_name,
            schema: self.schema,
            options: self.options,
            class_methods,
            instance_methods,
            associate: self.associate,
        }
    }
}

fn builtin_class_methods() -> MethodTable<ClassMethod> {
    let mut methods: MethodTable<ClassMethod> = MethodTable::new();
    methods.insert(
        "describe".to_string(),
        Arc::new(|model: &Model, _args: JsonValue| -> ModelResult<JsonValue> {
            Ok(model.describe())
        }),
    );
    methods.insert(
        "tableName".to_string(),
        Arc::new(|model: &Model, _args: JsonValue| -> ModelResult<JsonValue> {
            Ok(JsonValue::String(model.table_name().to_string()))
        }),
    );
    methods
}

fn builtin_instance_methods() -> MethodTable<InstanceMethod> {
    let mut methods: MethodTable<InstanceMethod> = MethodTable::new();
    methods.insert(
        "toJSON".to_string(),
        Arc::new(|instance: &ModelInstance, _args: JsonValue| -> ModelResult<JsonValue> {
            Ok(instance.to_json())
        }),
    );
    methods
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::{FieldDefinition, FieldType};
    use serde_json::json;

    fn schema() -> ModelSchema {
        ModelSchema::new().field(FieldDefinition::new("name", FieldType::Text))
    }

    #[test]
    fn test_builder_defaults() {
        let definition = ModelDefinition::builder("BlogPost", schema()).build();
        assert_eq!(definition.name(), "BlogPost");
        assert_eq!(definition.table_name(), "blogpost");
        assert!(definition.options().timestamps);
        assert!(definition.has_class_method("describe"));
        assert!(definition.has_class_method("tableName"));
        assert!(definition.has_instance_method("toJSON"));
        assert!(definition.associate.is_none());
    }

    #[test]
    fn test_custom_methods_overwrite_builtins() {
        let definition = ModelDefinition::builder("User", schema())
            .table_name("accounts")
            .timestamps(false)
            .class_method("tableName", |_model, _args| Ok(json!("custom")))
            .class_method("findActive", |_model, args| Ok(args))
            .build();

        let model = Model::bind(definition, "main").unwrap();
        assert_eq!(model.table_name(), "accounts");
        assert_eq!(model.call("tableName", JsonValue::Null).unwrap(), json!("custom"));
        assert_eq!(model.call("findActive", json!([1])).unwrap(), json!([1]));
    }
}
