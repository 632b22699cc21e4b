use std::sync::Arc;

use serde_json::{Map, Value as JsonValue};

use crate::error::{ModelError, ModelResult};
use crate::model::Model;

/// A row-shaped value belonging to a bound model
#[derive(Debug, Clone)]
pub struct ModelInstance {
    model: Arc<Model>,
    attributes: Map<String, JsonValue>,
}

impl ModelInstance {
    pub(crate) fn new(model: Arc<Model>, attributes: Map<String, JsonValue>) -> Self {
        Self { model, attributes }
    }

    pub fn model(&self) -> &Arc<Model> {
        &self.model
    }

    pub fn get(&self, attribute: &str) -> Option<&JsonValue> {
        self.attributes.get(attribute)
    }

    /// Set an attribute; only columns of the model are accepted
    pub fn set(&mut self, attribute: &str, value: JsonValue) -> ModelResult<()> {
        if !self.model.columns().iter().any(|c| c.name == attribute) {
            return Err(ModelError::Validation(format!(
                "Model '{}' has no column '{}'",
                self.model.name(),
                attribute
            )));
        }
        self.attributes.insert(attribute.to_string(), value);
        Ok(())
    }

    pub fn attributes(&self) -> &Map<String, JsonValue> {
        &self.attributes
    }

    /// Invoke an instance-level method
    pub fn call(&self, method: &str, args: JsonValue) -> ModelResult<JsonValue> {
        let handler = self.model.instance_method(method)?;
        handler(self, args)
    }

    pub fn to_json(&self) -> JsonValue {
        JsonValue::Object(self.attributes.clone())
    }
}
