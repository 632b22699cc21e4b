//! Field definitions that make up a model's table schema

use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;

use crate::error::{ModelError, ModelResult};
use crate::security::validate_identifier;

/// Column types supported by schema sync
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum FieldType {
    Integer,
    BigInteger,
    Float,
    Double,
    Decimal { precision: u8, scale: u8 },
    String { length: Option<u32> },
    Text,
    Boolean,
    Date,
    DateTime,
    Uuid,
    Json,
}

impl FieldType {
    /// PostgreSQL column type
    pub fn sql_type(&self, auto_increment: bool) -> String {
        match self {
            FieldType::Integer if auto_increment => "SERIAL".to_string(),
            FieldType::BigInteger if auto_increment => "BIGSERIAL".to_string(),
            FieldType::Integer => "INTEGER".to_string(),
            FieldType::BigInteger => "BIGINT".to_string(),
            FieldType::Float => "REAL".to_string(),
            FieldType::Double => "DOUBLE PRECISION".to_string(),
            FieldType::Decimal { precision, scale } => format!("NUMERIC({}, {})", precision, scale),
            FieldType::String { length: Some(len) } => format!("VARCHAR({})", len),
            FieldType::String { length: None } => "VARCHAR(255)".to_string(),
            FieldType::Text => "TEXT".to_string(),
            FieldType::Boolean => "BOOLEAN".to_string(),
            FieldType::Date => "DATE".to_string(),
            FieldType::DateTime => "TIMESTAMP WITH TIME ZONE".to_string(),
            FieldType::Uuid => "UUID".to_string(),
            FieldType::Json => "JSONB".to_string(),
        }
    }
}

/// A single column of a model
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldDefinition {
    pub name: String,
    #[serde(flatten)]
    pub field_type: FieldType,
    #[serde(default = "default_allow_null")]
    pub allow_null: bool,
    #[serde(default)]
    pub primary_key: bool,
    #[serde(default)]
    pub auto_increment: bool,
    #[serde(default)]
    pub unique: bool,
    #[serde(default)]
    pub default_value: Option<JsonValue>,
}

fn default_allow_null() -> bool {
    true
}

impl FieldDefinition {
    pub fn new(name: impl Into<String>, field_type: FieldType) -> Self {
        Self {
            name: name.into(),
            field_type,
            allow_null: true,
            primary_key: false,
            auto_increment: false,
            unique: false,
            default_value: None,
        }
    }

    /// Primary keys are never nullable
    pub fn primary_key(mut self) -> Self {
        self.primary_key = true;
        self.allow_null = false;
        self
    }

    pub fn auto_increment(mut self) -> Self {
        self.auto_increment = true;
        self
    }

    pub fn not_null(mut self) -> Self {
        self.allow_null = false;
        self
    }

    pub fn unique(mut self) -> Self {
        self.unique = true;
        self
    }

    pub fn default_value(mut self, value: impl Into<JsonValue>) -> Self {
        self.default_value = Some(value.into());
        self
    }

    /// Column definition as it appears inside CREATE TABLE / ADD COLUMN
    pub fn column_sql(&self) -> String {
        let mut sql = format!(
            "{} {}",
            crate::security::escape_identifier(&self.name),
            self.field_type.sql_type(self.auto_increment)
        );
        if self.primary_key {
            sql.push_str(" PRIMARY KEY");
        } else if !self.allow_null {
            sql.push_str(" NOT NULL");
        }
        if self.unique && !self.primary_key {
            sql.push_str(" UNIQUE");
        }
        if let Some(default) = &self.default_value {
            sql.push_str(&format!(" DEFAULT {}", default_literal(default)));
        }
        sql
    }
}

fn default_literal(value: &JsonValue) -> String {
    match value {
        JsonValue::Null => "NULL".to_string(),
        JsonValue::Bool(b) => b.to_string().to_uppercase(),
        JsonValue::Number(n) => n.to_string(),
        JsonValue::String(s) => format!("'{}'", s.replace('\'', "''")),
        other => format!("'{}'", other.to_string().replace('\'', "''")),
    }
}

/// Ordered set of fields for one model
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ModelSchema {
    fields: Vec<FieldDefinition>,
}

impl ModelSchema {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a field, replacing any existing field with the same name
    pub fn field(mut self, field: FieldDefinition) -> Self {
        match self.fields.iter_mut().find(|f| f.name == field.name) {
            Some(existing) => *existing = field,
            None => self.fields.push(field),
        }
        self
    }

    pub fn fields(&self) -> &[FieldDefinition] {
        &self.fields
    }

    pub fn get(&self, name: &str) -> Option<&FieldDefinition> {
        self.fields.iter().find(|f| f.name == name)
    }

    pub fn has_field(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// The primary key column, if one is declared
    pub fn primary_key(&self) -> Option<&FieldDefinition> {
        self.fields.iter().find(|f| f.primary_key)
    }

    /// Check the schema can be turned into a table
    pub fn validate(&self, model: &str) -> ModelResult<()> {
        if self.fields.is_empty() {
            return Err(ModelError::Schema(format!(
                "Model '{}' declares no fields",
                model
            )));
        }

        for field in &self.fields {
            validate_identifier(&field.name).map_err(|e| {
                ModelError::Schema(format!("Model '{}' field '{}': {}", model, field.name, e))
            })?;
        }

        let primary_keys = self.fields.iter().filter(|f| f.primary_key).count();
        if primary_keys > 1 {
            return Err(ModelError::Schema(format!(
                "Model '{}' declares {} primary keys; composite keys are not supported",
                model, primary_keys
            )));
        }
        Ok(())
    }

    pub fn to_json(&self) -> JsonValue {
        serde_json::to_value(self).unwrap_or(JsonValue::Null)
    }
}
