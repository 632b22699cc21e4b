//! Relationship metadata attached to bound models

use serde::{Deserialize, Serialize};

use crate::schema::FieldType;

/// Defines the type of relationship between models
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RelationshipType {
    /// One-to-one relationship (hasOne)
    HasOne,
    /// One-to-many relationship (hasMany)
    HasMany,
    /// Many-to-one relationship (belongsTo)
    BelongsTo,
    /// Many-to-many relationship through a pivot table
    ManyToMany,
}

impl RelationshipType {
    /// Returns true if this relationship returns a collection
    pub fn is_collection(self) -> bool {
        matches!(self, Self::HasMany | Self::ManyToMany)
    }

    /// Returns true if the foreign key lives on the source model's table
    pub fn owns_foreign_key(self) -> bool {
        matches!(self, Self::BelongsTo)
    }
}

/// One association declared by a model's associate hook
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Association {
    pub relationship_type: RelationshipType,

    /// Name of the association on the source model
    pub name: String,

    /// Global id of the declaring model
    pub source: String,

    /// Global id of the related model
    pub target: String,

    pub target_table: String,

    /// Foreign key column
    pub foreign_key: String,

    /// Column the foreign key points at
    pub target_key: String,

    /// Column type of the foreign key, taken from the referenced key
    pub key_type: FieldType,

    /// Pivot table for many-to-many associations
    pub through: Option<String>,

    /// Pivot column pointing at the target, for many-to-many associations
    pub other_key: Option<String>,
}

impl Association {
    /// Rename the association
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Override the inferred foreign key column
    pub fn with_foreign_key(mut self, foreign_key: impl Into<String>) -> Self {
        self.foreign_key = foreign_key.into();
        self
    }

    /// Override the pivot column pointing at the target
    pub fn with_other_key(mut self, other_key: impl Into<String>) -> Self {
        self.other_key = Some(other_key.into());
        self
    }

    pub fn is_collection(&self) -> bool {
        self.relationship_type.is_collection()
    }
}

/// A foreign key column some table carries because of an association
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForeignKey {
    pub column: String,
    pub column_type: FieldType,
    pub references_table: String,
    pub references_column: String,
}

/// Join table of a many-to-many association, one key per side
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PivotTable {
    pub table_name: String,
    pub keys: [ForeignKey; 2],
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_relationship_type_flags() {
        assert!(RelationshipType::HasMany.is_collection());
        assert!(RelationshipType::BelongsTo.owns_foreign_key());
        assert!(!RelationshipType::HasOne.owns_foreign_key());
        assert!(!RelationshipType::BelongsTo.is_collection());
    }
}
