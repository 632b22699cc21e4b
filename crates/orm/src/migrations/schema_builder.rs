//! Schema Builder - DSL for building DDL statements
//!
//! Every table and column name passes through [`escape_identifier`].

use crate::schema::FieldDefinition;
use crate::security::escape_identifier;

/// Ordered list of DDL statements
#[derive(Debug, Default)]
pub struct SchemaBuilder {
    statements: Vec<String>,
}

impl SchemaBuilder {
    /// Create a new schema builder
    pub fn new() -> Self {
        Self {
            statements: Vec::new(),
        }
    }

    /// Create a table unless it already exists
    pub fn create_table_if_not_exists<F>(&mut self, table_name: &str, callback: F) -> &mut Self
    where
        F: FnOnce(&mut TableBuilder),
    {
        let mut table_builder = TableBuilder::new(table_name).if_not_exists();
        callback(&mut table_builder);
        self.statements.push(table_builder.to_sql());
        self
    }

    /// Drop a table and everything depending on it
    pub fn drop_table(&mut self, table_name: &str) -> &mut Self {
        self.statements.push(format!(
            "DROP TABLE IF EXISTS {} CASCADE;",
            escape_identifier(table_name)
        ));
        self
    }

    /// Add a column unless the table already has it
    pub fn add_column_if_not_exists(&mut self, table_name: &str, column_sql: &str) -> &mut Self {
        self.statements.push(format!(
            "ALTER TABLE {} ADD COLUMN IF NOT EXISTS {};",
            escape_identifier(table_name),
            column_sql
        ));
        self
    }

    /// Consume the builder, returning its statements
    pub fn into_statements(self) -> Vec<String> {
        self.statements
    }
}

/// Table builder for CREATE TABLE statements
#[derive(Debug)]
pub struct TableBuilder {
    table_name: String,
    if_not_exists: bool,
    columns: Vec<String>,
    constraints: Vec<String>,
}

impl TableBuilder {
    pub fn new(table_name: &str) -> Self {
        Self {
            table_name: table_name.to_string(),
            if_not_exists: false,
            columns: Vec::new(),
            constraints: Vec::new(),
        }
    }

    pub fn if_not_exists(mut self) -> Self {
        self.if_not_exists = true;
        self
    }

    /// Add a column from a schema field
    pub fn field(&mut self, field: &FieldDefinition) -> &mut Self {
        self.columns.push(field.column_sql());
        self
    }

    /// Add a foreign key constraint
    pub fn foreign_key(
        &mut self,
        column: &str,
        references_table: &str,
        references_column: &str,
    ) -> &mut Self {
        self.constraints.push(format!(
            "FOREIGN KEY ({}) REFERENCES {} ({})",
            escape_identifier(column),
            escape_identifier(references_table),
            escape_identifier(references_column)
        ));
        self
    }

    /// Add a unique constraint
    pub fn unique(&mut self, columns: &[&str]) -> &mut Self {
        let columns: Vec<String> = columns.iter().map(|c| escape_identifier(c)).collect();
        self.constraints
            .push(format!("UNIQUE ({})", columns.join(", ")));
        self
    }

    /// Build the CREATE TABLE SQL
    pub fn to_sql(&self) -> String {
        let mut parts = self.columns.clone();
        parts.extend(self.constraints.clone());

        format!(
            "CREATE TABLE {}{} (\n    {}\n);",
            if self.if_not_exists { "IF NOT EXISTS " } else { "" },
            escape_identifier(&self.table_name),
            parts.join(",\n    ")
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::FieldType;

    #[test]
    fn test_schema_builder() {
        let mut builder = SchemaBuilder::new();
        builder.drop_table("users");
        builder.create_table_if_not_exists("users", |table| {
            table.field(
                &FieldDefinition::new("id", FieldType::Integer)
                    .primary_key()
                    .auto_increment(),
            );
            table.field(&FieldDefinition::new("email", FieldType::String { length: Some(255) }));
            table.unique(&["email"]);
        });
        builder.add_column_if_not_exists("users", "\"age\" INTEGER");

        let statements = builder.into_statements();
        assert_eq!(statements.len(), 3);
        let sql = statements.join("\n");
        assert!(sql.contains("DROP TABLE IF EXISTS \"users\" CASCADE;"));
        assert!(sql.contains("CREATE TABLE IF NOT EXISTS \"users\""));
        assert!(sql.contains("\"id\" SERIAL PRIMARY KEY"));
        assert!(sql.contains("\"email\" VARCHAR(255)"));
        assert!(sql.contains("UNIQUE (\"email\")"));
        assert!(sql.contains("ALTER TABLE \"users\" ADD COLUMN IF NOT EXISTS \"age\" INTEGER;"));
    }

    #[test]
    fn test_table_builder() {
        let mut table = TableBuilder::new("posts");
        table.field(&FieldDefinition::new("title", FieldType::Text));
        table.foreign_key("user_id", "user", "id");

        let sql = table.to_sql();
        assert!(sql.starts_with("CREATE TABLE \"posts\" ("));
        assert!(sql.contains("\"title\" TEXT"));
        assert!(sql.contains("FOREIGN KEY (\"user_id\") REFERENCES \"user\" (\"id\")"));
    }
}
