//! Schema sync: turn a set of bound models into DDL
//!
//! Tables are created in dependency order so that a foreign key can
//! reference a table created earlier in the same run. Many-to-many pivot
//! tables come last and are dropped first.

use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;

use crate::migrations::{SchemaBuilder, TableBuilder};
use crate::model::Model;
use crate::relationships::{ForeignKey, PivotTable};
use crate::schema::FieldDefinition;

/// How a sync treats existing tables
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SyncOptions {
    /// Drop every table before recreating it
    pub force: bool,
    /// Add columns missing from existing tables
    pub alter: bool,
}

impl SyncOptions {
    /// Drop and recreate
    pub fn force() -> Self {
        Self {
            force: true,
            alter: false,
        }
    }

    /// Create missing tables and columns, keep data
    pub fn alter() -> Self {
        Self {
            force: false,
            alter: true,
        }
    }
}

/// DDL statements bringing the database in line with `models`
pub fn sync_statements(models: &[Arc<Model>], options: SyncOptions) -> Vec<String> {
    let ordered = creation_order(models);
    let mut pivots: Vec<&PivotTable> = Vec::new();
    for pivot in ordered.iter().flat_map(|m| m.pivots()) {
        if !pivots.iter().any(|p| p.table_name == pivot.table_name) {
            pivots.push(pivot);
        }
    }

    let mut builder = SchemaBuilder::new();

    if options.force {
        for pivot in &pivots {
            builder.drop_table(&pivot.table_name);
        }
        for model in ordered.iter().rev() {
            builder.drop_table(model.table_name());
        }
    }

    let mut created: BTreeSet<&str> = BTreeSet::new();
    for model in &ordered {
        let columns = model.columns();
        builder.create_table_if_not_exists(model.table_name(), |table| {
            for column in &columns {
                table.field(column);
            }
            for key in model.foreign_keys() {
                let target = key.references_table.as_str();
                if created.contains(target) || target == model.table_name() {
                    reference(table, key);
                }
            }
        });
        created.insert(model.table_name());

        if options.alter && !options.force {
            for column in &columns {
                builder.add_column_if_not_exists(model.table_name(), &column.column_sql());
            }
        }
    }

    for pivot in &pivots {
        let columns: Vec<FieldDefinition> = pivot
            .keys
            .iter()
            .map(|key| FieldDefinition::new(key.column.clone(), key.column_type.clone()).not_null())
            .collect();
        builder.create_table_if_not_exists(&pivot.table_name, |table| {
            for column in &columns {
                table.field(column);
            }
            table.unique(&[pivot.keys[0].column.as_str(), pivot.keys[1].column.as_str()]);
            for key in &pivot.keys {
                if created.contains(key.references_table.as_str()) {
                    reference(table, key);
                }
            }
        });

        if options.alter && !options.force {
            for column in &columns {
                builder.add_column_if_not_exists(&pivot.table_name, &column.column_sql());
            }
        }
    }

    builder.into_statements()
}

fn reference(table: &mut TableBuilder, key: &ForeignKey) {
    table.foreign_key(&key.column, &key.references_table, &key.references_column);
}

/// Referenced tables first; input order breaks ties
fn creation_order(models: &[Arc<Model>]) -> Vec<&Arc<Model>> {
    let by_table: BTreeMap<&str, &Arc<Model>> =
        models.iter().map(|m| (m.table_name(), m)).collect();

    let mut visited: BTreeSet<&str> = BTreeSet::new();
    let mut ordered = Vec::with_capacity(models.len());

    fn visit<'a>(
        model: &'a Arc<Model>,
        by_table: &BTreeMap<&'a str, &'a Arc<Model>>,
        visited: &mut BTreeSet<&'a str>,
        ordered: &mut Vec<&'a Arc<Model>>,
    ) {
        if !visited.insert(model.table_name()) {
            return;
        }
        for key in model.foreign_keys() {
            if let Some(target) = by_table.get(key.references_table.as_str()) {
                visit(*target, by_table, visited, ordered);
            }
        }
        ordered.push(model);
    }

    for model in models {
        visit(model, &by_table, &mut visited, &mut ordered);
    }
    ordered
}
