//! Integration tests: definitions bound into a registry, associated and
//! turned into schema sync DDL

use std::sync::Arc;

use elif_orm::{
    sync_statements, FieldDefinition, FieldType, Model, ModelDefinition, ModelRegistry,
    ModelSchema, RelationshipType, SyncOptions,
};
use serde_json::{json, Map};

fn blog_registry() -> ModelRegistry {
    let user = ModelDefinition::builder(
        "User",
        ModelSchema::new()
            .field(
                FieldDefinition::new("email", FieldType::String { length: Some(255) })
                    .not_null()
                    .unique(),
            )
            .field(FieldDefinition::new("active", FieldType::Boolean).default_value(true)),
    )
    .associate(|ctx| Ok(vec![ctx.has_many("Post")?.with_name("posts")]))
    .build();

    let post = ModelDefinition::builder(
        "Post",
        ModelSchema::new()
            .field(FieldDefinition::new("id", FieldType::BigInteger).primary_key().auto_increment())
            .field(FieldDefinition::new("title", FieldType::Text).not_null()),
    )
    .table_name("posts")
    .associate(|ctx| Ok(vec![ctx.belongs_to("User")?.with_name("author")]))
    .build();

    let comment = ModelDefinition::builder(
        "Comment",
        ModelSchema::new().field(FieldDefinition::new("body", FieldType::Text)),
    )
    .timestamps(false)
    .associate(|ctx| {
        Ok(vec![
            ctx.belongs_to("Post")?,
            ctx.belongs_to("User")?.with_foreign_key("author_id"),
        ])
    })
    .build();

    let mut builder = ModelRegistry::builder();
    for definition in [comment, post, user] {
        let name = definition.name().to_string();
        builder
            .insert(name, Model::bind(definition, "main").unwrap())
            .unwrap();
    }
    builder.associate_all().unwrap();
    builder.build()
}

#[test]
fn test_associations_resolve_keys_across_models() {
    let registry = blog_registry();

    let user = registry.get("User").unwrap();
    let posts = user.association("posts").unwrap();
    assert_eq!(posts.relationship_type, RelationshipType::HasMany);
    assert_eq!(posts.foreign_key, "user_id");
    assert_eq!(posts.target_table, "posts");

    let comment = registry.get_by_identity("comment").unwrap();
    let post_fk = comment.association("post").unwrap();
    assert_eq!(post_fk.foreign_key, "post_id");
    assert_eq!(post_fk.key_type, FieldType::BigInteger);

    let columns: Vec<String> = comment.columns().into_iter().map(|c| c.name).collect();
    assert_eq!(columns, vec!["id", "body", "post_id", "author_id"]);
}

#[test]
fn test_sync_orders_tables_by_foreign_keys() {
    let registry = blog_registry();
    let models: Vec<Arc<Model>> = registry.for_connection("main");
    assert_eq!(models.len(), 3);

    let statements = sync_statements(&models, SyncOptions::force());
    let drops: Vec<&String> = statements.iter().filter(|s| s.starts_with("DROP")).collect();
    let creates: Vec<&String> = statements.iter().filter(|s| s.starts_with("CREATE")).collect();

    assert_eq!(drops.len(), 3);
    assert!(creates[0].contains("\"user\""));
    assert!(creates[1].contains("\"posts\""));
    assert!(creates[2].contains("\"comment\""));
    assert_eq!(drops[0], "DROP TABLE IF EXISTS \"comment\" CASCADE;");

    assert!(creates[1].contains("\"id\" BIGSERIAL PRIMARY KEY"));
    assert!(creates[2].contains("\"post_id\" BIGINT"));
    assert!(creates[2].contains("FOREIGN KEY (\"post_id\") REFERENCES \"posts\" (\"id\")"));
    assert!(creates[2].contains("FOREIGN KEY (\"author_id\") REFERENCES \"user\" (\"id\")"));
}

#[test]
fn test_instances_from_registry_models() {
    let registry = blog_registry();
    let post = registry.get("Post").unwrap();

    let mut attributes = Map::new();
    attributes.insert("title".to_string(), json!("Hello"));
    attributes.insert("user_id".to_string(), json!(7));
    attributes.insert("unknown".to_string(), json!(true));

    let mut instance = post.build(attributes);
    instance.set("id", json!(1)).unwrap();
    assert!(instance.set("body", json!("nope")).is_err());

    assert_eq!(
        instance.call("toJSON", serde_json::Value::Null).unwrap(),
        json!({"id": 1, "title": "Hello", "user_id": 7})
    );

    let description = post.describe();
    assert_eq!(description["tableName"], json!("posts"));
    assert_eq!(description["associations"], json!(["author"]));
}

#[test]
fn test_collection_associations_create_their_columns_and_pivots() {
    let user = ModelDefinition::builder(
        "User",
        ModelSchema::new().field(FieldDefinition::new("email", FieldType::Text)),
    )
    .associate(|ctx| {
        Ok(vec![
            ctx.has_many("Post")?,
            ctx.belongs_to_many("Tag", None)?,
        ])
    })
    .build();
    let post = ModelDefinition::builder(
        "Post",
        ModelSchema::new().field(FieldDefinition::new("title", FieldType::Text)),
    )
    .build();
    let tag = ModelDefinition::builder(
        "Tag",
        ModelSchema::new().field(FieldDefinition::new("label", FieldType::Text)),
    )
    .build();

    let mut builder = ModelRegistry::builder();
    for definition in [user, post, tag] {
        let name = definition.name().to_string();
        builder
            .insert(name, Model::bind(definition, "main").unwrap())
            .unwrap();
    }
    builder.associate_all().unwrap();
    let registry = builder.build();

    let statements = sync_statements(&registry.for_connection("main"), SyncOptions::alter());
    let post_table = statements
        .iter()
        .find(|s| s.starts_with("CREATE TABLE IF NOT EXISTS \"post\""))
        .unwrap();
    assert!(post_table.contains("\"user_id\" INTEGER"));
    assert!(post_table.contains("FOREIGN KEY (\"user_id\") REFERENCES \"user\" (\"id\")"));
    assert!(statements
        .iter()
        .any(|s| s.starts_with("CREATE TABLE IF NOT EXISTS \"tag_user\"")));

    let mut attributes = Map::new();
    attributes.insert("user_id".to_string(), json!(3));
    let instance = registry.get("Post").unwrap().build(attributes);
    assert_eq!(instance.get("user_id"), Some(&json!(3)));
}
