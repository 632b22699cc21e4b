//! Binds model descriptors to the connections they name

use std::collections::BTreeMap;

use elif_orm::{ModelRegistry, ModelResult};

use crate::transformer::{Connections, ModelDescriptor};

/// Bind every descriptor whose connection matches a store, run the
/// associate hooks once all of them are bound, and freeze the registry.
///
/// Descriptors whose connection matches no store are left out.
pub fn bind_models(
    descriptors: &BTreeMap<String, ModelDescriptor>,
    connections: &Connections,
) -> ModelResult<ModelRegistry> {
    let mut builder = ModelRegistry::builder();

    for (global_id, descriptor) in descriptors {
        for (name, connection) in connections {
            if descriptor.connection.as_deref() != Some(name.as_str()) {
                continue;
            }
            let model = connection.define(descriptor.to_definition())?;
            builder.insert(global_id.clone(), model)?;
        }
    }

    builder.associate_all()?;

    let registry = builder.build();
    tracing::debug!(
        "Bound {} of {} model(s) across {} store(s)",
        registry.len(),
        descriptors.len(),
        connections.len()
    );
    Ok(registry)
}
