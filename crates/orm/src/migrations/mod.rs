//! Schema sync
//!
//! Turns bound models into DDL. Connections execute the statements; the
//! migration service decides whether a sync drops or alters.

pub mod schema_builder;
pub mod sync;

pub use schema_builder::*;
pub use sync::*;
