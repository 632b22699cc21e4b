//! Model System
//!
//! - `definition`: schema plus behavior tables, composed before binding
//! - `bound`: a definition bound to a named connection
//! - `instance`: attribute rows built from a bound model

pub mod bound;
pub mod definition;
pub mod instance;

pub use bound::Model;
pub use definition::*;
pub use instance::ModelInstance;
