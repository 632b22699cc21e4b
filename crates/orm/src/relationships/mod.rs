//! Relationships Module - associations declared between bound models

pub mod context;
pub mod metadata;

pub use context::*;
pub use metadata::*;
