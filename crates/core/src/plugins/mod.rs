pub mod lifecycle;
pub mod plugin;

pub use lifecycle::*;
pub use plugin::*;
