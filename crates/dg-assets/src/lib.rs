//! dg-assets: JSON catalogs of room templates and themes for dg-core.

pub mod mapping;
pub mod registry;

pub use mapping::*;
pub use registry::*;
