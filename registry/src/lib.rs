//! Tagweave Registry
//!
//! Runtime lookup of constraint tag declarations. Single source of truth for
//! markers, tag restriction sets, and validator factories. The registry is
//! immutable after construction via RegistryBuilder; validator types are
//! registered explicitly and unresolved references are rejected at build
//! time, never discovered lazily.

mod builder;
mod registry;
mod types;

pub use builder::{RegistryBuilder, RegistryError, RegistryResult, TagBuilder};
pub use registry::Registry;
pub use types::{ArtifactId, MarkerDef, TagId, TagSpec, ValidatorFactory};
