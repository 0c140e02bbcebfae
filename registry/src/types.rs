//! Tag declaration types.

use std::fmt;
use std::sync::Arc;
use tagweave_core::{TagValidator, ValueType};

/// Interned identifier of a marker type.
///
/// Indices into the registry's marker arena. Interning replaces reflective
/// type objects as cache keys, so caches can be evicted by explicit
/// lifecycle events instead of collector-driven weak references.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TagId(pub u32);

impl TagId {
    /// Create a TagId from a raw arena index.
    pub fn new(id: u32) -> Self {
        Self(id)
    }

    /// Get the raw arena index.
    pub fn raw(&self) -> u32 {
        self.0
    }
}

impl fmt::Display for TagId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "t{}", self.0)
    }
}

/// Identifier of the loaded artifact that declared a marker.
///
/// Unloading an artifact is the explicit lifecycle event that evicts the
/// validators cached for its tags.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ArtifactId(pub u32);

impl ArtifactId {
    /// Create an ArtifactId from a raw value.
    pub fn new(id: u32) -> Self {
        Self(id)
    }

    /// Get the raw value.
    pub fn raw(&self) -> u32 {
        self.0
    }
}

impl fmt::Display for ArtifactId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "a{}", self.0)
    }
}

/// Factory producing a fresh validator instance for a tag.
///
/// The explicit registration contract: every custom validator type is
/// registered under a name at build time, and a tag's `validated_by` must
/// reference a registered name. Factories correspond to the no-argument
/// constructor requirement of the original design, so they may fail (a
/// throwing constructor) and may have side effects, which is why the cache
/// runs each one exactly once per key.
pub type ValidatorFactory =
    Arc<dyn Fn() -> Result<Box<dyn TagValidator>, Box<dyn std::error::Error + Send + Sync>> + Send + Sync>;

/// The constraint declaration carried by a tag marker.
#[derive(Clone)]
pub struct TagSpec {
    /// Required value supertypes; empty means unrestricted.
    pub restrict_to: Vec<ValueType>,
    /// Name of the registered validator factory, if any.
    pub validated_by: Option<String>,
}

/// A marker type known to the registry.
///
/// A marker with a [`TagSpec`] is a constraint tag; one without is a plain
/// marker the scanner skips.
#[derive(Clone)]
pub struct MarkerDef {
    /// Marker type name.
    pub name: String,
    /// Artifact that declared the marker.
    pub artifact: ArtifactId,
    /// Constraint declaration, if the marker is a tag.
    pub spec: Option<TagSpec>,
}

impl MarkerDef {
    /// Returns true if this marker is declared as a constraint tag.
    pub fn is_tag(&self) -> bool {
        self.spec.is_some()
    }
}

impl fmt::Debug for MarkerDef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MarkerDef")
            .field("name", &self.name)
            .field("artifact", &self.artifact)
            .field("is_tag", &self.is_tag())
            .finish()
    }
}
