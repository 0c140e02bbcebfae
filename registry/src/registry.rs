//! The Registry - immutable tag declaration lookup.

use crate::{ArtifactId, MarkerDef, TagId, ValidatorFactory};
use std::collections::HashMap;

/// The Registry provides runtime lookup of marker declarations and validator
/// factories. It is immutable after construction.
pub struct Registry {
    /// Marker arena; a TagId is an index into this vector.
    markers: Vec<MarkerDef>,
    /// Marker ID lookup by name.
    marker_names: HashMap<String, TagId>,
    /// Validator factories by registered name.
    factories: HashMap<String, ValidatorFactory>,
}

impl Registry {
    pub(crate) fn new(
        markers: Vec<MarkerDef>,
        marker_names: HashMap<String, TagId>,
        factories: HashMap<String, ValidatorFactory>,
    ) -> Self {
        Self {
            markers,
            marker_names,
            factories,
        }
    }

    // ==================== Marker Lookups ====================

    /// Get a marker definition by ID.
    pub fn marker(&self, id: TagId) -> Option<&MarkerDef> {
        self.markers.get(id.raw() as usize)
    }

    /// Get a marker ID by name.
    pub fn marker_id(&self, name: &str) -> Option<TagId> {
        self.marker_names.get(name).copied()
    }

    /// Get a marker definition by name.
    pub fn marker_by_name(&self, name: &str) -> Option<&MarkerDef> {
        self.marker_id(name).and_then(|id| self.marker(id))
    }

    /// Get all marker definitions in arena order.
    pub fn all_markers(&self) -> impl Iterator<Item = (TagId, &MarkerDef)> {
        self.markers
            .iter()
            .enumerate()
            .map(|(i, m)| (TagId::new(i as u32), m))
    }

    /// Get the number of interned markers.
    pub fn marker_count(&self) -> usize {
        self.markers.len()
    }

    /// Get the IDs of all tags declared by an artifact.
    pub fn tags_of_artifact(&self, artifact: ArtifactId) -> Vec<TagId> {
        self.all_markers()
            .filter(|(_, m)| m.artifact == artifact)
            .map(|(id, _)| id)
            .collect()
    }

    // ==================== Factory Lookups ====================

    /// Get a validator factory by registered name.
    pub fn factory(&self, name: &str) -> Option<&ValidatorFactory> {
        self.factories.get(name)
    }
}
