//! RegistryBuilder for constructing an immutable Registry.

use crate::{ArtifactId, MarkerDef, Registry, TagId, TagSpec, ValidatorFactory};
use std::collections::HashMap;
use std::sync::Arc;
use tagweave_core::{TagValidator, ValueType};
use thiserror::Error;

/// Errors that can occur during registry construction.
#[derive(Debug, Error)]
pub enum RegistryError {
    #[error("Duplicate marker name: {0}")]
    DuplicateMarker(String),

    #[error("Duplicate validator factory: {0}")]
    DuplicateFactory(String),

    #[error("Tag {tag} is validated by unregistered validator type {factory}")]
    UnknownFactory { tag: String, factory: String },
}

/// Result type for registry construction.
pub type RegistryResult<T> = Result<T, RegistryError>;

/// Builder for constructing an immutable Registry.
#[derive(Default)]
pub struct RegistryBuilder {
    markers: Vec<MarkerDef>,
    marker_names: HashMap<String, TagId>,
    factories: HashMap<String, ValidatorFactory>,
}

impl RegistryBuilder {
    /// Create a new builder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Declare a plain marker: known to the registry but not a constraint
    /// tag, so the scanner will skip it.
    pub fn declare_marker(
        &mut self,
        name: impl Into<String>,
        artifact: ArtifactId,
    ) -> RegistryResult<TagId> {
        self.intern(MarkerDef {
            name: name.into(),
            artifact,
            spec: None,
        })
    }

    /// Declare a constraint tag. Configure the returned [`TagBuilder`] and
    /// finish with [`TagBuilder::done`].
    pub fn declare_tag(&mut self, name: impl Into<String>, artifact: ArtifactId) -> TagBuilder<'_> {
        TagBuilder {
            builder: self,
            name: name.into(),
            artifact,
            restrict_to: Vec::new(),
            validated_by: None,
        }
    }

    /// Register a validator factory under a name.
    ///
    /// Tags reference factories by name via `validated_by`; a reference to a
    /// name that was never registered fails [`build`](Self::build).
    pub fn register_validator<F>(&mut self, name: impl Into<String>, factory: F) -> RegistryResult<&mut Self>
    where
        F: Fn() -> Result<Box<dyn TagValidator>, Box<dyn std::error::Error + Send + Sync>>
            + Send
            + Sync
            + 'static,
    {
        let name = name.into();
        if self.factories.contains_key(&name) {
            return Err(RegistryError::DuplicateFactory(name));
        }
        self.factories.insert(name, Arc::new(factory));
        Ok(self)
    }

    /// Build the registry, cross-checking all factory references.
    pub fn build(self) -> RegistryResult<Registry> {
        for marker in &self.markers {
            if let Some(spec) = &marker.spec {
                if let Some(factory) = &spec.validated_by {
                    if !self.factories.contains_key(factory) {
                        return Err(RegistryError::UnknownFactory {
                            tag: marker.name.clone(),
                            factory: factory.clone(),
                        });
                    }
                }
            }
        }
        Ok(Registry::new(self.markers, self.marker_names, self.factories))
    }

    fn intern(&mut self, marker: MarkerDef) -> RegistryResult<TagId> {
        if self.marker_names.contains_key(&marker.name) {
            return Err(RegistryError::DuplicateMarker(marker.name));
        }
        let id = TagId::new(self.markers.len() as u32);
        self.marker_names.insert(marker.name.clone(), id);
        self.markers.push(marker);
        Ok(id)
    }
}

/// Sub-builder for one constraint tag declaration.
pub struct TagBuilder<'b> {
    builder: &'b mut RegistryBuilder,
    name: String,
    artifact: ArtifactId,
    restrict_to: Vec<ValueType>,
    validated_by: Option<String>,
}

impl TagBuilder<'_> {
    /// Require values to be instances of the given type. May be called
    /// repeatedly to allow several supertypes; never calling it leaves the
    /// tag unrestricted.
    pub fn restrict_to(mut self, value_type: ValueType) -> Self {
        self.restrict_to.push(value_type);
        self
    }

    /// Name the registered validator factory that checks values of this tag.
    pub fn validated_by(mut self, factory: impl Into<String>) -> Self {
        self.validated_by = Some(factory.into());
        self
    }

    /// Finish the declaration, interning the tag.
    pub fn done(self) -> RegistryResult<TagId> {
        self.builder.intern(MarkerDef {
            name: self.name,
            artifact: self.artifact,
            spec: Some(TagSpec {
                restrict_to: self.restrict_to,
                validated_by: self.validated_by,
            }),
        })
    }
}
