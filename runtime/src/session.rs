//! The weaving session.
//!
//! A session is the explicitly constructed owner of the registry and the
//! validator caches; it is passed down instead of living in process-wide
//! statics, so "one validator instance per tag" holds per session. Loading a
//! unit allocates one fresh call site per call-out occurrence; bindings then
//! live as long as the loaded unit.

use crate::{CallSite, RuntimeResult, RuntimeError, ValidatorCache};
use std::collections::HashMap;
use std::sync::Arc;
use tagweave_core::{and_then, CodeElement, CompiledUnit, Instruction, TagParams, Validate};
use tagweave_registry::{ArtifactId, Registry};

/// A weaving session: registry plus validator caches.
pub struct Session {
    registry: Arc<Registry>,
    cache: ValidatorCache,
}

impl Session {
    /// Create a session over a registry.
    pub fn new(registry: Arc<Registry>) -> Self {
        Self {
            cache: ValidatorCache::new(registry.clone()),
            registry,
        }
    }

    /// The session's registry.
    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    /// The session's validator cache.
    pub fn cache(&self) -> &ValidatorCache {
        &self.cache
    }

    /// Load a (possibly rewritten) unit for execution, allocating one
    /// unresolved call site per call-out occurrence.
    ///
    /// Marker names baked into call-outs are linked against the registry
    /// here; an unknown name is a configuration error at load time.
    pub fn load(&self, unit: &CompiledUnit) -> RuntimeResult<LoadedUnit> {
        let mut methods = Vec::with_capacity(unit.methods.len());
        for method in &unit.methods {
            let mut sites = HashMap::new();
            for (index, element) in method.elements.iter().enumerate() {
                if let CodeElement::Instr(Instruction::Callout(callout)) = element {
                    let tag = self
                        .registry
                        .marker_id(&callout.marker)
                        .ok_or_else(|| RuntimeError::UnknownMarker(callout.marker.clone()))?;
                    sites.insert(
                        index,
                        Arc::new(CallSite::new(callout.op, tag, callout.params.clone())),
                    );
                }
            }
            methods.push(LoadedMethod { sites });
        }
        Ok(LoadedUnit {
            unit: unit.clone(),
            methods,
        })
    }

    /// Evict cached validators for all tags declared by an artifact.
    ///
    /// Units loaded before the unload keep their resolved bindings; dropping
    /// and reloading them picks up fresh validators.
    pub fn unload(&self, artifact: ArtifactId) {
        self.cache.unload(artifact);
    }

    // ==================== Direct validator access ====================

    /// Get the validator for a marker by name (embedder convenience,
    /// bypassing any call-out).
    pub fn validator_for_marker(&self, name: &str) -> RuntimeResult<Arc<dyn Validate>> {
        let tag = self
            .registry
            .marker_id(name)
            .ok_or_else(|| RuntimeError::UnknownMarker(name.to_string()))?;
        self.cache.validator_for(tag)
    }

    /// Compose the validators of several tag uses on one declaration, in
    /// order, into a single validator.
    pub fn validator_for_uses(
        &self,
        uses: &[(&str, TagParams)],
    ) -> RuntimeResult<Arc<dyn Validate>> {
        let mut composed: Option<Arc<dyn Validate>> = None;
        for (name, params) in uses {
            let tag = self
                .registry
                .marker_id(name)
                .ok_or_else(|| RuntimeError::UnknownMarker(name.to_string()))?;
            let validator = self.cache.validator_for_use(tag, params)?;
            composed = Some(match composed {
                Some(prev) => and_then(prev, validator),
                None => validator,
            });
        }
        composed.ok_or(RuntimeError::NoTags)
    }
}

/// One loaded method: its call sites keyed by element index.
pub struct LoadedMethod {
    sites: HashMap<usize, Arc<CallSite>>,
}

impl LoadedMethod {
    /// The call site allocated for the call-out at an element index.
    pub fn site_at(&self, index: usize) -> Option<&Arc<CallSite>> {
        self.sites.get(&index)
    }

    /// Number of call sites in this method.
    pub fn site_count(&self) -> usize {
        self.sites.len()
    }
}

/// A unit loaded for execution: the instruction streams plus per-call-out
/// resolution slots.
pub struct LoadedUnit {
    unit: CompiledUnit,
    methods: Vec<LoadedMethod>,
}

impl LoadedUnit {
    /// The loaded unit's code.
    pub fn unit(&self) -> &CompiledUnit {
        &self.unit
    }

    /// The loaded state for a method by position.
    pub fn method(&self, index: usize) -> Option<&LoadedMethod> {
        self.methods.get(index)
    }

    /// Find a method body and its loaded state by name.
    pub fn find_method(&self, name: &str) -> Option<(&tagweave_core::MethodBody, &LoadedMethod)> {
        self.unit
            .methods
            .iter()
            .position(|m| m.name == name)
            .map(|i| (&self.unit.methods[i], &self.methods[i]))
    }
}
