//! Lazy, memoizing validator construction.
//!
//! Two caches: one validator per tag type, and one bound validator per
//! distinct tag instance (tag plus parameter values). Construction is
//! double-checked per key: a short-lived map lock hands out a per-key once
//! cell, and the factory runs outside the map lock, so unrelated tags build
//! in parallel while same-key waiters block briefly and then read the one
//! completed entry. Failures are memoized, never retried, and never
//! downgraded to "no validation".

use crate::{RuntimeError, RuntimeResult};
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, OnceLock};
use tagweave_core::{always_valid, and_then, bind, restrict_to, TagParams, Validate};
use tagweave_registry::{ArtifactId, Registry, TagId, TagSpec};

type Entry = Arc<OnceLock<RuntimeResult<Arc<dyn Validate>>>>;

/// Cache of validator instances, owned by a weaving session.
pub struct ValidatorCache {
    registry: Arc<Registry>,
    /// One validator per tag type.
    by_tag: Mutex<HashMap<TagId, Entry>>,
    /// One bound validator per distinct tag instance.
    by_use: Mutex<HashMap<(TagId, TagParams), Entry>>,
    /// Bumped on every artifact unload.
    generation: AtomicU64,
}

impl ValidatorCache {
    /// Create an empty cache over a registry.
    pub fn new(registry: Arc<Registry>) -> Self {
        Self {
            registry,
            by_tag: Mutex::new(HashMap::new()),
            by_use: Mutex::new(HashMap::new()),
            generation: AtomicU64::new(0),
        }
    }

    /// Get the validator for a tag type, constructing it on first request.
    ///
    /// Construction composes a type-restriction stage (skipped when
    /// `restrict_to` is empty) before the tag's custom validator bound to
    /// default parameters (skipped when there is none).
    pub fn validator_for(&self, tag: TagId) -> RuntimeResult<Arc<dyn Validate>> {
        let cell = Self::cell(&self.by_tag, tag);
        cell.get_or_init(|| self.build(tag, &TagParams::new())).clone()
    }

    /// Get the validator for a tag instance: the tag's custom validator is
    /// constructed and bound once per distinct parameter set, keyed by value
    /// equality of the parameters.
    pub fn validator_for_use(&self, tag: TagId, params: &TagParams) -> RuntimeResult<Arc<dyn Validate>> {
        if params.is_empty() {
            return self.validator_for(tag);
        }
        let cell = Self::cell(&self.by_use, (tag, params.clone()));
        cell.get_or_init(|| self.build(tag, params)).clone()
    }

    /// Evict everything cached for tags declared by the given artifact.
    ///
    /// The explicit lifecycle event replacing collector-driven weak
    /// references: after unload, a tag of that artifact resolves to a fresh
    /// validator instance.
    pub fn unload(&self, artifact: ArtifactId) {
        let stale: Vec<TagId> = self.registry.tags_of_artifact(artifact);
        {
            let mut by_tag = self.by_tag.lock().unwrap_or_else(|e| e.into_inner());
            by_tag.retain(|tag, _| !stale.contains(tag));
        }
        {
            let mut by_use = self.by_use.lock().unwrap_or_else(|e| e.into_inner());
            by_use.retain(|(tag, _), _| !stale.contains(tag));
        }
        self.generation.fetch_add(1, Ordering::SeqCst);
    }

    /// Current cache generation; bumped on every unload.
    pub fn generation(&self) -> u64 {
        self.generation.load(Ordering::SeqCst)
    }

    /// The registry this cache resolves against.
    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    // ==================== Construction ====================

    fn cell<K>(map: &Mutex<HashMap<K, Entry>>, key: K) -> Entry
    where
        K: std::hash::Hash + Eq,
    {
        let mut map = map.lock().unwrap_or_else(|e| e.into_inner());
        map.entry(key).or_default().clone()
    }

    fn build(&self, tag: TagId, params: &TagParams) -> RuntimeResult<Arc<dyn Validate>> {
        let marker = self
            .registry
            .marker(tag)
            .ok_or_else(|| RuntimeError::UnknownMarker(tag.to_string()))?;
        let spec = marker
            .spec
            .as_ref()
            .ok_or_else(|| RuntimeError::NotATag(marker.name.clone()))?;

        let restriction = if spec.restrict_to.is_empty() {
            None
        } else {
            Some(restrict_to(&spec.restrict_to))
        };
        let custom = self.build_custom(&marker.name, spec, params)?;

        Ok(match (restriction, custom) {
            (Some(r), Some(c)) => and_then(r, c),
            (Some(r), None) => r,
            (None, Some(c)) => c,
            (None, None) => always_valid(),
        })
    }

    fn build_custom(
        &self,
        tag_name: &str,
        spec: &TagSpec,
        params: &TagParams,
    ) -> RuntimeResult<Option<Arc<dyn Validate>>> {
        let factory_name = match &spec.validated_by {
            Some(name) => name,
            None => return Ok(None),
        };
        let factory = self
            .registry
            .factory(factory_name)
            .ok_or_else(|| RuntimeError::MissingFactory {
                tag: tag_name.to_string(),
                factory: factory_name.clone(),
            })?;
        let instance = factory()
            .map_err(|e| RuntimeError::factory_failed(tag_name, e.to_string()))?;
        Ok(Some(bind(Arc::from(instance), params.clone())))
    }
}
