//! Weaver configuration.

use std::sync::Arc;
use tagweave_registry::Registry;

/// Filter predicate over marker type names; `false` excludes the marker
/// from weaving.
pub type MarkerFilter = Arc<dyn Fn(&str) -> bool + Send + Sync>;

/// Configuration for [`Weaver`](crate::Weaver) instances.
///
/// Carries the registry used to resolve marker types and an optional filter
/// that excludes some markers. The default is to weave every marker declared
/// as a constraint tag.
#[derive(Clone)]
pub struct WeaveConfig {
    registry: Arc<Registry>,
    filter: Option<MarkerFilter>,
}

impl WeaveConfig {
    /// Create a config resolving against the given registry.
    pub fn new(registry: Arc<Registry>) -> Self {
        Self {
            registry,
            filter: None,
        }
    }

    /// Exclude markers for which the predicate returns false.
    pub fn with_filter<F>(mut self, filter: F) -> Self
    where
        F: Fn(&str) -> bool + Send + Sync + 'static,
    {
        self.filter = Some(Arc::new(filter));
        self
    }

    /// The registry markers are resolved against.
    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    /// Whether the filter admits a marker (no filter admits everything).
    pub fn admits(&self, marker: &str) -> bool {
        self.filter.as_ref().map_or(true, |f| f(marker))
    }
}
