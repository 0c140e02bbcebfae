//! Call-site resolution.
//!
//! Each call-out occurrence in a loaded unit owns one [`CallSite`]. The site
//! holds a single-assignment slot: `Unresolved` until the first execution,
//! then `Resolved` forever. Resolution is idempotent (two racers compute
//! equal bindings), so losing the race just means adopting the winner's
//! binding; the one-shot slot is the only synchronization involved.

use crate::{RuntimeResult, ValidatorCache};
use std::sync::{Arc, OnceLock};
use tagweave_core::{CalloutOp, TagParams, Validate};
use tagweave_registry::TagId;

/// The resolved, immutable linkage from a call-out to its validator.
#[derive(Clone)]
pub struct CallSiteBinding {
    op: CalloutOp,
    validator: Arc<dyn Validate>,
}

impl CallSiteBinding {
    /// The operation this binding services.
    pub fn op(&self) -> CalloutOp {
        self.op
    }

    /// The bound validator.
    pub fn validator(&self) -> &Arc<dyn Validate> {
        &self.validator
    }
}

/// One call-out's resolution slot.
pub struct CallSite {
    op: CalloutOp,
    tag: TagId,
    params: TagParams,
    slot: OnceLock<CallSiteBinding>,
}

impl CallSite {
    /// Create an unresolved call site.
    pub fn new(op: CalloutOp, tag: TagId, params: TagParams) -> Self {
        Self {
            op,
            tag,
            params,
            slot: OnceLock::new(),
        }
    }

    /// The tag baked into the call-out at rewrite time.
    pub fn tag(&self) -> TagId {
        self.tag
    }

    /// Whether this site has been resolved.
    pub fn is_resolved(&self) -> bool {
        self.slot.get().is_some()
    }

    /// Resolve the binding, computing it on first execution.
    ///
    /// Resolution failures come from validator construction only; they are
    /// not stored here because the cache already memoizes them, so every
    /// later execution observes the same configuration error.
    pub fn resolve(&self, cache: &ValidatorCache) -> RuntimeResult<&CallSiteBinding> {
        if let Some(binding) = self.slot.get() {
            return Ok(binding);
        }
        let validator = cache.validator_for_use(self.tag, &self.params)?;
        Ok(self.slot.get_or_init(|| CallSiteBinding {
            op: self.op,
            validator,
        }))
    }
}
