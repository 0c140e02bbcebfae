//! Tagweave Runtime
//!
//! Runtime functionality required by the call-outs the weaver inserts.
//!
//! Responsibilities:
//! - Lazily build and memoize one validator per tag type, and one bound
//!   validator per distinct tag instance (parameter value equality)
//! - Resolve each call-out exactly once to an immutable call-site binding
//! - Own the per-session registry and caches; no process-wide statics
//! - Evict cached validators on explicit artifact unload

mod cache;
mod callsite;
mod error;
mod session;

pub use cache::ValidatorCache;
pub use callsite::{CallSite, CallSiteBinding};
pub use error::{RuntimeError, RuntimeResult};
pub use session::{LoadedMethod, LoadedUnit, Session};
