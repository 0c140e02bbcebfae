//! Runtime error types.

use thiserror::Error;

/// Result type for runtime operations.
pub type RuntimeResult<T> = Result<T, RuntimeError>;

/// Configuration errors surfaced while resolving validators or call sites.
///
/// These are fatal for the tag involved and never downgraded to "no
/// validation"; the cache memoizes them, so they are never retried either.
/// Cloneable because memoized failures are handed to every waiter.
#[derive(Debug, Clone, Error)]
pub enum RuntimeError {
    /// The marker name baked into a call-out is unknown to the registry.
    #[error("Unknown marker type: {0}")]
    UnknownMarker(String),

    /// The marker is known but carries no constraint tag declaration.
    #[error("Marker type {0} is not declared as a constraint tag")]
    NotATag(String),

    /// A tag references a validator factory the registry does not hold.
    #[error("No validator factory registered for tag {tag}: {factory}")]
    MissingFactory { tag: String, factory: String },

    /// The tag's validator factory failed (a throwing constructor).
    #[error("Error acquiring validator instance for tag {tag}: {message}")]
    FactoryFailed { tag: String, message: String },

    /// A validator composition was requested over zero tag uses.
    #[error("No constraint tags supplied")]
    NoTags,
}

impl RuntimeError {
    pub fn factory_failed(tag: impl Into<String>, message: impl Into<String>) -> Self {
        Self::FactoryFailed {
            tag: tag.into(),
            message: message.into(),
        }
    }
}
