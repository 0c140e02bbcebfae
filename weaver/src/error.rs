//! Weaving error types.
//!
//! Configuration errors (unresolved markers) and authoring/consistency
//! errors (ambiguous or malformed rewrite points) are fatal for the unit
//! being woven; the batch driver treats them as that unit's failure and
//! continues with other units. They are never retried.

use tagweave_core::Label;
use thiserror::Error;

/// Result type for weaving operations.
pub type WeaveResult<T> = Result<T, WeaveError>;

/// Errors that can occur while weaving one unit.
#[derive(Debug, Error)]
pub enum WeaveError {
    /// A metadata entry references a marker type the registry cannot resolve.
    #[error("Unable to resolve marker type \"{0}\"")]
    UnresolvedMarker(String),

    /// Two eligible annotations target the same instruction location.
    #[error("Duplicate weave site at {label} in method {method}")]
    DuplicateWeaveSite { method: String, label: Label },

    /// A second weave site arrived before the first was consumed; a bug in
    /// the emitting toolchain (or an attempt to weave twice).
    #[error("Unexpected overlapping weave site at {label} in method {method}")]
    PendingSiteOverlap { method: String, label: Label },

    /// The instruction at a declared type-test location is not a type test.
    #[error("Unexpected instruction at type-test site {label} in method {method}")]
    UnexpectedInstruction { method: String, label: Label },

    /// A weave site's label is the last element of the stream, so there is
    /// no instruction to weave around.
    #[error("Weave site at {label} in method {method} is not followed by an instruction")]
    DanglingWeaveSite { method: String, label: Label },

    /// A method with pending weave sites already contains call-outs, so it
    /// was woven before. Weaving must happen exactly once per unit.
    #[error("Method {0} was already woven")]
    AlreadyWoven(String),

    /// Artifact file could not be read or written.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Artifact bytes are not a valid compiled unit.
    #[error("Malformed unit artifact: {0}")]
    Format(#[from] serde_json::Error),
}
