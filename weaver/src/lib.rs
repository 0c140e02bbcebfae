//! Tagweave Weaver
//!
//! Statically instruments compiled units so that constraint tags attached to
//! cast and type-test instructions are checked at run time.
//!
//! Responsibilities:
//! - Scan method metadata for eligible weave sites
//! - Rewrite instruction streams, inserting validation call-outs while
//!   preserving stack shape and control-flow targets
//! - Read and overwrite unit artifacts in place
//!
//! Instances are thread safe: weaving shares no mutable state across
//! method-level invocations, so many units may be rewritten concurrently.

mod config;
mod error;
mod rewriter;
mod scanner;
mod weaver;

pub use config::WeaveConfig;
pub use error::{WeaveError, WeaveResult};
pub use scanner::{WeaveKind, WeaveSite};
pub use weaver::Weaver;
