//! The weaver entry points.

use crate::rewriter::rewrite_unit;
use crate::{WeaveConfig, WeaveResult};
use std::fs;
use std::path::Path;
use tagweave_core::CompiledUnit;

/// Weaves runtime checks into compiled units.
///
/// One instance serves any number of units; weaving shares no mutable state
/// across invocations, so a batch driver may fan calls out over a worker
/// pool, one unit per task, and collect per-unit results.
pub struct Weaver {
    config: WeaveConfig,
}

impl Weaver {
    /// Create a weaver from a config.
    pub fn new(config: WeaveConfig) -> Self {
        Self { config }
    }

    /// The config associated with this instance.
    pub fn config(&self) -> &WeaveConfig {
        &self.config
    }

    /// Weave runtime checks into one unit, producing the transformed unit.
    ///
    /// Methods with no eligible weave sites come back unchanged. A
    /// configuration or consistency error aborts this unit only.
    pub fn rewrite(&self, unit: &CompiledUnit) -> WeaveResult<CompiledUnit> {
        rewrite_unit(unit, &self.config)
    }

    /// Weave runtime checks into the unit artifact at `path`, overwriting
    /// the file in place.
    pub fn weave_file(&self, path: impl AsRef<Path>) -> WeaveResult<()> {
        let path = path.as_ref();
        let input: CompiledUnit = serde_json::from_slice(&fs::read(path)?)?;
        let output = self.rewrite(&input)?;
        fs::write(path, serde_json::to_vec(&output)?)?;
        Ok(())
    }
}
