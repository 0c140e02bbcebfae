//! Location scanning.
//!
//! Extracts the weave sites of one method: every cast or type-test
//! instruction whose location-tagged metadata names an eligible constraint
//! tag. Eligibility (resolved, declared as a tag, admitted by the filter)
//! requires registry resolution, so the determination is memoized per marker
//! name for the lifetime of one scan.

use crate::{WeaveConfig, WeaveError, WeaveResult};
use std::collections::HashMap;
use tagweave_core::{AnnotationTarget, Label, MethodBody, TagParams};
use tagweave_registry::TagId;

/// The operation kind at a weave site.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WeaveKind {
    Cast,
    TypeTest,
}

/// A resolved (location, tag, operation-kind) triple for one method.
#[derive(Debug, Clone)]
pub struct WeaveSite {
    pub tag: TagId,
    /// Marker name, baked into the emitted call-out.
    pub marker: String,
    pub kind: WeaveKind,
    pub params: TagParams,
}

/// Scan one method, producing its location → weave-site map.
///
/// Both visible and invisible retention classes are scanned identically;
/// target kinds other than cast and type-test are ignored. Two eligible
/// annotations targeting the same location are a fatal authoring error.
pub(crate) fn scan_method(
    method: &MethodBody,
    config: &WeaveConfig,
) -> WeaveResult<HashMap<Label, WeaveSite>> {
    let mut sites: HashMap<Label, WeaveSite> = HashMap::new();
    // Scan-local eligibility memo: marker name -> Some(tag) if weavable.
    let mut decisions: HashMap<String, Option<TagId>> = HashMap::new();

    for annotation in &method.annotations {
        let (kind, label) = match &annotation.target {
            AnnotationTarget::Cast(l) => (WeaveKind::Cast, *l),
            AnnotationTarget::TypeTest(l) => (WeaveKind::TypeTest, *l),
            AnnotationTarget::Other(_, _) => continue,
        };

        let tag = match decide(&mut decisions, &annotation.marker, config)? {
            Some(tag) => tag,
            None => continue,
        };

        let site = WeaveSite {
            tag,
            marker: annotation.marker.clone(),
            kind,
            params: annotation.params.clone(),
        };
        if sites.insert(label, site).is_some() {
            return Err(WeaveError::DuplicateWeaveSite {
                method: method.name.clone(),
                label,
            });
        }
    }

    Ok(sites)
}

fn decide(
    decisions: &mut HashMap<String, Option<TagId>>,
    marker: &str,
    config: &WeaveConfig,
) -> WeaveResult<Option<TagId>> {
    if let Some(decision) = decisions.get(marker) {
        return Ok(*decision);
    }
    let decision = match config.registry().marker_by_name(marker) {
        None => return Err(WeaveError::UnresolvedMarker(marker.to_string())),
        Some(def) if !def.is_tag() => None,
        Some(_) if !config.admits(marker) => None,
        Some(_) => config.registry().marker_id(marker),
    };
    decisions.insert(marker.to_string(), decision);
    Ok(decision)
}
