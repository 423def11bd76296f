/* src/server/core/rust/src/features.rs */

use std::collections::BTreeSet;

use tracing::{debug, warn};

use crate::errors::GadgetError;
use crate::registry::FeatureRegistry;
use crate::spec::GadgetSpec;

/// Expand the spec's required and optional features through `registry`.
///
/// Any missing required feature is fatal and the error names every missing
/// feature. Missing optional features are dropped. On success the spec's
/// feature sets are emptied and the registry's `found` list is returned.
pub fn resolve_features(
  registry: &dyn FeatureRegistry,
  mut spec: GadgetSpec,
) -> Result<(GadgetSpec, Vec<String>), GadgetError> {
  let required = std::mem::take(&mut spec.required_features);
  let optional = std::mem::take(&mut spec.optional_features);
  let requested: Vec<String> = required.union(&optional).cloned().collect();

  let resolution = registry.resolve_features(&requested);
  if !resolution.missing.is_empty() {
    if missing_required(&required, &resolution.missing) {
      return Err(GadgetError::FeatureResolution { missing: resolution.missing });
    }
    warn!(missing = ?resolution.missing, "optional features unavailable");
  }

  debug!(features = ?resolution.found, "resolved features");
  Ok((spec, resolution.found))
}

fn missing_required(required: &BTreeSet<String>, missing: &[String]) -> bool {
  missing.iter().any(|name| required.contains(name))
}
