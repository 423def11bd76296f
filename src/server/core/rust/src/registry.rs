/* src/server/core/rust/src/registry.rs */

use std::collections::{BTreeMap, HashSet};

/// Outcome of asking a registry to expand feature names.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FeatureResolution {
  /// Requested features plus their transitive dependencies, dependencies first.
  pub found: Vec<String>,
  /// Requested or depended-upon names the registry does not know.
  pub missing: Vec<String>,
}

pub trait FeatureRegistry: Send + Sync {
  fn resolve_features(&self, names: &[String]) -> FeatureResolution;
}

/// In-memory registry: feature name -> names it depends on.
#[derive(Debug, Clone, Default)]
pub struct StaticFeatureRegistry {
  features: BTreeMap<String, Vec<String>>,
}

impl StaticFeatureRegistry {
  pub fn new(features: BTreeMap<String, Vec<String>>) -> Self {
    Self { features }
  }

  pub fn with_feature<I, S>(mut self, name: impl Into<String>, deps: I) -> Self
  where
    I: IntoIterator<Item = S>,
    S: Into<String>,
  {
    self.features.insert(name.into(), deps.into_iter().map(Into::into).collect());
    self
  }

  fn visit(
    &self,
    name: &str,
    seen: &mut HashSet<String>,
    resolution: &mut FeatureResolution,
  ) {
    if !seen.insert(name.to_string()) {
      return;
    }
    let Some(deps) = self.features.get(name) else {
      resolution.missing.push(name.to_string());
      return;
    };
    for dep in deps {
      self.visit(dep, seen, resolution);
    }
    resolution.found.push(name.to_string());
  }
}

impl FeatureRegistry for StaticFeatureRegistry {
  fn resolve_features(&self, names: &[String]) -> FeatureResolution {
    let mut seen = HashSet::new();
    let mut resolution = FeatureResolution::default();
    for name in names {
      self.visit(name, &mut seen, &mut resolution);
    }
    resolution
  }
}
