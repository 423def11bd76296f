/* src/server/core/rust/src/gadget.rs */

use gadget_injector::Substitutions;
use serde::Serialize;

use crate::spec::GadgetSpec;

/// A fully assembled gadget, ready for an external renderer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Gadget {
  pub spec: GadgetSpec,
  /// Resolved features, dependencies first.
  pub features: Vec<String>,
  pub right_to_left: bool,
  pub substitutions: Substitutions,
}

impl Gadget {
  /// Message text from the merged bundle.
  pub fn message(&self, key: &str) -> Option<&str> {
    self.spec.messages.as_ref()?.messages.get(key).map(String::as_str)
  }

  /// Preload payload by its id.
  pub fn preload(&self, id: &str) -> Option<&str> {
    self.spec.preloads.iter().find(|p| p.id() == id)?.body.as_deref()
  }
}
