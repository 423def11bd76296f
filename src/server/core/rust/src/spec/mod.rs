/* src/server/core/rust/src/spec/mod.rs */

// Parsed gadget definition and the records each pipeline stage rewrites.

mod parser;

#[cfg(test)]
mod tests;

use std::collections::BTreeSet;

use serde::Serialize;

use crate::locale::{LocaleEntry, MergedLocale};

pub use parser::{SpecParser, XmlSpecParser};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum AuthzMode {
  #[default]
  None,
  Signed,
}

impl AuthzMode {
  /// Only an exact (case-insensitive) `signed` selects signing.
  pub fn parse(raw: &str) -> Self {
    if raw.trim().eq_ignore_ascii_case("signed") { AuthzMode::Signed } else { AuthzMode::None }
  }
}

/// Sign flags default to on; only a literal `false` (any case) turns one off.
pub fn parse_sign_flag(raw: Option<&str>) -> bool {
  !raw.is_some_and(|v| v.eq_ignore_ascii_case("false"))
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Preload {
  pub href: String,
  pub authz: AuthzMode,
  pub sign_viewer: bool,
  pub sign_owner: bool,
  /// Filled in once fetched; unfetched preloads never survive the fetch stage.
  pub body: Option<String>,
  pub status: Option<u16>,
}

impl Preload {
  pub fn new(href: impl Into<String>) -> Self {
    Self {
      href: href.into(),
      authz: AuthzMode::None,
      sign_viewer: true,
      sign_owner: true,
      body: None,
      status: None,
    }
  }

  /// Id the renderer uses to look the payload up.
  pub fn id(&self) -> &str {
    &self.href
  }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EnumValue {
  pub value: String,
  pub display_value: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct UserPref {
  pub name: String,
  pub display_name: String,
  /// Raw attribute text; substitution may rewrite it like any other field.
  pub required: String,
  pub datatype: String,
  pub default_value: String,
  /// Set once by the preference stage, from the request override or the default.
  pub value: Option<String>,
  pub enum_values: Vec<EnumValue>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TemplateLibrary {
  pub url: String,
  pub body: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct View {
  pub name: String,
  pub content_type: String,
  pub href: Option<String>,
  pub body: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct GadgetSpec {
  pub title: String,
  /// Consumed by feature resolution; empty afterwards.
  pub required_features: BTreeSet<String>,
  pub optional_features: BTreeSet<String>,
  /// Consumed by the locale merge; empty afterwards.
  pub locales: Vec<LocaleEntry>,
  /// The single merged bundle, present once locales are merged.
  pub messages: Option<MergedLocale>,
  pub user_prefs: Vec<UserPref>,
  pub preloads: Vec<Preload>,
  pub template_libraries: Vec<TemplateLibrary>,
  pub views: Vec<View>,
}
