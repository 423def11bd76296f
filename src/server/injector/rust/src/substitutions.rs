/* src/server/injector/rust/src/substitutions.rs */

use std::collections::BTreeMap;

use serde::Serialize;

use crate::token::{Token, tokenize};

/// Substitution namespaces recognised inside `__NS_KEY__` markers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub enum Namespace {
  #[serde(rename = "MSG")]
  Message,
  #[serde(rename = "UP")]
  UserPref,
  #[serde(rename = "MODULE")]
  Module,
  #[serde(rename = "BIDI")]
  Bidi,
}

impl Namespace {
  pub const ALL: [Namespace; 4] =
    [Namespace::Message, Namespace::UserPref, Namespace::Module, Namespace::Bidi];

  pub fn prefix(self) -> &'static str {
    match self {
      Namespace::Message => "MSG",
      Namespace::UserPref => "UP",
      Namespace::Module => "MODULE",
      Namespace::Bidi => "BIDI",
    }
  }
}

/// Per-assembly substitution table. Seeded once, then only read.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct Substitutions {
  entries: BTreeMap<Namespace, BTreeMap<String, String>>,
}

impl Substitutions {
  pub fn new() -> Self {
    Self::default()
  }

  pub fn add_substitution(
    &mut self,
    namespace: Namespace,
    key: impl Into<String>,
    value: impl Into<String>,
  ) {
    self.entries.entry(namespace).or_default().insert(key.into(), value.into());
  }

  pub fn add_substitutions<K, V>(
    &mut self,
    namespace: Namespace,
    values: impl IntoIterator<Item = (K, V)>,
  ) where
    K: Into<String>,
    V: Into<String>,
  {
    let table = self.entries.entry(namespace).or_default();
    for (key, value) in values {
      table.insert(key.into(), value.into());
    }
  }

  pub fn get(&self, namespace: Namespace, key: &str) -> Option<&str> {
    self.entries.get(&namespace)?.get(key).map(String::as_str)
  }

  pub fn is_empty(&self) -> bool {
    self.entries.values().all(BTreeMap::is_empty)
  }

  /// Replace every known `__NS_KEY__` marker in `text`.
  /// Unknown markers are kept verbatim and replacement values are not rescanned.
  pub fn substitute(&self, text: &str) -> String {
    let tokens = tokenize(text);
    let mut out = String::with_capacity(text.len());
    for token in tokens {
      match token {
        Token::Text(s) => out.push_str(s),
        Token::Marker { namespace, key, raw } => {
          out.push_str(self.get(namespace, key).unwrap_or(raw));
        }
      }
    }
    out
  }
}
