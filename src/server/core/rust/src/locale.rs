/* src/server/core/rust/src/locale.rs */

use std::collections::BTreeMap;

use serde::Serialize;
use tracing::debug;

/// Language/country value matching any tag.
pub const ALL: &str = "all";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Locale {
  pub language: String,
  pub country: String,
}

impl Locale {
  pub fn new(language: impl Into<String>, country: impl Into<String>) -> Self {
    Self { language: language.into(), country: country.into() }
  }

  pub fn all() -> Self {
    Self::new(ALL, ALL)
  }
}

impl Default for Locale {
  fn default() -> Self {
    Self::all()
  }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
  #[default]
  Ltr,
  Rtl,
}

impl Direction {
  /// Anything other than an exact (case-insensitive) `rtl` reads as left-to-right.
  pub fn parse(raw: &str) -> Self {
    if raw.trim().eq_ignore_ascii_case("rtl") { Direction::Rtl } else { Direction::Ltr }
  }

  pub fn is_rtl(self) -> bool {
    self == Direction::Rtl
  }
}

pub type MessageBundle = BTreeMap<String, String>;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "value", rename_all = "lowercase")]
pub enum MessageSource {
  /// Messages declared in the spec itself, or a fetched and decoded remote bundle.
  Inline(MessageBundle),
  /// Reference to a remote bundle, possibly relative to the gadget URL.
  Remote(String),
  /// No bundle: none declared, or the remote fetch did not succeed.
  Missing,
}

impl MessageSource {
  pub fn bundle(&self) -> Option<&MessageBundle> {
    match self {
      MessageSource::Inline(bundle) => Some(bundle),
      _ => None,
    }
  }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LocaleEntry {
  pub language: String,
  pub country: String,
  pub direction: Direction,
  pub messages: MessageSource,
}

/// How specifically a locale entry matches the request locale.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Specificity {
  /// `all` / `all`
  All,
  /// Same language, country `all`
  Partial,
  /// Same language and country
  Full,
}

/// Classify `entry` against `target`. `None` means the entry does not apply.
/// When the target itself is `all`/`all`, an `all`/`all` entry is a full match.
pub fn specificity(target: &Locale, language: &str, country: &str) -> Option<Specificity> {
  if language == target.language && country == target.country {
    Some(Specificity::Full)
  } else if language == target.language && country == ALL {
    Some(Specificity::Partial)
  } else if language == ALL && country == ALL {
    Some(Specificity::All)
  } else {
    None
  }
}

impl LocaleEntry {
  pub fn specificity(&self, target: &Locale) -> Option<Specificity> {
    specificity(target, &self.language, &self.country)
  }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct MergedLocale {
  pub messages: MessageBundle,
  pub direction: Direction,
}

/// Merge every applicable bundle into one. Precedence on key collision is
/// full > partial > all; direction comes from the full match only.
pub fn merge_locales(target: &Locale, entries: &[LocaleEntry]) -> MergedLocale {
  let mut tiers: [Vec<&LocaleEntry>; 3] = [Vec::new(), Vec::new(), Vec::new()];
  for entry in entries {
    if let Some(tier) = entry.specificity(target) {
      tiers[tier as usize].push(entry);
    }
  }

  // Lowest tier first so higher tiers overwrite; within a tier the first
  // declared entry wins, hence the reverse walk.
  let mut merged = MergedLocale::default();
  for tier in &tiers {
    for entry in tier.iter().rev() {
      if let Some(bundle) = entry.messages.bundle() {
        merged.messages.extend(bundle.iter().map(|(k, v)| (k.clone(), v.clone())));
      }
    }
  }
  if let Some(full) = tiers[Specificity::Full as usize].first() {
    merged.direction = full.direction;
  }

  debug!(
    language = %target.language,
    country = %target.country,
    keys = merged.messages.len(),
    rtl = merged.direction.is_rtl(),
    "merged locale bundles"
  );
  merged
}
