/* src/server/core/rust/src/resolve.rs */

use crate::locale::{ALL, Locale};

/// Locale chain for a render request: explicit `lang`/`country` parameters,
/// then the highest-weighted `Accept-Language` tag, then `default`.
pub fn resolve_locale(
  lang: Option<&str>,
  country: Option<&str>,
  accept_language: Option<&str>,
  default: &Locale,
) -> Locale {
  let lang = lang.map(str::trim).filter(|s| !s.is_empty());
  let country = country.map(str::trim).filter(|s| !s.is_empty());

  if let Some(lang) = lang {
    return Locale::new(lang, country.unwrap_or(ALL));
  }
  if let Some(locale) = accept_language.and_then(parse_accept_language) {
    return locale;
  }
  default.clone()
}

/// First tag by q-value, split as `xx-YY` into language and country.
pub fn parse_accept_language(header: &str) -> Option<Locale> {
  let mut entries: Vec<(&str, f64)> = Vec::new();
  for part in header.split(',') {
    let part = part.trim();
    if part.is_empty() {
      continue;
    }
    let mut segments = part.split(';');
    let tag = segments.next().unwrap_or("").trim();
    let mut q = 1.0_f64;
    for s in segments {
      if let Some(val) = s.trim().strip_prefix("q=") {
        if let Ok(v) = val.parse::<f64>() {
          q = v;
        }
      }
    }
    if !tag.is_empty() && tag != "*" && q > 0.0 {
      entries.push((tag, q));
    }
  }

  // stable: equal weights keep header order
  entries.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(std::cmp::Ordering::Equal));

  let (tag, _) = entries.first()?;
  let mut parts = tag.split(['-', '_']);
  let language = parts.next().filter(|l| !l.is_empty())?.to_ascii_lowercase();
  let country = parts.next().map_or_else(|| ALL.to_string(), str::to_ascii_uppercase);
  Some(Locale::new(language, country))
}
