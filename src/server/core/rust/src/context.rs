/* src/server/core/rust/src/context.rs */

use std::collections::HashMap;
use std::sync::Arc;

use regex::Regex;
use url::Url;

use crate::fetch::HttpFetcher;
use crate::locale::Locale;
use crate::registry::FeatureRegistry;

pub trait Blacklist: Send + Sync {
  fn is_blacklisted(&self, url: &Url) -> bool;
}

/// Blacklist that rejects any gadget URL matching one of its patterns.
#[derive(Debug, Clone, Default)]
pub struct PatternBlacklist {
  patterns: Vec<Regex>,
}

impl PatternBlacklist {
  pub fn new<S: AsRef<str>>(patterns: &[S]) -> Result<Self, regex::Error> {
    let patterns = patterns.iter().map(|p| Regex::new(p.as_ref())).collect::<Result<_, _>>()?;
    Ok(Self { patterns })
  }
}

impl Blacklist for PatternBlacklist {
  fn is_blacklisted(&self, url: &Url) -> bool {
    self.patterns.iter().any(|re| re.is_match(url.as_str()))
  }
}

/// Everything one assembly may consult about the incoming render request.
#[derive(Clone)]
pub struct GadgetContext {
  url: Url,
  locale: Locale,
  ignore_cache: bool,
  /// Request-time preference overrides, keyed by preference name (without `up_`).
  user_prefs: HashMap<String, String>,
  blacklist: Arc<dyn Blacklist>,
  registry: Arc<dyn FeatureRegistry>,
  fetcher: Arc<dyn HttpFetcher>,
}

impl GadgetContext {
  pub fn new(url: Url, fetcher: Arc<dyn HttpFetcher>, registry: Arc<dyn FeatureRegistry>) -> Self {
    Self {
      url,
      locale: Locale::default(),
      ignore_cache: false,
      user_prefs: HashMap::new(),
      blacklist: Arc::new(PatternBlacklist::default()),
      registry,
      fetcher,
    }
  }

  pub fn with_locale(mut self, locale: Locale) -> Self {
    self.locale = locale;
    self
  }

  pub fn with_ignore_cache(mut self, ignore_cache: bool) -> Self {
    self.ignore_cache = ignore_cache;
    self
  }

  pub fn with_user_pref(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
    self.user_prefs.insert(name.into(), value.into());
    self
  }

  pub fn with_user_prefs(mut self, prefs: HashMap<String, String>) -> Self {
    self.user_prefs.extend(prefs);
    self
  }

  pub fn with_blacklist(mut self, blacklist: Arc<dyn Blacklist>) -> Self {
    self.blacklist = blacklist;
    self
  }

  pub fn url(&self) -> &Url {
    &self.url
  }

  pub fn locale(&self) -> &Locale {
    &self.locale
  }

  pub fn ignore_cache(&self) -> bool {
    self.ignore_cache
  }

  pub fn user_prefs(&self) -> &HashMap<String, String> {
    &self.user_prefs
  }

  pub fn blacklist(&self) -> &dyn Blacklist {
    self.blacklist.as_ref()
  }

  pub fn registry(&self) -> &dyn FeatureRegistry {
    self.registry.as_ref()
  }

  pub fn http_fetcher(&self) -> Arc<dyn HttpFetcher> {
    Arc::clone(&self.fetcher)
  }

  /// Resolve `reference` against the gadget URL. Only http(s) results count.
  pub fn absolute_url(&self, reference: &str) -> Option<Url> {
    let resolved = self.url.join(reference.trim()).ok()?;
    matches!(resolved.scheme(), "http" | "https").then_some(resolved)
  }
}
