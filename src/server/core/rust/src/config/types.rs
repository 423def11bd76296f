/* src/server/core/rust/src/config/types.rs */

use std::collections::BTreeMap;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result, bail};
use serde::Deserialize;

use crate::context::PatternBlacklist;
use crate::fetch::{KeySource, ReqwestFetcher, SigningFetcherFactory};
use crate::locale::{ALL, Locale};
use crate::registry::StaticFeatureRegistry;

#[derive(Debug, Clone, Default, Deserialize)]
pub struct GadgetConfig {
  #[serde(default)]
  pub server: ServerSection,
  #[serde(default)]
  pub fetch: FetchSection,
  #[serde(default)]
  pub signing: Option<SigningSection>,
  #[serde(default)]
  pub blacklist: BlacklistSection,
  /// Feature name -> names it depends on.
  #[serde(default)]
  pub features: BTreeMap<String, Vec<String>>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerSection {
  #[serde(default = "default_bind")]
  pub bind: String,
  #[serde(default = "default_locale_part")]
  pub default_language: String,
  #[serde(default = "default_locale_part")]
  pub default_country: String,
}

impl Default for ServerSection {
  fn default() -> Self {
    Self {
      bind: default_bind(),
      default_language: default_locale_part(),
      default_country: default_locale_part(),
    }
  }
}

fn default_bind() -> String {
  "0.0.0.0:8080".to_string()
}

fn default_locale_part() -> String {
  ALL.to_string()
}

#[derive(Debug, Clone, Deserialize)]
pub struct FetchSection {
  #[serde(default = "default_timeout_secs")]
  pub timeout_secs: u64,
  #[serde(default = "default_user_agent")]
  pub user_agent: String,
}

impl Default for FetchSection {
  fn default() -> Self {
    Self { timeout_secs: default_timeout_secs(), user_agent: default_user_agent() }
  }
}

fn default_timeout_secs() -> u64 {
  10
}

fn default_user_agent() -> String {
  concat!("gadget-server/", env!("CARGO_PKG_VERSION")).to_string()
}

#[derive(Debug, Clone, Deserialize)]
pub struct SigningSection {
  pub key_name: String,
  pub key: Option<String>,
  /// Relative paths resolve against the config file's directory.
  pub key_file: Option<String>,
}

impl SigningSection {
  pub fn validate(&self) -> Result<()> {
    if self.key_name.trim().is_empty() {
      bail!("signing.key_name must not be empty");
    }
    match (&self.key, &self.key_file) {
      (Some(_), Some(_)) => bail!("signing: set only one of key and key_file"),
      (None, None) => bail!("signing: one of key or key_file is required"),
      _ => Ok(()),
    }
  }

  pub fn key_source(&self, base_dir: &Path) -> Result<KeySource> {
    match (&self.key, &self.key_file) {
      (Some(key), None) => Ok(KeySource::Inline(key.clone())),
      (None, Some(file)) => Ok(KeySource::File(base_dir.join(file))),
      _ => {
        self.validate()?;
        bail!("signing: invalid key configuration")
      }
    }
  }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct BlacklistSection {
  #[serde(default)]
  pub patterns: Vec<String>,
}

impl GadgetConfig {
  /// Reject configs the server could not start with.
  pub fn validate(&self) -> Result<()> {
    if let Some(ref signing) = self.signing {
      signing.validate()?;
    }
    self.pattern_blacklist()?;
    for (name, deps) in &self.features {
      if let Some(dep) = deps.iter().find(|d| !self.features.contains_key(*d)) {
        bail!("feature \"{name}\" depends on undeclared feature \"{dep}\"");
      }
    }
    if self.fetch.timeout_secs == 0 {
      bail!("fetch.timeout_secs must be greater than zero");
    }
    Ok(())
  }

  pub fn default_locale(&self) -> Locale {
    Locale::new(&self.server.default_language, &self.server.default_country)
  }

  pub fn http_fetcher(&self) -> Result<ReqwestFetcher> {
    ReqwestFetcher::new(Duration::from_secs(self.fetch.timeout_secs), &self.fetch.user_agent)
      .context("failed to build HTTP client")
  }

  pub fn pattern_blacklist(&self) -> Result<PatternBlacklist> {
    PatternBlacklist::new(&self.blacklist.patterns).context("invalid blacklist pattern")
  }

  pub fn feature_registry(&self) -> Arc<StaticFeatureRegistry> {
    Arc::new(StaticFeatureRegistry::new(self.features.clone()))
  }

  /// `None` when no `[signing]` section is present.
  pub fn signing_factory(&self, base_dir: &Path) -> Result<Option<SigningFetcherFactory>> {
    let Some(ref signing) = self.signing else {
      return Ok(None);
    };
    let source = signing.key_source(base_dir)?;
    let factory = SigningFetcherFactory::from_key_source(&signing.key_name, &source)
      .context("failed to load signing key")?;
    Ok(Some(factory))
  }
}
