/* src/server/core/rust/src/server.rs */

use std::sync::Arc;

use crate::context::{Blacklist, PatternBlacklist};
use crate::fetch::{HttpFetcher, SigningFetcherFactory};
use crate::locale::Locale;
use crate::pipeline::GadgetAssembler;
use crate::registry::{FeatureRegistry, StaticFeatureRegistry};
use crate::spec::SpecParser;
use crate::token::{PlainTokenDecoder, SecurityTokenDecoder};

/// Framework-agnostic parts extracted from `GadgetServer`.
/// Adapter crates consume this to build framework-specific routers.
#[derive(Clone)]
pub struct GadgetParts {
  pub assembler: GadgetAssembler,
  pub fetcher: Arc<dyn HttpFetcher>,
  pub registry: Arc<dyn FeatureRegistry>,
  pub blacklist: Arc<dyn Blacklist>,
  pub token_decoder: Arc<dyn SecurityTokenDecoder>,
  pub default_locale: Locale,
}

pub struct GadgetServer {
  fetcher: Arc<dyn HttpFetcher>,
  parser: Option<Arc<dyn SpecParser>>,
  registry: Arc<dyn FeatureRegistry>,
  blacklist: Arc<dyn Blacklist>,
  token_decoder: Arc<dyn SecurityTokenDecoder>,
  signing: Option<SigningFetcherFactory>,
  default_locale: Locale,
}

impl GadgetServer {
  pub fn new(fetcher: Arc<dyn HttpFetcher>) -> Self {
    Self {
      fetcher,
      parser: None,
      registry: Arc::new(StaticFeatureRegistry::default()),
      blacklist: Arc::new(PatternBlacklist::default()),
      token_decoder: Arc::new(PlainTokenDecoder),
      signing: None,
      default_locale: Locale::all(),
    }
  }

  pub fn parser(mut self, parser: Arc<dyn SpecParser>) -> Self {
    self.parser = Some(parser);
    self
  }

  pub fn registry(mut self, registry: Arc<dyn FeatureRegistry>) -> Self {
    self.registry = registry;
    self
  }

  pub fn blacklist(mut self, blacklist: Arc<dyn Blacklist>) -> Self {
    self.blacklist = blacklist;
    self
  }

  pub fn token_decoder(mut self, decoder: Arc<dyn SecurityTokenDecoder>) -> Self {
    self.token_decoder = decoder;
    self
  }

  pub fn signing(mut self, signing: SigningFetcherFactory) -> Self {
    self.signing = Some(signing);
    self
  }

  pub fn default_locale(mut self, locale: Locale) -> Self {
    self.default_locale = locale;
    self
  }

  /// Consume the builder, returning framework-agnostic parts for an adapter.
  pub fn into_parts(self) -> GadgetParts {
    let mut assembler = match self.parser {
      Some(parser) => GadgetAssembler::new(parser),
      None => GadgetAssembler::default(),
    };
    if let Some(signing) = self.signing {
      assembler = assembler.with_signing(signing);
    }
    GadgetParts {
      assembler,
      fetcher: self.fetcher,
      registry: self.registry,
      blacklist: self.blacklist,
      token_decoder: self.token_decoder,
      default_locale: self.default_locale,
    }
  }
}
