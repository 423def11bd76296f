/* src/server/core/rust/src/pipeline.rs */

use std::sync::Arc;

use tracing::{debug, info, instrument};

use crate::context::GadgetContext;
use crate::errors::GadgetError;
use crate::features::resolve_features;
use crate::fetch::{FetchRequest, SigningFetcherFactory};
use crate::gadget::Gadget;
use crate::locale::merge_locales;
use crate::preload::fetch_resources;
use crate::prefs::resolve_user_prefs;
use crate::spec::{GadgetSpec, SpecParser, XmlSpecParser};
use crate::substitution::{apply_substitutions, seed_substitutions};
use crate::token::SecurityToken;

/// Runs the assembly stages in order for one render request.
#[derive(Clone)]
pub struct GadgetAssembler {
  parser: Arc<dyn SpecParser>,
  signing: Option<SigningFetcherFactory>,
}

impl Default for GadgetAssembler {
  fn default() -> Self {
    Self::new(Arc::new(XmlSpecParser))
  }
}

impl GadgetAssembler {
  pub fn new(parser: Arc<dyn SpecParser>) -> Self {
    Self { parser, signing: None }
  }

  pub fn with_signing(mut self, signing: SigningFetcherFactory) -> Self {
    self.signing = Some(signing);
    self
  }

  pub fn signing(&self) -> Option<&SigningFetcherFactory> {
    self.signing.as_ref()
  }

  #[instrument(skip_all, fields(url = %ctx.url()))]
  pub async fn assemble(
    &self,
    ctx: &GadgetContext,
    token: Option<&SecurityToken>,
  ) -> Result<Gadget, GadgetError> {
    if ctx.blacklist().is_blacklisted(ctx.url()) {
      return Err(GadgetError::Blacklisted { url: ctx.url().to_string() });
    }

    let raw = self.fetch_definition(ctx).await?;
    let spec = self.parser.parse(&raw, ctx)?;
    debug!(
      locales = spec.locales.len(),
      preloads = spec.preloads.len(),
      prefs = spec.user_prefs.len(),
      "parsed gadget definition"
    );

    let spec = fetch_resources(ctx, token, self.signing.as_ref(), spec).await?;
    let spec = merge_spec_locales(ctx, spec);
    let spec = resolve_user_prefs(ctx.user_prefs(), spec);
    let substitutions = seed_substitutions(&spec, token);
    let spec = apply_substitutions(&substitutions, spec);
    let (spec, features) = resolve_features(ctx.registry(), spec)?;

    let right_to_left = spec.messages.as_ref().is_some_and(|m| m.direction.is_rtl());
    info!(features = features.len(), preloads = spec.preloads.len(), "assembled gadget");
    Ok(Gadget { spec, features, right_to_left, substitutions })
  }

  async fn fetch_definition(&self, ctx: &GadgetContext) -> Result<String, GadgetError> {
    let request = FetchRequest::new(ctx.url().clone()).ignore_cache(ctx.ignore_cache());
    let response = ctx.http_fetcher().fetch(&request).await?;
    if !response.is_ok() {
      return Err(GadgetError::Fetch {
        url: ctx.url().to_string(),
        status: Some(response.status),
      });
    }
    Ok(response.body)
  }
}

/// Collapse the fetched locale entries into the single merged bundle.
fn merge_spec_locales(ctx: &GadgetContext, mut spec: GadgetSpec) -> GadgetSpec {
  let locales = std::mem::take(&mut spec.locales);
  spec.messages = Some(merge_locales(ctx.locale(), &locales));
  spec
}

#[cfg(test)]
mod tests;
