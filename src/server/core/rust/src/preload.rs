/* src/server/core/rust/src/preload.rs */

use tracing::{debug, warn};

use crate::context::GadgetContext;
use crate::errors::GadgetError;
use crate::fetch::{FetchRequest, ResponseTable, SigningFetcherFactory, multi_fetch};
use crate::locale::{LocaleEntry, MessageSource};
use crate::messages::parse_message_bundle;
use crate::spec::{AuthzMode, GadgetSpec, Preload, TemplateLibrary};
use crate::token::SecurityToken;

const SIGNED_ID_PREFIX: &str = "signed:";

/// Requests split by how they must travel.
#[derive(Debug, Default)]
pub struct FetchPlan {
  pub signed: Vec<FetchRequest>,
  pub unsigned: Vec<FetchRequest>,
}

impl FetchPlan {
  pub fn is_empty(&self) -> bool {
    self.signed.is_empty() && self.unsigned.is_empty()
  }
}

/// Keep only locales that apply to the request, with remote bundle references
/// made absolute. Entries whose reference cannot be resolved are dropped.
fn applicable_locales(ctx: &GadgetContext, locales: Vec<LocaleEntry>) -> Vec<LocaleEntry> {
  let target = ctx.locale();
  locales
    .into_iter()
    .filter(|entry| entry.specificity(target).is_some())
    .filter_map(|mut entry| {
      if let MessageSource::Remote(href) = &entry.messages {
        let Some(url) = ctx.absolute_url(href) else {
          warn!(href = %href, "dropping locale with unresolvable message bundle");
          return None;
        };
        entry.messages = MessageSource::Remote(url.to_string());
      }
      Some(entry)
    })
    .collect()
}

/// Build both batches. Fails before anything is fetched when a signed
/// preload cannot be signed.
pub fn plan_fetches(
  ctx: &GadgetContext,
  token: Option<&SecurityToken>,
  signing: Option<&SigningFetcherFactory>,
  spec: &GadgetSpec,
) -> Result<FetchPlan, GadgetError> {
  let mut plan = FetchPlan::default();
  let ignore_cache = ctx.ignore_cache();

  for entry in &spec.locales {
    if let MessageSource::Remote(href) = &entry.messages {
      if let Some(url) = ctx.absolute_url(href) {
        plan.unsigned.push(with_id(FetchRequest::new(url).ignore_cache(ignore_cache), href));
      }
    }
  }

  for preload in &spec.preloads {
    let signed = preload.authz == AuthzMode::Signed;
    if signed {
      if token.is_none() {
        return Err(GadgetError::SecurityToken { href: preload.href.clone() });
      }
      if signing.is_none() {
        return Err(GadgetError::Signing(format!(
          "no signing key configured for signed preload {}",
          preload.href
        )));
      }
    }
    let Some(url) = ctx.absolute_url(&preload.href) else {
      warn!(href = %preload.href, "dropping preload with unresolvable href");
      continue;
    };
    let request =
      with_id(FetchRequest::new(url).ignore_cache(ignore_cache), &preload_request_id(preload));
    if signed {
      plan.signed.push(request.signed(preload.sign_viewer, preload.sign_owner));
    } else {
      plan.unsigned.push(request);
    }
  }

  for library in &spec.template_libraries {
    match ctx.absolute_url(&library.url) {
      Some(url) => {
        plan.unsigned.push(with_id(FetchRequest::new(url).ignore_cache(ignore_cache), &library.url))
      }
      None => warn!(url = %library.url, "dropping unresolvable template library"),
    }
  }

  Ok(plan)
}

/// Table key for a preload. Signed responses carry the viewer's identity, so
/// they never share a key with an unsigned fetch of the same URL.
fn preload_request_id(preload: &Preload) -> String {
  match preload.authz {
    AuthzMode::Signed => format!("{SIGNED_ID_PREFIX}{}", preload.href),
    AuthzMode::None => preload.href.clone(),
  }
}

fn with_id(mut request: FetchRequest, id: &str) -> FetchRequest {
  request.id = id.to_string();
  request
}

/// Run both batches. Signed requests go through a signing fetcher built for
/// `token`. Signed ids are prefixed, so the two tables merge without collisions.
pub async fn execute_plan(
  ctx: &GadgetContext,
  token: Option<&SecurityToken>,
  signing: Option<&SigningFetcherFactory>,
  plan: FetchPlan,
) -> Result<ResponseTable, GadgetError> {
  let FetchPlan { signed, unsigned } = plan;
  let unsigned_fetcher = ctx.http_fetcher();
  let signed_fetcher = if signed.is_empty() {
    None
  } else {
    let (Some(token), Some(signing)) = (token, signing) else {
      return Err(GadgetError::Internal("signed batch planned without token or signing key".into()));
    };
    Some(signing.fetcher(ctx.http_fetcher(), token))
  };

  debug!(signed = signed.len(), unsigned = unsigned.len(), "fetching gadget resources");
  let (mut table, signed_table) = tokio::try_join!(multi_fetch(unsigned_fetcher, unsigned), async {
    match signed_fetcher {
      Some(fetcher) => multi_fetch(fetcher, signed).await,
      None => Ok(ResponseTable::default()),
    }
  })?;
  table.extend(signed_table);
  Ok(table)
}

/// Write fetched bodies back into the spec: decoded bundles for locales,
/// successful preloads and template libraries only.
pub fn apply_responses(
  mut spec: GadgetSpec,
  responses: &ResponseTable,
) -> Result<GadgetSpec, GadgetError> {
  for entry in &mut spec.locales {
    if let MessageSource::Remote(url) = &entry.messages {
      entry.messages = match responses.ok(url) {
        Some(response) => MessageSource::Inline(parse_message_bundle(&response.body)?),
        None => {
          warn!(url = %url, "message bundle unavailable");
          MessageSource::Missing
        }
      };
    }
  }

  spec.preloads = std::mem::take(&mut spec.preloads)
    .into_iter()
    .filter_map(|preload| {
      let response = responses.ok(&preload_request_id(&preload))?;
      Some(Preload { body: Some(response.body.clone()), status: Some(response.status), ..preload })
    })
    .collect();

  spec.template_libraries = std::mem::take(&mut spec.template_libraries)
    .into_iter()
    .filter_map(|library| {
      let response = responses.ok(&library.url)?;
      Some(TemplateLibrary { body: Some(response.body.clone()), ..library })
    })
    .collect();

  Ok(spec)
}

/// Fetch every remote resource the spec references and fold the results in.
pub async fn fetch_resources(
  ctx: &GadgetContext,
  token: Option<&SecurityToken>,
  signing: Option<&SigningFetcherFactory>,
  mut spec: GadgetSpec,
) -> Result<GadgetSpec, GadgetError> {
  spec.locales = applicable_locales(ctx, std::mem::take(&mut spec.locales));
  let plan = plan_fetches(ctx, token, signing, &spec)?;
  let responses = if plan.is_empty() {
    ResponseTable::default()
  } else {
    execute_plan(ctx, token, signing, plan).await?
  };
  apply_responses(spec, &responses)
}
