/* src/server/adapter/axum/src/handler.rs */

use std::collections::HashMap;
use std::sync::Arc;

use axum::Router;
use axum::extract::{Query, State};
use axum::http::HeaderMap;
use axum::http::header::ACCEPT_LANGUAGE;
use axum::routing::get;
use gadget_server::{GadgetContext, GadgetError, GadgetParts, resolve_locale, user_prefs_from_params};
use url::Url;

use crate::error::AxumError;

pub(crate) const RENDER_ROUTE: &str = "/gadgets/render";

pub(crate) type AppState = GadgetParts;

pub(crate) fn build_router(parts: GadgetParts) -> Router {
  Router::new().route(RENDER_ROUTE, get(handle_render)).with_state(Arc::new(parts))
}

fn param<'a>(params: &'a HashMap<String, String>, name: &str) -> Option<&'a str> {
  params.get(name).map(String::as_str).filter(|v| !v.is_empty())
}

/// Build the per-request context from query parameters and headers.
fn request_context(
  state: &AppState,
  params: &HashMap<String, String>,
  headers: &HeaderMap,
) -> Result<GadgetContext, GadgetError> {
  let raw_url =
    param(params, "url").ok_or_else(|| GadgetError::BadRequest("missing url parameter".into()))?;
  let url =
    Url::parse(raw_url).map_err(|e| GadgetError::BadRequest(format!("invalid url {raw_url}: {e}")))?;
  if !matches!(url.scheme(), "http" | "https") {
    return Err(GadgetError::BadRequest(format!("unsupported scheme in {raw_url}")));
  }

  let accept_language = headers.get(ACCEPT_LANGUAGE).and_then(|v| v.to_str().ok());
  let locale = resolve_locale(
    param(params, "lang"),
    param(params, "country"),
    accept_language,
    &state.default_locale,
  );

  Ok(
    GadgetContext::new(url, Arc::clone(&state.fetcher), Arc::clone(&state.registry))
      .with_blacklist(Arc::clone(&state.blacklist))
      .with_locale(locale)
      .with_ignore_cache(param(params, "nocache") == Some("1"))
      .with_user_prefs(user_prefs_from_params(params)),
  )
}

pub(super) async fn handle_render(
  State(state): State<Arc<AppState>>,
  Query(params): Query<HashMap<String, String>>,
  headers: HeaderMap,
) -> Result<axum::Json<serde_json::Value>, AxumError> {
  let ctx = request_context(&state, &params, &headers)?;
  let token = param(&params, "st").map(|raw| state.token_decoder.decode(raw)).transpose()?;

  let gadget = state.assembler.assemble(&ctx, token.as_ref()).await?;
  Ok(axum::Json(serde_json::json!({ "ok": true, "gadget": gadget })))
}
