/* src/server/core/rust/src/fetch/mod.rs */

// Transport layer: the request/response records, the fetcher trait,
// and the concurrent batch runner both preload batches go through.

mod http;
mod signing;

#[cfg(test)]
pub(crate) mod testing;

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::task::JoinSet;
use tracing::warn;
use url::Url;

use crate::errors::GadgetError;
use crate::spec::AuthzMode;

pub use http::ReqwestFetcher;
pub use signing::{KeySource, SigningFetcherFactory};

/// One outbound fetch. `id` is the logical resource URL the pipeline looks the
/// response up by; `url` is what actually goes on the wire.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchRequest {
  pub id: String,
  pub url: Url,
  pub authz: AuthzMode,
  pub sign_viewer: bool,
  pub sign_owner: bool,
  pub ignore_cache: bool,
}

impl FetchRequest {
  pub fn new(url: Url) -> Self {
    Self {
      id: url.to_string(),
      url,
      authz: AuthzMode::None,
      sign_viewer: false,
      sign_owner: false,
      ignore_cache: false,
    }
  }

  pub fn signed(mut self, sign_viewer: bool, sign_owner: bool) -> Self {
    self.authz = AuthzMode::Signed;
    self.sign_viewer = sign_viewer;
    self.sign_owner = sign_owner;
    self
  }

  pub fn ignore_cache(mut self, ignore_cache: bool) -> Self {
    self.ignore_cache = ignore_cache;
    self
  }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchResponse {
  /// Effective URL after redirects and request signing.
  pub url: String,
  pub status: u16,
  pub body: String,
}

impl FetchResponse {
  pub fn is_ok(&self) -> bool {
    self.status == 200
  }
}

#[async_trait]
pub trait HttpFetcher: Send + Sync {
  async fn fetch(&self, request: &FetchRequest) -> Result<FetchResponse, GadgetError>;
}

/// Responses keyed by request id, whichever batch served them.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResponseTable {
  by_id: HashMap<String, FetchResponse>,
}

impl ResponseTable {
  pub fn insert(&mut self, id: impl Into<String>, response: FetchResponse) {
    self.by_id.insert(id.into(), response);
  }

  pub fn extend(&mut self, other: ResponseTable) {
    self.by_id.extend(other.by_id);
  }

  pub fn get(&self, id: &str) -> Option<&FetchResponse> {
    self.by_id.get(id)
  }

  /// The response for `id` only if it came back with status 200.
  pub fn ok(&self, id: &str) -> Option<&FetchResponse> {
    self.get(id).filter(|r| r.is_ok())
  }

  pub fn len(&self) -> usize {
    self.by_id.len()
  }

  pub fn is_empty(&self) -> bool {
    self.by_id.is_empty()
  }
}

/// Issue every request concurrently and wait for all of them.
/// A request whose transport fails is logged and left out of the table.
pub async fn multi_fetch(
  fetcher: Arc<dyn HttpFetcher>,
  requests: Vec<FetchRequest>,
) -> Result<ResponseTable, GadgetError> {
  let mut join_set = JoinSet::new();

  for request in requests {
    let fetcher = Arc::clone(&fetcher);
    join_set.spawn(async move {
      let result = fetcher.fetch(&request).await;
      (request, result)
    });
  }

  let mut table = ResponseTable::default();
  while let Some(joined) = join_set.join_next().await {
    let (request, result) = joined.map_err(|e| GadgetError::Internal(e.to_string()))?; // task panic
    match result {
      Ok(response) => table.insert(request.id, response),
      Err(err) => warn!(url = %request.url, error = %err, "resource fetch failed"),
    }
  }
  Ok(table)
}
