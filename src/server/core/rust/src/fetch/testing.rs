/* src/server/core/rust/src/fetch/testing.rs */

use std::collections::{HashMap, HashSet};
use std::sync::Mutex;

use async_trait::async_trait;

use super::{FetchRequest, FetchResponse, HttpFetcher};
use crate::errors::GadgetError;

/// Canned responses keyed by URL without its query string; records every request.
#[derive(Default)]
pub(crate) struct StaticFetcher {
  responses: HashMap<String, (u16, String)>,
  failing: HashSet<String>,
  requests: Mutex<Vec<FetchRequest>>,
}

fn strip_query(url: &url::Url) -> String {
  let mut bare = url.clone();
  bare.set_query(None);
  bare.to_string()
}

impl StaticFetcher {
  pub(crate) fn with(mut self, url: &str, status: u16, body: &str) -> Self {
    self.responses.insert(url.to_string(), (status, body.to_string()));
    self
  }

  pub(crate) fn failing(mut self, url: &str) -> Self {
    self.failing.insert(url.to_string());
    self
  }

  pub(crate) fn requests(&self) -> Vec<FetchRequest> {
    self.requests.lock().unwrap().clone()
  }

  pub(crate) fn request_count(&self) -> usize {
    self.requests.lock().unwrap().len()
  }
}

#[async_trait]
impl HttpFetcher for StaticFetcher {
  async fn fetch(&self, request: &FetchRequest) -> Result<FetchResponse, GadgetError> {
    self.requests.lock().unwrap().push(request.clone());
    let full = request.url.to_string();
    let bare = strip_query(&request.url);
    if self.failing.contains(&full) || self.failing.contains(&bare) {
      return Err(GadgetError::Fetch { url: full, status: None });
    }
    let (status, body) = self
      .responses
      .get(&full)
      .or_else(|| self.responses.get(&bare))
      .cloned()
      .unwrap_or((404, String::new()));
    Ok(FetchResponse { url: full, status, body })
  }
}
