/* src/server/core/rust/src/fetch/http.rs */

use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::{CACHE_CONTROL, PRAGMA};
use tracing::debug;

use super::{FetchRequest, FetchResponse, HttpFetcher};
use crate::errors::GadgetError;

/// Default transport. Follows redirects and reports the final URL.
#[derive(Debug, Clone)]
pub struct ReqwestFetcher {
  client: reqwest::Client,
}

impl ReqwestFetcher {
  pub fn new(timeout: Duration, user_agent: &str) -> reqwest::Result<Self> {
    let client = reqwest::Client::builder().timeout(timeout).user_agent(user_agent).build()?;
    Ok(Self { client })
  }

  pub fn from_client(client: reqwest::Client) -> Self {
    Self { client }
  }
}

#[async_trait]
impl HttpFetcher for ReqwestFetcher {
  async fn fetch(&self, request: &FetchRequest) -> Result<FetchResponse, GadgetError> {
    let fail = |err: reqwest::Error| {
      debug!(url = %request.url, error = %err, "transport error");
      GadgetError::Fetch {
        url: request.url.to_string(),
        status: err.status().map(|s| s.as_u16()),
      }
    };

    let mut builder = self.client.get(request.url.clone());
    if request.ignore_cache {
      builder = builder.header(CACHE_CONTROL, "no-cache").header(PRAGMA, "no-cache");
    }

    let response = builder.send().await.map_err(fail)?;
    let url = response.url().to_string();
    let status = response.status().as_u16();
    let body = response.text().await.map_err(fail)?;
    debug!(url = %url, status, bytes = body.len(), "fetched");
    Ok(FetchResponse { url, status, body })
  }
}
