/* src/server/core/rust/src/fetch/signing.rs */

use std::path::PathBuf;
use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};

use async_trait::async_trait;
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use hmac::{Hmac, Mac};
use sha2::Sha256;
use url::{Url, form_urlencoded};

use super::{FetchRequest, FetchResponse, HttpFetcher};
use crate::errors::GadgetError;
use crate::spec::AuthzMode;
use crate::token::SecurityToken;

type HmacSha256 = Hmac<Sha256>;

pub const SIGNATURE_METHOD: &str = "HMAC-SHA256";

/// Where the signing secret comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum KeySource {
  Inline(String),
  File(PathBuf),
}

/// Builds per-token fetchers that sign outgoing requests with one shared key.
#[derive(Debug, Clone)]
pub struct SigningFetcherFactory {
  key_name: String,
  key: Arc<[u8]>,
}

impl SigningFetcherFactory {
  pub fn from_key_source(key_name: impl Into<String>, source: &KeySource) -> Result<Self, GadgetError> {
    let key = match source {
      KeySource::Inline(secret) => secret.trim().as_bytes().to_vec(),
      KeySource::File(path) => std::fs::read_to_string(path)
        .map_err(|e| GadgetError::Signing(format!("failed to read {}: {e}", path.display())))?
        .trim()
        .as_bytes()
        .to_vec(),
    };
    if key.is_empty() {
      return Err(GadgetError::Signing("signing key is empty".into()));
    }
    Ok(Self { key_name: key_name.into(), key: key.into() })
  }

  pub fn key_name(&self) -> &str {
    &self.key_name
  }

  pub fn fetcher(&self, inner: Arc<dyn HttpFetcher>, token: &SecurityToken) -> Arc<dyn HttpFetcher> {
    Arc::new(SigningFetcher { inner, signer: self.clone(), token: token.clone() })
  }

  /// Add identity and OAuth parameters to `request.url` and sign the result.
  /// Caller-supplied parameters in the reserved namespaces are dropped first.
  pub fn sign(
    &self,
    request: &FetchRequest,
    token: &SecurityToken,
    timestamp: u64,
    nonce: u64,
  ) -> Result<FetchRequest, GadgetError> {
    let mut params: Vec<(String, String)> = request
      .url
      .query_pairs()
      .filter(|(k, _)| !is_reserved_param(k))
      .map(|(k, v)| (k.into_owned(), v.into_owned()))
      .collect();

    if request.sign_owner {
      params.push(("opensocial_owner_id".into(), token.owner_id.clone()));
    }
    if request.sign_viewer {
      params.push(("opensocial_viewer_id".into(), token.viewer_id.clone()));
    }
    params.push(("opensocial_app_id".into(), token.app_id.clone()));
    params.push(("opensocial_app_url".into(), token.app_url.clone()));
    params.push(("xoauth_signature_publickey".into(), self.key_name.clone()));
    params.push(("oauth_signature_method".into(), SIGNATURE_METHOD.into()));
    params.push(("oauth_timestamp".into(), timestamp.to_string()));
    params.push(("oauth_nonce".into(), nonce.to_string()));
    params.push(("oauth_version".into(), "1.0".into()));
    params.sort();

    let signature = self.signature(&base_string(&request.url, &params))?;
    params.push(("oauth_signature".into(), signature));

    let mut url = request.url.clone();
    url.query_pairs_mut().clear().extend_pairs(&params);
    Ok(FetchRequest { url, ..request.clone() })
  }

  fn signature(&self, base: &str) -> Result<String, GadgetError> {
    let mut mac =
      HmacSha256::new_from_slice(&self.key).map_err(|e| GadgetError::Signing(e.to_string()))?;
    mac.update(base.as_bytes());
    Ok(STANDARD.encode(mac.finalize().into_bytes()))
  }

  /// Recompute the signature of an already signed URL.
  pub fn verify(&self, url: &Url) -> bool {
    let mut signature = None;
    let mut params: Vec<(String, String)> = Vec::new();
    for (k, v) in url.query_pairs() {
      if k == "oauth_signature" {
        signature = Some(v.into_owned());
      } else {
        params.push((k.into_owned(), v.into_owned()));
      }
    }
    params.sort();
    match (signature, self.signature(&base_string(url, &params))) {
      (Some(given), Ok(expected)) => given == expected,
      _ => false,
    }
  }
}

fn is_reserved_param(name: &str) -> bool {
  let lower = name.to_ascii_lowercase();
  lower.starts_with("opensocial_") || lower.starts_with("oauth_") || lower.starts_with("xoauth_")
}

/// RFC 3986 percent-encoding as OAuth expects it.
fn oauth_encode(raw: &str) -> String {
  form_urlencoded::byte_serialize(raw.as_bytes())
    .collect::<String>()
    .replace('+', "%20")
    .replace('*', "%2A")
    .replace("%7E", "~")
}

/// `GET&<encoded url without query>&<encoded sorted params>`
fn base_string(url: &Url, sorted_params: &[(String, String)]) -> String {
  let mut bare = url.clone();
  bare.set_query(None);
  bare.set_fragment(None);
  let normalized = sorted_params
    .iter()
    .map(|(k, v)| format!("{}={}", oauth_encode(k), oauth_encode(v)))
    .collect::<Vec<_>>()
    .join("&");
  format!("GET&{}&{}", oauth_encode(bare.as_str()), oauth_encode(&normalized))
}

struct SigningFetcher {
  inner: Arc<dyn HttpFetcher>,
  signer: SigningFetcherFactory,
  token: SecurityToken,
}

#[async_trait]
impl HttpFetcher for SigningFetcher {
  async fn fetch(&self, request: &FetchRequest) -> Result<FetchResponse, GadgetError> {
    if request.authz != AuthzMode::Signed {
      return self.inner.fetch(request).await;
    }
    let timestamp = SystemTime::now().duration_since(UNIX_EPOCH).map(|d| d.as_secs()).unwrap_or(0);
    let signed = self.signer.sign(request, &self.token, timestamp, rand::random())?;
    self.inner.fetch(&signed).await
  }
}
