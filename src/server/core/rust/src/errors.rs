/* src/server/core/rust/src/errors.rs */

use thiserror::Error;

/// Every way an assembly can fail. All variants are terminal for the request.
#[derive(Debug, Error)]
pub enum GadgetError {
  #[error("gadget {url} is blacklisted")]
  Blacklisted { url: String },

  #[error("failed to fetch {url}{}", status.map(|s| format!(" (HTTP {s})")).unwrap_or_default())]
  Fetch { url: String, status: Option<u16> },

  /// `document` holds the raw input that failed to parse.
  #[error("failed to parse {what}: {message}")]
  Parse { what: &'static str, message: String, document: String },

  #[error("unable to resolve features: {}", missing.join(", "))]
  FeatureResolution { missing: Vec<String> },

  #[error("signed preload of {href} requires a security token")]
  SecurityToken { href: String },

  #[error("bad request: {0}")]
  BadRequest(String),

  #[error("invalid security token: {0}")]
  InvalidToken(String),

  #[error("signing unavailable: {0}")]
  Signing(String),

  #[error("internal error: {0}")]
  Internal(String),
}

impl GadgetError {
  pub fn parse(what: &'static str, message: impl Into<String>, document: impl Into<String>) -> Self {
    Self::Parse { what, message: message.into(), document: document.into() }
  }

  pub fn code(&self) -> &'static str {
    match self {
      Self::Blacklisted { .. } => "BLACKLISTED",
      Self::Fetch { .. } => "FETCH_ERROR",
      Self::Parse { .. } => "PARSE_ERROR",
      Self::FeatureResolution { .. } => "FEATURE_RESOLUTION_ERROR",
      Self::SecurityToken { .. } => "SECURITY_TOKEN_ERROR",
      Self::BadRequest(_) => "VALIDATION_ERROR",
      Self::InvalidToken(_) => "UNAUTHORIZED",
      Self::Signing(_) | Self::Internal(_) => "INTERNAL_ERROR",
    }
  }

  pub fn status(&self) -> u16 {
    match self {
      Self::Blacklisted { .. } => 403,
      Self::InvalidToken(_) | Self::SecurityToken { .. } => 401,
      Self::Fetch { .. } | Self::Parse { .. } => 502,
      Self::FeatureResolution { .. } | Self::BadRequest(_) => 400,
      Self::Signing(_) | Self::Internal(_) => 500,
    }
  }
}
