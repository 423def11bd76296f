/* src/server/core/rust/src/token.rs */

use url::form_urlencoded;

use crate::errors::GadgetError;

/// Identity the request runs as. Issuance and validation live outside this crate.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SecurityToken {
  pub owner_id: String,
  pub viewer_id: String,
  pub app_id: String,
  pub domain: String,
  pub app_url: String,
  pub module_id: u64,
}

pub trait SecurityTokenDecoder: Send + Sync {
  fn decode(&self, raw: &str) -> Result<SecurityToken, GadgetError>;
}

/// Decodes unsigned `o=&v=&a=&d=&u=&m=` query-style tokens. Development use only.
#[derive(Debug, Default, Clone, Copy)]
pub struct PlainTokenDecoder;

impl PlainTokenDecoder {
  pub fn encode(token: &SecurityToken) -> String {
    form_urlencoded::Serializer::new(String::new())
      .append_pair("o", &token.owner_id)
      .append_pair("v", &token.viewer_id)
      .append_pair("a", &token.app_id)
      .append_pair("d", &token.domain)
      .append_pair("u", &token.app_url)
      .append_pair("m", &token.module_id.to_string())
      .finish()
  }
}

impl SecurityTokenDecoder for PlainTokenDecoder {
  fn decode(&self, raw: &str) -> Result<SecurityToken, GadgetError> {
    if raw.trim().is_empty() {
      return Err(GadgetError::InvalidToken("empty token".into()));
    }

    let mut token = SecurityToken::default();
    let mut saw_owner = false;
    for (key, value) in form_urlencoded::parse(raw.as_bytes()) {
      match key.as_ref() {
        "o" => {
          token.owner_id = value.into_owned();
          saw_owner = true;
        }
        "v" => token.viewer_id = value.into_owned(),
        "a" => token.app_id = value.into_owned(),
        "d" => token.domain = value.into_owned(),
        "u" => token.app_url = value.into_owned(),
        "m" => {
          token.module_id = value
            .parse()
            .map_err(|_| GadgetError::InvalidToken(format!("bad module id {value:?}")))?;
        }
        _ => {}
      }
    }

    if !saw_owner {
      return Err(GadgetError::InvalidToken("missing owner".into()));
    }
    Ok(token)
  }
}
