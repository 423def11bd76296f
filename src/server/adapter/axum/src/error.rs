/* src/server/adapter/axum/src/error.rs */

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use gadget_server::GadgetError;

/// Newtype wrapper to implement `IntoResponse` for `GadgetError`.
/// Required because Rust's orphan rule prevents `impl IntoResponse for GadgetError`
/// when both types are foreign to this crate.
pub(crate) struct AxumError(pub GadgetError);

impl IntoResponse for AxumError {
  fn into_response(self) -> Response {
    let err = self.0;
    let status = StatusCode::from_u16(err.status()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
    if status.is_server_error() {
      tracing::error!(code = err.code(), error = %err, "gadget render failed");
    } else {
      tracing::debug!(code = err.code(), error = %err, "gadget render rejected");
    }
    let body = serde_json::json!({
      "ok": false,
      "error": {
        "code": err.code(),
        "message": err.to_string(),
      }
    });
    (status, axum::Json(body)).into_response()
  }
}

impl From<GadgetError> for AxumError {
  fn from(err: GadgetError) -> Self {
    Self(err)
  }
}
