//! Shared-secret authentication for the calculation relay.
//!
//! Every calculation request must carry the configured key in
//! `X-WS-API-Key`. The check runs before the body is read.
//!
//! # Usage
//!
//! ```rust,ignore
//! let calc = Router::new()
//!     .route("/attack", post(handler))
//!     .layer(middleware::from_fn_with_state(app.clone(), require_api_key));
//! ```

use std::sync::Arc;

use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};
use sha2::{Digest, Sha256};

use super::http::ApiError;
use crate::app::App;

/// Header carrying the shared secret
pub const API_KEY_HEADER: &str = "x-ws-api-key";

/// Rejects requests without the configured key.
///
/// Returns 500 when no key is configured and 401 when the header is missing
/// or wrong.
pub async fn require_api_key(
    State(app): State<Arc<App>>,
    request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let Some(expected) = app.settings.api_key.as_deref() else {
        tracing::error!("Rejecting calculation request: WS_RULES_API_KEY is not set");
        return Err(ApiError::ServerNotConfigured);
    };

    let provided = request
        .headers()
        .get(API_KEY_HEADER)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default();

    if provided.is_empty() || !keys_match(expected, provided) {
        tracing::warn!(path = %request.uri().path(), "Rejecting request with bad API key");
        return Err(ApiError::Unauthorized);
    }

    Ok(next.run(request).await)
}

/// Constant-time comparison of fixed-length digests.
fn keys_match(expected: &str, provided: &str) -> bool {
    let expected = Sha256::digest(expected.as_bytes());
    let provided = Sha256::digest(provided.as_bytes());
    expected
        .iter()
        .zip(provided.iter())
        .fold(0u8, |diff, (a, b)| diff | (a ^ b))
        == 0
}
