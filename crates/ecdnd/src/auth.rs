//! API-key gate in front of every file route

use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};
use ecdn_core::EcdnError;
use secrecy::{ExposeSecret, SecretString};

use crate::{error::ApiError, state::AppState};

pub const API_KEY_HEADER: &str = "x-api-key";

/// Exact comparison of the presented key with the configured one.
pub fn api_key_matches(presented: Option<&str>, expected: &SecretString) -> bool {
    presented.is_some_and(|key| key == expected.expose_secret())
}

/// Reject the request with 401 unless `X-API-Key` matches; nothing
/// downstream runs on rejection.
pub async fn require_api_key(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let presented = request
        .headers()
        .get(API_KEY_HEADER)
        .and_then(|v| v.to_str().ok());

    if !api_key_matches(presented, &state.api_key) {
        state.metrics.auth_rejections.inc();
        tracing::warn!(
            path = %request.uri().path(),
            key_present = presented.is_some(),
            "rejected request: invalid API key"
        );
        return Err(ApiError(EcdnError::Unauthorized));
    }

    Ok(next.run(request).await)
}
