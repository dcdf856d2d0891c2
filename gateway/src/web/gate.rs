//! Signature verdict gate.
//!
//! Middleware that buffers the raw request body, verifies the Shopify HMAC
//! signature against it, and rejects the request with 403 before any
//! handler runs if verification fails. Handlers behind the gate never
//! re-check the signature.

use std::sync::Arc;

use axum::{
    body::{to_bytes, Body},
    extract::{Request, State},
    http::StatusCode,
    middleware::Next,
    response::{IntoResponse, Response},
};
use tracing::debug;

use crate::config::Config;
use crate::web::signature::{verify_signature, SIGNATURE_HEADER};

/// Shared gateway state.
#[derive(Clone)]
pub struct GatewayState {
    pub config: Arc<Config>,
}

impl GatewayState {
    pub fn new(config: Config) -> Self {
        Self {
            config: Arc::new(config),
        }
    }
}

/// Require a valid webhook signature before dispatching to any handler.
///
/// The complete body is buffered first; verification needs the exact bytes
/// as received. Bodies over the configured limit are rejected with 413
/// without being verified. An invalid or missing signature yields 403 with
/// an empty body. A rejection is an expected outcome, logged at debug
/// level only.
pub async fn require_valid_signature(
    State(state): State<GatewayState>,
    request: Request,
    next: Next,
) -> Response {
    let (parts, body) = request.into_parts();

    let bytes = match to_bytes(body, state.config.body_limit).await {
        Ok(bytes) => bytes,
        Err(_) => {
            debug!(
                path = %parts.uri.path(),
                limit = state.config.body_limit,
                "body_limit_exceeded"
            );
            return StatusCode::PAYLOAD_TOO_LARGE.into_response();
        }
    };

    let header = parts
        .headers
        .get(SIGNATURE_HEADER)
        .and_then(|v| v.to_str().ok());

    let verdict = verify_signature(
        &state.config.shared_secret,
        &bytes,
        header,
        state.config.comparison,
    );

    if !verdict.is_valid() {
        debug!(path = %parts.uri.path(), "signature_rejected");
        return StatusCode::FORBIDDEN.into_response();
    }

    // Hand the handler the same bytes the digest was computed over.
    let request = Request::from_parts(parts, Body::from(bytes));
    next.run(request).await
}
