//! Payload presence stage.

use axum::{
    body::Body,
    extract::{Request, State},
    middleware::Next,
    response::Response,
};

use crate::http::error::GatewayError;
use crate::http::server::AppState;

/// Buffer the body and reject the request if it is empty.
pub(crate) async fn require_payload(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Result<Response, GatewayError> {
    let (parts, body) = request.into_parts();
    let bytes = axum::body::to_bytes(body, state.max_body_size)
        .await
        .map_err(|_| GatewayError::PayloadTooLarge)?;

    if bytes.is_empty() {
        return Err(GatewayError::PayloadMissing);
    }

    Ok(next.run(Request::from_parts(parts, Body::from(bytes))).await)
}
