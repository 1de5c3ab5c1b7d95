//! Typed per-request context.
//!
//! Created once per request by [`begin_request`], carried in request
//! extensions, advanced by the token stages and read by the handler.

use std::fmt;
use std::time::Duration;

use axum::{
    extract::{FromRequestParts, Request, State},
    http::request::Parts,
    middleware::Next,
    response::Response,
};
use tokio::time::Instant;
use tonic::metadata::MetadataValue;

use crate::backend::messages::TokenInfos;
use crate::http::error::GatewayError;

/// Request header carrying the correlation id.
pub const X_REQUEST_ID: &str = "x-request-id";

/// A bearer token as presented by the client.
///
/// Never rendered: `Debug` is redacted and there is no `Display`.
#[derive(Clone, PartialEq, Eq)]
pub struct RawToken(String);

impl RawToken {
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    /// The token text, for forwarding to the backend only.
    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for RawToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("RawToken(<redacted>)")
    }
}

/// How far the request got through the token stages.
#[derive(Debug, Clone, Default)]
pub enum TokenState {
    #[default]
    Missing,
    Extracted(RawToken),
    Validated { raw: RawToken, identity: TokenInfos },
}

impl TokenState {
    pub fn raw(&self) -> Option<&RawToken> {
        match self {
            TokenState::Missing => None,
            TokenState::Extracted(raw) | TokenState::Validated { raw, .. } => Some(raw),
        }
    }

    pub fn identity(&self) -> Option<&TokenInfos> {
        match self {
            TokenState::Validated { identity, .. } => Some(identity),
            _ => None,
        }
    }
}

#[derive(Debug, Clone)]
pub struct RequestContext {
    pub request_id: String,
    /// Instant by which the whole request must be answered.
    pub deadline: Instant,
    pub token: TokenState,
}

impl RequestContext {
    pub fn new(request_id: impl Into<String>, timeout: Duration) -> Self {
        Self {
            request_id: request_id.into(),
            deadline: Instant::now() + timeout,
            token: TokenState::Missing,
        }
    }

    /// Wrap `message` for the backend.
    ///
    /// The call deadline is the earlier of the request deadline and `budget`
    /// from now; it is sent as `grpc-timeout` and returned for the local
    /// bound. The request id travels as `x-request-id` metadata.
    pub fn outbound<T>(&self, message: T, budget: Duration) -> (tonic::Request<T>, Instant) {
        let now = Instant::now();
        let deadline = self.deadline.min(now + budget);

        let mut request = tonic::Request::new(message);
        request.set_timeout(deadline.saturating_duration_since(now));
        if let Ok(value) = MetadataValue::try_from(self.request_id.as_str()) {
            request.metadata_mut().insert(X_REQUEST_ID, value);
        }

        (request, deadline)
    }
}

impl<S> FromRequestParts<S> for RequestContext
where
    S: Send + Sync,
{
    type Rejection = GatewayError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<RequestContext>()
            .cloned()
            .ok_or_else(|| GatewayError::Internal("request context not initialised".into()))
    }
}

/// Middleware installing a fresh [`RequestContext`] with the request deadline.
///
/// Runs after the request-id layer, so the id header is already present.
pub async fn begin_request(
    State(timeout): State<Duration>,
    mut request: Request,
    next: Next,
) -> Response {
    let request_id = request
        .headers()
        .get(X_REQUEST_ID)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("unknown")
        .to_string();

    request
        .extensions_mut()
        .insert(RequestContext::new(request_id, timeout));

    next.run(request).await
}
