//! Token validation stage.

use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};
use tonic::Code;

use crate::http::context::{RequestContext, TokenState};
use crate::http::error::GatewayError;
use crate::http::server::AppState;

/// Validate the extracted token with the backend and store the identity.
pub(crate) async fn validate_token(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, GatewayError> {
    let ctx = request
        .extensions_mut()
        .get_mut::<RequestContext>()
        .ok_or_else(|| GatewayError::Internal("request context not initialised".into()))?;

    let raw = match &ctx.token {
        TokenState::Extracted(raw) => Some(raw.clone()),
        TokenState::Validated { .. } => None,
        TokenState::Missing => {
            return Err(GatewayError::Unauthenticated("token missing".into()));
        }
    };
    let Some(raw) = raw else {
        return Ok(next.run(request).await);
    };

    let (outbound, deadline) = ctx.outbound(raw.expose().to_string(), state.call_timeout);
    let identity = state
        .client
        .validate_token(outbound, deadline)
        .await
        .map_err(rejection)?;

    tracing::debug!(request_id = %ctx.request_id, user_id = %identity.id, "Token validated");
    ctx.token = TokenState::Validated { raw, identity };

    Ok(next.run(request).await)
}

/// Map a validation failure to the response the client sees.
pub(crate) fn rejection(status: tonic::Status) -> GatewayError {
    match status.code() {
        Code::Unauthenticated | Code::InvalidArgument | Code::NotFound => {
            GatewayError::Unauthenticated(status.message().to_string())
        }
        Code::PermissionDenied => GatewayError::Forbidden(status.message().to_string()),
        _ => GatewayError::Backend(status),
    }
}
