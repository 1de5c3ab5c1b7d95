//! Public route table.
//!
//! Routes are grouped by the [`Pipeline`](crate::pipeline::Pipeline) they
//! share; each group is wrapped with its stages and then merged.

pub mod legacy;
pub mod v1;

use axum::Router;

use crate::http::error::GatewayError;
use crate::http::server::AppState;

/// All business routes, legacy and `/v1`.
pub fn router(state: &AppState) -> Router<AppState> {
    Router::new()
        .merge(legacy::routes(state))
        .nest("/v1", v1::routes(state))
}

/// Placeholder for endpoints declared but not served yet.
pub async fn not_implemented() -> GatewayError {
    GatewayError::NotImplemented
}
