//! Token and payload stages applied in front of route handlers.
//!
//! # Data Flow
//! ```text
//! request (RequestContext: Missing)
//!     → payload.rs  (body present?)            400 on failure
//!     → extract.rs  (bearer header / ?token=)  401 on failure, Extracted
//!     → validate.rs (ValidateJWT)              401/403/mapped, Validated
//!     → handler
//! ```
//!
//! # Design Decisions
//! - A [`Pipeline`] is a value describing which stages a route group needs;
//!   it can only express the canonical order
//! - Validation implies extraction from the same source
//! - A failing stage short-circuits; no business call is made

mod extract;
mod payload;
mod validate;

pub use extract::{bearer_token, query_token};

use axum::middleware::from_fn_with_state;
use axum::Router;

use crate::http::server::AppState;

/// Where a route expects its token.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenSource {
    /// `Authorization: Bearer <token>`.
    Header,
    /// `?token=<token>`, for links sent by email.
    Query,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenPolicy {
    None,
    Extract(TokenSource),
    Validate(TokenSource),
}

/// Stages guarding a group of routes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pipeline {
    require_payload: bool,
    token: TokenPolicy,
}

impl Pipeline {
    /// No stages.
    pub const fn open() -> Self {
        Self {
            require_payload: false,
            token: TokenPolicy::None,
        }
    }

    /// Reject empty bodies.
    pub const fn with_payload(mut self) -> Self {
        self.require_payload = true;
        self
    }

    /// Extract a token without validating it.
    pub const fn extract(mut self, source: TokenSource) -> Self {
        self.token = TokenPolicy::Extract(source);
        self
    }

    /// Extract a token and validate it with the backend.
    pub const fn validate(mut self, source: TokenSource) -> Self {
        self.token = TokenPolicy::Validate(source);
        self
    }

    pub fn requires_payload(&self) -> bool {
        self.require_payload
    }

    pub fn token_policy(&self) -> TokenPolicy {
        self.token
    }

    /// Wrap every route of `router` with this pipeline's stages.
    ///
    /// Layers added last run first, so stages are added innermost first.
    pub fn apply(&self, router: Router<AppState>, state: &AppState) -> Router<AppState> {
        let mut router = router;

        if let TokenPolicy::Validate(_) = self.token {
            router = router.route_layer(from_fn_with_state(state.clone(), validate::validate_token));
        }

        match self.token {
            TokenPolicy::Extract(TokenSource::Header) | TokenPolicy::Validate(TokenSource::Header) => {
                router = router.route_layer(axum::middleware::from_fn(extract::extract_header_token));
            }
            TokenPolicy::Extract(TokenSource::Query) | TokenPolicy::Validate(TokenSource::Query) => {
                router = router.route_layer(axum::middleware::from_fn(extract::extract_query_token));
            }
            TokenPolicy::None => {}
        }

        if self.require_payload {
            router = router.route_layer(from_fn_with_state(state.clone(), payload::require_payload));
        }

        router
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builders_compose() {
        let pipeline = Pipeline::open().with_payload().validate(TokenSource::Header);
        assert!(pipeline.requires_payload());
        assert_eq!(
            pipeline.token_policy(),
            TokenPolicy::Validate(TokenSource::Header)
        );
        assert_eq!(Pipeline::open().token_policy(), TokenPolicy::None);
    }
}
