//! Token extraction stage.

use axum::{
    extract::Request,
    http::{header::AUTHORIZATION, HeaderMap},
    middleware::Next,
    response::Response,
};

use crate::http::context::{RawToken, RequestContext, TokenState};
use crate::http::error::GatewayError;

const BEARER: &str = "bearer";

/// Parse `Authorization: Bearer <token>`. The scheme is case-insensitive.
pub fn bearer_token(headers: &HeaderMap) -> Result<RawToken, GatewayError> {
    let value = headers
        .get(AUTHORIZATION)
        .ok_or_else(|| GatewayError::Unauthenticated("authorization header missing".into()))?;

    let malformed = || GatewayError::Unauthenticated("malformed authorization header".into());
    let value = value.to_str().map_err(|_| malformed())?.trim();
    let (scheme, token) = value.split_once(' ').ok_or_else(malformed)?;
    let token = token.trim();

    if !scheme.eq_ignore_ascii_case(BEARER) || token.is_empty() {
        return Err(malformed());
    }
    Ok(RawToken::new(token))
}

/// Find a non-empty `token` parameter in a query string.
pub fn query_token(query: Option<&str>) -> Result<RawToken, GatewayError> {
    query
        .and_then(|q| {
            url::form_urlencoded::parse(q.as_bytes())
                .find(|(key, _)| key == "token")
                .map(|(_, value)| value.into_owned())
        })
        .filter(|token| !token.is_empty())
        .map(RawToken::new)
        .ok_or_else(|| GatewayError::Unauthenticated("token missing".into()))
}

pub(crate) async fn extract_header_token(
    mut request: Request,
    next: Next,
) -> Result<Response, GatewayError> {
    let token = bearer_token(request.headers())?;
    store(&mut request, token)?;
    Ok(next.run(request).await)
}

pub(crate) async fn extract_query_token(
    mut request: Request,
    next: Next,
) -> Result<Response, GatewayError> {
    let token = query_token(request.uri().query())?;
    store(&mut request, token)?;
    Ok(next.run(request).await)
}

fn store(request: &mut Request, token: RawToken) -> Result<(), GatewayError> {
    let ctx = request
        .extensions_mut()
        .get_mut::<RequestContext>()
        .ok_or_else(|| GatewayError::Internal("request context not initialised".into()))?;
    ctx.token = TokenState::Extracted(token);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    fn headers(value: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, HeaderValue::from_str(value).unwrap());
        headers
    }

    #[test]
    fn test_bearer_scheme_case_insensitive() {
        assert_eq!(bearer_token(&headers("Bearer abc")).unwrap().expose(), "abc");
        assert_eq!(bearer_token(&headers("bearer  abc ")).unwrap().expose(), "abc");
    }

    #[test]
    fn test_bearer_rejections() {
        assert!(matches!(
            bearer_token(&HeaderMap::new()),
            Err(GatewayError::Unauthenticated(msg)) if msg == "authorization header missing"
        ));
        for value in ["Basic abc", "Bearer", "Bearer ", "abc"] {
            assert!(
                matches!(bearer_token(&headers(value)), Err(GatewayError::Unauthenticated(_))),
                "{value:?} should be rejected"
            );
        }
    }

    #[test]
    fn test_query_token() {
        assert_eq!(
            query_token(Some("a=1&token=t%2B1")).unwrap().expose(),
            "t+1"
        );
        assert!(query_token(Some("token=")).is_err());
        assert!(query_token(Some("a=1")).is_err());
        assert!(query_token(None).is_err());
    }
}
