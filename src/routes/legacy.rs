//! Legacy `/user/*` surface kept for older clients.

use axum::{routing::get, Router};

use crate::backend::messages::TempToken;
use crate::backend::methods::{
    CHANGE_PASSWORD, LOGIN_WITH_EMAIL, SIGNUP_WITH_EMAIL, USE_UNSUBSCRIBE_TOKEN,
};
use crate::dispatch::{get_binding, post_binding, Binding};
use crate::http::server::AppState;
use crate::pipeline::{Pipeline, TokenSource};
use crate::routes::not_implemented;

pub fn routes(state: &AppState) -> Router<AppState> {
    let public = Router::new()
        .route("/user/loginWithEmail", post_binding(Binding::new(LOGIN_WITH_EMAIL)))
        .route(
            "/user/signupWithEmail",
            post_binding(Binding::new(SIGNUP_WITH_EMAIL).created()),
        );

    let protected = Router::new().route(
        "/user/changePassword",
        post_binding(Binding::new(CHANGE_PASSWORD).with_identity()),
    );

    let link = Router::new().route("/user/verify-email", get(not_implemented));

    let unsubscribe = Router::new().route(
        "/user/unsubscribe",
        get_binding(Binding::new(USE_UNSUBSCRIBE_TOKEN).from_parts(|inbound| TempToken {
            token: inbound.query_or_empty("token"),
        })),
    );

    Router::new()
        .merge(Pipeline::open().with_payload().apply(public, state))
        .merge(
            Pipeline::open()
                .with_payload()
                .validate(TokenSource::Header)
                .apply(protected, state),
        )
        .merge(Pipeline::open().extract(TokenSource::Query).apply(link, state))
        .merge(Pipeline::open().apply(unsubscribe, state))
}
