//! Versioned surface, mounted under `/v1`.

use axum::Router;

use crate::backend::messages::{LoginWithEmailMsg, RefreshJwtRequest, TempToken, UserReference};
use crate::backend::methods::*;
use crate::dispatch::{get_binding, get_binding_with_path, post_binding, Binding};
use crate::http::server::AppState;
use crate::pipeline::{Pipeline, TokenSource};

pub fn routes(state: &AppState) -> Router<AppState> {
    Router::new()
        .merge(Pipeline::open().with_payload().apply(public(), state))
        .merge(Pipeline::open().apply(links(), state))
        .merge(
            Pipeline::open()
                .with_payload()
                .extract(TokenSource::Header)
                .apply(renewal(), state),
        )
        .merge(
            Pipeline::open()
                .with_payload()
                .validate(TokenSource::Header)
                .apply(account(), state),
        )
        .merge(
            Pipeline::open()
                .validate(TokenSource::Header)
                .apply(bodiless(), state),
        )
}

fn as_participant(msg: &mut LoginWithEmailMsg) {
    msg.as_participant = true;
}

fn as_manager(msg: &mut LoginWithEmailMsg) {
    msg.as_participant = false;
}

fn public() -> Router<AppState> {
    Router::new()
        .route(
            "/auth/login-with-email",
            post_binding(Binding::new(LOGIN_WITH_EMAIL).map_request(as_participant)),
        )
        .route(
            "/auth/login-with-email-management",
            post_binding(Binding::new(LOGIN_WITH_EMAIL).map_request(as_manager)),
        )
        .route("/auth/signup-with-email", post_binding(Binding::new(SIGNUP_WITH_EMAIL)))
        .route(
            "/auth/resend-verification-code",
            post_binding(Binding::new(SEND_VERIFICATION_CODE)),
        )
        .route(
            "/auth/verification-code-with-token",
            post_binding(Binding::new(AUTO_VALIDATE_TEMP_TOKEN)),
        )
        .route(
            "/auth/password-reset/initiate",
            post_binding(Binding::new(INITIATE_PASSWORD_RESET)),
        )
        .route(
            "/auth/password-reset/get-infos",
            post_binding(Binding::new(GET_INFOS_FOR_PASSWORD_RESET)),
        )
        .route("/auth/password-reset/reset", post_binding(Binding::new(RESET_PASSWORD)))
        .route("/auth/verify-contact", post_binding(Binding::new(VERIFY_CONTACT)))
}

fn links() -> Router<AppState> {
    Router::new()
        .route(
            "/auth/verify-contact-link",
            get_binding(Binding::new(VERIFY_CONTACT).from_parts(|inbound| TempToken {
                token: inbound.query_or_empty("token"),
            })),
        )
        .route(
            "/user/unsubscribe",
            get_binding(
                Binding::new(USE_UNSUBSCRIBE_TOKEN).from_parts(|inbound| TempToken {
                    token: inbound.query_or_empty("token"),
                }),
            ),
        )
}

fn renewal() -> Router<AppState> {
    Router::new().route(
        "/auth/renew-token",
        post_binding(Binding::new(RENEW_JWT).with_raw_token(
            |msg: &mut RefreshJwtRequest, token| msg.access_token = token,
        )),
    )
}

fn account() -> Router<AppState> {
    Router::new()
        .route(
            "/auth/switch-profile",
            post_binding(Binding::new(SWITCH_PROFILE).with_identity()),
        )
        .route(
            "/user/change-password",
            post_binding(Binding::new(CHANGE_PASSWORD).with_identity()),
        )
        .route(
            "/user/change-account-email",
            post_binding(Binding::new(CHANGE_ACCOUNT_ID_EMAIL).with_identity()),
        )
        .route(
            "/user/set-language",
            post_binding(Binding::new(CHANGE_PREFERRED_LANGUAGE).with_identity()),
        )
        .route(
            "/user/delete",
            post_binding(Binding::new(DELETE_ACCOUNT).with_identity()),
        )
        .route(
            "/user/profile/save",
            post_binding(Binding::new(SAVE_PROFILE).with_identity()),
        )
        .route(
            "/user/profile/remove",
            post_binding(Binding::new(REMOVE_PROFILE).with_identity()),
        )
        .route(
            "/user/contact-preferences",
            post_binding(Binding::new(UPDATE_CONTACT_PREFERENCES).with_identity()),
        )
        .route(
            "/user/contact/add-email",
            post_binding(Binding::new(ADD_EMAIL).with_identity()),
        )
        .route(
            "/user/contact/remove-email",
            post_binding(Binding::new(REMOVE_EMAIL).with_identity()),
        )
        .route(
            "/user/contact/resend-verification",
            post_binding(Binding::new(RESEND_CONTACT_VERIFICATION).with_identity()),
        )
        .route(
            "/user/management/create-user",
            post_binding(Binding::new(CREATE_USER).created().with_identity()),
        )
        .route(
            "/user/management/add-role",
            post_binding(Binding::new(ADD_ROLE_FOR_USER).with_identity()),
        )
        .route(
            "/user/management/remove-role",
            post_binding(Binding::new(REMOVE_ROLE_FOR_USER).with_identity()),
        )
}

fn bodiless() -> Router<AppState> {
    Router::new()
        .route(
            "/user/{id}",
            get_binding_with_path(
                Binding::new(GET_USER)
                    .from_parts(|inbound| UserReference {
                        token: None,
                        user_id: inbound.path_param("id"),
                    })
                    .with_identity(),
            ),
        )
        .route(
            "/user/management/non-participant-users",
            get_binding(Binding::new(FIND_NON_PARTICIPANT_USERS).without_body().with_identity()),
        )
        .route(
            "/user/revoke-refresh-tokens",
            post_binding(Binding::new(REVOKE_ALL_REFRESH_TOKENS).without_body().with_identity()),
        )
}
