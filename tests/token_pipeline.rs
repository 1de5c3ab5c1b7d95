//! Token stages: extraction, validation, identity attachment.

use axum::http::StatusCode;
use edge_gateway::backend::messages::{ServiceStatus, TokenResponse, User, UserListMsg};
use edge_gateway::backend::methods::{
    CHANGE_PASSWORD, CREATE_USER, FIND_NON_PARTICIPANT_USERS, GET_USER, RENEW_JWT,
    REVOKE_ALL_REFRESH_TOKENS, VALIDATE_JWT,
};
use tonic::Code;

mod common;
use common::{gateway, get, identity, post_json, TestGateway, VALID_TOKEN};

const CHANGE_PASSWORD_BODY: &str = r#"{"old_password":"old","new_password":"new"}"#;

fn authenticated_gateway() -> TestGateway {
    let gw = gateway();
    gw.mock.reply(VALIDATE_JWT, identity());
    gw
}

#[tokio::test]
async fn test_protected_routes_without_token_are_401() {
    let gw = authenticated_gateway();

    let posts = [
        "/user/changePassword",
        "/v1/auth/switch-profile",
        "/v1/auth/renew-token",
        "/v1/user/change-password",
        "/v1/user/change-account-email",
        "/v1/user/set-language",
        "/v1/user/delete",
        "/v1/user/profile/save",
        "/v1/user/profile/remove",
        "/v1/user/contact-preferences",
        "/v1/user/contact/add-email",
        "/v1/user/contact/remove-email",
        "/v1/user/contact/resend-verification",
        "/v1/user/management/create-user",
        "/v1/user/management/add-role",
        "/v1/user/management/remove-role",
        "/v1/user/revoke-refresh-tokens",
    ];
    for path in posts {
        let res = gw.send(post_json(path, "{}", None)).await;
        assert_eq!(res.status, StatusCode::UNAUTHORIZED, "POST {path}");
        assert!(res.body["error"].is_string(), "POST {path}");
    }

    for path in ["/v1/user/user-2", "/v1/user/management/non-participant-users"] {
        let res = gw.send(get(path, None)).await;
        assert_eq!(res.status, StatusCode::UNAUTHORIZED, "GET {path}");
    }

    assert_eq!(gw.mock.call_count(), 0);
}

#[tokio::test]
async fn test_malformed_authorization_is_401() {
    let gw = authenticated_gateway();

    let request = axum::http::Request::post("/user/changePassword")
        .header("authorization", "Basic dXNlcjpwYXNz")
        .body(axum::body::Body::from(CHANGE_PASSWORD_BODY))
        .unwrap();
    let res = gw.send(request).await;

    assert_eq!(res.status, StatusCode::UNAUTHORIZED);
    assert_eq!(gw.mock.call_count(), 0);
}

#[tokio::test]
async fn test_payload_checked_before_token() {
    let gw = authenticated_gateway();

    let res = gw.send(post_json("/user/changePassword", "", None)).await;

    assert_eq!(res.status, StatusCode::BAD_REQUEST);
    assert_eq!(res.body["error"], "payload missing");
    assert_eq!(gw.mock.call_count(), 0);
}

#[tokio::test]
async fn test_validated_identity_is_attached() {
    let gw = authenticated_gateway();
    gw.mock.reply(CHANGE_PASSWORD, ServiceStatus::default());

    let res = gw
        .send(post_json(
            "/user/changePassword",
            CHANGE_PASSWORD_BODY,
            Some(VALID_TOKEN),
        ))
        .await;

    assert_eq!(res.status, StatusCode::OK);
    assert_eq!(gw.mock.calls_to(VALIDATE_JWT), 1);
    assert_eq!(gw.mock.calls_to(CHANGE_PASSWORD), 1);

    let validated = gw.mock.last_request(VALIDATE_JWT).unwrap();
    assert_eq!(validated.token, VALID_TOKEN);

    let sent = gw.mock.last_request(CHANGE_PASSWORD).unwrap();
    assert_eq!(sent.token, Some(identity()));
    assert_eq!(sent.old_password, "old");
    assert_eq!(sent.new_password, "new");
}

#[tokio::test]
async fn test_identity_in_body_is_replaced() {
    let gw = authenticated_gateway();
    gw.mock.reply(CHANGE_PASSWORD, ServiceStatus::default());

    let spoofed = r#"{"token":{"id":"admin","roles":["ADMIN"]},"old_password":"old","new_password":"new"}"#;
    let res = gw
        .send(post_json("/v1/user/change-password", spoofed, Some(VALID_TOKEN)))
        .await;

    assert_eq!(res.status, StatusCode::OK);
    let sent = gw.mock.last_request(CHANGE_PASSWORD).unwrap();
    assert_eq!(sent.token.unwrap().id, "user-1");
}

#[tokio::test]
async fn test_revoked_token_is_403() {
    let gw = gateway();
    gw.mock
        .fail(VALIDATE_JWT, Code::PermissionDenied, "token revoked");

    let res = gw
        .send(post_json(
            "/user/changePassword",
            CHANGE_PASSWORD_BODY,
            Some(VALID_TOKEN),
        ))
        .await;

    assert_eq!(res.status, StatusCode::FORBIDDEN);
    assert_eq!(res.body["error"], "token revoked");
    assert_eq!(gw.mock.calls_to(CHANGE_PASSWORD), 0);
}

#[tokio::test]
async fn test_rejected_tokens_are_401() {
    for code in [Code::Unauthenticated, Code::InvalidArgument, Code::NotFound] {
        let gw = gateway();
        gw.mock.fail(VALIDATE_JWT, code, "bad token");

        let res = gw
            .send(post_json(
                "/v1/user/change-password",
                CHANGE_PASSWORD_BODY,
                Some("expired"),
            ))
            .await;

        assert_eq!(res.status, StatusCode::UNAUTHORIZED, "{code:?}");
        assert_eq!(gw.mock.calls_to(CHANGE_PASSWORD), 0);
    }
}

#[tokio::test]
async fn test_validation_outage_is_mapped() {
    let gw = gateway();
    gw.mock.unreachable(VALIDATE_JWT);

    let res = gw
        .send(post_json(
            "/v1/user/change-password",
            CHANGE_PASSWORD_BODY,
            Some(VALID_TOKEN),
        ))
        .await;

    assert_eq!(res.status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(gw.mock.calls_to(CHANGE_PASSWORD), 0);
}

#[tokio::test]
async fn test_renew_forwards_raw_token_without_validation() {
    let gw = gateway();
    gw.mock.reply(RENEW_JWT, TokenResponse::default());

    let res = gw
        .send(post_json(
            "/v1/auth/renew-token",
            r#"{"refresh_token":"refresh-1","access_token":"ignored"}"#,
            Some("expired-access"),
        ))
        .await;

    assert_eq!(res.status, StatusCode::OK);
    assert_eq!(gw.mock.calls_to(VALIDATE_JWT), 0);

    let sent = gw.mock.last_request(RENEW_JWT).unwrap();
    assert_eq!(sent.access_token, "expired-access");
    assert_eq!(sent.refresh_token, "refresh-1");
}

#[tokio::test]
async fn test_get_user_reads_id_from_path() {
    let gw = authenticated_gateway();
    gw.mock.reply(
        GET_USER,
        User {
            id: "user-2".into(),
            ..Default::default()
        },
    );

    let res = gw.send(get("/v1/user/user-2", Some(VALID_TOKEN))).await;

    assert_eq!(res.status, StatusCode::OK);
    assert_eq!(res.body["id"], "user-2");

    let sent = gw.mock.last_request(GET_USER).unwrap();
    assert_eq!(sent.user_id, "user-2");
    assert_eq!(sent.token, Some(identity()));
}

#[tokio::test]
async fn test_undecodable_path_param_is_json_400() {
    let gw = authenticated_gateway();

    let res = gw.send(get("/v1/user/%FF", Some(VALID_TOKEN))).await;

    assert_eq!(res.status, StatusCode::BAD_REQUEST);
    let message = res.body["error"].as_str().unwrap();
    assert!(message.starts_with("invalid request parameters"), "{}", message);
    assert_eq!(gw.mock.calls_to(GET_USER), 0);
}

#[tokio::test]
async fn test_bodiless_routes_send_identity_only() {
    let gw = authenticated_gateway();
    gw.mock
        .reply(REVOKE_ALL_REFRESH_TOKENS, ServiceStatus::default())
        .reply(FIND_NON_PARTICIPANT_USERS, UserListMsg::default());

    let revoke = axum::http::Request::post("/v1/user/revoke-refresh-tokens")
        .header("authorization", format!("Bearer {}", VALID_TOKEN))
        .body(axum::body::Body::empty())
        .unwrap();
    let res = gw.send(revoke).await;
    assert_eq!(res.status, StatusCode::OK);
    assert_eq!(
        gw.mock.last_request(REVOKE_ALL_REFRESH_TOKENS).unwrap().token,
        Some(identity())
    );

    let res = gw
        .send(get("/v1/user/management/non-participant-users", Some(VALID_TOKEN)))
        .await;
    assert_eq!(res.status, StatusCode::OK);
    assert_eq!(
        gw.mock.last_request(FIND_NON_PARTICIPANT_USERS).unwrap().token,
        Some(identity())
    );
}

#[tokio::test]
async fn test_create_user_is_201() {
    let gw = authenticated_gateway();
    gw.mock.reply(CREATE_USER, User::default());

    let res = gw
        .send(post_json(
            "/v1/user/management/create-user",
            r#"{"account_id":"new@example.com","roles":["PARTICIPANT"]}"#,
            Some(VALID_TOKEN),
        ))
        .await;

    assert_eq!(res.status, StatusCode::CREATED);
    let sent = gw.mock.last_request(CREATE_USER).unwrap();
    assert_eq!(sent.account_id, "new@example.com");
    assert_eq!(sent.token, Some(identity()));
}

#[tokio::test]
async fn test_request_id_reaches_backend() {
    let gw = authenticated_gateway();
    gw.mock.reply(CHANGE_PASSWORD, ServiceStatus::default());

    let mut request = post_json(
        "/user/changePassword",
        CHANGE_PASSWORD_BODY,
        Some(VALID_TOKEN),
    );
    request
        .headers_mut()
        .insert("x-request-id", "trace-me".parse().unwrap());
    let res = gw.send(request).await;

    assert_eq!(res.status, StatusCode::OK);
    assert_eq!(res.headers.get("x-request-id").unwrap(), "trace-me");

    for metadata in [
        gw.mock.last_metadata(VALIDATE_JWT).unwrap(),
        gw.mock.last_metadata(CHANGE_PASSWORD).unwrap(),
    ] {
        assert_eq!(
            metadata.get("x-request-id").unwrap().to_str().unwrap(),
            "trace-me"
        );
        assert!(metadata.get("grpc-timeout").is_some());
    }
}
