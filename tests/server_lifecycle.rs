//! End-to-end tests against a gateway bound to a real socket.

use std::time::Duration;

use edge_gateway::backend::messages::TokenResponse;
use edge_gateway::backend::methods::LOGIN_WITH_EMAIL;
use edge_gateway::config::GatewayConfig;
use edge_gateway::ShutdownReason;

mod common;
use common::start_gateway;

const LOGIN_BODY: &str = r#"{"email":"ada@example.com","password":"hunter2"}"#;

#[tokio::test]
async fn test_login_over_http() {
    let gw = start_gateway(GatewayConfig::default()).await;
    gw.mock.reply(
        LOGIN_WITH_EMAIL,
        TokenResponse {
            access_token: "access-1".into(),
            ..Default::default()
        },
    );

    let client = reqwest::Client::new();
    let res = client
        .post(format!("http://{}/v1/auth/login-with-email", gw.addr))
        .header("content-type", "application/json")
        .body(LOGIN_BODY)
        .send()
        .await
        .unwrap();

    assert_eq!(res.status(), 200);
    let request_id = res
        .headers()
        .get("x-request-id")
        .and_then(|v| v.to_str().ok())
        .map(str::to_string)
        .expect("gateway assigns a request id");

    let json: serde_json::Value = res.json().await.unwrap();
    assert_eq!(json["access_token"], "access-1");

    let metadata = gw.mock.last_metadata(LOGIN_WITH_EMAIL).unwrap();
    assert_eq!(
        metadata.get("x-request-id").unwrap().to_str().unwrap(),
        request_id
    );

    gw.shutdown.trigger(ShutdownReason::Requested);
    gw.handle.await.unwrap().unwrap();
}

#[tokio::test]
async fn test_slow_backend_is_504() {
    let mut config = GatewayConfig::default();
    config.backend.call_timeout_secs = 1;
    let gw = start_gateway(config).await;
    gw.mock
        .reply(LOGIN_WITH_EMAIL, TokenResponse::default())
        .with_latency(Duration::from_secs(5));

    let res = reqwest::Client::new()
        .post(format!("http://{}/user/loginWithEmail", gw.addr))
        .body(LOGIN_BODY)
        .send()
        .await
        .unwrap();

    assert_eq!(res.status(), 504);
    let json: serde_json::Value = res.json().await.unwrap();
    assert!(json["error"].is_string());

    gw.shutdown.trigger(ShutdownReason::Requested);
    gw.handle.await.unwrap().unwrap();
}

#[tokio::test]
async fn test_shutdown_stops_accepting() {
    let gw = start_gateway(GatewayConfig::default()).await;
    let url = format!("http://{}/healthz", gw.addr);

    let res = reqwest::get(&url).await.unwrap();
    assert_eq!(res.status(), 200);

    gw.shutdown.trigger(ShutdownReason::Requested);
    tokio::time::timeout(Duration::from_secs(5), gw.handle)
        .await
        .expect("server stops after shutdown")
        .unwrap()
        .unwrap();

    assert!(reqwest::get(&url).await.is_err());
}
