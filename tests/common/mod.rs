//! Shared utilities for integration testing.

#![allow(dead_code)]

use std::net::SocketAddr;

use axum::body::Body;
use axum::http::{HeaderMap, Request, StatusCode};
use axum::Router;
use edge_gateway::backend::messages::TokenInfos;
use edge_gateway::backend::{MockTransport, ServiceClient};
use edge_gateway::config::GatewayConfig;
use edge_gateway::{HttpServer, Shutdown};
use serde_json::Value;
use tokio::net::TcpListener;
use tokio::task::JoinHandle;
use tower::ServiceExt;

pub const VALID_TOKEN: &str = "valid-access-token";

/// In-process gateway wired to a scripted backend.
pub struct TestGateway {
    pub router: Router,
    pub mock: MockTransport,
}

pub fn gateway() -> TestGateway {
    gateway_with(GatewayConfig::default())
}

pub fn gateway_with(config: GatewayConfig) -> TestGateway {
    let mock = MockTransport::new();
    let server = HttpServer::new(config, ServiceClient::new(mock.clone()));
    TestGateway {
        router: server.router(),
        mock,
    }
}

/// Claims returned by the scripted `ValidateJWT`.
pub fn identity() -> TokenInfos {
    TokenInfos {
        id: "user-1".into(),
        instance_id: "inst-1".into(),
        roles: vec!["PARTICIPANT".into()],
        session_id: "session-1".into(),
        profile_id: "profile-1".into(),
        account_confirmed: true,
        ..Default::default()
    }
}

pub struct TestResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: Value,
}

impl TestGateway {
    pub async fn send(&self, request: Request<Body>) -> TestResponse {
        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let headers = response.headers().clone();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let body = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap_or(Value::Null)
        };
        TestResponse {
            status,
            headers,
            body,
        }
    }
}

pub fn post_json(uri: &str, body: &str, token: Option<&str>) -> Request<Body> {
    let mut builder = Request::post(uri).header("content-type", "application/json");
    if let Some(token) = token {
        builder = builder.header("authorization", format!("Bearer {}", token));
    }
    builder.body(Body::from(body.to_string())).unwrap()
}

pub fn get(uri: &str, token: Option<&str>) -> Request<Body> {
    let mut builder = Request::get(uri);
    if let Some(token) = token {
        builder = builder.header("authorization", format!("Bearer {}", token));
    }
    builder.body(Body::empty()).unwrap()
}

/// A gateway serving on an ephemeral port.
pub struct RunningGateway {
    pub addr: SocketAddr,
    pub mock: MockTransport,
    pub shutdown: Shutdown,
    pub handle: JoinHandle<Result<(), std::io::Error>>,
}

pub async fn start_gateway(config: GatewayConfig) -> RunningGateway {
    let mock = MockTransport::new();
    let server = HttpServer::new(config, ServiceClient::new(mock.clone()));

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    let shutdown = Shutdown::new();
    let rx = shutdown.subscribe();
    let handle = tokio::spawn(async move { server.run(listener, rx).await });

    RunningGateway {
        addr,
        mock,
        shutdown,
        handle,
    }
}
