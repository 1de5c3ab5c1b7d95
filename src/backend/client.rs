//! Shared client of the user-management service.

use std::error::Error as _;
use std::sync::Arc;
use std::time::Instant;

use bytes::Bytes;
use prost::Message;
use tonic::{Request, Status};

use crate::backend::methods::{Rpc, VALIDATE_JWT};
use crate::backend::messages::{JwtRequest, TokenInfos};
use crate::backend::transport::RpcTransport;
use crate::observability::metrics;

/// Message reported to callers when the backend could not be reached at all.
pub const BACKEND_UNREACHABLE: &str = "user management service unreachable";

/// Long-lived handle to the backend, shared by every request.
///
/// Cloning is cheap: all clones share one transport (and therefore one
/// underlying connection).
#[derive(Clone)]
pub struct ServiceClient {
    transport: Arc<dyn RpcTransport>,
}

impl std::fmt::Debug for ServiceClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ServiceClient").finish_non_exhaustive()
    }
}

impl ServiceClient {
    pub fn new(transport: impl RpcTransport) -> Self {
        Self {
            transport: Arc::new(transport),
        }
    }

    /// Invoke one unary method.
    ///
    /// Metadata and the `grpc-timeout` set on `request` travel with the call.
    /// Failures produced locally by the transport (connection refused, broken
    /// stream) keep their code but get a fixed message; the underlying error
    /// is logged, never returned.
    pub async fn call<Req, Resp>(
        &self,
        rpc: Rpc<Req, Resp>,
        request: Request<Req>,
    ) -> Result<Resp, Status>
    where
        Req: Message,
        Resp: Message + Default,
    {
        let started = Instant::now();
        let request = request.map(|msg| Bytes::from(msg.encode_to_vec()));

        let result = match self.transport.unary(rpc.path(), request).await {
            Ok(response) => Resp::decode(response.into_inner()).map_err(|e| {
                tracing::error!(rpc = rpc.name(), error = %e, "Undecodable backend response");
                Status::internal(format!("malformed {} response", rpc.name()))
            }),
            Err(status) if status.source().is_some() => {
                tracing::error!(
                    rpc = rpc.name(),
                    code = ?status.code(),
                    error = %status,
                    "Backend transport failure"
                );
                Err(Status::new(status.code(), BACKEND_UNREACHABLE))
            }
            Err(status) => Err(status),
        };

        let code = match &result {
            Ok(_) => tonic::Code::Ok,
            Err(status) => status.code(),
        };
        metrics::record_backend_call(rpc.name(), code, started);

        result
    }

    /// Invoke one unary method, giving up locally at `deadline`.
    ///
    /// The `grpc-timeout` carried by `request` lets the backend stop early;
    /// this bound covers a backend that never answers.
    pub async fn call_until<Req, Resp>(
        &self,
        rpc: Rpc<Req, Resp>,
        request: Request<Req>,
        deadline: tokio::time::Instant,
    ) -> Result<Resp, Status>
    where
        Req: Message,
        Resp: Message + Default,
    {
        let started = Instant::now();
        match tokio::time::timeout_at(deadline, self.call(rpc, request)).await {
            Ok(result) => result,
            Err(_) => {
                tracing::warn!(rpc = rpc.name(), "Backend call exceeded its deadline");
                metrics::record_backend_call(rpc.name(), tonic::Code::DeadlineExceeded, started);
                Err(Status::deadline_exceeded(format!(
                    "{} did not answer in time",
                    rpc.name()
                )))
            }
        }
    }

    /// Ask the backend to validate a bearer token.
    pub async fn validate_token(
        &self,
        request: Request<String>,
        deadline: tokio::time::Instant,
    ) -> Result<TokenInfos, Status> {
        self.call_until(VALIDATE_JWT, request.map(|token| JwtRequest { token }), deadline)
            .await
    }
}
