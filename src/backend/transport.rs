//! Wire transport to the user-management service.
//!
//! # Responsibilities
//! - Carry already-encoded protobuf payloads to a method path and back
//! - Own the long-lived tonic `Channel` (HTTP/2, multiplexed, cheap to clone)
//!
//! # Design Decisions
//! - The transport is byte-level and object safe, so [`ServiceClient`] can be
//!   generic over message types while tests swap in an in-memory transport
//! - Channel establishment happens once at startup, never per request
//!
//! [`ServiceClient`]: crate::backend::ServiceClient

use std::time::Duration;

use async_trait::async_trait;
use bytes::{Buf, BufMut, Bytes};
use tonic::codec::{Codec, DecodeBuf, Decoder, EncodeBuf, Encoder};
use tonic::codegen::http::uri::PathAndQuery;
use tonic::transport::{Channel, Endpoint};
use tonic::{Request, Response, Status};

use crate::backend::BackendError;
use crate::config::BackendConfig;

/// Unary request/response exchange of encoded messages.
#[async_trait]
pub trait RpcTransport: Send + Sync + 'static {
    async fn unary(
        &self,
        path: &'static str,
        request: Request<Bytes>,
    ) -> Result<Response<Bytes>, Status>;
}

/// gRPC transport over a tonic channel.
#[derive(Clone, Debug)]
pub struct GrpcTransport {
    channel: Channel,
}

impl GrpcTransport {
    /// Connect to the configured backend URL.
    ///
    /// With `connect_lazily` the channel is created immediately and connects
    /// on first use; otherwise the connection is established here so startup
    /// fails fast on a wrong address.
    pub async fn connect(config: &BackendConfig) -> Result<Self, BackendError> {
        let endpoint = Endpoint::from_shared(config.user_management_url.clone())
            .map_err(|e| BackendError::InvalidUrl(format!("{}: {}", config.user_management_url, e)))?
            .connect_timeout(Duration::from_secs(config.connect_timeout_secs))
            .tcp_keepalive(Some(Duration::from_secs(60)));

        let channel = if config.connect_lazily {
            endpoint.connect_lazy()
        } else {
            endpoint.connect().await.map_err(|e| BackendError::Connect {
                url: config.user_management_url.clone(),
                reason: e.to_string(),
            })?
        };

        tracing::info!(
            url = %config.user_management_url,
            lazy = config.connect_lazily,
            "User management channel ready"
        );

        Ok(Self { channel })
    }

    pub fn from_channel(channel: Channel) -> Self {
        Self { channel }
    }
}

#[async_trait]
impl RpcTransport for GrpcTransport {
    async fn unary(
        &self,
        path: &'static str,
        request: Request<Bytes>,
    ) -> Result<Response<Bytes>, Status> {
        let mut grpc = tonic::client::Grpc::new(self.channel.clone());
        grpc.ready()
            .await
            .map_err(|e| Status::from_error(Box::new(e)))?;

        grpc.unary(request, PathAndQuery::from_static(path), PassthroughCodec)
            .await
    }
}

/// Codec that moves pre-encoded protobuf bytes unchanged.
#[derive(Debug, Clone, Copy, Default)]
struct PassthroughCodec;

impl Codec for PassthroughCodec {
    type Encode = Bytes;
    type Decode = Bytes;
    type Encoder = PassthroughCodec;
    type Decoder = PassthroughCodec;

    fn encoder(&mut self) -> Self::Encoder {
        PassthroughCodec
    }

    fn decoder(&mut self) -> Self::Decoder {
        PassthroughCodec
    }
}

impl Encoder for PassthroughCodec {
    type Item = Bytes;
    type Error = Status;

    fn encode(&mut self, item: Bytes, dst: &mut EncodeBuf<'_>) -> Result<(), Status> {
        dst.put(item);
        Ok(())
    }
}

impl Decoder for PassthroughCodec {
    type Item = Bytes;
    type Error = Status;

    fn decode(&mut self, src: &mut DecodeBuf<'_>) -> Result<Option<Bytes>, Status> {
        Ok(Some(src.copy_to_bytes(src.remaining())))
    }
}
