//! In-memory transport for tests and local development.
//!
//! Replies are scripted per method; every call is recorded so tests can
//! assert how many backend round-trips a request caused and what was sent.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;
use prost::Message;
use tonic::metadata::MetadataMap;
use tonic::{Code, Request, Response, Status};

use crate::backend::methods::Rpc;
use crate::backend::transport::RpcTransport;

/// A call observed by [`MockTransport`].
#[derive(Debug, Clone)]
pub struct RecordedCall {
    pub path: &'static str,
    pub body: Bytes,
    pub metadata: MetadataMap,
}

#[derive(Debug, Clone)]
enum Reply {
    Message(Bytes),
    Failure(Code, String),
    Unreachable,
}

#[derive(Debug, Default)]
struct MockState {
    replies: HashMap<&'static str, Reply>,
    calls: Vec<RecordedCall>,
    latency: Option<Duration>,
}

/// Scripted backend. Unscripted methods answer `Unimplemented`.
#[derive(Debug, Clone, Default)]
pub struct MockTransport {
    state: Arc<Mutex<MockState>>,
}

impl MockTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Answer every call to `rpc` with `response`.
    pub fn reply<Req, Resp: Message>(&self, rpc: Rpc<Req, Resp>, response: Resp) -> &Self {
        self.lock()
            .replies
            .insert(rpc.path(), Reply::Message(Bytes::from(response.encode_to_vec())));
        self
    }

    /// Fail every call to `rpc` with the given status.
    pub fn fail<Req, Resp>(&self, rpc: Rpc<Req, Resp>, code: Code, message: &str) -> &Self {
        self.lock()
            .replies
            .insert(rpc.path(), Reply::Failure(code, message.to_string()));
        self
    }

    /// Make `rpc` fail the way a refused connection does: `Unavailable`
    /// with an underlying I/O error attached.
    pub fn unreachable<Req, Resp>(&self, rpc: Rpc<Req, Resp>) -> &Self {
        self.lock().replies.insert(rpc.path(), Reply::Unreachable);
        self
    }

    /// Delay every reply.
    pub fn with_latency(&self, latency: Duration) -> &Self {
        self.lock().latency = Some(latency);
        self
    }

    pub fn calls(&self) -> Vec<RecordedCall> {
        self.lock().calls.clone()
    }

    pub fn call_count(&self) -> usize {
        self.lock().calls.len()
    }

    /// Number of calls made to `rpc`.
    pub fn calls_to<Req, Resp>(&self, rpc: Rpc<Req, Resp>) -> usize {
        self.lock()
            .calls
            .iter()
            .filter(|call| call.path == rpc.path())
            .count()
    }

    /// Decode the most recent request sent to `rpc`.
    pub fn last_request<Req, Resp>(&self, rpc: Rpc<Req, Resp>) -> Option<Req>
    where
        Req: Message + Default,
    {
        let state = self.lock();
        let call = state.calls.iter().rev().find(|call| call.path == rpc.path())?;
        Req::decode(call.body.clone()).ok()
    }

    /// Metadata of the most recent call to `rpc`.
    pub fn last_metadata<Req, Resp>(&self, rpc: Rpc<Req, Resp>) -> Option<MetadataMap> {
        let state = self.lock();
        state
            .calls
            .iter()
            .rev()
            .find(|call| call.path == rpc.path())
            .map(|call| call.metadata.clone())
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, MockState> {
        self.state.lock().expect("mock transport mutex poisoned")
    }
}

#[async_trait]
impl RpcTransport for MockTransport {
    async fn unary(
        &self,
        path: &'static str,
        request: Request<Bytes>,
    ) -> Result<Response<Bytes>, Status> {
        let (reply, latency) = {
            let mut state = self.lock();
            state.calls.push(RecordedCall {
                path,
                metadata: request.metadata().clone(),
                body: request.into_inner(),
            });
            (state.replies.get(path).cloned(), state.latency)
        };

        if let Some(latency) = latency {
            tokio::time::sleep(latency).await;
        }

        match reply {
            Some(Reply::Message(bytes)) => Ok(Response::new(bytes)),
            Some(Reply::Failure(code, message)) => Err(Status::new(code, message)),
            Some(Reply::Unreachable) => {
                let mut status = Status::unavailable("tcp connect error: Connection refused (os error 111)");
                status.set_source(Arc::new(std::io::Error::from(
                    std::io::ErrorKind::ConnectionRefused,
                )));
                Err(status)
            }
            None => Err(Status::unimplemented(format!("no reply scripted for {}", path))),
        }
    }
}
