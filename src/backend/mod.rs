//! Backend (user-management RPC service) subsystem.
//!
//! # Data Flow
//! ```text
//! Binding (typed request)
//!     → client.rs (protobuf encode, metrics, transport error scrubbing)
//!     → transport.rs (tonic channel, or mock.rs in tests)
//!     → client.rs (protobuf decode)
//!     → status.rs on failure (gRPC code → HTTP status)
//! ```
//!
//! # Design Decisions
//! - Message schemas are hand-written prost structs that also derive serde,
//!   so JSON bodies map one-to-one onto RPC messages
//! - Methods are typed constants (`methods.rs`), not per-method client code

pub mod client;
pub mod messages;
pub mod methods;
pub mod mock;
pub mod status;
pub mod transport;

pub use client::ServiceClient;
pub use methods::Rpc;
pub use mock::MockTransport;
pub use transport::{GrpcTransport, RpcTransport};

use thiserror::Error;

/// Errors raised while establishing the backend connection.
#[derive(Debug, Error)]
pub enum BackendError {
    /// The configured service URL is not a valid endpoint.
    #[error("invalid user management URL {0}")]
    InvalidUrl(String),

    /// The initial connection attempt failed.
    #[error("failed to connect to {url}: {reason}")]
    Connect { url: String, reason: String },
}
