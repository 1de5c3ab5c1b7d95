//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! TCP/TLS connection
//!     → server.rs (Axum setup, request ID, tracing, limits, timeout)
//!     → context.rs (RequestContext with deadline)
//!     → [pipeline stages] → [dispatch engine]
//!     → codec.rs (JSON ⇄ message) / error.rs (error body)
//!     → Send to client
//! ```

pub mod codec;
pub mod context;
pub mod error;
pub mod server;

pub use context::{RawToken, RequestContext, TokenState, X_REQUEST_ID};
pub use error::{DecodeError, GatewayError};
pub use server::{AppState, HttpServer};
