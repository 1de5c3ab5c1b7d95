//! HTTP/JSON edge gateway in front of the user-management RPC service.

pub mod backend;
pub mod config;
pub mod dispatch;
pub mod http;
pub mod lifecycle;
pub mod net;
pub mod observability;
pub mod pipeline;
pub mod routes;

pub use config::schema::GatewayConfig;
pub use http::HttpServer;
pub use lifecycle::{Shutdown, ShutdownReason};
