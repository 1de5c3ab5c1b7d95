//! Network layer subsystem.
//!
//! Plain TCP listening is handled by `tokio` and `axum::serve`; this module
//! only holds TLS material loading for the `axum-server` listener.

pub mod tls;
