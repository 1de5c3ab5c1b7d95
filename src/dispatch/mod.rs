//! Handler dispatch: declarative bindings executed by one generic engine.
//!
//! # Data Flow
//! ```text
//! body / query / path
//!     → binding.rs (which message, which RPC, which status)
//!     → engine.rs  (decode, attach identity, one backend call, encode)
//!     → response or GatewayError
//! ```

pub mod binding;
pub mod engine;

pub use binding::{Binding, Inbound, Source};
pub use engine::{execute, get_binding, get_binding_with_path, post_binding};
