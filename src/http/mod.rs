//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (Axum setup, fallback handler, tracing)
//!     → responder.rs (fixed status, headers and body)
//!     → body.rs (body frames handed to the connection)
//!     → body dropped
//!         → all bytes written: on_request(request.rs snapshot)
//!         → otherwise:         on_error(WriteError)
//! ```

pub mod body;
pub mod request;
pub mod responder;
pub mod server;

pub use body::{TrackedBody, WriteError};
pub use request::RequestInfo;
pub use responder::{Responder, ResponderConfig, ResponderConfigBuilder};
pub use server::HttpServer;
