//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! responder hooks (served request / write error)
//!     → logging.rs (structured log events)
//!     → tracing subscriber → stdout
//!
//! tower-http TraceLayer
//!     → per-request spans and debug events
//! ```

pub mod logging;
