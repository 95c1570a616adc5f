//! Static pixel server library.
//!
//! Answers every HTTP request with the same image, then logs the request (or
//! the failed write) on a detached task.

pub mod config;
pub mod http;
pub mod lifecycle;
pub mod observability;

pub use config::schema::ServerConfig;
pub use http::{HttpServer, Responder, ResponderConfig};
pub use lifecycle::Shutdown;
