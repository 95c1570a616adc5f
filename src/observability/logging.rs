//! Structured logging.
//!
//! # Responsibilities
//! - Initialize the tracing subscriber
//! - Provide the default responder hooks that log served requests and write errors
//!
//! # Design Decisions
//! - Uses tracing crate for structured logging; the subscriber is safe to call
//!   from many tasks at once, so hooks need no extra locking
//! - Log level from `RUST_LOG`, falling back to the configured filter

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::http::body::WriteError;
use crate::http::request::RequestInfo;

/// Install the global subscriber.
///
/// Returns `false` if a subscriber was already installed.
pub fn init(default_filter: &str) -> bool {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| default_filter.into()))
        .with(tracing_subscriber::fmt::layer())
        .try_init()
        .is_ok()
}

/// Default `on_request` hook.
pub fn log_request(info: RequestInfo) {
    tracing::info!(
        url = %info.url,
        remote_addr = %info.remote_addr,
        forwarded_for = %info.forwarded_for,
        "URL requested"
    );
}

/// Default `on_error` hook.
pub fn log_write_error(err: WriteError) {
    tracing::error!(error = %err, "An error happened asynchronously");
}
