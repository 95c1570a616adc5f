//! Request metadata captured for logging.
//!
//! The responder never inspects a request to decide the response. It only takes
//! a snapshot of the few fields worth logging once the response is written.

use std::net::SocketAddr;

use axum::http::Request;

/// Name of the header carrying the original client address behind proxies.
pub const X_FORWARDED_FOR: &str = "x-forwarded-for";

/// Snapshot of a served request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestInfo {
    /// Request target as sent by the client.
    pub url: String,
    /// Address of the peer that sent the request.
    pub remote_addr: SocketAddr,
    /// First `X-Forwarded-For` value, empty when absent.
    pub forwarded_for: String,
}

impl RequestInfo {
    pub fn capture<B>(request: &Request<B>, remote_addr: SocketAddr) -> Self {
        let forwarded_for = request
            .headers()
            .get(X_FORWARDED_FOR)
            .map(|v| String::from_utf8_lossy(v.as_bytes()).into_owned())
            .unwrap_or_default();

        Self {
            url: request.uri().to_string(),
            remote_addr,
            forwarded_for,
        }
    }
}
