//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Check the bind address parses as a socket address
//! - Check the status code can carry a body
//! - Check header names and values are legal HTTP
//!
//! Payload decoding is left to startup, where a bad payload is its own fatal error.

use std::net::SocketAddr;

use axum::http::{HeaderName, HeaderValue, StatusCode};
use thiserror::Error;

use crate::config::schema::ServerConfig;

/// A single semantic problem in a configuration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("invalid bind address '{0}'")]
    BindAddress(String),

    #[error("status {0} is not a valid response status")]
    Status(u16),

    #[error("status {0} does not allow a response body")]
    StatusWithoutBody(u16),

    #[error("invalid header name '{0}'")]
    HeaderName(String),

    #[error("invalid value for header '{name}': {value:?}")]
    HeaderValue { name: String, value: String },
}

/// Validate a configuration, collecting every error rather than stopping at the first.
pub fn validate_config(config: &ServerConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    let bind_address = &config.listener.bind_address;
    if bind_address.parse::<SocketAddr>().is_err() {
        errors.push(ValidationError::BindAddress(bind_address.clone()));
    }

    let status = config.response.status;
    if !(200..=599).contains(&status) || StatusCode::from_u16(status).is_err() {
        errors.push(ValidationError::Status(status));
    } else if matches!(status, 204 | 205 | 304) {
        errors.push(ValidationError::StatusWithoutBody(status));
    }

    for (name, values) in &config.response.headers {
        if HeaderName::from_bytes(name.as_bytes()).is_err() {
            errors.push(ValidationError::HeaderName(name.clone()));
            continue;
        }
        for value in values {
            if HeaderValue::from_str(value).is_err() {
                errors.push(ValidationError::HeaderValue {
                    name: name.clone(),
                    value: value.clone(),
                });
            }
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
