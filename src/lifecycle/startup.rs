//! Startup orchestration.
//!
//! # Order
//! 1. Decode the payload and assemble the responder
//! 2. Bind the listener
//! 3. Serve until shutdown
//!
//! Any failure is fatal, and nothing is bound until the responder is ready.

use axum::http::{HeaderName, HeaderValue, StatusCode};
use base64::{engine::general_purpose::STANDARD, Engine as _};
use thiserror::Error;
use tokio::net::TcpListener;
use tokio::sync::broadcast;

use crate::config::{ResponseConfig, ServerConfig};
use crate::http::responder::{ResponderConfig, ResponderConfigBuilder};
use crate::http::{HttpServer, Responder};

/// Fatal errors that stop the process.
#[derive(Debug, Error)]
pub enum StartupError {
    #[error("Failed to decode response body: {0}")]
    Decode(#[from] base64::DecodeError),

    #[error("Invalid response status {0}")]
    Status(u16),

    #[error("Invalid response header '{0}'")]
    Header(String),

    #[error("Failed to bind {address}: {source}")]
    Bind {
        address: String,
        source: std::io::Error,
    },

    #[error("Failed to serve: {0}")]
    Serve(#[source] std::io::Error),
}

/// Decode the payload and assemble the fixed response.
///
/// The returned builder carries the logging hooks; callers may replace them.
pub fn responder_from_config(
    response: &ResponseConfig,
) -> Result<ResponderConfigBuilder, StartupError> {
    let body = STANDARD.decode(&response.body_base64)?;
    let status =
        StatusCode::from_u16(response.status).map_err(|_| StartupError::Status(response.status))?;

    let mut builder = ResponderConfig::builder().body(body).status(status);
    for (name, values) in &response.headers {
        let header_name = HeaderName::from_bytes(name.as_bytes())
            .map_err(|_| StartupError::Header(name.clone()))?;
        for value in values {
            let header_value =
                HeaderValue::from_str(value).map_err(|_| StartupError::Header(name.clone()))?;
            builder = builder.header(header_name.clone(), header_value);
        }
    }

    Ok(builder)
}

/// Build the responder, bind the listener and serve until `shutdown` fires.
pub async fn launch(
    config: ServerConfig,
    shutdown: broadcast::Receiver<()>,
) -> Result<(), StartupError> {
    let responder = Responder::new(responder_from_config(&config.response)?.build());

    tracing::info!(
        status = %responder.config().status(),
        body_bytes = responder.config().body().len(),
        "Responder ready"
    );

    let address = config.listener.bind_address;
    let listener = TcpListener::bind(&address)
        .await
        .map_err(|source| StartupError::Bind {
            address: address.clone(),
            source,
        })?;

    HttpServer::new(responder)
        .run(listener, shutdown)
        .await
        .map_err(StartupError::Serve)
}
