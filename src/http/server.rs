//! HTTP server setup.
//!
//! # Responsibilities
//! - Create the Axum router; its fallback sends every method and path to the responder
//! - Wire up request tracing middleware
//! - Serve on a bound listener until shutdown is signalled

use std::net::SocketAddr;

use axum::{
    body::Body,
    extract::{ConnectInfo, State},
    http::Request,
    response::Response,
    Router,
};
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tower_http::trace::TraceLayer;

use crate::http::responder::Responder;

/// HTTP server hosting the universal responder.
pub struct HttpServer {
    router: Router,
}

impl HttpServer {
    pub fn new(responder: Responder) -> Self {
        Self {
            router: Self::build_router(responder),
        }
    }

    /// Build the Axum router with all middleware layers.
    pub fn build_router(responder: Responder) -> Router {
        Router::new()
            .fallback(respond_handler)
            .with_state(responder)
            .layer(TraceLayer::new_for_http())
    }

    /// Run the server, accepting connections on the given listener until
    /// `shutdown` fires or its sender is dropped.
    pub async fn run(
        self,
        listener: TcpListener,
        mut shutdown: broadcast::Receiver<()>,
    ) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(address = %addr, "HTTP server starting");

        let app = self
            .router
            .into_make_service_with_connect_info::<SocketAddr>();

        axum::serve(listener, app)
            .with_graceful_shutdown(async move {
                let _ = shutdown.recv().await;
                tracing::info!("Shutdown signal received");
            })
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }
}

async fn respond_handler(
    State(responder): State<Responder>,
    ConnectInfo(remote_addr): ConnectInfo<SocketAddr>,
    request: Request<Body>,
) -> Response {
    responder.respond(&request, remote_addr)
}
