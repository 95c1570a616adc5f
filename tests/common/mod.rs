//! Shared utilities for integration tests.

use std::net::SocketAddr;
use std::time::Duration;

use pixel_server::http::{RequestInfo, ResponderConfigBuilder, WriteError};
use pixel_server::{HttpServer, Responder, Shutdown};
use tokio::net::TcpListener;
use tokio::sync::mpsc;

/// A hook invocation observed by a test server.
#[derive(Debug)]
pub enum Event {
    Request(RequestInfo),
    Error(WriteError),
}

/// A running server with capturing hooks.
pub struct TestServer {
    pub addr: SocketAddr,
    pub shutdown: Shutdown,
    pub events: mpsc::UnboundedReceiver<Event>,
}

impl TestServer {
    pub fn url(&self, path: &str) -> String {
        format!("http://{}{}", self.addr, path)
    }

    /// Wait for the next hook invocation.
    pub async fn next_event(&mut self) -> Event {
        tokio::time::timeout(Duration::from_secs(5), self.events.recv())
            .await
            .expect("no hook dispatched in time")
            .expect("hook channel closed")
    }

    /// Assert that no further hook runs within a short grace period.
    pub async fn assert_quiet(&mut self) {
        let extra = tokio::time::timeout(Duration::from_millis(200), self.events.recv()).await;
        assert!(extra.is_err(), "unexpected hook: {:?}", extra);
    }
}

/// Start a server on an ephemeral port, replacing the builder's hooks with
/// ones that report into `TestServer::events`.
pub async fn start_server(builder: ResponderConfigBuilder) -> TestServer {
    let (tx, events) = mpsc::unbounded_channel();
    let error_tx = tx.clone();
    let config = builder
        .on_request(move |info| {
            let _ = tx.send(Event::Request(info));
        })
        .on_error(move |err| {
            let _ = error_tx.send(Event::Error(err));
        })
        .build();

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let shutdown = Shutdown::new();
    let server_shutdown = shutdown.subscribe();
    let server = HttpServer::new(Responder::new(config));

    tokio::spawn(async move {
        let _ = server.run(listener, server_shutdown).await;
    });

    TestServer {
        addr,
        shutdown,
        events,
    }
}

/// A client that opens a fresh connection per request.
pub fn client() -> reqwest::Client {
    reqwest::Client::builder()
        .pool_max_idle_per_host(0)
        .no_proxy()
        .build()
        .unwrap()
}
