//! The universal responder.
//!
//! Every request, whatever its method, path, headers or body, gets the same
//! status, headers and body. After the connection is done with the body one of
//! two hooks runs on a detached task:
//! - `on_request` with a [`RequestInfo`] when every body byte was written
//! - `on_error` with a [`WriteError`] when the write was cut short
//!
//! Exactly one hook runs per request.

use std::net::SocketAddr;
use std::sync::Arc;

use axum::body::{Body, Bytes};
use axum::http::header::CONTENT_LENGTH;
use axum::http::{HeaderMap, HeaderName, HeaderValue, Method, Request, Response, StatusCode};

use crate::http::body::{TrackedBody, WriteError};
use crate::http::request::RequestInfo;
use crate::observability::logging;

/// Callback run after a response was fully written.
pub type RequestHook = Arc<dyn Fn(RequestInfo) + Send + Sync>;

/// Callback run when writing a response body failed.
pub type ErrorHook = Arc<dyn Fn(WriteError) + Send + Sync>;

/// The fixed response and its hooks. Immutable once built.
pub struct ResponderConfig {
    body: Bytes,
    headers: HeaderMap,
    status: StatusCode,
    on_error: ErrorHook,
    on_request: RequestHook,
}

impl ResponderConfig {
    pub fn builder() -> ResponderConfigBuilder {
        ResponderConfigBuilder::default()
    }

    pub fn body(&self) -> &Bytes {
        &self.body
    }

    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    pub fn status(&self) -> StatusCode {
        self.status
    }
}

impl std::fmt::Debug for ResponderConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ResponderConfig")
            .field("body_len", &self.body.len())
            .field("headers", &self.headers)
            .field("status", &self.status)
            .finish_non_exhaustive()
    }
}

/// Builder for [`ResponderConfig`].
///
/// Defaults to an empty `200 OK` response with the logging hooks from
/// [`crate::observability::logging`].
pub struct ResponderConfigBuilder {
    body: Bytes,
    headers: HeaderMap,
    status: StatusCode,
    on_error: ErrorHook,
    on_request: RequestHook,
}

impl Default for ResponderConfigBuilder {
    fn default() -> Self {
        Self {
            body: Bytes::new(),
            headers: HeaderMap::new(),
            status: StatusCode::OK,
            on_error: Arc::new(logging::log_write_error),
            on_request: Arc::new(logging::log_request),
        }
    }
}

impl std::fmt::Debug for ResponderConfigBuilder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ResponderConfigBuilder")
            .field("body_len", &self.body.len())
            .field("headers", &self.headers)
            .field("status", &self.status)
            .finish_non_exhaustive()
    }
}

impl ResponderConfigBuilder {
    pub fn body(mut self, body: impl Into<Bytes>) -> Self {
        self.body = body.into();
        self
    }

    pub fn status(mut self, status: StatusCode) -> Self {
        self.status = status;
        self
    }

    /// Add a header value. Repeated names keep every value, in call order.
    pub fn header(mut self, name: HeaderName, value: HeaderValue) -> Self {
        self.headers.append(name, value);
        self
    }

    pub fn on_request<F>(mut self, hook: F) -> Self
    where
        F: Fn(RequestInfo) + Send + Sync + 'static,
    {
        self.on_request = Arc::new(hook);
        self
    }

    pub fn on_error<F>(mut self, hook: F) -> Self
    where
        F: Fn(WriteError) + Send + Sync + 'static,
    {
        self.on_error = Arc::new(hook);
        self
    }

    pub fn build(self) -> ResponderConfig {
        ResponderConfig {
            body: self.body,
            headers: self.headers,
            status: self.status,
            on_error: self.on_error,
            on_request: self.on_request,
        }
    }
}

/// Answers every request with the configured response.
///
/// Cloning is cheap; all clones share one [`ResponderConfig`].
#[derive(Debug, Clone)]
pub struct Responder {
    config: Arc<ResponderConfig>,
}

impl Responder {
    pub fn new(config: ResponderConfig) -> Self {
        Self {
            config: Arc::new(config),
        }
    }

    pub fn config(&self) -> &ResponderConfig {
        &self.config
    }

    /// Build the response for `request`.
    ///
    /// The request only contributes the metadata handed to `on_request`.
    pub fn respond<B>(&self, request: &Request<B>, remote_addr: SocketAddr) -> Response<Body> {
        let info = RequestInfo::capture(request, remote_addr);
        let config = Arc::clone(&self.config);
        let on_release = move |outcome: Result<(), WriteError>| match outcome {
            Ok(()) => {
                let hook = Arc::clone(&config.on_request);
                dispatch(move || hook(info));
            }
            Err(err) => {
                let hook = Arc::clone(&config.on_error);
                dispatch(move || hook(err));
            }
        };

        let is_head = request.method() == Method::HEAD;
        let body_len = self.config.body.len() as u64;
        let body = if is_head {
            TrackedBody::without_transmission(body_len, on_release)
        } else {
            TrackedBody::new(self.config.body.clone(), on_release)
        };

        let mut response = Response::new(Body::new(body));
        *response.status_mut() = self.config.status;
        *response.headers_mut() = self.config.headers.clone();
        // The HEAD body is empty, so the length a GET would carry is set by hand.
        if is_head && !response.headers().contains_key(CONTENT_LENGTH) {
            response
                .headers_mut()
                .insert(CONTENT_LENGTH, HeaderValue::from(body_len));
        }
        response
    }
}

/// Run `task` on a detached tokio task, or inline when no runtime is around.
fn dispatch<F>(task: F)
where
    F: FnOnce() + Send + 'static,
{
    match tokio::runtime::Handle::try_current() {
        Ok(handle) => {
            handle.spawn(async move { task() });
        }
        Err(_) => task(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::header::CONTENT_TYPE;
    use http_body_util::BodyExt;
    use std::time::Duration;
    use tokio::sync::mpsc;

    #[derive(Debug)]
    enum Event {
        Request(RequestInfo),
        Error(WriteError),
    }

    fn capturing(builder: ResponderConfigBuilder) -> (Responder, mpsc::UnboundedReceiver<Event>) {
        let (tx, rx) = mpsc::unbounded_channel();
        let error_tx = tx.clone();
        let config = builder
            .on_request(move |info| {
                let _ = tx.send(Event::Request(info));
            })
            .on_error(move |err| {
                let _ = error_tx.send(Event::Error(err));
            })
            .build();
        (Responder::new(config), rx)
    }

    fn pixel() -> ResponderConfigBuilder {
        ResponderConfig::builder()
            .body(Bytes::from_static(b"\x89PNG\r\n\x1a\nfake"))
            .header(CONTENT_TYPE, HeaderValue::from_static("image/png"))
    }

    fn peer() -> SocketAddr {
        "192.0.2.10:50000".parse().unwrap()
    }

    async fn next_event(rx: &mut mpsc::UnboundedReceiver<Event>) -> Event {
        tokio::time::timeout(Duration::from_secs(1), rx.recv())
            .await
            .expect("hook was not dispatched")
            .expect("hook channel closed")
    }

    async fn assert_no_more_events(rx: &mut mpsc::UnboundedReceiver<Event>) {
        let extra = tokio::time::timeout(Duration::from_millis(50), rx.recv()).await;
        assert!(extra.is_err(), "unexpected extra hook: {:?}", extra);
    }

    #[tokio::test]
    async fn every_request_gets_the_same_response() {
        let (responder, _rx) = capturing(pixel());

        for (method, uri) in [
            (Method::GET, "/"),
            (Method::POST, "/upload?x=1"),
            (Method::DELETE, "/a/b/c"),
            (Method::PUT, "/pixel.png"),
        ] {
            let request = Request::builder()
                .method(method)
                .uri(uri)
                .header("accept", "text/html")
                .body(Body::from("ignored"))
                .unwrap();

            let response = responder.respond(&request, peer());
            assert_eq!(response.status(), StatusCode::OK);
            assert_eq!(response.headers()[CONTENT_TYPE], "image/png");

            let body = response.into_body().collect().await.unwrap().to_bytes();
            assert_eq!(body.as_ref(), b"\x89PNG\r\n\x1a\nfake");
        }
    }

    #[tokio::test]
    async fn repeated_header_values_are_kept_in_order() {
        let (responder, _rx) = capturing(
            pixel()
                .header(
                    HeaderName::from_static("x-pixel"),
                    HeaderValue::from_static("one"),
                )
                .header(
                    HeaderName::from_static("x-pixel"),
                    HeaderValue::from_static("two"),
                )
                .header(
                    HeaderName::from_static("x-pixel"),
                    HeaderValue::from_static("one"),
                ),
        );

        let request = Request::builder().uri("/").body(()).unwrap();
        let response = responder.respond(&request, peer());

        let values: Vec<_> = response.headers().get_all("x-pixel").iter().collect();
        assert_eq!(values, vec!["one", "two", "one"]);
    }

    #[tokio::test]
    async fn configured_status_is_used() {
        let (responder, _rx) = capturing(pixel().status(StatusCode::NOT_FOUND));
        let request = Request::builder().uri("/").body(()).unwrap();

        let response = responder.respond(&request, peer());
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn written_response_dispatches_request_hook_only() {
        let (responder, mut rx) = capturing(pixel());
        let request = Request::builder()
            .uri("/open.png?id=7")
            .header("x-forwarded-for", "203.0.113.9")
            .body(())
            .unwrap();

        let response = responder.respond(&request, peer());
        response.into_body().collect().await.unwrap();

        match next_event(&mut rx).await {
            Event::Request(info) => {
                assert_eq!(info.url, "/open.png?id=7");
                assert_eq!(info.remote_addr, peer());
                assert_eq!(info.forwarded_for, "203.0.113.9");
            }
            other => panic!("expected request hook, got {:?}", other),
        }
        assert_no_more_events(&mut rx).await;
    }

    #[tokio::test]
    async fn dropped_response_dispatches_error_hook_only() {
        let (responder, mut rx) = capturing(pixel());
        let request = Request::builder().uri("/").body(()).unwrap();

        let response = responder.respond(&request, peer());
        drop(response);

        match next_event(&mut rx).await {
            Event::Error(err) => {
                assert_eq!(err.written(), 0);
                assert_eq!(err.total(), 12);
            }
            other => panic!("expected error hook, got {:?}", other),
        }
        assert_no_more_events(&mut rx).await;
    }

    #[tokio::test]
    async fn partial_write_dispatches_error_hook() {
        let payload = vec![0u8; crate::http::body::MAX_FRAME_SIZE + 1];
        let (responder, mut rx) = capturing(ResponderConfig::builder().body(payload));
        let request = Request::builder().uri("/").body(()).unwrap();

        let mut body = responder.respond(&request, peer()).into_body();
        body.frame().await.unwrap().unwrap();
        drop(body);

        assert!(matches!(next_event(&mut rx).await, Event::Error(_)));
        assert_no_more_events(&mut rx).await;
    }

    #[tokio::test]
    async fn empty_body_is_served() {
        let (responder, mut rx) = capturing(ResponderConfig::builder());
        let request = Request::builder().uri("/").body(()).unwrap();

        let body = responder
            .respond(&request, peer())
            .into_body()
            .collect()
            .await
            .unwrap()
            .to_bytes();

        assert!(body.is_empty());
        assert!(matches!(next_event(&mut rx).await, Event::Request(_)));
    }

    #[tokio::test]
    async fn head_request_counts_as_written() {
        let (responder, mut rx) = capturing(pixel());
        let request = Request::builder()
            .method(Method::HEAD)
            .uri("/")
            .body(())
            .unwrap();

        let response = responder.respond(&request, peer());
        assert_eq!(response.headers()[CONTENT_TYPE], "image/png");
        assert_eq!(response.headers()[CONTENT_LENGTH], "12");
        drop(response);

        assert!(matches!(next_event(&mut rx).await, Event::Request(_)));
        assert_no_more_events(&mut rx).await;
    }

    #[test]
    fn builder_debug_omits_hooks_and_body_bytes() {
        let rendered = format!("{:?}", pixel().status(StatusCode::ACCEPTED));

        assert!(rendered.starts_with("ResponderConfigBuilder"));
        assert!(rendered.contains("body_len: 12"));
        assert!(rendered.contains("202"));
        assert!(!rendered.contains("on_request"));
    }

    #[test]
    fn hooks_run_inline_without_runtime() {
        let (responder, mut rx) = capturing(pixel());
        let request = Request::builder().uri("/").body(()).unwrap();

        drop(responder.respond(&request, peer()));

        assert!(matches!(rx.try_recv(), Ok(Event::Error(_))));
    }
}
