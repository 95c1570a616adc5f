//! Response body that reports whether it was fully written.
//!
//! The server polls the body for frames and hands each one to the connection's
//! write path. Once the connection is done with the body it is dropped: either
//! after the last frame was taken, or early because the client went away or
//! the transport failed. The drop is where the outcome is decided, so exactly
//! one outcome is reported per body.

use std::convert::Infallible;
use std::pin::Pin;
use std::task::{Context, Poll};

use axum::body::Bytes;
use hyper::body::{Body, Frame, SizeHint};
use thiserror::Error;

/// Largest frame handed to the connection at once.
pub const MAX_FRAME_SIZE: usize = 16 * 1024;

/// The response body could not be fully written to the client.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("response body write aborted after {written} of {total} bytes")]
pub struct WriteError {
    written: u64,
    total: u64,
}

impl WriteError {
    /// Bytes handed to the connection before the write was abandoned.
    pub fn written(&self) -> u64 {
        self.written
    }

    /// Length of the full body.
    pub fn total(&self) -> u64 {
        self.total
    }
}

type OnRelease = Box<dyn FnOnce(Result<(), WriteError>) + Send>;

/// A fixed body that calls `on_release` exactly once, when it is dropped.
pub struct TrackedBody {
    remaining: Option<Bytes>,
    written: u64,
    total: u64,
    on_release: Option<OnRelease>,
}

impl TrackedBody {
    pub fn new<F>(bytes: Bytes, on_release: F) -> Self
    where
        F: FnOnce(Result<(), WriteError>) + Send + 'static,
    {
        let total = bytes.len() as u64;
        // An empty body is never polled; the connection drops it right after the head.
        let remaining = if bytes.is_empty() { None } else { Some(bytes) };
        Self {
            remaining,
            written: 0,
            total,
            on_release: Some(Box::new(on_release)),
        }
    }

    /// A body whose bytes count as written without being transmitted.
    ///
    /// Used for `HEAD` responses, where the connection never sends a body.
    pub fn without_transmission<F>(total: u64, on_release: F) -> Self
    where
        F: FnOnce(Result<(), WriteError>) + Send + 'static,
    {
        Self {
            remaining: None,
            written: total,
            total,
            on_release: Some(Box::new(on_release)),
        }
    }

    /// Whether every byte has been handed to the connection.
    pub fn is_complete(&self) -> bool {
        self.remaining.is_none()
    }
}

impl Body for TrackedBody {
    type Data = Bytes;
    type Error = Infallible;

    fn poll_frame(
        mut self: Pin<&mut Self>,
        _cx: &mut Context<'_>,
    ) -> Poll<Option<Result<Frame<Self::Data>, Self::Error>>> {
        let Some(mut bytes) = self.remaining.take() else {
            return Poll::Ready(None);
        };

        let chunk = if bytes.len() > MAX_FRAME_SIZE {
            let chunk = bytes.split_to(MAX_FRAME_SIZE);
            self.remaining = Some(bytes);
            chunk
        } else {
            bytes
        };

        self.written += chunk.len() as u64;
        Poll::Ready(Some(Ok(Frame::data(chunk))))
    }

    fn is_end_stream(&self) -> bool {
        self.remaining.is_none()
    }

    fn size_hint(&self) -> SizeHint {
        SizeHint::with_exact(
            self.remaining
                .as_ref()
                .map(|b| b.len() as u64)
                .unwrap_or_default(),
        )
    }
}

impl Drop for TrackedBody {
    fn drop(&mut self) {
        let Some(on_release) = self.on_release.take() else {
            return;
        };

        if self.is_complete() {
            on_release(Ok(()));
        } else {
            on_release(Err(WriteError {
                written: self.written,
                total: self.total,
            }));
        }
    }
}

impl std::fmt::Debug for TrackedBody {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TrackedBody")
            .field("written", &self.written)
            .field("total", &self.total)
            .finish()
    }
}
