//! Graceful shutdown.
//!
//! One [`Shutdown`] fans a single stop request out to every server run that
//! subscribed to it. The stop request comes either from [`Shutdown::trigger`]
//! (tests) or from a termination future such as
//! [`signals::wait_for_termination`](crate::lifecycle::signals::wait_for_termination).

use std::future::Future;

use tokio::sync::broadcast;
use tokio::task::JoinHandle;

#[derive(Clone)]
pub struct Shutdown {
    tx: broadcast::Sender<()>,
}

impl Shutdown {
    pub fn new() -> Self {
        let (tx, _) = broadcast::channel(1);
        Self { tx }
    }

    /// A receiver that resolves once shutdown is triggered, or when every
    /// `Shutdown` handle is gone.
    pub fn subscribe(&self) -> broadcast::Receiver<()> {
        self.tx.subscribe()
    }

    /// Stop every subscribed server. Returns how many were notified.
    pub fn trigger(&self) -> usize {
        let notified = self.tx.send(()).unwrap_or(0);
        tracing::debug!(notified, "Shutdown triggered");
        notified
    }

    /// Trigger shutdown once `termination` resolves.
    ///
    /// The handle is moved into the spawned task, so subscribers are also
    /// released if the task is aborted.
    pub fn trigger_on<F>(self, termination: F) -> JoinHandle<()>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        tokio::spawn(async move {
            termination.await;
            self.trigger();
        })
    }
}

impl Default for Shutdown {
    fn default() -> Self {
        Self::new()
    }
}
