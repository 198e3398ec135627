use std::future::Future;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use tokio::sync::Notify;

use crate::error::ClientError;

/// Hand-off between the receiver and a console blocked on a reply.
///
/// A signal only reaches a waiter that is already registered; nothing is
/// remembered for a later waiter. Once closed, every current and future wait
/// fails with `ConnectionClosed`.
#[derive(Debug, Default)]
pub struct SyncGate {
    notify: Notify,
    closed: AtomicBool,
}

impl SyncGate {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn signal(&self) {
        self.notify.notify_waiters();
    }

    pub fn close(&self) {
        self.closed.store(true, Ordering::SeqCst);
        self.notify.notify_waiters();
    }

    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::SeqCst)
    }

    /// Registers as the waiter, runs `request`, then suspends until the next
    /// signal. Any signal resolves the wait, not only the matching reply.
    ///
    /// `limit` bounds only the wait; `request` always runs to completion so a
    /// command is never left half written.
    pub async fn wait_after<F>(&self, request: F, limit: Option<Duration>) -> Result<(), ClientError>
    where
        F: Future<Output = Result<(), ClientError>>,
    {
        let notified = self.notify.notified();
        tokio::pin!(notified);
        // Must be registered before the request hits the wire.
        notified.as_mut().enable();

        if self.is_closed() {
            return Err(ClientError::ConnectionClosed);
        }
        request.await?;
        match limit {
            Some(limit) => tokio::time::timeout(limit, notified)
                .await
                .map_err(|_| ClientError::ReplyTimeout(limit))?,
            None => notified.await,
        }

        if self.is_closed() {
            return Err(ClientError::ConnectionClosed);
        }
        Ok(())
    }

    pub async fn closed(&self) {
        loop {
            let notified = self.notify.notified();
            if self.is_closed() {
                return;
            }
            notified.await;
        }
    }
}
