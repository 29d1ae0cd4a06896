//! Single-shot re-armable timer
//!
//! At most one pending callback. Re-arming replaces it; cancelling is
//! idempotent and safe from any state. Only the sleep is ever aborted:
//! the callback runs synchronously after the sleep, so a cancel can never
//! interrupt it halfway.

use std::time::Duration;
use tokio::task::JoinHandle;

#[derive(Debug, Default)]
pub struct LiveTimer {
    handle: Option<JoinHandle<()>>,
}

impl LiveTimer {
    pub fn new() -> Self {
        Self { handle: None }
    }

    /// Run `callback` after `delay`, replacing any pending callback
    ///
    /// Must be called from within a tokio runtime.
    pub fn arm<F>(&mut self, delay: Duration, callback: F)
    where
        F: FnOnce() + Send + 'static,
    {
        self.cancel();
        self.handle = Some(tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            callback();
        }));
    }

    /// Drop the pending callback, if any
    pub fn cancel(&mut self) {
        if let Some(handle) = self.handle.take() {
            handle.abort();
        }
    }

    /// True while a callback is waiting to fire
    pub fn is_armed(&self) -> bool {
        self.handle.as_ref().is_some_and(|h| !h.is_finished())
    }
}

impl Drop for LiveTimer {
    fn drop(&mut self) {
        self.cancel();
    }
}
