//! Cancellable background tasks.

use std::future::Future;

use {
    tokio::task::JoinHandle,
    tokio_util::sync::CancellationToken,
    tracing::warn,
};

/// A spawned loop plus the token that ends it.
///
/// [`TaskHandle::stop`] cancels and then waits for the task to return, so once
/// it resolves the loop performs no further work.
#[derive(Debug)]
pub struct TaskHandle {
    cancel: CancellationToken,
    join: JoinHandle<()>,
}

impl TaskHandle {
    /// Spawn `body` on the current runtime, handing it the cancellation token.
    pub fn spawn<F, Fut>(body: F) -> Self
    where
        F: FnOnce(CancellationToken) -> Fut,
        Fut: Future<Output = ()> + Send + 'static,
    {
        let cancel = CancellationToken::new();
        let join = tokio::spawn(body(cancel.clone()));
        Self { cancel, join }
    }

    pub fn is_running(&self) -> bool {
        !self.join.is_finished()
    }

    pub async fn stop(self) {
        self.cancel.cancel();
        if let Err(e) = self.join.await
            && e.is_panic()
        {
            warn!(error = %e, "background task panicked");
        }
    }
}
