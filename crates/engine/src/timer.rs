use std::{future::Future, time::Duration};

use tokio::task::JoinHandle;

/// A one-shot delayed task owned by a session or game.
///
/// Cancellation is best effort: a task that already woke up and is waiting
/// for the session lock keeps running, so the fired callback must check that
/// its target is still current.
#[derive(Debug, Default)]
pub(crate) struct Timer(Option<JoinHandle<()>>);

impl Timer {
    pub(crate) fn arm<F>(&mut self, delay: Duration, fire: F)
    where
        F: Future<Output = ()> + Send + 'static,
    {
        self.cancel();
        self.0 = Some(tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            fire.await;
        }));
    }

    pub(crate) fn cancel(&mut self) {
        if let Some(handle) = self.0.take() {
            handle.abort();
        }
    }

    /// Forgets the handle without aborting. Called from inside the firing
    /// task before it drops its owner.
    pub(crate) fn disarm(&mut self) {
        self.0 = None;
    }

    pub(crate) fn is_armed(&self) -> bool {
        self.0.as_ref().is_some_and(|handle| !handle.is_finished())
    }
}

impl Drop for Timer {
    fn drop(&mut self) {
        self.cancel();
    }
}
