use std::future::Future;
use std::time::Duration;
use tokio::sync::watch;

/// Sender side of the stop signal. `send(true)` stops the loop.
pub type ShutdownSender = watch::Sender<bool>;

pub fn shutdown_channel() -> (ShutdownSender, Scheduler) {
    let (tx, rx) = watch::channel(false);
    (tx, Scheduler::new(rx))
}

/// Timer source for the loop controller that gives up as soon as the stop
/// signal fires.
pub struct Scheduler {
    shutdown: watch::Receiver<bool>,
}

impl Scheduler {
    pub fn new(shutdown: watch::Receiver<bool>) -> Self {
        Self { shutdown }
    }

    pub fn is_cancelled(&self) -> bool {
        *self.shutdown.borrow()
    }

    /// Drive `fut` unless the stop signal fires first.
    pub async fn until_cancelled<F: Future>(&mut self, fut: F) -> Option<F::Output> {
        if self.is_cancelled() {
            return None;
        }
        let shutdown = &mut self.shutdown;
        tokio::select! {
            out = fut => Some(out),
            _ = cancelled(shutdown) => None,
        }
    }

    /// `false` if cancelled before `delay` elapsed.
    pub async fn sleep(&mut self, delay: Duration) -> bool {
        self.until_cancelled(tokio::time::sleep(delay)).await.is_some()
    }
}

/// Resolves once the flag is set. A dropped sender can never stop us.
async fn cancelled(rx: &mut watch::Receiver<bool>) {
    if rx.wait_for(|stop| *stop).await.is_err() {
        std::future::pending::<()>().await;
    }
}
