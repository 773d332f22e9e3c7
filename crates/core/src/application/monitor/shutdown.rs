// Monitor stop signal
// One sender (the daemon's Ctrl-C handler), any number of tokens.

use tokio::sync::watch;

/// Observed by the monitor loop between cycles and while it sleeps.
/// Stopping never interrupts a cycle already in progress.
#[derive(Clone)]
pub struct ShutdownToken {
    rx: watch::Receiver<bool>,
}

impl ShutdownToken {
    pub fn is_shutdown(&self) -> bool {
        *self.rx.borrow()
    }

    /// Resolves once a stop was requested, immediately if it already was.
    /// A dropped sender also counts as a stop.
    pub async fn wait(&mut self) {
        let _ = self.rx.wait_for(|stopped| *stopped).await;
    }
}

pub struct ShutdownSender {
    tx: watch::Sender<bool>,
}

impl ShutdownSender {
    /// Ask the monitor to stop after its current cycle
    pub fn shutdown(&self) {
        self.tx.send_replace(true);
    }
}

pub fn shutdown_channel() -> (ShutdownSender, ShutdownToken) {
    let (tx, rx) = watch::channel(false);
    (ShutdownSender { tx }, ShutdownToken { rx })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;
    use tokio::time::timeout;

    #[tokio::test]
    async fn test_wait_returns_when_already_stopped() {
        let (tx, mut token) = shutdown_channel();
        tx.shutdown();

        assert!(token.is_shutdown());
        assert!(timeout(Duration::from_millis(100), token.wait()).await.is_ok());
    }

    #[tokio::test]
    async fn test_wait_blocks_until_stop() {
        let (tx, mut token) = shutdown_channel();
        assert!(!token.is_shutdown());
        assert!(timeout(Duration::from_millis(20), token.wait()).await.is_err());

        tx.shutdown();
        assert!(timeout(Duration::from_millis(100), token.wait()).await.is_ok());
    }

    #[tokio::test]
    async fn test_dropped_sender_releases_waiters() {
        let (tx, mut token) = shutdown_channel();
        drop(tx);

        assert!(timeout(Duration::from_millis(100), token.wait()).await.is_ok());
    }
}
