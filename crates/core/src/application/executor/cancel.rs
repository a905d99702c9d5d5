// Run Cancellation Token

use tokio::sync::watch;

/// Cancellation signal for an audit run (e.g. Ctrl+C)
///
/// A token whose sender was dropped without cancelling never fires.
#[derive(Clone)]
pub struct CancelToken {
    rx: watch::Receiver<bool>,
}

impl CancelToken {
    /// Token that is never cancelled
    pub fn never() -> Self {
        let (_tx, rx) = watch::channel(false);
        Self { rx }
    }

    /// Check if cancellation was requested
    pub fn is_cancelled(&self) -> bool {
        *self.rx.borrow()
    }

    /// Wait for cancellation
    pub async fn cancelled(&mut self) {
        while !*self.rx.borrow_and_update() {
            if self.rx.changed().await.is_err() {
                // Sender gone without cancelling: wait forever
                std::future::pending::<()>().await;
            }
        }
    }
}

/// Cancel sender
pub struct CancelSender {
    tx: watch::Sender<bool>,
}

impl CancelSender {
    /// Signal cancellation to the run and its workers
    pub fn cancel(&self) {
        let _ = self.tx.send(true);
    }
}

/// Create a cancellation channel
pub fn cancel_channel() -> (CancelSender, CancelToken) {
    let (tx, rx) = watch::channel(false);
    (CancelSender { tx }, CancelToken { rx })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[tokio::test]
    async fn test_cancel_wakes_waiter() {
        let (tx, mut token) = cancel_channel();
        let waiter = tokio::spawn(async move {
            token.cancelled().await;
            true
        });

        tx.cancel();
        let woke = tokio::time::timeout(Duration::from_secs(1), waiter)
            .await
            .unwrap()
            .unwrap();
        assert!(woke);
    }

    #[tokio::test]
    async fn test_never_token_does_not_fire() {
        let mut token = CancelToken::never();
        assert!(!token.is_cancelled());

        let waited = tokio::time::timeout(Duration::from_millis(50), token.cancelled()).await;
        assert!(waited.is_err());
    }

    #[tokio::test]
    async fn test_already_cancelled_returns_immediately() {
        let (tx, mut token) = cancel_channel();
        tx.cancel();

        assert!(token.is_cancelled());
        tokio::time::timeout(Duration::from_millis(50), token.cancelled())
            .await
            .unwrap();
    }
}
