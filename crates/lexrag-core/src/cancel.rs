//! Cancellation helpers shared by every network-bound stage

use crate::error::{LexRagError, Result};
use std::future::Future;

pub use tokio_util::sync::CancellationToken;

/// Race `fut` against `cancel`; cancellation wins ties and maps to `Cancelled`
pub async fn cancellable<F, T>(cancel: &CancellationToken, fut: F) -> Result<T>
where
    F: Future<Output = Result<T>>,
{
    if cancel.is_cancelled() {
        return Err(LexRagError::Cancelled);
    }
    tokio::select! {
        biased;
        _ = cancel.cancelled() => Err(LexRagError::Cancelled),
        result = fut => result,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[tokio::test]
    async fn test_completes_when_not_cancelled() {
        let token = CancellationToken::new();
        let value = cancellable(&token, async { Ok::<_, LexRagError>(7) })
            .await
            .unwrap();
        assert_eq!(value, 7);
    }

    #[tokio::test]
    async fn test_already_cancelled_skips_future() {
        use std::sync::atomic::{AtomicBool, Ordering};

        let token = CancellationToken::new();
        token.cancel();
        let polled = AtomicBool::new(false);
        let result = cancellable(&token, async {
            polled.store(true, Ordering::SeqCst);
            Ok::<(), LexRagError>(())
        })
        .await;
        assert!(matches!(result, Err(LexRagError::Cancelled)));
        assert!(!polled.load(Ordering::SeqCst));
    }

    #[tokio::test]
    async fn test_cancel_interrupts_pending_future() {
        let token = CancellationToken::new();
        let trigger = token.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(20)).await;
            trigger.cancel();
        });

        let started = std::time::Instant::now();
        let result = cancellable(&token, async {
            tokio::time::sleep(Duration::from_secs(30)).await;
            Ok::<(), LexRagError>(())
        })
        .await;
        assert!(matches!(result, Err(LexRagError::Cancelled)));
        assert!(started.elapsed() < Duration::from_secs(5));
    }
}
