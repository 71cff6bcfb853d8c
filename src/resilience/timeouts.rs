//! Timeout enforcement.
//!
//! # Responsibilities
//! - Wrap upstream calls with a deadline
//! - Cancel the wrapped operation cleanly on expiry
//!
//! # Design Decisions
//! - Uses Tokio's timeout facilities; cancellation is dropping the future
//! - Timeout errors are distinct from the operation's own errors
//! - Timed-out relay requests return 504 Gateway Timeout

use std::future::Future;
use std::time::Duration;

/// Outcome of a deadline-bounded operation that did not succeed.
#[derive(Debug)]
pub enum Bounded<E> {
    /// The deadline elapsed; the operation was dropped mid-flight.
    TimedOut(Duration),
    /// The operation finished with its own error before the deadline.
    Failed(E),
}

/// Run `fut` with a deadline.
///
/// When the deadline elapses first, `fut` is dropped. For an HTTP client
/// future that aborts the request and releases its connection.
pub async fn with_timeout<F, T, E>(limit: Duration, fut: F) -> Result<T, Bounded<E>>
where
    F: Future<Output = Result<T, E>>,
{
    match tokio::time::timeout(limit, fut).await {
        Ok(Ok(value)) => Ok(value),
        Ok(Err(e)) => Err(Bounded::Failed(e)),
        Err(_) => Err(Bounded::TimedOut(limit)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::sync::Arc;

    struct DropFlag(Arc<AtomicBool>);

    impl Drop for DropFlag {
        fn drop(&mut self) {
            self.0.store(true, Ordering::SeqCst);
        }
    }

    #[tokio::test]
    async fn test_completes_before_deadline() {
        let res: Result<u32, Bounded<()>> =
            with_timeout(Duration::from_secs(1), async { Ok(7) }).await;
        assert_eq!(res.unwrap(), 7);
    }

    #[tokio::test]
    async fn test_inner_error_is_failed() {
        let res: Result<(), Bounded<&str>> =
            with_timeout(Duration::from_secs(1), async { Err("refused") }).await;
        assert!(matches!(res, Err(Bounded::Failed("refused"))));
    }

    #[tokio::test]
    async fn test_deadline_drops_future() {
        let dropped = Arc::new(AtomicBool::new(false));
        let flag = DropFlag(dropped.clone());

        let res: Result<(), Bounded<()>> = with_timeout(Duration::from_millis(50), async move {
            let _flag = flag;
            tokio::time::sleep(Duration::from_secs(30)).await;
            Ok(())
        })
        .await;

        assert!(matches!(res, Err(Bounded::TimedOut(d)) if d == Duration::from_millis(50)));
        assert!(dropped.load(Ordering::SeqCst), "timed-out future should be dropped");
    }
}
