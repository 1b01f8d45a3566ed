//! Confirmation polling.
//!
//! A transfer is acknowledged only indirectly: the sender's sequence number
//! moves, or the recipient's balance grows. These waits are sleep-then-read
//! loops against a captured baseline, bounded by a [`PollPolicy`] and
//! abortable through a [`CancellationToken`]. Exhausting the bound is a
//! [`WalletError::PollTimeout`]; a failed read propagates immediately.

use std::future::Future;
use std::time::Duration;

use tokio_util::sync::CancellationToken;

use crate::error::WalletError;

/// Bounds for one confirmation wait.
#[derive(Clone, Copy, Debug)]
pub struct PollPolicy {
    /// Fixed delay before each read.
    pub interval: Duration,
    /// Maximum number of reads before giving up.
    pub max_attempts: u32,
}

impl Default for PollPolicy {
    fn default() -> Self {
        Self {
            interval: Duration::from_millis(1500),
            max_attempts: 200,
        }
    }
}

/// Sleep-then-read until `done` accepts the observed value.
///
/// Each attempt sleeps `policy.interval`, invokes `read`, and tests the
/// result. Read errors propagate to the caller; cancellation wins over an
/// in-progress sleep.
async fn wait_until<T, F, Fut, P>(
    what: &str,
    mut read: F,
    done: P,
    policy: &PollPolicy,
    cancel: &CancellationToken,
) -> Result<T, WalletError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, WalletError>>,
    P: Fn(&T) -> bool,
{
    for attempt in 1..=policy.max_attempts {
        tokio::select! {
            _ = cancel.cancelled() => return Err(WalletError::Cancelled),
            _ = tokio::time::sleep(policy.interval) => {}
        }

        let current = read().await?;
        if done(&current) {
            tracing::debug!(what, attempt, "confirmed");
            return Ok(current);
        }
        tracing::debug!(what, attempt, "still waiting");
    }

    Err(WalletError::PollTimeout {
        what: what.to_string(),
        attempts: policy.max_attempts,
    })
}

/// Wait until the observed value differs from `baseline` in any direction.
///
/// Used for sequence numbers, where any movement means a transaction from
/// the account was processed.
pub async fn wait_for_change<T, F, Fut>(
    what: &str,
    baseline: T,
    read: F,
    policy: &PollPolicy,
    cancel: &CancellationToken,
) -> Result<T, WalletError>
where
    T: PartialEq + Copy,
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, WalletError>>,
{
    wait_until(what, read, move |v| *v != baseline, policy, cancel).await
}

/// Wait until the observed value strictly exceeds `baseline`.
///
/// Used for balances. A decrease (an unrelated fee deduction, say) keeps
/// the wait going rather than satisfying it.
pub async fn wait_for_increase<T, F, Fut>(
    what: &str,
    baseline: T,
    read: F,
    policy: &PollPolicy,
    cancel: &CancellationToken,
) -> Result<T, WalletError>
where
    T: PartialOrd + Copy,
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, WalletError>>,
{
    wait_until(what, read, move |v| *v > baseline, policy, cancel).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::sync::Arc;

    fn fast_policy(max_attempts: u32) -> PollPolicy {
        PollPolicy {
            interval: Duration::from_millis(1),
            max_attempts,
        }
    }

    /// Reads `baseline` for `flat` calls, then `changed`.
    fn scripted_reader(
        baseline: u64,
        changed: u64,
        flat: u32,
    ) -> (Arc<AtomicU32>, impl FnMut() -> std::future::Ready<Result<u64, WalletError>>) {
        let calls = Arc::new(AtomicU32::new(0));
        let counter = Arc::clone(&calls);
        let read = move || {
            let n = counter.fetch_add(1, Ordering::SeqCst) + 1;
            let value = if n <= flat { baseline } else { changed };
            std::future::ready(Ok(value))
        };
        (calls, read)
    }

    #[tokio::test]
    async fn returns_after_exactly_k_plus_one_reads() {
        let (calls, read) = scripted_reader(5, 6, 3);
        let cancel = CancellationToken::new();

        let result = wait_for_change("seq", 5u64, read, &fast_policy(50), &cancel)
            .await
            .unwrap();

        assert_eq!(result, 6);
        assert_eq!(calls.load(Ordering::SeqCst), 4);
    }

    #[tokio::test]
    async fn change_on_first_read_returns_immediately() {
        let (calls, read) = scripted_reader(5, 6, 0);
        let cancel = CancellationToken::new();

        wait_for_change("seq", 5u64, read, &fast_policy(50), &cancel)
            .await
            .unwrap();
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn times_out_after_max_attempts_when_nothing_changes() {
        let (calls, read) = scripted_reader(5, 5, u32::MAX);
        let cancel = CancellationToken::new();

        let err = wait_for_change("seq", 5u64, read, &fast_policy(7), &cancel)
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            WalletError::PollTimeout { attempts: 7, .. }
        ));
        assert_eq!(calls.load(Ordering::SeqCst), 7);
    }

    #[tokio::test]
    async fn increase_ignores_decrease() {
        // Balance dips below baseline before the deposit lands.
        let calls = Arc::new(AtomicU32::new(0));
        let counter = Arc::clone(&calls);
        let read = move || {
            let n = counter.fetch_add(1, Ordering::SeqCst) + 1;
            let value: u128 = match n {
                1 => 90,  // below baseline — must not satisfy the wait
                2 => 100, // equal — must not satisfy either
                _ => 150,
            };
            std::future::ready(Ok(value))
        };
        let cancel = CancellationToken::new();

        let result = wait_for_increase("balance", 100u128, read, &fast_policy(10), &cancel)
            .await
            .unwrap();

        assert_eq!(result, 150);
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn read_error_propagates() {
        let read = || std::future::ready(Err::<u64, _>(WalletError::Node("boom".into())));
        let cancel = CancellationToken::new();

        let err = wait_for_change("seq", 5u64, read, &fast_policy(10), &cancel)
            .await
            .unwrap_err();
        assert!(matches!(err, WalletError::Node(_)));
    }

    #[tokio::test]
    async fn cancellation_aborts_before_any_read() {
        let (calls, read) = scripted_reader(5, 5, u32::MAX);
        let cancel = CancellationToken::new();
        cancel.cancel();

        let err = wait_for_change(
            "seq",
            5u64,
            read,
            &PollPolicy {
                interval: Duration::from_secs(3600),
                max_attempts: 10,
            },
            &cancel,
        )
        .await
        .unwrap_err();

        assert!(matches!(err, WalletError::Cancelled));
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn cancellation_interrupts_a_long_sleep() {
        let (_, read) = scripted_reader(5, 5, u32::MAX);
        let cancel = CancellationToken::new();
        let canceller = cancel.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(10)).await;
            canceller.cancel();
        });

        let err = tokio::time::timeout(
            Duration::from_secs(5),
            wait_for_change(
                "seq",
                5u64,
                read,
                &PollPolicy {
                    interval: Duration::from_secs(3600),
                    max_attempts: 10,
                },
                &cancel,
            ),
        )
        .await
        .expect("wait must not outlive cancellation")
        .unwrap_err();

        assert!(matches!(err, WalletError::Cancelled));
    }
}
