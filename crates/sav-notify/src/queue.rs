//! Notification queue worker.
//!
//! Drains claimed notifications through a [`Dispatcher`], with exponential
//! backoff between passes. Failed deliveries return to the queue and are
//! retried on the next pass until the attempt limit dead-letters them;
//! state transitions and attempt counting live in the `sav-db` repo.

use std::time::Duration;

use sav_core::responses::DrainResponse;
use sav_db::service::SavService;

use crate::dispatch::Dispatcher;
use crate::error::NotifyError;

/// Notifications claimed per pass.
const BATCH_SIZE: u32 = 50;

/// Configuration for retry behavior on failed deliveries.
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    /// Maximum number of attempts per notification (including the first).
    pub max_attempts: u32,
    /// Initial delay before the first retry pass.
    pub base_delay: Duration,
    /// Maximum delay between passes (backoff is capped here).
    pub max_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 4,
            base_delay: Duration::from_millis(100),
            max_delay: Duration::from_secs(2),
        }
    }
}

impl RetryPolicy {
    /// Delay before retry pass `pass` (1-based): `base * 2^(pass-1)`,
    /// capped at `max_delay`.
    #[must_use]
    pub fn backoff_delay(&self, pass: u32) -> Duration {
        let exp = pass.saturating_sub(1).min(16);
        let delay = self.base_delay.saturating_mul(2_u32.saturating_pow(exp));
        delay.min(self.max_delay)
    }
}

/// Run one queue pass: claim deliverable notifications and attempt each once.
///
/// Successes are marked delivered; failures return to `failed` (or `dead`
/// at the attempt limit) and wait for the next pass.
///
/// # Errors
///
/// Returns [`NotifyError::Database`] if queue bookkeeping fails. Dispatch
/// errors are consumed into the retry state, not returned.
pub async fn drain_once<D: Dispatcher>(
    service: &SavService,
    dispatcher: &D,
    policy: &RetryPolicy,
) -> Result<DrainResponse, NotifyError> {
    let claimed = service.claim_ready(BATCH_SIZE).await?;
    let mut outcome = DrainResponse {
        delivered: 0,
        failed: 0,
        dead_lettered: 0,
    };

    for notification in claimed {
        match dispatcher.deliver(&notification).await {
            Ok(()) => {
                service.record_delivery(&notification.id).await?;
                outcome.delivered += 1;
            }
            Err(error) => {
                tracing::warn!(
                    id = notification.id,
                    attempt = notification.attempts + 1,
                    %error,
                    "notification delivery failed"
                );
                let failed = service
                    .record_failure(&notification.id, &error.to_string(), policy.max_attempts)
                    .await?;
                if failed.status == sav_core::enums::NotificationStatus::Dead {
                    outcome.dead_lettered += 1;
                } else {
                    outcome.failed += 1;
                }
            }
        }
    }

    Ok(outcome)
}

/// Drain the queue to completion: repeat passes with exponential backoff
/// until nothing deliverable remains. Bounded by `max_attempts` passes, so
/// a permanently failing receiver terminates with everything dead-lettered.
///
/// # Errors
///
/// Returns [`NotifyError::Database`] if queue bookkeeping fails.
pub async fn drain<D: Dispatcher>(
    service: &SavService,
    dispatcher: &D,
    policy: &RetryPolicy,
) -> Result<DrainResponse, NotifyError> {
    let mut total = DrainResponse {
        delivered: 0,
        failed: 0,
        dead_lettered: 0,
    };

    for pass in 1..=policy.max_attempts.max(1) {
        let outcome = drain_once(service, dispatcher, policy).await?;
        total.delivered += outcome.delivered;
        total.dead_lettered += outcome.dead_lettered;
        total.failed = outcome.failed;

        if outcome.failed == 0 {
            break;
        }
        tokio::time::sleep(policy.backoff_delay(pass)).await;
    }

    Ok(total)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};

    use sav_core::entities::Notification;
    use sav_core::enums::{NotificationPriority, NotificationStatus};
    use sav_db::SavDb;

    use crate::dispatch::LogDispatcher;

    async fn test_service() -> SavService {
        let db = SavDb::open_local(":memory:").await.unwrap();
        SavService::from_db(db)
    }

    fn fast_policy(max_attempts: u32) -> RetryPolicy {
        RetryPolicy {
            max_attempts,
            base_delay: Duration::from_millis(1),
            max_delay: Duration::from_millis(4),
        }
    }

    /// Fails the first `failures` deliveries, then succeeds.
    struct FlakyDispatcher {
        failures: u32,
        calls: AtomicU32,
    }

    impl FlakyDispatcher {
        const fn new(failures: u32) -> Self {
            Self {
                failures,
                calls: AtomicU32::new(0),
            }
        }
    }

    impl Dispatcher for FlakyDispatcher {
        async fn deliver(&self, _notification: &Notification) -> Result<(), NotifyError> {
            let call = self.calls.fetch_add(1, Ordering::SeqCst);
            if call < self.failures {
                Err(NotifyError::Dispatch("simulated failure".to_string()))
            } else {
                Ok(())
            }
        }
    }

    #[test]
    fn backoff_doubles_and_caps() {
        let policy = RetryPolicy {
            max_attempts: 5,
            base_delay: Duration::from_millis(100),
            max_delay: Duration::from_secs(2),
        };
        assert_eq!(policy.backoff_delay(1), Duration::from_millis(100));
        assert_eq!(policy.backoff_delay(2), Duration::from_millis(200));
        assert_eq!(policy.backoff_delay(3), Duration::from_millis(400));
        assert_eq!(policy.backoff_delay(10), Duration::from_secs(2), "capped");
    }

    #[tokio::test]
    async fn drain_once_delivers_everything_with_healthy_dispatcher() {
        let svc = test_service().await;
        svc.enqueue_notification(None, "a", "b", NotificationPriority::Normal)
            .await
            .unwrap();
        svc.enqueue_notification(None, "c", "d", NotificationPriority::Urgent)
            .await
            .unwrap();

        let outcome = drain_once(&svc, &LogDispatcher, &fast_policy(3))
            .await
            .unwrap();

        assert_eq!(outcome.delivered, 2);
        assert_eq!(outcome.failed, 0);
        assert_eq!(outcome.dead_lettered, 0);

        let delivered = svc
            .list_notifications(Some(NotificationStatus::Delivered), 10)
            .await
            .unwrap();
        assert_eq!(delivered.len(), 2);
    }

    #[tokio::test]
    async fn drain_retries_transient_failure() {
        let svc = test_service().await;
        let n = svc
            .enqueue_notification(None, "flaky", "b", NotificationPriority::Normal)
            .await
            .unwrap();

        // First delivery fails, second succeeds
        let dispatcher = FlakyDispatcher::new(1);
        let outcome = drain(&svc, &dispatcher, &fast_policy(3)).await.unwrap();

        assert_eq!(outcome.delivered, 1);
        assert_eq!(outcome.dead_lettered, 0);

        let final_state = svc.get_notification(&n.id).await.unwrap();
        assert_eq!(final_state.status, NotificationStatus::Delivered);
        assert_eq!(final_state.attempts, 1, "one failed attempt recorded");
    }

    #[tokio::test]
    async fn drain_dead_letters_permanent_failure() {
        let svc = test_service().await;
        let n = svc
            .enqueue_notification(None, "doomed", "b", NotificationPriority::High)
            .await
            .unwrap();

        let dispatcher = FlakyDispatcher::new(u32::MAX);
        let outcome = drain(&svc, &dispatcher, &fast_policy(3)).await.unwrap();

        assert_eq!(outcome.delivered, 0);
        assert_eq!(outcome.dead_lettered, 1);

        let final_state = svc.get_notification(&n.id).await.unwrap();
        assert_eq!(final_state.status, NotificationStatus::Dead);
        assert_eq!(final_state.attempts, 3);
        assert_eq!(
            final_state.last_error.as_deref(),
            Some("dispatch failed: simulated failure")
        );
    }

    #[tokio::test]
    async fn drain_empty_queue_is_noop() {
        let svc = test_service().await;
        let outcome = drain(&svc, &LogDispatcher, &fast_policy(3)).await.unwrap();
        assert_eq!(outcome.delivered, 0);
        assert_eq!(outcome.failed, 0);
        assert_eq!(outcome.dead_lettered, 0);
    }

    #[tokio::test]
    async fn urgent_delivered_before_low_on_partial_pass() {
        let svc = test_service().await;
        svc.enqueue_notification(None, "low", "b", NotificationPriority::Low)
            .await
            .unwrap();
        let urgent = svc
            .enqueue_notification(None, "urgent", "b", NotificationPriority::Urgent)
            .await
            .unwrap();

        drain_once(&svc, &LogDispatcher, &fast_policy(3))
            .await
            .unwrap();

        let delivered = svc
            .list_notifications(Some(NotificationStatus::Delivered), 10)
            .await
            .unwrap();
        // Both delivered, but the urgent one carries the earlier delivery slot
        assert_eq!(delivered.len(), 2);
        assert!(delivered.iter().any(|n| n.id == urgent.id));
    }
}
