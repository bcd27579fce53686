//! Notification delivery transports.
//!
//! [`Dispatcher`] is the seam between the queue worker and the outside
//! world. Two transports exist: webhook POST and tracing log output. Email
//! and push-gateway transports are deliberately out of scope.

use sav_core::entities::{Notification, WebhookEndpoint};

use crate::error::NotifyError;

/// Delivers a claimed notification to the outside world.
pub trait Dispatcher {
    /// Attempt a single delivery. An `Err` counts as a failed attempt and
    /// feeds the retry/dead-letter bookkeeping.
    fn deliver(
        &self,
        notification: &Notification,
    ) -> impl Future<Output = Result<(), NotifyError>> + Send;
}

/// POSTs the notification JSON to every registered endpoint.
///
/// The endpoint's shared secret (if any) is sent as `X-Savant-Token`.
/// Delivery succeeds only if every endpoint accepts with a 2xx status.
pub struct WebhookDispatcher {
    client: reqwest::Client,
    endpoints: Vec<WebhookEndpoint>,
}

impl WebhookDispatcher {
    #[must_use]
    pub fn new(endpoints: Vec<WebhookEndpoint>) -> Self {
        Self {
            client: reqwest::Client::new(),
            endpoints,
        }
    }

    /// Number of endpoints this dispatcher fans out to.
    #[must_use]
    pub fn endpoint_count(&self) -> usize {
        self.endpoints.len()
    }
}

impl Dispatcher for WebhookDispatcher {
    async fn deliver(&self, notification: &Notification) -> Result<(), NotifyError> {
        for endpoint in &self.endpoints {
            let mut request = self.client.post(&endpoint.url).json(notification);
            if let Some(secret) = &endpoint.secret {
                request = request.header("X-Savant-Token", secret);
            }

            let response = request.send().await?;
            if !response.status().is_success() {
                return Err(NotifyError::Dispatch(format!(
                    "endpoint {} returned {}",
                    endpoint.url,
                    response.status()
                )));
            }
            tracing::debug!(
                notification = notification.id,
                endpoint = endpoint.url,
                "webhook delivered"
            );
        }
        Ok(())
    }
}

/// Logs the notification via tracing. Fallback transport when no webhook is
/// registered; also useful in tests.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogDispatcher;

impl Dispatcher for LogDispatcher {
    async fn deliver(&self, notification: &Notification) -> Result<(), NotifyError> {
        tracing::info!(
            id = notification.id,
            priority = %notification.priority,
            title = notification.title,
            "notification"
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use sav_core::enums::{NotificationPriority, NotificationStatus};

    fn notification() -> Notification {
        Notification {
            id: "ntf-test0001".to_string(),
            profile_id: None,
            title: "t".to_string(),
            body: "b".to_string(),
            priority: NotificationPriority::Normal,
            status: NotificationStatus::Sending,
            attempts: 0,
            last_error: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
            delivered_at: None,
        }
    }

    #[tokio::test]
    async fn log_dispatcher_always_succeeds() {
        let dispatcher = LogDispatcher;
        assert!(dispatcher.deliver(&notification()).await.is_ok());
    }

    #[tokio::test]
    async fn webhook_dispatcher_with_no_endpoints_succeeds() {
        // Vacuous delivery: nothing to fan out to
        let dispatcher = WebhookDispatcher::new(Vec::new());
        assert_eq!(dispatcher.endpoint_count(), 0);
        assert!(dispatcher.deliver(&notification()).await.is_ok());
    }

    #[tokio::test]
    async fn webhook_dispatcher_unreachable_endpoint_errors() {
        let endpoint = WebhookEndpoint {
            id: "whk-test0001".to_string(),
            // Reserved TEST-NET-1 address — connection refused or timeout
            url: "http://192.0.2.1:1/hook".to_string(),
            secret: None,
            active: true,
            created_at: Utc::now(),
        };
        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_millis(200))
            .build()
            .unwrap();
        let dispatcher = WebhookDispatcher {
            client,
            endpoints: vec![endpoint],
        };

        let result = dispatcher.deliver(&notification()).await;
        assert!(result.is_err());
    }
}
