//! Real-time intelligence event feed.
//!
//! `IntelligenceHub` is a bounded in-process broadcast bus. Publishing never
//! blocks: with no subscribers the event is dropped, and a subscriber that
//! falls more than `capacity` events behind observes a lag error and resumes
//! from the oldest retained event. Events can additionally be appended to a
//! JSONL journal for offline inspection.

use chrono::{DateTime, Utc};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;

use crate::error::NotifyError;
use crate::journal::EventJournal;

/// Kind of intelligence event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum EventKind {
    DocumentIngested,
    NotificationDelivered,
    FundingClosing,
    ProfileUpdated,
    ParamsTuned,
}

/// An event on the intelligence feed.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct IntelligenceEvent {
    pub kind: EventKind,
    pub entity_id: String,
    pub payload: serde_json::Value,
    pub at: DateTime<Utc>,
}

impl IntelligenceEvent {
    /// Build an event stamped with the current time.
    #[must_use]
    pub fn now(kind: EventKind, entity_id: impl Into<String>, payload: serde_json::Value) -> Self {
        Self {
            kind,
            entity_id: entity_id.into(),
            payload,
            at: Utc::now(),
        }
    }
}

/// In-process broadcast bus for intelligence events.
pub struct IntelligenceHub {
    sender: broadcast::Sender<IntelligenceEvent>,
    journal: Option<EventJournal>,
}

impl IntelligenceHub {
    /// Create a hub retaining up to `capacity` undelivered events per
    /// subscriber.
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity.max(1));
        Self {
            sender,
            journal: None,
        }
    }

    /// Attach a JSONL journal; every published event is appended.
    #[must_use]
    pub fn with_journal(mut self, journal: EventJournal) -> Self {
        self.journal = Some(journal);
        self
    }

    /// Subscribe to the feed from this point onward.
    #[must_use]
    pub fn subscribe(&self) -> broadcast::Receiver<IntelligenceEvent> {
        self.sender.subscribe()
    }

    /// Publish an event. Returns the number of subscribers that will see it
    /// (0 when nobody is listening — not an error).
    ///
    /// # Errors
    ///
    /// Returns [`NotifyError::Journal`] if journal append fails; broadcast
    /// itself cannot fail.
    pub fn publish(&self, event: IntelligenceEvent) -> Result<usize, NotifyError> {
        if let Some(journal) = &self.journal {
            journal.append(&event)?;
        }
        tracing::debug!(kind = ?event.kind, entity = event.entity_id, "intelligence event");
        Ok(self.sender.send(event).unwrap_or(0))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn event(entity_id: &str) -> IntelligenceEvent {
        IntelligenceEvent::now(
            EventKind::DocumentIngested,
            entity_id,
            serde_json::json!({ "chunks": 3 }),
        )
    }

    #[tokio::test]
    async fn publish_without_subscribers_is_ok() {
        let hub = IntelligenceHub::new(8);
        let receivers = hub.publish(event("doc-1")).unwrap();
        assert_eq!(receivers, 0);
    }

    #[tokio::test]
    async fn subscriber_receives_events_in_order() {
        let hub = IntelligenceHub::new(8);
        let mut rx = hub.subscribe();

        hub.publish(event("doc-1")).unwrap();
        hub.publish(event("doc-2")).unwrap();

        assert_eq!(rx.recv().await.unwrap().entity_id, "doc-1");
        assert_eq!(rx.recv().await.unwrap().entity_id, "doc-2");
    }

    #[tokio::test]
    async fn multiple_subscribers_each_get_a_copy() {
        let hub = IntelligenceHub::new(8);
        let mut rx1 = hub.subscribe();
        let mut rx2 = hub.subscribe();

        let receivers = hub.publish(event("doc-1")).unwrap();
        assert_eq!(receivers, 2);
        assert_eq!(rx1.recv().await.unwrap().entity_id, "doc-1");
        assert_eq!(rx2.recv().await.unwrap().entity_id, "doc-1");
    }

    #[tokio::test]
    async fn slow_subscriber_observes_lag() {
        let hub = IntelligenceHub::new(2);
        let mut rx = hub.subscribe();

        for i in 0..5 {
            hub.publish(event(&format!("doc-{i}"))).unwrap();
        }

        // Oldest events were dropped; first recv reports the lag
        let result = rx.recv().await;
        assert!(matches!(
            result,
            Err(broadcast::error::RecvError::Lagged(_))
        ));

        // After the lag, the subscriber resumes from the retained tail
        let next = rx.recv().await.unwrap();
        assert_eq!(next.entity_id, "doc-3");
    }

    #[tokio::test]
    async fn journal_records_published_events() {
        let dir = tempfile::tempdir().unwrap();
        let journal = EventJournal::new(dir.path().join("events.jsonl"));
        let hub = IntelligenceHub::new(8).with_journal(journal);

        hub.publish(event("doc-1")).unwrap();
        hub.publish(event("doc-2")).unwrap();

        let journal = EventJournal::new(dir.path().join("events.jsonl"));
        let events = journal.read_all().unwrap();
        assert_eq!(events.len(), 2);
        assert_eq!(events[0].entity_id, "doc-1");
        assert_eq!(events[1].entity_id, "doc-2");
    }
}
