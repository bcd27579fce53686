//! # sav-notify
//!
//! Notification delivery and real-time events for Savant.
//!
//! - prioritized queue drain with retry counters and dead-lettering
//!   (queue state lives in `sav-db`; this crate runs the worker)
//! - webhook and log transports behind the [`dispatch::Dispatcher`] seam
//! - bounded broadcast [`realtime::IntelligenceHub`] with an optional
//!   JSONL journal

pub mod dispatch;
pub mod error;
pub mod journal;
pub mod queue;
pub mod realtime;

pub use dispatch::{Dispatcher, LogDispatcher, WebhookDispatcher};
pub use error::NotifyError;
pub use journal::EventJournal;
pub use queue::{RetryPolicy, drain, drain_once};
pub use realtime::{EventKind, IntelligenceEvent, IntelligenceHub};
