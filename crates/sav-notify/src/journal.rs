//! JSONL event journal.
//!
//! Append-only newline-delimited JSON file of published intelligence
//! events. One file, one event per line; readable with standard JSONL
//! tooling.

use std::path::PathBuf;

use serde_jsonlines::{append_json_lines, json_lines};

use crate::error::NotifyError;
use crate::realtime::IntelligenceEvent;

/// Append-only JSONL journal at a fixed path.
#[derive(Debug, Clone)]
pub struct EventJournal {
    path: PathBuf,
}

impl EventJournal {
    /// Create a journal handle. The file is created on first append.
    #[must_use]
    pub const fn new(path: PathBuf) -> Self {
        Self { path }
    }

    /// Path of the journal file.
    #[must_use]
    pub fn path(&self) -> &std::path::Path {
        &self.path
    }

    /// Append one event.
    ///
    /// # Errors
    ///
    /// Returns [`NotifyError::Journal`] on I/O failure.
    pub fn append(&self, event: &IntelligenceEvent) -> Result<(), NotifyError> {
        if let Some(parent) = self.path.parent()
            && !parent.as_os_str().is_empty()
        {
            std::fs::create_dir_all(parent)?;
        }
        append_json_lines(&self.path, [event])?;
        Ok(())
    }

    /// Read the whole journal. Returns an empty list if the file does not
    /// exist yet.
    ///
    /// # Errors
    ///
    /// Returns [`NotifyError::Journal`] on I/O failure or malformed lines.
    pub fn read_all(&self) -> Result<Vec<IntelligenceEvent>, NotifyError> {
        if !self.path.exists() {
            return Ok(Vec::new());
        }
        let events = json_lines(&self.path)?.collect::<std::io::Result<Vec<_>>>()?;
        Ok(events)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::realtime::EventKind;

    #[test]
    fn append_and_read_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let journal = EventJournal::new(dir.path().join("journal").join("events.jsonl"));

        journal
            .append(&IntelligenceEvent::now(
                EventKind::ProfileUpdated,
                "prf-1",
                serde_json::json!({ "interest": "nlp" }),
            ))
            .unwrap();

        let events = journal.read_all().unwrap();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].kind, EventKind::ProfileUpdated);
        assert_eq!(events[0].entity_id, "prf-1");
    }

    #[test]
    fn missing_file_reads_empty() {
        let dir = tempfile::tempdir().unwrap();
        let journal = EventJournal::new(dir.path().join("absent.jsonl"));
        assert!(journal.read_all().unwrap().is_empty());
    }
}
