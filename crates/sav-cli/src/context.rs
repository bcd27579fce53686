//! Application context shared by command handlers.

use std::path::PathBuf;

use anyhow::Context;

use sav_config::SavantConfig;
use sav_db::service::SavService;
use sav_notify::{EventJournal, IntelligenceHub};

/// Everything a command handler needs: config, database service, event hub.
pub struct AppContext {
    pub project_root: PathBuf,
    pub config: SavantConfig,
    pub service: SavService,
    pub hub: IntelligenceHub,
}

impl AppContext {
    /// Open the project database and wire the event hub.
    pub async fn init(project_root: PathBuf, config: SavantConfig) -> anyhow::Result<Self> {
        let db_path = resolve_db_path(&project_root, &config.database.path);
        if let Some(parent) = db_path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("failed to create {}", parent.display()))?;
        }
        let db_path_str = db_path
            .to_str()
            .context("database path is not valid UTF-8")?;

        let service = SavService::new_local(db_path_str)
            .await
            .with_context(|| format!("failed to open database at {}", db_path.display()))?;

        let mut hub = IntelligenceHub::new(256);
        if config.general.journal {
            hub = hub.with_journal(EventJournal::new(Self::journal_path_in(&project_root)));
        }

        Ok(Self {
            project_root,
            config,
            service,
            hub,
        })
    }

    /// Path of the JSONL event journal for this project.
    #[must_use]
    pub fn journal_path(&self) -> PathBuf {
        Self::journal_path_in(&self.project_root)
    }

    fn journal_path_in(project_root: &std::path::Path) -> PathBuf {
        project_root.join(".savant").join("events.jsonl")
    }

    /// Embed a batch of texts on a blocking thread.
    ///
    /// The fastembed engine is created per call; the ONNX model itself is
    /// cached on disk after the first run.
    pub async fn embed_texts(texts: Vec<String>) -> anyhow::Result<Vec<Vec<f32>>> {
        tokio::task::spawn_blocking(move || {
            let mut engine = sav_embeddings::EmbeddingEngine::new()?;
            engine.embed_batch(texts)
        })
        .await
        .context("embedding task panicked")?
        .context("embedding failed")
    }

    /// Embed a single query string on a blocking thread.
    pub async fn embed_query(query: &str) -> anyhow::Result<Vec<f32>> {
        let query = query.to_string();
        tokio::task::spawn_blocking(move || {
            let mut engine = sav_embeddings::EmbeddingEngine::new()?;
            engine.embed_single(&query)
        })
        .await
        .context("embedding task panicked")?
        .context("embedding failed")
    }
}

fn resolve_db_path(project_root: &std::path::Path, configured: &str) -> PathBuf {
    let path = PathBuf::from(configured);
    if path.is_absolute() || configured == ":memory:" {
        path
    } else {
        project_root.join(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn relative_db_path_is_project_scoped() {
        let root = PathBuf::from("/work/project");
        let path = resolve_db_path(&root, ".savant/savant.db");
        assert_eq!(path, PathBuf::from("/work/project/.savant/savant.db"));
    }

    #[test]
    fn absolute_db_path_is_kept() {
        let root = PathBuf::from("/work/project");
        let path = resolve_db_path(&root, "/tmp/custom.db");
        assert_eq!(path, PathBuf::from("/tmp/custom.db"));
    }

    #[test]
    fn memory_db_path_is_kept() {
        let root = PathBuf::from("/work/project");
        let path = resolve_db_path(&root, ":memory:");
        assert_eq!(path, PathBuf::from(":memory:"));
    }
}
