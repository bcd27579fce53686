//! # sav-embeddings
//!
//! Local embedding generation for Savant using fastembed (ONNX runtime).
//!
//! Generates 384-dimensional vectors for text content (document chunks and
//! search queries) without requiring any external API keys.
//!
//! ## Model
//!
//! Uses [`AllMiniLML6V2`](fastembed::EmbeddingModel::AllMiniLML6V2) (sentence-transformers/all-MiniLM-L6-v2):
//! - 384-dimensional output vectors
//! - Mean pooling (no query/passage prefix needed)
//! - ~80MB model size, cached at `~/.savant/cache/fastembed/`
//!
//! ## Async usage
//!
//! The fastembed ONNX runtime is synchronous. When calling from async code,
//! wrap calls in [`tokio::task::spawn_blocking`]:
//!
//! ```ignore
//! let embeddings = tokio::task::spawn_blocking(move || {
//!     engine.embed_batch(texts)
//! }).await??;
//! ```

pub mod error;

pub use error::EmbeddingError;
use fastembed::{EmbeddingModel, TextEmbedding, TextInitOptions};

/// Local embedding engine backed by fastembed (ONNX runtime).
///
/// Wraps the `AllMiniLML6V2` model to produce 384-dimensional float vectors.
/// Model files are downloaded on first use and cached at `~/.savant/cache/fastembed/`.
///
/// # Thread safety
///
/// [`TextEmbedding::embed`] requires `&mut self`. To use from multiple threads,
/// wrap in a `Mutex` or create one engine per thread. From async code, prefer
/// [`tokio::task::spawn_blocking`] with a moved engine.
pub struct EmbeddingEngine {
    model: TextEmbedding,
}

impl EmbeddingEngine {
    /// Create a new embedding engine with the `AllMiniLML6V2` model.
    ///
    /// Downloads the model on first run (~80MB) to `~/.savant/cache/fastembed/`.
    ///
    /// # Errors
    ///
    /// Returns [`EmbeddingError::InitFailed`] if model download or ONNX initialization fails.
    pub fn new() -> Result<Self, EmbeddingError> {
        let cache_dir = dirs::home_dir().map_or_else(
            || std::path::PathBuf::from(".fastembed_cache"),
            |h| h.join(".savant").join("cache").join("fastembed"),
        );

        let model = TextEmbedding::try_new(
            TextInitOptions::new(EmbeddingModel::AllMiniLML6V2)
                .with_cache_dir(cache_dir)
                .with_show_download_progress(true),
        )
        .map_err(|e| EmbeddingError::InitFailed(e.to_string()))?;

        Ok(Self { model })
    }

    /// Embed a batch of texts. Returns one 384-dim vector per input.
    ///
    /// # Errors
    ///
    /// Returns [`EmbeddingError::EmbedFailed`] if the ONNX inference fails.
    pub fn embed_batch(&mut self, texts: Vec<String>) -> Result<Vec<Vec<f32>>, EmbeddingError> {
        self.model
            .embed(texts, None)
            .map_err(|e| EmbeddingError::EmbedFailed(e.to_string()))
    }

    /// Embed a single text. Returns a 384-dim vector.
    ///
    /// Convenience wrapper around [`Self::embed_batch`].
    ///
    /// # Errors
    ///
    /// Returns [`EmbeddingError::EmbedFailed`] if inference fails, or
    /// [`EmbeddingError::EmptyResult`] if the model returns no embeddings.
    pub fn embed_single(&mut self, text: &str) -> Result<Vec<f32>, EmbeddingError> {
        let mut results = self.embed_batch(vec![text.to_string()])?;
        results.pop().ok_or(EmbeddingError::EmptyResult)
    }

    /// Embedding vector dimensionality (always 384 for `AllMiniLML6V2`).
    #[must_use]
    pub const fn dimension() -> usize {
        384
    }
}
