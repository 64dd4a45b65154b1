//! Persistent embedding cache.
//!
//! Maps the SHA-256 of a text to its embedding. Entries live in memory in
//! insertion order and are mirrored to a JSON file. Writes are debounced:
//! every mutation (re)arms a timer and only the last one within the window
//! touches the disk. Once the soft cap is exceeded the oldest fraction of
//! entries is dropped in one go.
//!
//! Persistence is best-effort. A crash inside the debounce window loses the
//! unsaved delta; call [`EmbeddingCache::flush`] before shutdown.

use indexmap::IndexMap;
use sha2::{Digest, Sha256};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::config::CacheConfig;
use crate::error::{EngineError, Result};
use crate::traits::ai::AI;

type Entries = IndexMap<String, Vec<f32>>;

/// Content-addressed embedding cache shared by every matcher run.
pub struct EmbeddingCache {
    entries: Arc<Mutex<Entries>>,
    config: CacheConfig,
    pending_save: Mutex<Option<JoinHandle<()>>>,
}

impl EmbeddingCache {
    /// Create an empty cache. Nothing is read from disk.
    pub fn new(config: CacheConfig) -> Self {
        Self {
            entries: Arc::new(Mutex::new(IndexMap::new())),
            config,
            pending_save: Mutex::new(None),
        }
    }

    /// Memory-only cache with default limits.
    pub fn in_memory() -> Self {
        Self::new(CacheConfig::default())
    }

    /// Create a cache and populate it from `config.path` if the file exists.
    ///
    /// A missing file yields an empty cache. An unreadable or corrupt file is
    /// logged and ignored.
    pub fn load(config: CacheConfig) -> Result<Self> {
        let cache = Self::new(config);
        let Some(path) = cache.config.path.clone() else {
            return Ok(cache);
        };

        match std::fs::read_to_string(&path) {
            Ok(raw) => match serde_json::from_str::<Entries>(&raw) {
                Ok(entries) => {
                    info!(path = %path.display(), entries = entries.len(), "Loaded embedding cache");
                    *cache.lock() = entries;
                    cache.evict_if_needed();
                }
                Err(e) => {
                    warn!(path = %path.display(), error = %e, "Ignoring corrupt embedding cache")
                }
            },
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!(path = %path.display(), "No embedding cache on disk yet");
            }
            Err(e) => return Err(EngineError::Cache(e)),
        }
        Ok(cache)
    }

    /// Cache key for a text.
    pub fn key(text: &str) -> String {
        hex::encode(Sha256::digest(text.as_bytes()))
    }

    pub fn get(&self, text: &str) -> Option<Vec<f32>> {
        self.lock().get(&Self::key(text)).cloned()
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    /// Store an embedding and schedule a save.
    pub fn insert(&self, text: &str, vector: Vec<f32>) {
        self.lock().insert(Self::key(text), vector);
        self.evict_if_needed();
        self.schedule_save();
    }

    /// Return the cached embedding or ask the AI for it.
    ///
    /// Identical texts hit the backend exactly once.
    pub async fn get_or_embed<A: AI + ?Sized>(&self, ai: &A, text: &str) -> Result<Vec<f32>> {
        if let Some(vector) = self.get(text) {
            debug!(text_len = text.len(), "Embedding cache hit");
            return Ok(vector);
        }

        let vector = ai.embed(text).await?;
        if vector.is_empty() {
            return Err(EngineError::Embedding("empty embedding".into()));
        }
        self.insert(text, vector.clone());
        Ok(vector)
    }

    /// Cancel any pending debounced write and write now.
    pub async fn flush(&self) -> Result<()> {
        if let Some(handle) = self.take_pending() {
            handle.abort();
        }
        match &self.config.path {
            Some(path) => write_snapshot(&self.entries, path).await,
            None => Ok(()),
        }
    }

    fn evict_if_needed(&self) {
        let mut entries = self.lock();
        if entries.len() <= self.config.soft_cap {
            return;
        }
        let evict = ((entries.len() as f32 * self.config.evict_fraction) as usize)
            .max(1)
            .min(entries.len());
        entries.drain(..evict);
        info!(evicted = evict, remaining = entries.len(), "Evicted oldest embeddings");
    }

    fn schedule_save(&self) {
        let Some(path) = self.config.path.clone() else {
            return;
        };
        let Ok(runtime) = tokio::runtime::Handle::try_current() else {
            debug!("No runtime for debounced save, waiting for flush");
            return;
        };

        let entries = self.entries.clone();
        let delay = Duration::from_millis(self.config.save_debounce_ms);
        let handle = runtime.spawn(async move {
            tokio::time::sleep(delay).await;
            if let Err(e) = write_snapshot(&entries, &path).await {
                warn!(path = %path.display(), error = %e, "Failed to persist embedding cache");
            }
        });

        let mut pending = self.pending_save.lock().unwrap_or_else(|e| e.into_inner());
        if let Some(previous) = pending.replace(handle) {
            previous.abort();
        }
    }

    fn take_pending(&self) -> Option<JoinHandle<()>> {
        self.pending_save
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .take()
    }

    fn lock(&self) -> MutexGuard<'_, Entries> {
        self.entries.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Path of the backing file, if any.
    pub fn path(&self) -> Option<&Path> {
        self.config.path.as_deref()
    }
}

impl Default for EmbeddingCache {
    fn default() -> Self {
        Self::in_memory()
    }
}

async fn write_snapshot(entries: &Arc<Mutex<Entries>>, path: &PathBuf) -> Result<()> {
    let json = {
        let guard = entries.lock().unwrap_or_else(|e| e.into_inner());
        serde_json::to_vec(&*guard)?
    };

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        tokio::fs::create_dir_all(parent).await?;
    }
    let tmp = path.with_extension("json.tmp");
    tokio::fs::write(&tmp, &json).await?;
    tokio::fs::rename(&tmp, path).await?;
    debug!(path = %path.display(), bytes = json.len(), "Embedding cache saved");
    Ok(())
}

/// Cosine similarity between two vectors; 0 when undefined.
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    if a.len() != b.len() || a.is_empty() {
        return 0.0;
    }

    let dot: f32 = a.iter().zip(b.iter()).map(|(x, y)| x * y).sum();
    let norm_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let norm_b: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();

    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }

    dot / (norm_a * norm_b)
}
