// Transcript cache - Bounded LRU in front of the transcript source

use std::collections::{HashMap, VecDeque};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::Mutex;
use tracing::debug;

use crate::domain::errors::*;
use crate::domain::model::*;
use crate::ports::*;

struct Entries {
    transcripts: HashMap<PathBuf, Arc<Transcript>>,
    /// Most recently used at the back
    order: VecDeque<PathBuf>,
}

/// Keyed by the full media path; failures are never cached
pub struct CachedTranscriber {
    inner: Arc<dyn TranscriptPort>,
    capacity: usize,
    entries: Mutex<Entries>,
}

impl CachedTranscriber {
    pub fn new(inner: Arc<dyn TranscriptPort>, capacity: usize) -> Self {
        Self {
            inner,
            capacity: capacity.max(1),
            entries: Mutex::new(Entries {
                transcripts: HashMap::new(),
                order: VecDeque::new(),
            }),
        }
    }

    async fn cached(&self, key: &Path) -> Option<Arc<Transcript>> {
        let mut entries = self.entries.lock().await;
        let hit = entries.transcripts.get(key).cloned()?;
        entries.order.retain(|p| p != key);
        entries.order.push_back(key.to_path_buf());
        Some(hit)
    }

    async fn store(&self, key: PathBuf, transcript: Arc<Transcript>) {
        let mut entries = self.entries.lock().await;
        entries.order.retain(|p| p != &key);
        entries.order.push_back(key.clone());
        entries.transcripts.insert(key, transcript);

        while entries.order.len() > self.capacity {
            if let Some(evicted) = entries.order.pop_front() {
                entries.transcripts.remove(&evicted);
            }
        }
    }

    pub async fn len(&self) -> usize {
        self.entries.lock().await.transcripts.len()
    }
}

#[async_trait]
impl TranscriptPort for CachedTranscriber {
    async fn transcribe(&self, media_path: &Path) -> Result<Transcript, DomainError> {
        let key = std::fs::canonicalize(media_path).unwrap_or_else(|_| media_path.to_path_buf());

        if let Some(hit) = self.cached(&key).await {
            debug!("Transcript cache hit for {}", key.display());
            return Ok((*hit).clone());
        }

        let transcript = Arc::new(self.inner.transcribe(media_path).await?);
        self.store(key, Arc::clone(&transcript)).await;
        Ok((*transcript).clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct CountingSource {
        calls: AtomicUsize,
    }

    #[async_trait]
    impl TranscriptPort for CountingSource {
        async fn transcribe(&self, media_path: &Path) -> Result<Transcript, DomainError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if media_path.ends_with("broken.mp4") {
                return Err(DomainError::Transform("decoder error".to_string()));
            }
            Ok(Transcript {
                segments: vec![Segment::new(media_path.to_string_lossy(), 0.0, 1.0)],
                language: None,
            })
        }
    }

    #[tokio::test]
    async fn test_hits_and_eviction() {
        let source = Arc::new(CountingSource {
            calls: AtomicUsize::new(0),
        });
        let cache = CachedTranscriber::new(source.clone(), 2);

        cache.transcribe(Path::new("/virtual/a.mp4")).await.unwrap();
        cache.transcribe(Path::new("/virtual/b.mp4")).await.unwrap();
        cache.transcribe(Path::new("/virtual/a.mp4")).await.unwrap();
        assert_eq!(source.calls.load(Ordering::SeqCst), 2);

        // c evicts b (least recently used), a stays
        cache.transcribe(Path::new("/virtual/c.mp4")).await.unwrap();
        cache.transcribe(Path::new("/virtual/a.mp4")).await.unwrap();
        assert_eq!(source.calls.load(Ordering::SeqCst), 3);
        cache.transcribe(Path::new("/virtual/b.mp4")).await.unwrap();
        assert_eq!(source.calls.load(Ordering::SeqCst), 4);
        assert_eq!(cache.len().await, 2);
    }

    #[tokio::test]
    async fn test_failures_not_cached() {
        let source = Arc::new(CountingSource {
            calls: AtomicUsize::new(0),
        });
        let cache = CachedTranscriber::new(source.clone(), 4);
        assert!(cache.transcribe(Path::new("/virtual/broken.mp4")).await.is_err());
        assert!(cache.transcribe(Path::new("/virtual/broken.mp4")).await.is_err());
        assert_eq!(source.calls.load(Ordering::SeqCst), 2);
        assert_eq!(cache.len().await, 0);
    }
}
