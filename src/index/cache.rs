//! Shared, fingerprint-keyed index with atomic swap-in
use super::{Index, IndexBuildError, IndexBuilder};
use crate::config::CachePolicy;
use crate::corpus::CorpusFingerprint;
use std::path::{Path, PathBuf};
use std::sync::{Arc, RwLock};
use std::time::Duration;
use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

/// Owns the active [`Index`] for one corpus directory
///
/// Readers clone an `Arc<Index>` out of a short read lock. Rebuilds run
/// outside that lock, one at a time, and replace the active index in a single
/// write. Readers that already hold an index are never made to wait for a
/// rebuild another caller has started.
pub struct IndexHandle {
    builder: Arc<IndexBuilder>,
    corpus_path: PathBuf,
    policy: CachePolicy,
    active: RwLock<Option<Arc<Index>>>,
    rebuild: Mutex<()>,
}

impl IndexHandle {
    pub fn new(builder: Arc<IndexBuilder>, corpus_path: impl Into<PathBuf>, policy: CachePolicy) -> Self {
        Self {
            builder,
            corpus_path: corpus_path.into(),
            policy,
            active: RwLock::new(None),
            rebuild: Mutex::new(()),
        }
    }

    pub fn corpus_path(&self) -> &Path {
        &self.corpus_path
    }

    pub fn policy(&self) -> CachePolicy {
        self.policy
    }

    /// Index currently installed, without checking freshness
    pub fn cached(&self) -> Option<Arc<Index>> {
        match self.active.read() {
            Ok(guard) => guard.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }

    /// Index reflecting the corpus as it is now
    ///
    /// With [`CachePolicy::None`] every call builds a fresh index. With
    /// [`CachePolicy::Fingerprint`] the cached index is returned while the
    /// corpus fingerprint is unchanged, and rebuilt otherwise.
    pub async fn current(&self) -> Result<Arc<Index>, IndexBuildError> {
        if self.policy == CachePolicy::None {
            return self.build().await.map(Arc::new);
        }

        let fingerprint = self.fingerprint().await?;
        if let Some(index) = self.cached_if_fresh(fingerprint) {
            return Ok(index);
        }

        // Someone else is already rebuilding: serve what we have
        let _guard = match self.rebuild.try_lock() {
            Ok(guard) => guard,
            Err(_) => match self.cached() {
                Some(stale) => {
                    debug!("Index rebuild in progress, serving previous index");
                    return Ok(stale);
                }
                None => self.rebuild.lock().await,
            },
        };

        // The rebuild we waited on may already match
        if let Some(index) = self.cached_if_fresh(fingerprint) {
            return Ok(index);
        }

        let index = Arc::new(self.build().await?);
        self.install(index.clone());
        Ok(index)
    }

    /// Rebuild if the corpus changed since the last build
    ///
    /// Returns `true` when a new index was installed.
    pub async fn refresh(&self) -> Result<bool, IndexBuildError> {
        let _guard = self.rebuild.lock().await;

        let fingerprint = self.fingerprint().await?;
        if self.cached_if_fresh(fingerprint).is_some() {
            return Ok(false);
        }

        let index = Arc::new(self.build().await?);
        self.install(index);
        Ok(true)
    }

    /// Periodically call [`IndexHandle::refresh`] until the task is aborted
    pub fn spawn_refresher(self: Arc<Self>, every: Duration) -> JoinHandle<()> {
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(every);
            ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);

            loop {
                ticker.tick().await;
                match self.refresh().await {
                    Ok(true) => info!(corpus = ?self.corpus_path, "Index refreshed after corpus change"),
                    Ok(false) => debug!("Corpus unchanged, keeping index"),
                    Err(e) => warn!(corpus = ?self.corpus_path, error = %e, "Background index refresh failed"),
                }
            }
        })
    }

    fn cached_if_fresh(&self, fingerprint: CorpusFingerprint) -> Option<Arc<Index>> {
        self.cached()
            .filter(|index| index.fingerprint() == fingerprint)
    }

    fn install(&self, index: Arc<Index>) {
        let mut guard = match self.active.write() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        *guard = Some(index);
    }

    async fn fingerprint(&self) -> Result<CorpusFingerprint, IndexBuildError> {
        let builder = self.builder.clone();
        let path = self.corpus_path.clone();
        tokio::task::spawn_blocking(move || builder.loader().fingerprint(&path))
            .await
            .map_err(|e| IndexBuildError::Task(e.to_string()))?
    }

    async fn build(&self) -> Result<Index, IndexBuildError> {
        let builder = self.builder.clone();
        let path = self.corpus_path.clone();
        tokio::task::spawn_blocking(move || builder.build(&path))
            .await
            .map_err(|e| IndexBuildError::Task(e.to_string()))?
    }
}
