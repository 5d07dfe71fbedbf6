//! On-disk staging store

use std::collections::{BTreeMap, HashMap};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration as StdDuration;

use chrono::{DateTime, Duration, Utc};
use futures::future;
use tokio::sync::Mutex;

use core_kernel::ClaimId;

use crate::error::StagingError;

/// Default retention window for staged files
const DEFAULT_RETENTION_MINUTES: i64 = 5;

/// A file handed to the store for staging
#[derive(Debug, Clone)]
pub struct StagedUpload {
    pub name: String,
    pub content_type: String,
    pub bytes: Vec<u8>,
}

/// Metadata of a file currently held in staging
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StagedFile {
    /// MIME content type recorded at upload
    pub content_type: String,
    /// Location of the staged copy on disk
    pub path: PathBuf,
    /// Arrival time; eviction is measured against this
    pub staged_at: DateTime<Utc>,
}

/// Short-lived per-claim staging area on local disk.
///
/// Every claim owns one bucket, laid out as `<root>/<claim uuid>/<file>`.
/// A bucket exists exactly while it holds at least one entry. All mutation
/// goes through one exclusive lock, so readers always observe a bucket that
/// is either fully merged or untouched.
pub struct StagingStore {
    root: PathBuf,
    retention: Duration,
    buckets: Mutex<HashMap<ClaimId, HashMap<String, StagedFile>>>,
}

impl StagingStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            retention: Duration::minutes(DEFAULT_RETENTION_MINUTES),
            buckets: Mutex::new(HashMap::new()),
        }
    }

    /// Overrides the retention window
    pub fn with_retention(mut self, retention: Duration) -> Self {
        self.retention = retention;
        self
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn claim_dir(&self, claim: ClaimId) -> PathBuf {
        self.root.join(claim.as_uuid().to_string())
    }

    fn validate_name(name: &str) -> Result<(), StagingError> {
        if name.is_empty()
            || name.contains('/')
            || name.contains('\\')
            || name.contains("..")
        {
            return Err(StagingError::InvalidName(name.to_string()));
        }
        Ok(())
    }

    /// Stages a batch of files for a claim and merges them into its bucket.
    ///
    /// Copies run concurrently. The batch is all-or-nothing: on any copy
    /// failure the files already written for this batch are removed
    /// best-effort and nothing is merged. All entries of a successful batch
    /// share one arrival timestamp, taken after the copies finish. Returns a
    /// snapshot of the full bucket after the merge.
    pub async fn append(
        &self,
        claim: ClaimId,
        files: Vec<StagedUpload>,
    ) -> Result<BTreeMap<String, StagedFile>, StagingError> {
        if files.is_empty() {
            return Ok(self.get(claim).await);
        }
        for file in &files {
            Self::validate_name(&file.name)?;
        }

        let dir = self.claim_dir(claim);
        tokio::fs::create_dir_all(&dir)
            .await
            .map_err(|source| StagingError::PrepareDirectory {
                path: dir.clone(),
                source,
            })?;

        let copies = files.iter().map(|file| {
            let path = dir.join(&file.name);
            async move {
                match tokio::fs::write(&path, &file.bytes).await {
                    Ok(()) => Ok(path),
                    Err(source) => Err(StagingError::Copy {
                        name: file.name.clone(),
                        source,
                    }),
                }
            }
        });
        let outcomes = future::join_all(copies).await;

        let mut written = Vec::with_capacity(outcomes.len());
        let mut failure = None;
        for outcome in outcomes {
            match outcome {
                Ok(path) => written.push(path),
                Err(err) if failure.is_none() => failure = Some(err),
                Err(_) => {}
            }
        }
        if let Some(err) = failure {
            for path in written {
                if let Err(cleanup) = tokio::fs::remove_file(&path).await {
                    tracing::warn!(path = %path.display(), error = %cleanup, "failed to undo staged copy");
                }
            }
            return Err(err);
        }

        let staged_at = Utc::now();
        let mut buckets = self.buckets.lock().await;
        let bucket = buckets.entry(claim).or_default();
        for file in files {
            bucket.insert(
                file.name.clone(),
                StagedFile {
                    content_type: file.content_type,
                    path: dir.join(&file.name),
                    staged_at,
                },
            );
        }
        Ok(bucket
            .iter()
            .map(|(name, meta)| (name.clone(), meta.clone()))
            .collect())
    }

    /// Snapshot of a claim's bucket; empty when the claim has nothing staged
    pub async fn get(&self, claim: ClaimId) -> BTreeMap<String, StagedFile> {
        let buckets = self.buckets.lock().await;
        buckets
            .get(&claim)
            .map(|bucket| {
                bucket
                    .iter()
                    .map(|(name, meta)| (name.clone(), meta.clone()))
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Drops a claim's bucket and its directory. Absent claims are a no-op.
    pub async fn remove(&self, claim: ClaimId) -> Result<(), StagingError> {
        let mut buckets = self.buckets.lock().await;
        buckets.remove(&claim);
        let dir = self.claim_dir(claim);
        match tokio::fs::remove_dir_all(&dir).await {
            Ok(()) => Ok(()),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(source) => Err(StagingError::Remove { path: dir, source }),
        }
    }

    /// Evicts every staged file strictly older than the retention window.
    ///
    /// `now` is passed in so sweeps are testable against a simulated clock.
    /// Per-entry removal failures are logged and skipped; the entry stays for
    /// the next sweep. Returns how many entries were evicted.
    pub async fn evict_stale(&self, now: DateTime<Utc>) -> usize {
        let mut buckets = self.buckets.lock().await;
        let mut evicted = 0;
        let mut emptied = Vec::new();

        for (claim, bucket) in buckets.iter_mut() {
            let stale: Vec<String> = bucket
                .iter()
                .filter(|(_, meta)| now - meta.staged_at > self.retention)
                .map(|(name, _)| name.clone())
                .collect();
            for name in stale {
                let path = bucket[&name].path.clone();
                match tokio::fs::remove_file(&path).await {
                    Ok(()) => {
                        bucket.remove(&name);
                        evicted += 1;
                    }
                    Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
                        bucket.remove(&name);
                        evicted += 1;
                    }
                    Err(err) => {
                        tracing::warn!(claim = %claim, file = %name, error = %err, "eviction failed, keeping entry");
                    }
                }
            }
            if bucket.is_empty() {
                emptied.push(*claim);
            }
        }

        for claim in emptied {
            buckets.remove(&claim);
            let dir = self.claim_dir(claim);
            if let Err(err) = tokio::fs::remove_dir_all(&dir).await {
                if err.kind() != std::io::ErrorKind::NotFound {
                    tracing::warn!(path = %dir.display(), error = %err, "failed to remove emptied staging directory");
                }
            }
        }
        evicted
    }
}

/// Periodic sweep over the staging area.
///
/// Runs until the owning task is cancelled. Eviction failures are handled
/// inside the sweep, so this only ever exits by cancellation.
pub async fn run_housekeeper(store: Arc<StagingStore>, interval: StdDuration) -> anyhow::Result<()> {
    tracing::info!(interval_secs = interval.as_secs(), "staging housekeeper started");
    loop {
        tokio::time::sleep(interval).await;
        let evicted = store.evict_stale(Utc::now()).await;
        if evicted > 0 {
            tracing::info!(evicted, "staging sweep evicted stale files");
        }
    }
}
