use rayon::prelude::*;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;
use tracing::{debug, error, warn};

use crate::config::BackupRoot;
use crate::error::Error;
use crate::fingerprint;
use crate::locator::{self, BackupCandidate};
use crate::progress::ProgressReporter;
use crate::scanner::FileRecord;
use crate::storage::models::{VerdictRow, VerdictStatus};
use crate::storage::Database;

use super::{FileReport, Verdict};

/// Produces a verdict for every (file, backup root) pair, reusing stored
/// verdicts while the local file's (size, mtime) is unchanged.
///
/// The store handle is the only shared mutable state; all access serializes
/// through its mutex. Each upsert commits independently; a run killed
/// between files leaves the store consistent.
pub struct ValidationEngine {
    backup_roots: Vec<BackupRoot>,
    io_timeout: Duration,
    store: Arc<Mutex<Database>>,
}

impl ValidationEngine {
    pub fn new(
        backup_roots: Vec<BackupRoot>,
        io_timeout: Duration,
        store: Arc<Mutex<Database>>,
    ) -> Self {
        Self {
            backup_roots,
            io_timeout,
            store,
        }
    }

    /// Validate every record on a dedicated worker pool of `concurrency`
    /// threads. Reports are returned in input order.
    pub fn validate_all(
        &self,
        records: &[FileRecord],
        concurrency: usize,
        reporter: &dyn ProgressReporter,
    ) -> Result<Vec<FileReport>, Error> {
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(concurrency)
            .build()?;

        let total = records.len();
        let done = AtomicUsize::new(0);

        let reports = pool.install(|| {
            records
                .par_iter()
                .map(|record| {
                    let report = self.validate_file(record);
                    let finished = done.fetch_add(1, Ordering::Relaxed) + 1;
                    reporter.on_validate_progress(finished, total);
                    report
                })
                .collect::<Vec<_>>()
        });

        Ok(reports)
    }

    /// Run the full state machine for one file.
    pub fn validate_file(&self, record: &FileRecord) -> FileReport {
        let local_digest = match self.local_digest(record) {
            Ok(digest) => digest,
            Err(e) => {
                warn!(
                    "Local read failed for {}, skipping its validation pass: {}",
                    record.local_path.display(),
                    e
                );
                return FileReport {
                    record: record.clone(),
                    local_digest: None,
                    verdicts: Vec::new(),
                    error: Some(e.to_string()),
                };
            }
        };

        let candidates = locator::locate(record, &self.backup_roots);
        let verdicts = candidates
            .iter()
            .map(|candidate| self.validate_candidate(record, candidate, &local_digest))
            .collect();

        FileReport {
            record: record.clone(),
            local_digest: Some(local_digest),
            verdicts,
            error: None,
        }
    }

    /// Fingerprint the local file, reusing the cached digest while the
    /// (size, mtime) key still matches. Errors here are fatal for this
    /// file's pass.
    fn local_digest(&self, record: &FileRecord) -> Result<String, Error> {
        let path_key = record.local_path.to_string_lossy().into_owned();

        if let Ok(store) = self.store_guard() {
            match store.get_fingerprint(&path_key, record.size as i64, record.mtime_ns) {
                Ok(Some(digest)) => {
                    debug!("Fingerprint cache hit for {}", record.local_path.display());
                    return Ok(digest);
                }
                Ok(None) => {}
                Err(e) => warn!(
                    "Fingerprint cache lookup failed for {}: {}",
                    record.local_path.display(),
                    e
                ),
            }
        }

        let digest = fingerprint::digest_file(&record.local_path, self.io_timeout)?;

        match self.store_guard() {
            Ok(store) => {
                if let Err(e) = store.upsert_fingerprint(
                    &path_key,
                    record.size as i64,
                    record.mtime_ns,
                    &digest,
                ) {
                    error!(
                        "Failed to cache fingerprint for {}: {}",
                        record.local_path.display(),
                        e
                    );
                }
            }
            Err(e) => error!("{}", e),
        }

        Ok(digest)
    }

    /// State machine for one (file, root) pair:
    /// absent candidate → Missing; unreadable candidate → Indeterminate;
    /// digest mismatch → Invalid; digest match → Valid.
    fn validate_candidate(
        &self,
        record: &FileRecord,
        candidate: &BackupCandidate,
        local_digest: &str,
    ) -> Verdict {
        let path_key = record.local_path.to_string_lossy().into_owned();

        if !candidate.exists {
            let status = VerdictStatus::Missing;
            self.persist_verdict(record, &candidate.root_id, status, None);
            return Verdict {
                root_id: candidate.root_id.clone(),
                candidate_path: candidate.path.clone(),
                status,
                reused: false,
            };
        }

        // Reuse a terminal verdict while the local file is unchanged.
        if let Ok(store) = self.store_guard() {
            match store.get_verdict(&path_key, &candidate.root_id) {
                Ok(Some(row))
                    if row.file_size == record.size as i64
                        && row.mtime_ns == record.mtime_ns
                        && row.status.is_terminal() =>
                {
                    debug!(
                        "Verdict cache hit for {} @ {}: {}",
                        record.local_path.display(),
                        candidate.root_id,
                        row.status
                    );
                    return Verdict {
                        root_id: candidate.root_id.clone(),
                        candidate_path: candidate.path.clone(),
                        status: row.status,
                        reused: true,
                    };
                }
                Ok(_) => {}
                Err(e) => warn!(
                    "Verdict lookup failed for {} @ {}: {}",
                    record.local_path.display(),
                    candidate.root_id,
                    e
                ),
            }
        }

        let (status, backup_digest) =
            match fingerprint::digest_file(&candidate.path, self.io_timeout) {
                Ok(digest) if digest == local_digest => (VerdictStatus::Valid, Some(digest)),
                Ok(digest) => {
                    warn!(
                        "Backup copy diverges from local content: {} @ {}",
                        record.local_path.display(),
                        candidate.root_id
                    );
                    (VerdictStatus::Invalid, Some(digest))
                }
                Err(e) => {
                    warn!(
                        "Backup copy unreadable, verdict indeterminate: {} @ {}: {}",
                        candidate.path.display(),
                        candidate.root_id,
                        e
                    );
                    (VerdictStatus::Indeterminate, None)
                }
            };

        self.persist_verdict(record, &candidate.root_id, status, backup_digest);

        Verdict {
            root_id: candidate.root_id.clone(),
            candidate_path: candidate.path.clone(),
            status,
            reused: false,
        }
    }

    fn persist_verdict(
        &self,
        record: &FileRecord,
        root_id: &str,
        status: VerdictStatus,
        backup_digest: Option<String>,
    ) {
        let row = VerdictRow {
            local_path: record.local_path.to_string_lossy().into_owned(),
            file_size: record.size as i64,
            mtime_ns: record.mtime_ns,
            root_id: root_id.to_string(),
            status,
            backup_digest,
            checked_at: chrono::Utc::now().to_rfc3339(),
        };

        match self.store_guard() {
            Ok(store) => {
                if let Err(e) = store.upsert_verdict(&row) {
                    error!(
                        "Failed to persist verdict for {} @ {}: {}",
                        record.local_path.display(),
                        root_id,
                        e
                    );
                }
            }
            Err(e) => error!("{}", e),
        }
    }

    fn store_guard(&self) -> Result<MutexGuard<'_, Database>, Error> {
        self.store
            .lock()
            .map_err(|_| Error::Other("verdict store lock poisoned".to_string()))
    }
}
