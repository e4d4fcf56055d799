pub mod engine;

use std::path::PathBuf;

use crate::scanner::FileRecord;
use crate::storage::models::VerdictStatus;

pub use engine::ValidationEngine;

/// Outcome of checking one (file, backup root) pair.
#[derive(Debug, Clone)]
pub struct Verdict {
    pub root_id: String,
    pub candidate_path: PathBuf,
    pub status: VerdictStatus,
    /// True when the verdict was reused from the store without rehashing.
    pub reused: bool,
}

/// Per-file output of a validation pass.
///
/// `error` is set when the *local* file could not be fingerprinted; such a
/// file gets no verdicts and can never be eligible for cleanup.
#[derive(Debug, Clone)]
pub struct FileReport {
    pub record: FileRecord,
    pub local_digest: Option<String>,
    pub verdicts: Vec<Verdict>,
    pub error: Option<String>,
}

impl FileReport {
    pub fn has_status(&self, status: VerdictStatus) -> bool {
        self.verdicts.iter().any(|v| v.status == status)
    }

    pub fn all_valid(&self) -> bool {
        !self.verdicts.is_empty()
            && self.verdicts.iter().all(|v| v.status == VerdictStatus::Valid)
    }
}
