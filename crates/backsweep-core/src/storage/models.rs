use std::fmt;

/// Integrity state of one (local file, backup root) pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum VerdictStatus {
    /// Backup exists and its digest matches the local digest.
    /// The only status that authorizes cleanup.
    Valid,
    /// Backup exists but its digest differs. Corruption or divergence;
    /// surfaced to the operator.
    Invalid,
    /// No file at the mapped path under this root.
    Missing,
    /// Backup present but could not be read or hashed. Retried next run.
    Indeterminate,
}

impl VerdictStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            VerdictStatus::Valid => "valid",
            VerdictStatus::Invalid => "invalid",
            VerdictStatus::Missing => "missing",
            VerdictStatus::Indeterminate => "indeterminate",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "valid" => Some(VerdictStatus::Valid),
            "invalid" => Some(VerdictStatus::Invalid),
            "missing" => Some(VerdictStatus::Missing),
            "indeterminate" => Some(VerdictStatus::Indeterminate),
            _ => None,
        }
    }

    /// Terminal for the current content version, so safe to reuse from the
    /// store while the file's (size, mtime) is unchanged. Missing and
    /// Indeterminate are re-evaluated every run.
    pub fn is_terminal(&self) -> bool {
        matches!(self, VerdictStatus::Valid | VerdictStatus::Invalid)
    }
}

impl fmt::Display for VerdictStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A persisted validation verdict, keyed by (local_path, root_id).
/// Usable only while the row's (file_size, mtime_ns) matches the live file.
#[derive(Debug, Clone)]
pub struct VerdictRow {
    pub local_path: String,
    pub file_size: i64,
    pub mtime_ns: i64,
    pub root_id: String,
    pub status: VerdictStatus,
    pub backup_digest: Option<String>,
    pub checked_at: String,
}

/// A cached local-content fingerprint.
#[derive(Debug, Clone)]
pub struct FingerprintRow {
    pub local_path: String,
    pub file_size: i64,
    pub mtime_ns: i64,
    pub digest: String,
    pub computed_at: String,
}
