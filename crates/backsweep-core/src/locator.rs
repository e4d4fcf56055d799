use std::path::PathBuf;

use crate::config::BackupRoot;
use crate::scanner::FileRecord;

/// The mapped location of a local file under one backup root.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BackupCandidate {
    pub root_id: String,
    pub path: PathBuf,
    pub exists: bool,
}

/// Map a record into every configured backup root's namespace.
///
/// The mapping preserves the record's relative path under each root, so it is
/// reversible. Absence of the mapped path is data, not failure, and backup
/// stores are never touched beyond the existence probe.
pub fn locate(record: &FileRecord, backup_roots: &[BackupRoot]) -> Vec<BackupCandidate> {
    backup_roots
        .iter()
        .map(|root| {
            let path = PathBuf::from(&root.path).join(&record.relative_path);
            let exists = path.exists();
            BackupCandidate {
                root_id: root.id.clone(),
                path,
                exists,
            }
        })
        .collect()
}
