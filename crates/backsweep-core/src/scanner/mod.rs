pub mod walk;

use std::path::PathBuf;

pub use walk::collect_files;

/// One local data file discovered during scanning.
///
/// `relative_path` is the path below the local root that contained the file;
/// it is the key used to map the file into each backup root's namespace.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileRecord {
    pub local_path: PathBuf,
    pub relative_path: PathBuf,
    pub size: u64,
    pub mtime_ns: i64,
}
