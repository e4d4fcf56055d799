use dashmap::DashMap;
use glob::Pattern;
use rayon::prelude::*;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::time::UNIX_EPOCH;
use tracing::error;

use super::FileRecord;

/// Parallel directory traversal. Builds the list of local files to validate,
/// filtering by glob ignore patterns. Skips symlinks and 0-byte files.
/// Output is sorted by path so downstream passes are deterministic.
pub fn collect_files(
    local_roots: &[&str],
    ignore_globs: &[&str],
) -> io::Result<Vec<FileRecord>> {
    let map: DashMap<PathBuf, FileRecord> = DashMap::new();

    let ignore_patterns: Vec<Pattern> = ignore_globs
        .iter()
        .filter_map(|glob| match Pattern::new(glob) {
            Ok(p) => Some(p),
            Err(e) => {
                error!("Invalid glob pattern '{}': {}", glob, e);
                None
            }
        })
        .collect();

    local_roots.par_iter().try_for_each(|root_dir| {
        let root = Path::new(root_dir);
        visit_dirs(root, root, &map, &ignore_patterns)
    })?;

    let mut records: Vec<FileRecord> = map.into_iter().map(|(_, record)| record).collect();
    records.sort_by(|a, b| a.local_path.cmp(&b.local_path));
    Ok(records)
}

fn visit_dirs(
    root: &Path,
    dir: &Path,
    map: &DashMap<PathBuf, FileRecord>,
    ignore_patterns: &[Pattern],
) -> io::Result<()> {
    if !dir.is_dir() {
        return Ok(());
    }

    if ignore_patterns
        .iter()
        .any(|pattern| pattern.matches_path(dir))
    {
        return Ok(());
    }

    let entries = match fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(err) => {
            if err.kind() == io::ErrorKind::PermissionDenied {
                error!(
                    "Access denied reading directory {}: {}",
                    dir.display(),
                    err
                );
                return Ok(());
            } else {
                return Err(io::Error::new(
                    err.kind(),
                    format!("Error reading directory {}: {}", dir.display(), err),
                ));
            }
        }
    };

    entries.par_bridge().try_for_each(|entry_result| {
        let entry = match entry_result {
            Ok(entry) => entry,
            Err(err) => {
                return Err(io::Error::new(
                    err.kind(),
                    format!(
                        "Error reading entry in directory {}: {}",
                        dir.display(),
                        err
                    ),
                ));
            }
        };

        let path = entry.path();
        let metadata = match fs::symlink_metadata(&path) {
            Ok(metadata) => metadata,
            Err(err) => {
                return Err(io::Error::new(
                    err.kind(),
                    format!("Error getting metadata for {}: {}", path.display(), err),
                ));
            }
        };

        if metadata.is_dir() {
            visit_dirs(root, &path, map, ignore_patterns)?;
        } else if metadata.is_file() && metadata.len() > 0 {
            if !ignore_patterns
                .iter()
                .any(|pattern| pattern.matches_path(&path))
            {
                if let Some(record) = make_record(root, &path, &metadata) {
                    map.insert(record.local_path.clone(), record);
                }
            }
        }
        Ok(())
    })?;

    Ok(())
}

fn make_record(root: &Path, path: &Path, metadata: &fs::Metadata) -> Option<FileRecord> {
    let relative_path = match path.strip_prefix(root) {
        Ok(rel) => rel.to_path_buf(),
        Err(_) => {
            error!(
                "File {} escaped its scan root {}",
                path.display(),
                root.display()
            );
            return None;
        }
    };

    let mtime_ns = match metadata.modified() {
        Ok(modified) => modified
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_nanos() as i64)
            .unwrap_or(0),
        Err(e) => {
            error!("Error reading mtime for {}: {}", path.display(), e);
            return None;
        }
    };

    Some(FileRecord {
        local_path: path.to_path_buf(),
        relative_path,
        size: metadata.len(),
        mtime_ns,
    })
}
