use config::{Config, File as ConfigFile};
use serde::Deserialize;
use std::collections::HashSet;
use std::path::Path;
use std::time::Duration;

use crate::error::Error;

/// One mirrored storage location expected to hold copies of local data.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct BackupRoot {
    pub id: String,
    pub path: String,
}

/// Aggregate validity policy across backup roots.
#[derive(Debug, Clone, Copy, Default, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub enum ValidityPolicy {
    /// One Valid verdict on any root authorizes cleanup.
    #[default]
    AnyRoot,
    /// Every configured root must be Valid.
    AllRoots,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub local_roots: Vec<String>,
    pub backup_roots: Vec<BackupRoot>,
    #[serde(default)]
    pub ignore_patterns: Vec<String>,
    #[serde(default)]
    pub policy: ValidityPolicy,
    #[serde(default = "default_concurrency")]
    pub concurrency: usize,
    #[serde(default = "default_io_timeout_secs")]
    pub io_timeout_secs: u64,
    #[serde(default = "default_verdict_db")]
    pub verdict_db: String,
}

fn default_concurrency() -> usize {
    4
}

fn default_io_timeout_secs() -> u64 {
    300
}

fn default_verdict_db() -> String {
    "backsweep_verdicts.db".to_string()
}

impl AppConfig {
    pub fn io_timeout(&self) -> Duration {
        Duration::from_secs(self.io_timeout_secs)
    }

    /// Reject configurations that must never reach the I/O phases.
    /// A run with no backup roots can only fail closed on every file.
    pub fn validate(&self) -> Result<(), Error> {
        if self.local_roots.is_empty() {
            return Err(Error::InvalidConfig("no local_roots configured".into()));
        }
        if self.backup_roots.is_empty() {
            return Err(Error::InvalidConfig("no backup_roots configured".into()));
        }
        let mut seen = HashSet::new();
        for root in &self.backup_roots {
            if root.id.trim().is_empty() {
                return Err(Error::InvalidConfig("backup root with empty id".into()));
            }
            if !seen.insert(root.id.as_str()) {
                return Err(Error::InvalidConfig(format!(
                    "duplicate backup root id '{}'",
                    root.id
                )));
            }
        }
        if self.concurrency == 0 {
            return Err(Error::InvalidConfig("concurrency must be > 0".into()));
        }
        if self.io_timeout_secs == 0 {
            return Err(Error::InvalidConfig("io_timeout_secs must be > 0".into()));
        }
        Ok(())
    }
}

pub fn load_configuration() -> Result<AppConfig, Error> {
    load_from(
        &std::env::var("BACKSWEEP_CONFIG").unwrap_or_else(|_| "Backsweep".to_string()),
    )
}

pub fn load_from(name: &str) -> Result<AppConfig, Error> {
    let builder = Config::builder()
        .add_source(ConfigFile::with_name(name).required(true))
        .build()?;
    let cfg = builder.try_deserialize::<AppConfig>()?;
    cfg.validate()?;
    Ok(cfg)
}

/// Remove directories that are subdirectories of other directories in the list.
pub fn non_overlapping_directories(dirs: Vec<String>) -> Vec<String> {
    let mut result: Vec<String> = Vec::new();

    for dir in dirs {
        let dir_path = Path::new(&dir);
        let mut should_add = true;
        let result_clone = result.clone();

        for res_dir in &result_clone {
            let res_dir_path = Path::new(res_dir);

            if dir_path.starts_with(res_dir_path) {
                should_add = false;
                break;
            }

            if res_dir_path.starts_with(dir_path) {
                result.retain(|x| x != res_dir);
                break;
            }
        }

        if should_add {
            result.push(dir);
        }
    }

    result
}
