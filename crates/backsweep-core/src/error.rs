use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("file not found: {}", .0.display())]
    NotFound(PathBuf),

    #[error("read of {} exceeded {budget_secs}s budget", .path.display())]
    Timeout { path: PathBuf, budget_secs: u64 },

    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("worker pool error: {0}")]
    Pool(#[from] rayon::ThreadPoolBuildError),

    #[error("Report error: {0}")]
    Csv(#[from] csv::Error),

    #[error("{0}")]
    Other(String),
}
