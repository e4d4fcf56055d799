use std::fs;
use std::io::ErrorKind;
use std::path::PathBuf;
use std::sync::Mutex;
use tracing::{debug, error, info, warn};

use crate::planner::CleanupDecision;
use crate::progress::ProgressReporter;
use crate::storage::Database;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OutcomeStatus {
    Deleted,
    /// The file was already gone at delete time.
    AlreadyGone,
    Failed(String),
    /// Decision was ineligible; nothing touched.
    Skipped,
}

#[derive(Debug, Clone)]
pub struct ExecutionOutcome {
    pub local_path: PathBuf,
    pub status: OutcomeStatus,
}

/// Apply a cleanup plan. One file is the atomic unit: each deletion either
/// fully happens or is recorded as failed, and a failure never aborts the
/// remaining plan. Ineligible decisions are never acted on here; overrides
/// belong in policy configuration upstream.
pub fn execute(
    plan: &[CleanupDecision],
    store: &Mutex<Database>,
    reporter: &dyn ProgressReporter,
) -> Vec<ExecutionOutcome> {
    let total_eligible = plan.iter().filter(|d| d.eligible).count();
    reporter.on_execute_start(total_eligible);

    let mut outcomes = Vec::with_capacity(plan.len());
    let mut processed = 0usize;

    for decision in plan {
        if !decision.eligible {
            outcomes.push(ExecutionOutcome {
                local_path: decision.local_path.clone(),
                status: OutcomeStatus::Skipped,
            });
            continue;
        }

        let status = match fs::remove_file(&decision.local_path) {
            Ok(()) => {
                debug!("Deleted {}", decision.local_path.display());
                invalidate(store, &decision.local_path);
                OutcomeStatus::Deleted
            }
            Err(e) if e.kind() == ErrorKind::NotFound => {
                warn!(
                    "File {} no longer exists, nothing to delete",
                    decision.local_path.display()
                );
                invalidate(store, &decision.local_path);
                OutcomeStatus::AlreadyGone
            }
            Err(e) => {
                error!("Failed to remove {}: {}", decision.local_path.display(), e);
                OutcomeStatus::Failed(e.to_string())
            }
        };

        processed += 1;
        reporter.on_execute_progress(processed, total_eligible);
        outcomes.push(ExecutionOutcome {
            local_path: decision.local_path.clone(),
            status,
        });
    }

    let deleted = outcomes
        .iter()
        .filter(|o| o.status == OutcomeStatus::Deleted)
        .count();
    let failed = outcomes
        .iter()
        .filter(|o| matches!(o.status, OutcomeStatus::Failed(_)))
        .count();
    info!("Cleanup executed: {} deleted, {} failed", deleted, failed);

    outcomes
}

/// Drop every stored row for a deleted path. A future file at the same path
/// must not inherit its verdicts.
fn invalidate(store: &Mutex<Database>, path: &std::path::Path) {
    let path_key = path.to_string_lossy().into_owned();
    match store.lock() {
        Ok(db) => {
            if let Err(e) = db.invalidate_local_path(&path_key) {
                error!("Failed to invalidate store rows for {}: {}", path.display(), e);
            }
        }
        Err(_) => error!("verdict store lock poisoned"),
    }
}
