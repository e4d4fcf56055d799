use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};
use tracing::{debug, info};

use crate::config::{self, AppConfig};
use crate::error::Error;
use crate::executor::{self, ExecutionOutcome, OutcomeStatus};
use crate::planner::{self, CleanupDecision};
use crate::progress::ProgressReporter;
use crate::scanner;
use crate::storage::models::VerdictStatus;
use crate::storage::Database;
use crate::validate::{FileReport, ValidationEngine};

/// How far the pipeline runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunMode {
    /// Scan + validate, no planning or deletion.
    ValidateOnly,
    /// Scan + validate + plan, but never delete.
    DryRun,
    /// Full pipeline including deletion.
    Full,
}

#[derive(Debug)]
pub struct RunResult {
    pub scan_duration: Duration,
    pub validate_duration: Duration,
    pub execute_duration: Duration,
    pub total_files: usize,
    /// Files whose verdicts authorize cleanup under the configured policy.
    pub valid_files: usize,
    pub invalid_files: usize,
    pub missing_files: usize,
    pub indeterminate_files: usize,
    /// Files whose local read failed.
    pub errored_files: usize,
    pub eligible: usize,
    pub deleted: usize,
    pub delete_failed: usize,
    pub reports: Vec<FileReport>,
    pub decisions: Vec<CleanupDecision>,
    pub outcomes: Vec<ExecutionOutcome>,
}

impl RunResult {
    /// True only when every scanned file validated under policy and every
    /// attempted deletion succeeded. Anything else leaves work behind and
    /// must surface as a non-zero process exit.
    pub fn is_clean(&self) -> bool {
        self.valid_files == self.total_files
            && self.errored_files == 0
            && self.delete_failed == 0
    }
}

/// Orchestrates the pipeline: scan → validate → plan → execute.
///
/// The executor never starts before validation has produced a verdict set
/// for every scanned file; the phases are strict barriers.
pub struct SweepEngine {
    config: AppConfig,
    db_path: String,
}

impl SweepEngine {
    pub fn new(config: AppConfig) -> Self {
        let db_path = config.verdict_db.clone();
        Self { config, db_path }
    }

    pub fn with_db_path(mut self, path: &str) -> Self {
        self.db_path = path.to_string();
        self
    }

    pub fn run(
        &self,
        mode: RunMode,
        reporter: &dyn ProgressReporter,
    ) -> Result<RunResult, Error> {
        self.config.validate()?;

        let local_roots =
            config::non_overlapping_directories(self.config.local_roots.clone());
        info!("Processing local roots: {:?}", local_roots);

        // Phase 1: Scan
        reporter.on_scan_start();
        let scan_start = Instant::now();
        let root_slices: Vec<&str> = local_roots.iter().map(|s| s.as_str()).collect();
        let ignore_slices: Vec<&str> = self
            .config
            .ignore_patterns
            .iter()
            .map(|s| s.as_str())
            .collect();
        let records = scanner::collect_files(&root_slices, &ignore_slices)?;
        let scan_duration = scan_start.elapsed();
        reporter.on_scan_complete(records.len(), scan_duration.as_secs_f64());
        debug!(
            "Scan completed in {:.2}s — {} files",
            scan_duration.as_secs_f64(),
            records.len()
        );

        // Phase 2: Validate
        let store = Arc::new(Mutex::new(Database::open(&self.db_path)?));
        reporter.on_validate_start(records.len());
        let validate_start = Instant::now();
        let validation = ValidationEngine::new(
            self.config.backup_roots.clone(),
            self.config.io_timeout(),
            Arc::clone(&store),
        );
        let reports =
            validation.validate_all(&records, self.config.concurrency, reporter)?;
        let validate_duration = validate_start.elapsed();

        let valid_files = reports
            .iter()
            .filter(|r| planner::satisfies_policy(r, self.config.policy))
            .count();
        reporter.on_validate_complete(valid_files, validate_duration.as_secs_f64());
        debug!(
            "Validation completed in {:.2}s — {}/{} files valid under policy",
            validate_duration.as_secs_f64(),
            valid_files,
            reports.len()
        );

        // Phase 3: Plan
        let decisions = if mode == RunMode::ValidateOnly {
            Vec::new()
        } else {
            let decisions = planner::plan(&reports, self.config.policy);
            let eligible = decisions.iter().filter(|d| d.eligible).count();
            reporter.on_plan_complete(eligible, decisions.len());
            decisions
        };

        // Phase 4: Execute
        let execute_start = Instant::now();
        let outcomes = if mode == RunMode::Full {
            executor::execute(&decisions, &store, reporter)
        } else {
            Vec::new()
        };
        let execute_duration = if mode == RunMode::Full {
            let elapsed = execute_start.elapsed();
            let deleted = outcomes
                .iter()
                .filter(|o| o.status == OutcomeStatus::Deleted)
                .count();
            let failed = outcomes
                .iter()
                .filter(|o| matches!(o.status, OutcomeStatus::Failed(_)))
                .count();
            reporter.on_execute_complete(deleted, failed, elapsed.as_secs_f64());
            elapsed
        } else {
            Duration::ZERO
        };

        Ok(self.summarize(
            reports,
            decisions,
            outcomes,
            scan_duration,
            validate_duration,
            execute_duration,
            valid_files,
        ))
    }

    #[allow(clippy::too_many_arguments)]
    fn summarize(
        &self,
        reports: Vec<FileReport>,
        decisions: Vec<CleanupDecision>,
        outcomes: Vec<ExecutionOutcome>,
        scan_duration: Duration,
        validate_duration: Duration,
        execute_duration: Duration,
        valid_files: usize,
    ) -> RunResult {
        let count_status = |status: VerdictStatus| {
            reports.iter().filter(|r| r.has_status(status)).count()
        };
        let invalid_files = count_status(VerdictStatus::Invalid);
        let missing_files = count_status(VerdictStatus::Missing);
        let indeterminate_files = count_status(VerdictStatus::Indeterminate);
        let errored_files = reports.iter().filter(|r| r.error.is_some()).count();
        let eligible = decisions.iter().filter(|d| d.eligible).count();

        let deleted = outcomes
            .iter()
            .filter(|o| {
                matches!(o.status, OutcomeStatus::Deleted | OutcomeStatus::AlreadyGone)
            })
            .count();
        let delete_failed = outcomes
            .iter()
            .filter(|o| matches!(o.status, OutcomeStatus::Failed(_)))
            .count();

        RunResult {
            scan_duration,
            validate_duration,
            execute_duration,
            total_files: reports.len(),
            valid_files,
            invalid_files,
            missing_files,
            indeterminate_files,
            errored_files,
            eligible,
            deleted,
            delete_failed,
            reports,
            decisions,
            outcomes,
        }
    }
}
