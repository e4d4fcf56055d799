/// Trait for reporting pipeline progress.
///
/// CLI implements with indicatif; library consumers and tests use
/// `SilentReporter`. All methods have default no-op implementations.
pub trait ProgressReporter: Send + Sync {
    fn on_scan_start(&self) {}
    fn on_scan_complete(&self, _total_files: usize, _duration_secs: f64) {}
    fn on_validate_start(&self, _total_files: usize) {}
    fn on_validate_progress(&self, _files_done: usize, _total_files: usize) {}
    fn on_validate_complete(&self, _valid_files: usize, _duration_secs: f64) {}
    fn on_plan_complete(&self, _eligible: usize, _total: usize) {}
    fn on_execute_start(&self, _total_deletions: usize) {}
    fn on_execute_progress(&self, _deletions_done: usize, _total_deletions: usize) {}
    fn on_execute_complete(&self, _deleted: usize, _failed: usize, _duration_secs: f64) {}
}

/// No-op progress reporter for silent operation.
pub struct SilentReporter;

impl ProgressReporter for SilentReporter {}
