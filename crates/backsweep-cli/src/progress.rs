use backsweep_core::ProgressReporter;
use indicatif::{ProgressBar, ProgressStyle};
use std::sync::Mutex;

/// CLI progress reporter using indicatif progress bars.
///
/// - Scan phase: spinner (unknown total files upfront)
/// - Validate phase: progress bar (total files known from scan)
/// - Execute phase: progress bar (plan size known)
pub struct CliReporter {
    bar: Mutex<Option<ProgressBar>>,
}

impl CliReporter {
    pub fn new() -> Self {
        Self {
            bar: Mutex::new(None),
        }
    }

    fn set_bar(&self, pb: ProgressBar) {
        let mut guard = self.bar.lock().unwrap();
        if let Some(old) = guard.take() {
            old.finish_and_clear();
        }
        *guard = Some(pb);
    }

    fn finish_bar(&self) {
        let mut guard = self.bar.lock().unwrap();
        if let Some(pb) = guard.take() {
            pb.finish_and_clear();
        }
    }

    fn spinner(&self, message: &'static str) {
        let pb = ProgressBar::new_spinner();
        pb.set_style(
            ProgressStyle::with_template("{spinner:.cyan} {msg}")
                .unwrap()
                .tick_chars("⠋⠙⠹⠸⠼⠴⠦⠧⠇⠏"),
        );
        pb.set_message(message);
        pb.enable_steady_tick(std::time::Duration::from_millis(80));
        self.set_bar(pb);
    }

    fn bar_with_len(&self, template: &str, len: usize) {
        let pb = ProgressBar::new(len as u64);
        pb.set_style(
            ProgressStyle::with_template(template)
                .unwrap()
                .progress_chars("━╸─")
                .tick_chars("⠋⠙⠹⠸⠼⠴⠦⠧⠇⠏"),
        );
        pb.enable_steady_tick(std::time::Duration::from_millis(80));
        self.set_bar(pb);
    }
}

impl ProgressReporter for CliReporter {
    fn on_scan_start(&self) {
        self.spinner("Scanning local files...");
    }

    fn on_scan_complete(&self, total_files: usize, duration_secs: f64) {
        self.finish_bar();
        eprintln!(
            "  \x1b[32m✓\x1b[0m Scan complete: {} files in {:.2}s",
            total_files, duration_secs
        );
    }

    fn on_validate_start(&self, total_files: usize) {
        self.bar_with_len(
            "  {spinner:.cyan} Validating [{bar:30.cyan/dim}] {pos}/{len} files ({eta} remaining)",
            total_files,
        );
    }

    fn on_validate_progress(&self, files_done: usize, total_files: usize) {
        let guard = self.bar.lock().unwrap();
        if let Some(pb) = guard.as_ref() {
            if pb.length() != Some(total_files as u64) {
                pb.set_length(total_files as u64);
            }
            pb.set_position(files_done as u64);
        }
    }

    fn on_validate_complete(&self, valid_files: usize, duration_secs: f64) {
        self.finish_bar();
        eprintln!(
            "  \x1b[32m✓\x1b[0m Validation complete: {} files with valid backups in {:.2}s",
            valid_files, duration_secs
        );
    }

    fn on_plan_complete(&self, eligible: usize, total: usize) {
        eprintln!(
            "  \x1b[32m✓\x1b[0m Plan: {}/{} files eligible for deletion",
            eligible, total
        );
    }

    fn on_execute_start(&self, total_deletions: usize) {
        self.bar_with_len(
            "  {spinner:.cyan} Deleting [{bar:30.cyan/dim}] {pos}/{len} files",
            total_deletions,
        );
    }

    fn on_execute_progress(&self, deletions_done: usize, total_deletions: usize) {
        let guard = self.bar.lock().unwrap();
        if let Some(pb) = guard.as_ref() {
            if pb.length() != Some(total_deletions as u64) {
                pb.set_length(total_deletions as u64);
            }
            pb.set_position(deletions_done as u64);
        }
    }

    fn on_execute_complete(&self, deleted: usize, failed: usize, duration_secs: f64) {
        self.finish_bar();
        eprintln!(
            "  \x1b[32m✓\x1b[0m Cleanup complete: {} deleted, {} failed in {:.2}s",
            deleted, failed, duration_secs
        );
    }
}

impl Default for CliReporter {
    fn default() -> Self {
        Self::new()
    }
}
