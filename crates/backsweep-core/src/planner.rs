use std::path::PathBuf;
use tracing::info;

use crate::config::ValidityPolicy;
use crate::storage::models::VerdictStatus;
use crate::validate::FileReport;

/// A deletion decision for one local file. Derived, never persisted;
/// recomputed from current verdicts on every planning pass.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CleanupDecision {
    pub local_path: PathBuf,
    pub eligible: bool,
    pub reason: String,
}

/// Pair each file with its verdicts and decide deletion eligibility under
/// the configured policy. Fails closed: files whose local pass errored, and
/// files with no backup candidates at all, are never eligible.
///
/// Deterministic over its inputs: the same reports and policy always yield
/// the same plan, in path order.
pub fn plan(reports: &[FileReport], policy: ValidityPolicy) -> Vec<CleanupDecision> {
    let mut decisions: Vec<CleanupDecision> =
        reports.iter().map(|report| decide(report, policy)).collect();
    decisions.sort_by(|a, b| a.local_path.cmp(&b.local_path));

    let eligible = decisions.iter().filter(|d| d.eligible).count();
    info!(
        "Cleanup plan: {} of {} files eligible for deletion",
        eligible,
        decisions.len()
    );

    decisions
}

/// Whether a file's verdicts authorize cleanup under the policy. Shared with
/// the run summary so "clean" means the same thing everywhere.
pub fn satisfies_policy(report: &FileReport, policy: ValidityPolicy) -> bool {
    if report.error.is_some() || report.verdicts.is_empty() {
        return false;
    }
    match policy {
        ValidityPolicy::AnyRoot => report.has_status(VerdictStatus::Valid),
        ValidityPolicy::AllRoots => report.all_valid(),
    }
}

fn decide(report: &FileReport, policy: ValidityPolicy) -> CleanupDecision {
    let local_path = report.record.local_path.clone();

    if let Some(err) = &report.error {
        return CleanupDecision {
            local_path,
            eligible: false,
            reason: format!("local validation pass failed: {}", err),
        };
    }

    if report.verdicts.is_empty() {
        return CleanupDecision {
            local_path,
            eligible: false,
            reason: "no backup candidates".to_string(),
        };
    }

    match policy {
        ValidityPolicy::AnyRoot => {
            if let Some(valid) = report
                .verdicts
                .iter()
                .find(|v| v.status == VerdictStatus::Valid)
            {
                CleanupDecision {
                    local_path,
                    eligible: true,
                    reason: format!("valid backup on root '{}'", valid.root_id),
                }
            } else {
                CleanupDecision {
                    local_path,
                    eligible: false,
                    reason: format!("no valid backup ({})", summarize(report)),
                }
            }
        }
        ValidityPolicy::AllRoots => {
            if report.all_valid() {
                CleanupDecision {
                    local_path,
                    eligible: true,
                    reason: "valid backup on all roots".to_string(),
                }
            } else {
                CleanupDecision {
                    local_path,
                    eligible: false,
                    reason: format!("not valid on all roots ({})", summarize(report)),
                }
            }
        }
    }
}

fn summarize(report: &FileReport) -> String {
    report
        .verdicts
        .iter()
        .map(|v| format!("{}: {}", v.root_id, v.status))
        .collect::<Vec<_>>()
        .join(", ")
}
