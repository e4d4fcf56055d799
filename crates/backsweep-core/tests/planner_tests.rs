use std::path::PathBuf;

use backsweep_core::planner;
use backsweep_core::scanner::FileRecord;
use backsweep_core::storage::models::VerdictStatus;
use backsweep_core::validate::{FileReport, Verdict};
use backsweep_core::ValidityPolicy;

fn verdict(root: &str, status: VerdictStatus) -> Verdict {
    Verdict {
        root_id: root.to_string(),
        candidate_path: PathBuf::from(format!("/backup/{root}/a.dat")),
        status,
        reused: false,
    }
}

fn report(path: &str, verdicts: Vec<Verdict>) -> FileReport {
    FileReport {
        record: FileRecord {
            local_path: PathBuf::from(path),
            relative_path: PathBuf::from(path.trim_start_matches('/')),
            size: 10,
            mtime_ns: 1,
        },
        local_digest: Some("digest".to_string()),
        verdicts,
        error: None,
    }
}

fn errored_report(path: &str) -> FileReport {
    FileReport {
        record: FileRecord {
            local_path: PathBuf::from(path),
            relative_path: PathBuf::from(path.trim_start_matches('/')),
            size: 10,
            mtime_ns: 1,
        },
        local_digest: None,
        verdicts: Vec::new(),
        error: Some("IO error: permission denied".to_string()),
    }
}

#[test]
fn test_any_root_policy_needs_one_valid() {
    let reports = vec![
        report(
            "/data/a.dat",
            vec![
                verdict("nas", VerdictStatus::Missing),
                verdict("cold", VerdictStatus::Valid),
            ],
        ),
        report(
            "/data/b.dat",
            vec![
                verdict("nas", VerdictStatus::Missing),
                verdict("cold", VerdictStatus::Indeterminate),
            ],
        ),
    ];

    let plan = planner::plan(&reports, ValidityPolicy::AnyRoot);

    assert_eq!(plan.len(), 2);
    assert!(plan[0].eligible);
    assert!(plan[0].reason.contains("cold"));
    assert!(!plan[1].eligible);
}

#[test]
fn test_all_roots_policy_needs_every_root_valid() {
    let reports = vec![
        report(
            "/data/a.dat",
            vec![
                verdict("nas", VerdictStatus::Valid),
                verdict("cold", VerdictStatus::Valid),
            ],
        ),
        report(
            "/data/b.dat",
            vec![
                verdict("nas", VerdictStatus::Valid),
                verdict("cold", VerdictStatus::Missing),
            ],
        ),
    ];

    let plan = planner::plan(&reports, ValidityPolicy::AllRoots);

    assert!(plan[0].eligible);
    assert!(!plan[1].eligible);
}

#[test]
fn test_invalid_or_indeterminate_never_eligible() {
    for status in [VerdictStatus::Invalid, VerdictStatus::Indeterminate, VerdictStatus::Missing] {
        let reports = vec![report("/data/a.dat", vec![verdict("nas", status)])];
        for policy in [ValidityPolicy::AnyRoot, ValidityPolicy::AllRoots] {
            let plan = planner::plan(&reports, policy);
            assert!(!plan[0].eligible, "{status} must not authorize cleanup");
        }
    }
}

#[test]
fn test_no_candidates_fails_closed() {
    let reports = vec![report("/data/a.dat", Vec::new())];

    let plan = planner::plan(&reports, ValidityPolicy::AnyRoot);

    assert!(!plan[0].eligible);
    assert_eq!(plan[0].reason, "no backup candidates");
}

#[test]
fn test_local_error_fails_closed() {
    let reports = vec![errored_report("/data/a.dat")];

    let plan = planner::plan(&reports, ValidityPolicy::AnyRoot);

    assert!(!plan[0].eligible);
    assert!(plan[0].reason.contains("local validation pass failed"));
}

#[test]
fn test_plan_is_idempotent_and_ordered() {
    let reports = vec![
        report("/data/z.dat", vec![verdict("nas", VerdictStatus::Valid)]),
        report("/data/a.dat", vec![verdict("nas", VerdictStatus::Missing)]),
        report("/data/m.dat", vec![verdict("nas", VerdictStatus::Valid)]),
    ];

    let first = planner::plan(&reports, ValidityPolicy::AnyRoot);
    let second = planner::plan(&reports, ValidityPolicy::AnyRoot);

    assert_eq!(first, second);

    let paths: Vec<&str> = first
        .iter()
        .map(|d| d.local_path.to_str().unwrap())
        .collect();
    assert_eq!(paths, vec!["/data/a.dat", "/data/m.dat", "/data/z.dat"]);
}

#[test]
fn test_satisfies_policy_matches_plan_eligibility() {
    let valid = report("/data/a.dat", vec![verdict("nas", VerdictStatus::Valid)]);
    let missing = report("/data/b.dat", vec![verdict("nas", VerdictStatus::Missing)]);

    assert!(planner::satisfies_policy(&valid, ValidityPolicy::AnyRoot));
    assert!(!planner::satisfies_policy(&missing, ValidityPolicy::AnyRoot));
    assert!(!planner::satisfies_policy(&errored_report("/data/c.dat"), ValidityPolicy::AnyRoot));
}
