use std::fs;
use std::path::Path;
use tempfile::tempdir;

use backsweep_core::storage::Database;
use backsweep_core::{
    AppConfig, BackupRoot, RunMode, SilentReporter, SweepEngine, ValidityPolicy,
};

fn make_config(local: &Path, backups: Vec<(&str, &Path)>, db_path: &Path) -> AppConfig {
    AppConfig {
        local_roots: vec![local.to_string_lossy().into_owned()],
        backup_roots: backups
            .into_iter()
            .map(|(id, path)| BackupRoot {
                id: id.to_string(),
                path: path.to_string_lossy().into_owned(),
            })
            .collect(),
        ignore_patterns: vec![],
        policy: ValidityPolicy::AnyRoot,
        concurrency: 2,
        io_timeout_secs: 60,
        verdict_db: db_path.to_string_lossy().into_owned(),
    }
}

/// Local tree with one file per backup state:
///   a.dat — mirrored intact on the backup root          → deleted
///   b.dat — absent from the backup root                 → retained
///   c.dat — present on the backup root with other bytes → retained
fn create_mixed_tree(local: &Path, nas: &Path) {
    fs::create_dir_all(local.join("session_1")).unwrap();
    fs::create_dir_all(nas.join("session_1")).unwrap();

    fs::write(local.join("session_1/a.dat"), b"x").unwrap();
    fs::write(nas.join("session_1/a.dat"), b"x").unwrap();

    fs::write(local.join("session_1/b.dat"), b"x").unwrap();

    fs::write(local.join("session_1/c.dat"), b"x").unwrap();
    fs::write(nas.join("session_1/c.dat"), b"y").unwrap();
}

#[test]
fn test_full_run_deletes_only_validated_files() {
    let tmp = tempdir().unwrap();
    let local = tmp.path().join("local");
    let nas = tmp.path().join("nas");
    let db_path = tmp.path().join("verdicts.db");
    create_mixed_tree(&local, &nas);

    let engine = SweepEngine::new(make_config(&local, vec![("nas", &nas)], &db_path));
    let result = engine.run(RunMode::Full, &SilentReporter).unwrap();

    assert_eq!(result.total_files, 3);
    assert_eq!(result.valid_files, 1);
    assert_eq!(result.missing_files, 1);
    assert_eq!(result.invalid_files, 1);
    assert_eq!(result.eligible, 1);
    assert_eq!(result.deleted, 1);
    assert_eq!(result.delete_failed, 0);

    // only the validated file is gone
    assert!(!local.join("session_1/a.dat").exists());
    assert!(local.join("session_1/b.dat").exists());
    assert!(local.join("session_1/c.dat").exists());

    // unvalidated files leave the run dirty
    assert!(!result.is_clean());
}

#[test]
fn test_fully_backed_up_tree_is_a_clean_run() {
    let tmp = tempdir().unwrap();
    let local = tmp.path().join("local");
    let nas = tmp.path().join("nas");
    let db_path = tmp.path().join("verdicts.db");
    fs::create_dir_all(&local).unwrap();
    fs::create_dir_all(&nas).unwrap();
    fs::write(local.join("a.dat"), b"payload a").unwrap();
    fs::write(nas.join("a.dat"), b"payload a").unwrap();
    fs::write(local.join("b.dat"), b"payload b").unwrap();
    fs::write(nas.join("b.dat"), b"payload b").unwrap();

    let engine = SweepEngine::new(make_config(&local, vec![("nas", &nas)], &db_path));
    let result = engine.run(RunMode::Full, &SilentReporter).unwrap();

    assert_eq!(result.total_files, 2);
    assert_eq!(result.deleted, 2);
    assert!(result.is_clean());
    assert!(!local.join("a.dat").exists());
    assert!(!local.join("b.dat").exists());
}

#[test]
fn test_dry_run_deletes_nothing() {
    let tmp = tempdir().unwrap();
    let local = tmp.path().join("local");
    let nas = tmp.path().join("nas");
    let db_path = tmp.path().join("verdicts.db");
    create_mixed_tree(&local, &nas);

    let engine = SweepEngine::new(make_config(&local, vec![("nas", &nas)], &db_path));
    let result = engine.run(RunMode::DryRun, &SilentReporter).unwrap();

    assert_eq!(result.eligible, 1);
    assert_eq!(result.deleted, 0);
    assert!(result.outcomes.is_empty());
    assert!(local.join("session_1/a.dat").exists());
}

#[test]
fn test_all_roots_policy_blocks_partially_mirrored_files() {
    let tmp = tempdir().unwrap();
    let local = tmp.path().join("local");
    let nas = tmp.path().join("nas");
    let cold = tmp.path().join("cold");
    let db_path = tmp.path().join("verdicts.db");
    fs::create_dir_all(&local).unwrap();
    fs::create_dir_all(&nas).unwrap();
    fs::create_dir_all(&cold).unwrap();
    // on nas only
    fs::write(local.join("a.dat"), b"x").unwrap();
    fs::write(nas.join("a.dat"), b"x").unwrap();
    // on both roots
    fs::write(local.join("b.dat"), b"y").unwrap();
    fs::write(nas.join("b.dat"), b"y").unwrap();
    fs::write(cold.join("b.dat"), b"y").unwrap();

    let mut config = make_config(&local, vec![("nas", &nas), ("cold", &cold)], &db_path);
    config.policy = ValidityPolicy::AllRoots;

    let engine = SweepEngine::new(config);
    let result = engine.run(RunMode::Full, &SilentReporter).unwrap();

    assert_eq!(result.eligible, 1);
    assert!(local.join("a.dat").exists());
    assert!(!local.join("b.dat").exists());
}

#[test]
fn test_second_run_reuses_verdicts_without_rehashing_backups() {
    let tmp = tempdir().unwrap();
    let local = tmp.path().join("local");
    let nas = tmp.path().join("nas");
    let db_path = tmp.path().join("verdicts.db");
    fs::create_dir_all(&local).unwrap();
    fs::create_dir_all(&nas).unwrap();
    fs::write(local.join("a.dat"), b"stable content").unwrap();
    fs::write(nas.join("a.dat"), b"stable content").unwrap();

    let config = make_config(&local, vec![("nas", &nas)], &db_path);

    let engine = SweepEngine::new(config.clone());
    let first = engine.run(RunMode::DryRun, &SilentReporter).unwrap();
    assert_eq!(first.valid_files, 1);

    // corrupt the backup copy behind the cache's back: if the second run
    // rehashed the candidate it would now report Invalid
    fs::write(nas.join("a.dat"), b"silently corrupted").unwrap();

    let engine = SweepEngine::new(config);
    let second = engine.run(RunMode::DryRun, &SilentReporter).unwrap();
    assert_eq!(second.valid_files, 1);
    assert!(second.reports[0].verdicts[0].reused);
}

#[test]
fn test_validate_only_mode_produces_no_plan() {
    let tmp = tempdir().unwrap();
    let local = tmp.path().join("local");
    let nas = tmp.path().join("nas");
    let db_path = tmp.path().join("verdicts.db");
    create_mixed_tree(&local, &nas);

    let engine = SweepEngine::new(make_config(&local, vec![("nas", &nas)], &db_path));
    let result = engine.run(RunMode::ValidateOnly, &SilentReporter).unwrap();

    assert_eq!(result.total_files, 3);
    assert!(result.decisions.is_empty());
    assert!(result.outcomes.is_empty());
    assert!(local.join("session_1/a.dat").exists());
}

#[test]
fn test_run_rejects_config_without_backup_roots() {
    let tmp = tempdir().unwrap();
    let local = tmp.path().join("local");
    let db_path = tmp.path().join("verdicts.db");
    fs::create_dir_all(&local).unwrap();

    let config = make_config(&local, vec![], &db_path);
    let engine = SweepEngine::new(config);

    assert!(engine.run(RunMode::Full, &SilentReporter).is_err());
}

#[test]
fn test_verdict_store_survives_across_runs() {
    let tmp = tempdir().unwrap();
    let local = tmp.path().join("local");
    let nas = tmp.path().join("nas");
    let db_path = tmp.path().join("verdicts.db");
    fs::create_dir_all(&local).unwrap();
    fs::create_dir_all(&nas).unwrap();
    fs::write(local.join("a.dat"), b"x").unwrap();
    fs::write(nas.join("a.dat"), b"y").unwrap();

    let config = make_config(&local, vec![("nas", &nas)], &db_path);
    let engine = SweepEngine::new(config);
    engine.run(RunMode::DryRun, &SilentReporter).unwrap();

    let db = Database::open(db_path.to_str().unwrap()).unwrap();
    let key = local.join("a.dat").to_string_lossy().into_owned();
    let verdict = db.get_verdict(&key, "nas").unwrap().unwrap();
    assert_eq!(
        verdict.status,
        backsweep_core::storage::models::VerdictStatus::Invalid
    );
}
