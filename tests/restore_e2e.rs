//! E2E tests for the restore flow.
//!
//! These tests verify that:
//! - backups are listed and selectable, newest first
//! - the restore is an exact byte-for-byte overwrite
//! - the pre-restore backup decision honors all four conflict choices
//! - cancellation at any prompt leaves the kubeconfig untouched
//!
//! # Running
//!
//! ```bash
//! cargo test --test restore_e2e
//! ```

mod common;

use std::fs;
use std::path::{Path, PathBuf};

use assert_cmd::Command;
use predicates::prelude::*;

use common::{files_containing, kubeconfig_yaml, write_kubeconfig};

fn kubectx_manager_restore(kubeconfig: &Path) -> Command {
    let mut cmd = Command::cargo_bin("kubectx-manager").unwrap();
    cmd.env_remove("KUBECONFIG");
    cmd.env_remove("RUST_LOG");
    cmd.arg("restore").arg("--kubeconfig").arg(kubeconfig);
    cmd
}

/// Live config plus one backup whose `dev` user token differs, which
/// guarantees exactly one conflict at restore time.
fn setup_with_conflict(dir: &Path) -> (PathBuf, PathBuf) {
    let kubeconfig = write_kubeconfig(dir, "config", &["dev", "prod"]);
    let backup = dir.join("config.backup.20240101-120000");
    fs::write(
        &backup,
        kubeconfig_yaml(&["dev", "prod"], &[("dev", "rotated-token")]),
    )
    .unwrap();
    (kubeconfig, backup)
}

#[test]
fn no_backups_is_a_clean_exit() {
    let dir = tempfile::tempdir().unwrap();
    let kubeconfig = write_kubeconfig(dir.path(), "config", &["dev"]);

    kubectx_manager_restore(&kubeconfig)
        .assert()
        .success()
        .stderr(predicate::str::contains("No backups found"));
}

#[test]
fn lists_backups_newest_first() {
    let dir = tempfile::tempdir().unwrap();
    let kubeconfig = write_kubeconfig(dir.path(), "config", &["dev"]);
    for ts in ["20240101-120000", "20240301-080000", "20240201-000000"] {
        fs::write(
            dir.path().join(format!("config.backup.{ts}")),
            kubeconfig_yaml(&["dev"], &[]),
        )
        .unwrap();
    }

    kubectx_manager_restore(&kubeconfig)
        .write_stdin("0\n")
        .assert()
        .success()
        .stderr(predicate::str::contains(
            "1. config.backup.20240301-080000",
        ))
        .stderr(predicate::str::contains(
            "3. config.backup.20240101-120000",
        ))
        .stderr(predicate::str::contains("Restore canceled"));
}

#[test]
fn restore_without_conflicts_overwrites_and_consumes_backup() {
    let dir = tempfile::tempdir().unwrap();
    let kubeconfig = write_kubeconfig(dir.path(), "config", &["dev"]);
    let backup = dir.path().join("config.backup.20240101-120000");
    fs::write(&backup, kubeconfig_yaml(&["dev", "staging"], &[])).unwrap();
    let backup_bytes = fs::read(&backup).unwrap();

    kubectx_manager_restore(&kubeconfig)
        .write_stdin("1\ny\n")
        .assert()
        .success()
        .stderr(predicate::str::contains("Skipping backup: no conflicts"))
        .stderr(predicate::str::contains("Successfully restored"))
        .stderr(predicate::str::contains("Removed backup file"));

    assert_eq!(fs::read(&kubeconfig).unwrap(), backup_bytes);
    assert!(!backup.exists());
}

#[test]
fn declined_confirmation_changes_nothing() {
    let dir = tempfile::tempdir().unwrap();
    let (kubeconfig, backup) = setup_with_conflict(dir.path());
    let before = fs::read(&kubeconfig).unwrap();

    kubectx_manager_restore(&kubeconfig)
        .write_stdin("1\nn\n")
        .assert()
        .success()
        .stderr(predicate::str::contains("Restore canceled"));

    assert_eq!(fs::read(&kubeconfig).unwrap(), before);
    assert!(backup.exists());
}

#[test]
fn conflict_menu_shows_descriptions() {
    let dir = tempfile::tempdir().unwrap();
    let (kubeconfig, _backup) = setup_with_conflict(dir.path());

    kubectx_manager_restore(&kubeconfig)
        .write_stdin("1\ny\nc\n")
        .assert()
        .success()
        .stdout(predicate::str::contains(
            "user 'dev-user' (different credentials)",
        ))
        .stderr(predicate::str::contains("Restore canceled"));
}

#[test]
fn cancel_at_conflict_choice_aborts_before_overwrite() {
    let dir = tempfile::tempdir().unwrap();
    let (kubeconfig, backup) = setup_with_conflict(dir.path());
    let before = fs::read(&kubeconfig).unwrap();

    kubectx_manager_restore(&kubeconfig)
        .write_stdin("1\ny\nc\n")
        .assert()
        .success();

    assert_eq!(fs::read(&kubeconfig).unwrap(), before);
    assert!(backup.exists());
}

#[test]
fn unrecognized_conflict_answer_cancels() {
    let dir = tempfile::tempdir().unwrap();
    let (kubeconfig, backup) = setup_with_conflict(dir.path());
    let before = fs::read(&kubeconfig).unwrap();

    kubectx_manager_restore(&kubeconfig)
        .write_stdin("1\ny\nwhatever\n")
        .assert()
        .success()
        .stdout(predicate::str::contains("defaulting to cancel"));

    assert_eq!(fs::read(&kubeconfig).unwrap(), before);
    assert!(backup.exists());
}

#[test]
fn full_backup_choice_preserves_old_state() {
    let dir = tempfile::tempdir().unwrap();
    let (kubeconfig, backup) = setup_with_conflict(dir.path());
    let before = fs::read(&kubeconfig).unwrap();
    let backup_bytes = fs::read(&backup).unwrap();

    kubectx_manager_restore(&kubeconfig)
        .write_stdin("1\ny\nf\n")
        .assert()
        .success()
        .stderr(predicate::str::contains("Created full backup"));

    assert_eq!(fs::read(&kubeconfig).unwrap(), backup_bytes);
    // The consumed backup is gone but a fresh full backup of the old state
    // exists.
    assert!(!backup.exists());
    assert_eq!(files_containing(dir.path(), ".backup."), 1);
    let new_backup = fs::read_dir(dir.path())
        .unwrap()
        .filter_map(Result::ok)
        .map(|e| e.path())
        .find(|p| p.file_name().unwrap().to_string_lossy().contains(".backup."))
        .unwrap();
    assert_eq!(fs::read(new_backup).unwrap(), before);
}

#[test]
fn selective_backup_choice_saves_only_conflicting_items() {
    let dir = tempfile::tempdir().unwrap();
    let (kubeconfig, backup) = setup_with_conflict(dir.path());
    let backup_bytes = fs::read(&backup).unwrap();

    kubectx_manager_restore(&kubeconfig)
        .write_stdin("1\ny\ns\n")
        .assert()
        .success()
        .stderr(predicate::str::contains("Created selective backup"));

    assert_eq!(fs::read(&kubeconfig).unwrap(), backup_bytes);
    assert_eq!(files_containing(dir.path(), ".selective-backup."), 1);

    let selective = fs::read_dir(dir.path())
        .unwrap()
        .filter_map(Result::ok)
        .map(|e| e.path())
        .find(|p| {
            p.file_name()
                .unwrap()
                .to_string_lossy()
                .contains(".selective-backup.")
        })
        .unwrap();
    let content = fs::read_to_string(selective).unwrap();
    assert!(content.contains("dev-user"));
    assert!(!content.contains("prod-user"));
}

#[test]
fn no_backup_flag_skips_the_conflict_prompt() {
    let dir = tempfile::tempdir().unwrap();
    let (kubeconfig, backup) = setup_with_conflict(dir.path());
    let backup_bytes = fs::read(&backup).unwrap();

    kubectx_manager_restore(&kubeconfig)
        .arg("--no-backup")
        .write_stdin("1\ny\n")
        .assert()
        .success()
        .stderr(predicate::str::contains(
            "Skipping backup (--no-backup flag specified)",
        ));

    assert_eq!(fs::read(&kubeconfig).unwrap(), backup_bytes);
}

#[test]
fn keep_backup_flag_preserves_the_consumed_file() {
    let dir = tempfile::tempdir().unwrap();
    let (kubeconfig, backup) = setup_with_conflict(dir.path());

    kubectx_manager_restore(&kubeconfig)
        .arg("--keep-backup")
        .write_stdin("1\ny\nn\n")
        .assert()
        .success()
        .stderr(predicate::str::contains("Backup file preserved"));

    assert!(backup.exists());
}

#[test]
fn invalid_selection_reprompts_until_valid() {
    let dir = tempfile::tempdir().unwrap();
    let (kubeconfig, _backup) = setup_with_conflict(dir.path());

    kubectx_manager_restore(&kubeconfig)
        .write_stdin("abc\n9\n0\n")
        .assert()
        .success()
        .stdout(predicate::str::contains("Please enter a valid number"))
        .stdout(predicate::str::contains("between 1 and 1"))
        .stderr(predicate::str::contains("Restore canceled"));
}
