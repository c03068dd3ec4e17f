//! Integration tests for the `runset classes` command.

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

#[test]
fn test_classes_unknown_dataset() {
    let temp_dir = TempDir::new().unwrap();
    let mut cmd = Command::cargo_bin("runset").unwrap();

    cmd.current_dir(temp_dir.path())
        .args(["classes", "--dataset", "ImageNet"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("meta path not registered"));
}

#[test]
fn test_classes_missing_meta_file() {
    let temp_dir = TempDir::new().unwrap();
    let mut cmd = Command::cargo_bin("runset").unwrap();

    cmd.current_dir(temp_dir.path())
        .args(["classes", "--dataset", "CIFAR10", "--data_dir"])
        .arg(temp_dir.path())
        .assert()
        .failure()
        .stderr(predicate::str::contains("No meta file found").or(predicate::str::contains("no meta file found")));
}
