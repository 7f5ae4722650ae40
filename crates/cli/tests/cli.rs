//! End-to-end tests for the `sermon` binary.

use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use tempfile::tempdir;

fn sermon() -> Command {
    let mut cmd = Command::cargo_bin("sermon").unwrap();
    cmd.env("NO_COLOR", "1").env_remove("RUST_LOG");
    cmd
}

#[test]
fn test_steps_lists_builtin_catalog() {
    let dir = tempdir().unwrap();

    sermon()
        .args(["steps", "-d"])
        .arg(dir.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("Original Text Analyst"))
        .stdout(predicate::str::contains("[HITL-5]"));
}

#[test]
fn test_init_creates_configuration() {
    let dir = tempdir().unwrap();

    sermon()
        .args(["init", "-d"])
        .arg(dir.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("Initialized"));

    assert!(dir.path().join(".sermon-pipeline/pipeline.yaml").exists());

    sermon()
        .args(["init", "-d"])
        .arg(dir.path())
        .assert()
        .failure()
        .stderr(predicate::str::contains("--force"));
}

#[test]
fn test_run_with_mock_agent_writes_exports() {
    let dir = tempdir().unwrap();
    let sp_dir = dir.path().join(".sermon-pipeline");
    fs::create_dir_all(&sp_dir).unwrap();
    fs::write(
        sp_dir.join("config.toml"),
        "[pacing]\nstart-delay-ms = 0\nadvance-delay-ms = 0\n",
    )
    .unwrap();
    let out = dir.path().join("out");

    sermon()
        .args(["run", "--mock", "--auto-approve", "--passage", "Psalm 23", "-d"])
        .arg(dir.path())
        .arg("--output")
        .arg(&out)
        .assert()
        .success()
        .stdout(predicate::str::contains("[HITL-1]"))
        .stdout(predicate::str::contains("Completed."));

    let report = fs::read_to_string(out.join("Full-Report-Psalm-23.md")).unwrap();
    assert!(report.starts_with("# Sermon Research Report: Psalm 23"));
    assert!(out.join("Sermon-Manuscript-Psalm-23.md").exists());
    assert!(!out.join("keyword-expert-Psalm-23.md").exists());
}

#[test]
fn test_run_each_step_exports_every_result() {
    let dir = tempdir().unwrap();
    let sp_dir = dir.path().join(".sermon-pipeline");
    fs::create_dir_all(&sp_dir).unwrap();
    fs::write(
        sp_dir.join("config.toml"),
        "[pacing]\nstart-delay-ms = 0\nadvance-delay-ms = 0\n",
    )
    .unwrap();
    let out = dir.path().join("out");

    sermon()
        .args(["run", "--mock", "--auto-approve", "--each-step"])
        .args(["--passage", "Psalm 23", "-d"])
        .arg(dir.path())
        .arg("--output")
        .arg(&out)
        .assert()
        .success();

    let keyword = fs::read_to_string(out.join("keyword-expert-Psalm-23.md")).unwrap();
    assert!(keyword.starts_with("## Keyword Expert"));
    assert!(out.join("original-text-Psalm-23.md").exists());
    assert!(out.join("Sermon-Manuscript-Psalm-23.md").exists());
    assert!(!out.join("sermon-writer-Psalm-23.md").exists());
    assert_eq!(fs::read_dir(&out).unwrap().count(), 16);
}

#[test]
fn test_run_quits_at_first_checkpoint() {
    let dir = tempdir().unwrap();
    let sp_dir = dir.path().join(".sermon-pipeline");
    fs::create_dir_all(&sp_dir).unwrap();
    fs::write(sp_dir.join("config.toml"), "[pacing]\nstart-delay-ms = 0\n").unwrap();

    sermon()
        .args(["run", "--mock", "-d"])
        .arg(dir.path())
        .write_stdin("q\n")
        .assert()
        .success()
        .stdout(predicate::str::contains("Stopped."));

    assert!(!dir.path().join("sermon-output").exists());
}
