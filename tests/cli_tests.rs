//! Command-line smoke tests

use assert_cmd::Command;
use predicates::prelude::*;

fn reelcraft(dir: &tempfile::TempDir) -> Command {
    let mut cmd = Command::cargo_bin("reelcraft").unwrap();
    cmd.current_dir(dir.path()).env_remove("RUST_LOG");
    cmd
}

#[test]
fn test_tools_lists_every_capability() {
    let dir = tempfile::tempdir().unwrap();
    reelcraft(&dir)
        .arg("tools")
        .assert()
        .success()
        .stdout(predicate::str::contains("remove_duplicates"))
        .stdout(predicate::str::contains("add_captions"))
        .stdout(predicate::str::contains("add_music"))
        .stdout(predicate::str::contains("add_broll"));
}

#[test]
fn test_unknown_step_fails() {
    let dir = tempfile::tempdir().unwrap();
    reelcraft(&dir)
        .args(["run", "sharpen", "--file-id", "f1", "--filename", "talk.mp4"])
        .assert()
        .failure()
        .stdout(predicate::str::contains("\"failed\""))
        .stderr(predicate::str::contains("No tool registered for 'sharpen'"));
}

#[test]
fn test_import_then_status() {
    let dir = tempfile::tempdir().unwrap();
    let source = dir.path().join("talk.mp4");
    std::fs::write(&source, b"video").unwrap();

    reelcraft(&dir)
        .args(["import", "talk.mp4"])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"filename\": \"talk.mp4\""));

    reelcraft(&dir)
        .arg("status")
        .assert()
        .success()
        .stdout(predicate::str::contains("No processed files yet"));
}

#[test]
fn test_edit_rejects_short_instruction() {
    let dir = tempfile::tempdir().unwrap();
    reelcraft(&dir)
        .args(["edit", "--file-id", "f1", "-i", "hi"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Invalid edit request"));
}

#[test]
fn test_invalid_config_is_rejected() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(
        dir.path().join("reelcraft.toml"),
        "[editing]\ndedupe_threshold = 1.5\n",
    )
    .unwrap();

    reelcraft(&dir).arg("tools").assert().failure();
}
