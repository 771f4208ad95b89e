//! Error scenario integration tests

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

fn taskmaster(home: &TempDir) -> Command {
    let mut cmd = Command::cargo_bin("taskmaster").expect("binary is built");
    cmd.env("TASKMASTER_HOME", home.path())
        .env("NO_COLOR", "1")
        .env_remove("TASKMASTER_SUBMIT_DELAY")
        .env_remove("TASKMASTER_MAX_RECORDING");
    cmd
}

#[test]
fn missing_subcommand_is_a_usage_error() {
    let home = TempDir::new().unwrap();
    taskmaster(&home).assert().code(2);
}

#[test]
fn config_get_unknown_key() {
    let home = TempDir::new().unwrap();
    taskmaster(&home)
        .args(["config", "get", "unknown_key"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("Unknown key"));
}

#[test]
fn config_set_invalid_duration() {
    let home = TempDir::new().unwrap();
    taskmaster(&home)
        .args(["config", "set", "max_recording", "forever"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("Invalid duration"));
}

#[test]
fn config_set_invalid_bool() {
    let home = TempDir::new().unwrap();
    taskmaster(&home)
        .args(["config", "set", "notify", "loud"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("true"));
}

#[test]
fn edit_invalid_submit_delay() {
    let home = TempDir::new().unwrap();
    taskmaster(&home)
        .args(["edit", "--submit-delay", "soon"])
        .write_stdin("")
        .assert()
        .code(2)
        .stderr(predicate::str::contains("Invalid submit-delay"));
}

#[test]
fn edit_invalid_duration_from_environment() {
    let home = TempDir::new().unwrap();
    taskmaster(&home)
        .env("TASKMASTER_MAX_RECORDING", "-5s")
        .arg("edit")
        .write_stdin("")
        .assert()
        .code(2)
        .stderr(predicate::str::contains("Invalid max-recording"));
}

#[test]
fn edit_unknown_example_task() {
    let home = TempDir::new().unwrap();
    taskmaster(&home)
        .args(["edit", "--task", "99"])
        .write_stdin("")
        .assert()
        .code(1)
        .stderr(predicate::str::contains("No example task"));
}

#[test]
fn editor_rejects_bad_lines_and_keeps_going() {
    let home = TempDir::new().unwrap();
    taskmaster(&home)
        .args(["edit", "--submit-delay", "1ms"])
        .write_stdin("fly away\npriority urgent\ndue someday\ntitle Still works\nsave\n")
        .assert()
        .success()
        .stderr(predicate::str::contains("Unknown command"))
        .stderr(predicate::str::contains("Invalid priority"))
        .stderr(predicate::str::contains("Invalid due date"))
        .stdout(predicate::str::contains("Still works"));
}

#[test]
fn playing_without_a_memo_is_ignored() {
    let home = TempDir::new().unwrap();
    taskmaster(&home)
        .args(["edit", "--title", "Quiet", "--submit-delay", "1ms"])
        .write_stdin("play\nstop-play\nstop\ndelete-audio\nsave\n")
        .assert()
        .success()
        .stdout(predicate::str::contains("Quiet"));
}

#[test]
fn tasks_delete_unknown_id() {
    let home = TempDir::new().unwrap();
    taskmaster(&home)
        .args(["tasks", "delete", "99"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("No example task with id \"99\""));
}
