//! CLI argument validation tests.
//!
//! Tests command-line argument parsing, validation, and error handling.

#![allow(clippy::unwrap_used)]
#![allow(deprecated)] // cargo_bin deprecation

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

/// `engage` with an isolated config home and an empty models directory.
fn engage(home: &TempDir) -> Command {
    let mut cmd = Command::cargo_bin("engage").unwrap();
    cmd.env("XDG_CONFIG_HOME", home.path().join("config"))
        .current_dir(home.path());
    cmd
}

fn analyze(home: &TempDir) -> Command {
    let mut cmd = engage(home);
    cmd.arg("analyze")
        .arg("--models-dir")
        .arg(home.path().join("models"));
    cmd
}

#[test]
fn test_no_subcommand_shows_usage() {
    let home = tempfile::tempdir().unwrap();
    engage(&home)
        .assert()
        .failure()
        .stderr(predicate::str::contains("Usage"));
}

#[test]
fn test_help_lists_subcommands() {
    let home = tempfile::tempdir().unwrap();
    engage(&home)
        .arg("--help")
        .assert()
        .success()
        .stdout(
            predicate::str::contains("serve")
                .and(predicate::str::contains("analyze"))
                .and(predicate::str::contains("models")),
        );
}

#[test]
fn test_analyze_requires_paths() {
    let home = tempfile::tempdir().unwrap();
    analyze(&home)
        .assert()
        .code(2)
        .stderr(predicate::str::contains("PATHS").or(predicate::str::contains("required")));
}

#[test]
fn test_nonexistent_path_warns_but_continues() {
    let home = tempfile::tempdir().unwrap();
    analyze(&home)
        .arg("-v")
        .arg("/nonexistent/path/to/frame.png")
        .assert()
        .code(0)
        .stdout(predicate::str::is_empty())
        .stderr(predicate::str::contains("no such file or directory"));
}

#[test]
fn test_empty_directory() {
    let home = tempfile::tempdir().unwrap();
    let frames = home.path().join("frames");
    std::fs::create_dir(&frames).unwrap();

    analyze(&home).arg(&frames).assert().code(0);
}

#[test]
fn test_invalid_format_rejected() {
    let home = tempfile::tempdir().unwrap();
    analyze(&home)
        .arg("--format")
        .arg("xml")
        .arg(home.path())
        .assert()
        .code(2)
        .stderr(predicate::str::contains("json").and(predicate::str::contains("jsonl")));
}

#[test]
fn test_min_face_confidence_out_of_range() {
    let home = tempfile::tempdir().unwrap();
    analyze(&home)
        .arg("--min-face-confidence")
        .arg("1.5")
        .arg(home.path())
        .assert()
        .failure()
        .stderr(predicate::str::contains("1.5 is not in 0.0..=1.0"));
}

#[test]
fn test_min_face_confidence_non_numeric() {
    let home = tempfile::tempdir().unwrap();
    analyze(&home)
        .arg("--min-face-confidence")
        .arg("high")
        .arg(home.path())
        .assert()
        .failure()
        .stderr(predicate::str::contains("not a valid number"));
}

#[test]
fn test_serve_rejects_port_zero() {
    let home = tempfile::tempdir().unwrap();
    engage(&home)
        .args(["serve", "--port", "0"])
        .assert()
        .failure();
}

#[test]
fn test_models_path_honors_override() {
    let home = tempfile::tempdir().unwrap();
    let dir = home.path().join("weights");
    engage(&home)
        .args(["models", "path", "--models-dir"])
        .arg(&dir)
        .assert()
        .success()
        .stdout(predicate::str::contains(dir.to_string_lossy().as_ref()));
}

#[test]
fn test_models_list_empty_store() {
    let home = tempfile::tempdir().unwrap();
    engage(&home)
        .args(["models", "list", "--models-dir"])
        .arg(home.path().join("weights"))
        .assert()
        .success()
        .stdout(
            predicate::str::contains("blazeface")
                .and(predicate::str::contains("emotion"))
                .and(predicate::str::contains("hands"))
                .and(predicate::str::contains("0/3 models installed")),
        );
}

#[test]
fn test_corrupt_weights_exit_with_error() {
    let home = tempfile::tempdir().unwrap();
    let models = home.path().join("models");
    std::fs::create_dir(&models).unwrap();
    std::fs::write(models.join("emotion_cnn.safetensors"), b"garbage").unwrap();

    analyze(&home)
        .arg(home.path())
        .assert()
        .code(2)
        .stderr(predicate::str::contains("error:").and(predicate::str::contains("emotion model")));
}
