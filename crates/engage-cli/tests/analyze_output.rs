//! Output format tests for `engage analyze`.
//!
//! No weights are installed in these runs, so every frame takes the
//! no-face path.

#![allow(clippy::unwrap_used, clippy::float_cmp)]
#![allow(deprecated)] // cargo_bin deprecation

use std::path::Path;

use assert_cmd::Command;
use predicates::prelude::*;
use serde_json::Value;
use tempfile::TempDir;

fn write_frame(dir: &Path, name: &str) {
    image::RgbImage::from_pixel(48, 32, image::Rgb([90, 120, 150]))
        .save(dir.join(name))
        .unwrap();
}

fn analyze(home: &TempDir) -> Command {
    let mut cmd = Command::cargo_bin("engage").unwrap();
    cmd.env("XDG_CONFIG_HOME", home.path().join("config"))
        .current_dir(home.path())
        .arg("analyze")
        .arg("--quiet")
        .arg("--models-dir")
        .arg(home.path().join("models"));
    cmd
}

fn frames_dir(home: &TempDir, names: &[&str]) -> std::path::PathBuf {
    let dir = home.path().join("frames");
    std::fs::create_dir_all(&dir).unwrap();
    for name in names {
        write_frame(&dir, name);
    }
    dir
}

fn assert_empty_result(value: &Value) {
    assert_eq!(value["faceCount"], 0);
    assert_eq!(value["headPose"]["direction"], "straight");
    assert_eq!(value["headPose"]["horizontal"], "straight");
    assert_eq!(value["headPose"]["vertical"], "straight");
    let emotions = value["emotions"].as_object().unwrap();
    assert_eq!(emotions.len(), 6);
    assert_eq!(emotions["neutral"], 1.0);
    for key in ["happy", "sad", "fearful", "thinking", "confused"] {
        assert_eq!(emotions[key], 0.0, "{key}");
    }
    assert!(value["timestamp"].as_f64().unwrap() > 0.0);
}

#[test]
fn test_jsonl_one_object_per_frame() {
    let home = tempfile::tempdir().unwrap();
    let dir = frames_dir(&home, &["a.png", "b.png"]);

    let output = analyze(&home).arg(&dir).output().unwrap();
    assert_eq!(output.status.code(), Some(0));

    let stdout = String::from_utf8(output.stdout).unwrap();
    let lines: Vec<_> = stdout.lines().collect();
    assert_eq!(lines.len(), 2);
    for (line, name) in lines.iter().zip(["a.png", "b.png"]) {
        let value: Value = serde_json::from_str(line).unwrap();
        assert!(value["source"].as_str().unwrap().ends_with(name));
        assert_empty_result(&value);
    }
}

#[test]
fn test_json_array_format() {
    let home = tempfile::tempdir().unwrap();
    let dir = frames_dir(&home, &["a.png", "b.png", "c.png"]);

    let output = analyze(&home)
        .args(["--format", "json", "--pretty"])
        .arg(&dir)
        .output()
        .unwrap();
    assert!(output.status.success());

    let value: Value = serde_json::from_slice(&output.stdout).unwrap();
    let items = value.as_array().unwrap();
    assert_eq!(items.len(), 3);
    items.iter().for_each(assert_empty_result);
}

#[test]
fn test_json_array_for_no_frames() {
    let home = tempfile::tempdir().unwrap();
    let dir = frames_dir(&home, &[]);

    analyze(&home)
        .args(["--format", "json"])
        .arg(&dir)
        .assert()
        .success()
        .stdout("[]\n");
}

#[test]
fn test_recursive_flag() {
    let home = tempfile::tempdir().unwrap();
    let dir = frames_dir(&home, &["top.png"]);
    let nested = dir.join("nested");
    std::fs::create_dir(&nested).unwrap();
    write_frame(&nested, "deep.png");

    let flat = analyze(&home).arg(&dir).output().unwrap();
    assert_eq!(String::from_utf8_lossy(&flat.stdout).lines().count(), 1);

    let deep = analyze(&home).arg("--recursive").arg(&dir).output().unwrap();
    assert_eq!(String::from_utf8_lossy(&deep.stdout).lines().count(), 2);
}

#[test]
fn test_corrupt_frame_is_dropped() {
    let home = tempfile::tempdir().unwrap();
    let dir = frames_dir(&home, &["good.png"]);
    std::fs::write(dir.join("broken.png"), b"not a png").unwrap();

    let output = analyze(&home).arg(&dir).output().unwrap();
    assert_eq!(output.status.code(), Some(1));

    let stdout = String::from_utf8(output.stdout).unwrap();
    let lines: Vec<_> = stdout.lines().collect();
    assert_eq!(lines.len(), 1);
    let value: Value = serde_json::from_str(lines[0]).unwrap();
    assert!(value["source"].as_str().unwrap().ends_with("good.png"));
}

#[test]
fn test_dropped_frame_reported_without_quiet() {
    let home = tempfile::tempdir().unwrap();
    let dir = frames_dir(&home, &[]);
    std::fs::write(dir.join("broken.png"), b"not a png").unwrap();

    let mut cmd = Command::cargo_bin("engage").unwrap();
    cmd.env("XDG_CONFIG_HOME", home.path().join("config"))
        .current_dir(home.path())
        .arg("analyze")
        .arg("--models-dir")
        .arg(home.path().join("models"))
        .arg(&dir)
        .assert()
        .code(1)
        .stderr(predicate::str::contains("broken.png"));
}

#[test]
fn test_no_face_flag_with_installed_nothing() {
    let home = tempfile::tempdir().unwrap();
    let dir = frames_dir(&home, &["a.png"]);

    let output = analyze(&home)
        .args(["--no-face", "--no-emotion"])
        .arg(&dir)
        .output()
        .unwrap();
    assert!(output.status.success());
    let value: Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_empty_result(&value);
}
