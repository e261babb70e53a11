//! Integration tests for the storage command.

use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use std::path::Path;
use tempfile::TempDir;

fn write_bytes(root: &Path, rel: &str, len: usize) {
    let path = root.join(rel);
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(path, vec![b'x'; len]).unwrap();
}

/// A fake machine: Android SDK, Gradle user home and an empty Kotlin/Native dir.
fn create_machine() -> TempDir {
    let tmp = TempDir::new().unwrap();
    let root = tmp.path();

    write_bytes(root, "sdk/platforms/android-34/android.jar", 1000);
    write_bytes(root, "sdk/platforms/android-33/android.jar", 400);
    write_bytes(root, "sdk/build-tools/34.0.0/aapt2", 200);
    write_bytes(
        root,
        "gradle/caches/modules-2/files-2.1/com.squareup.okhttp3/okhttp/4.12.0/aa/okhttp.jar",
        300,
    );
    write_bytes(root, "gradle/wrapper/dists/gradle-8.5-bin/abc/gradle-8.5.zip", 700);
    tmp
}

fn droid_sweeper(machine: &Path) -> Command {
    let mut cmd = Command::cargo_bin("droid-sweeper").unwrap();
    cmd.env("HOME", machine)
        .env("XDG_CONFIG_HOME", machine.join(".config"))
        .env("ANDROID_HOME", machine.join("sdk"))
        .env("GRADLE_USER_HOME", machine.join("gradle"))
        .env("KONAN_DATA_DIR", machine.join("konan"))
        .env_remove("GRADLE_HOME")
        .env_remove("DROID_SWEEPER_CONFIG");
    cmd
}

#[test]
fn storage_json_reports_sections() {
    let machine = create_machine();

    let output = droid_sweeper(machine.path())
        .args(["storage", "--only", "gradle,sdk", "--json", "--no-du"])
        .output()
        .unwrap();
    assert!(output.status.success());

    let json: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    let sections = json["sections"].as_array().unwrap();
    assert_eq!(sections.len(), 2);

    assert_eq!(sections[0]["kind"], "gradle");
    assert_eq!(sections[0]["total_size"], 1000);
    assert_eq!(sections[1]["kind"], "sdk");
    assert_eq!(sections[1]["total_size"], 1600);
}

#[test]
fn storage_tree_output() {
    let machine = create_machine();

    droid_sweeper(machine.path())
        .args(["storage", "--only", "sdk", "--no-du"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Android SDK"))
        .stdout(predicate::str::contains("android-34"))
        .stdout(predicate::str::contains("Total: 1.56 KB"));
}

#[test]
fn storage_missing_directory_is_empty_section() {
    let machine = create_machine();

    droid_sweeper(machine.path())
        .args(["storage", "--only", "konan", "--no-du"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Kotlin/Native"))
        .stdout(predicate::str::contains("not found"))
        .stdout(predicate::str::contains("Total: 0 B"));
}

#[test]
fn storage_rejects_unknown_kind() {
    let machine = create_machine();

    droid_sweeper(machine.path())
        .args(["storage", "--only", "maven"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Unknown storage kind"));
}
