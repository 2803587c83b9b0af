// tests/cli.rs

//! Exit status and error reporting of the `timewalk` binary.

use std::process::Command;

#[test]
fn test_bad_cutoff_reports_error_and_fails() {
    let dir = tempfile::tempdir().unwrap();
    let output = Command::new(env!("CARGO_BIN_EXE_timewalk"))
        .current_dir(dir.path())
        .args(["--at", "sometime soon", "--no-color"])
        .env_remove("RUST_LOG")
        .output()
        .unwrap();

    assert!(!output.status.success());
    assert!(output.stdout.is_empty());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.starts_with("error: "), "stderr was {stderr:?}");
    assert!(stderr.contains("sometime soon"));
}

#[test]
fn test_missing_manifest_reports_error_and_fails() {
    let dir = tempfile::tempdir().unwrap();
    let output = Command::new(env!("CARGO_BIN_EXE_timewalk"))
        .args(["--at", "2019-06-01", "--no-color", "--where"])
        .arg(dir.path())
        .env_remove("RUST_LOG")
        .output()
        .unwrap();

    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.starts_with("error: "), "stderr was {stderr:?}");
}
