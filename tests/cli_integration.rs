// Drives the compiled binary without a terminal. Split loading happens
// before any terminal setup, so bad input must fail cleanly here.

use assert_cmd::Command;

fn splitrun() -> Command {
    let mut cmd = Command::cargo_bin("splitrun").unwrap();
    cmd.env("RUST_LOG", "off");
    cmd
}

fn stderr_of(cmd: &mut Command) -> String {
    let output = cmd.output().unwrap();
    assert!(!output.status.success());
    String::from_utf8_lossy(&output.stderr).into_owned()
}

#[test]
fn malformed_personal_best_on_stdin_fails() {
    let mut cmd = splitrun();
    cmd.write_stdin("Intro\t00:00:10.000000\t\t\nBoss\tsoon\t\t\n");

    let stderr = stderr_of(&mut cmd);
    assert!(stderr.contains("line 2"), "{stderr}");
    assert!(stderr.contains("soon"), "{stderr}");
}

#[test]
fn wrong_field_count_on_stdin_fails() {
    let mut cmd = splitrun();
    cmd.write_stdin("Intro\t00:00:10.000000\n");

    let stderr = stderr_of(&mut cmd);
    assert!(stderr.contains("line 1"), "{stderr}");
    assert!(stderr.contains("found 2"), "{stderr}");
}

#[test]
fn empty_stdin_fails() {
    let mut cmd = splitrun();
    cmd.write_stdin("\n");

    let stderr = stderr_of(&mut cmd);
    assert!(stderr.contains("no splits found"), "{stderr}");
}

#[test]
fn missing_splits_file_fails() {
    let dir = tempfile::tempdir().unwrap();
    let missing = dir.path().join("nope.txt");

    let mut cmd = splitrun();
    cmd.arg("--splits").arg(&missing);

    let stderr = stderr_of(&mut cmd);
    assert!(stderr.contains("nope.txt"), "{stderr}");
}

#[test]
fn zero_tick_is_rejected() {
    let mut cmd = splitrun();
    cmd.args(["--tick-ms", "0"]);

    let stderr = stderr_of(&mut cmd);
    assert!(stderr.contains("tick-ms"), "{stderr}");
}
