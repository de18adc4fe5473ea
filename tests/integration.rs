use predicates::prelude::*;
use std::process::Command;
use tempfile::TempDir;

fn cmd() -> assert_cmd::Command {
    assert_cmd::Command::from(Command::new(env!("CARGO_BIN_EXE_docprep")))
}

fn fixture_path(name: &str) -> String {
    format!("{}/tests/fixtures/{}", env!("CARGO_MANIFEST_DIR"), name)
}

// -- stdin mode --

#[test]
fn stdin_mode_rewrites_span_fixture() {
    let input = std::fs::read_to_string(fixture_path("table.html")).unwrap();
    let expected = std::fs::read_to_string(fixture_path("table.expected.html")).unwrap();

    let assert = cmd().write_stdin(input).assert().success();
    let output = String::from_utf8(assert.get_output().stdout.clone()).unwrap();
    assert_eq!(output, expected);
}

#[test]
fn stdin_mode_linebreak_fixture() {
    let input = std::fs::read_to_string(fixture_path("module.py")).unwrap();
    let expected = std::fs::read_to_string(fixture_path("module.expected.py")).unwrap();

    let assert = cmd()
        .args(["-m", "linebreak"])
        .write_stdin(input)
        .assert()
        .success();
    let output = String::from_utf8(assert.get_output().stdout.clone()).unwrap();
    assert_eq!(output, expected);
}

#[test]
fn stdin_mode_colon_delimiter() {
    let input = ":param tableName: name of new table\n:type tableName: String\n";

    let assert = cmd()
        .args(["-d", ":", "-m", "linebreak"])
        .write_stdin(input)
        .assert()
        .success();
    let output = String::from_utf8(assert.get_output().stdout.clone()).unwrap();
    assert_eq!(
        output,
        "<b>tableName</b> (<i>String</i>): name of new table</br>\n"
    );
}

// -- file mode --

#[test]
fn file_mode_creates_output() {
    let dir = TempDir::new().unwrap();

    cmd()
        .args(["-o", dir.path().to_str().unwrap()])
        .arg(fixture_path("table.html"))
        .assert()
        .success();

    let output = std::fs::read_to_string(dir.path().join("table.html")).unwrap();
    let expected = std::fs::read_to_string(fixture_path("table.expected.html")).unwrap();
    assert_eq!(output, expected);
}

#[test]
fn file_mode_requires_output() {
    cmd()
        .arg(fixture_path("table.html"))
        .assert()
        .failure()
        .stderr(predicate::str::contains("--output is required"));
}

// -- irregularity policy --

#[test]
fn typecheck_aborts_on_missing_type() {
    cmd()
        .args(["-m", "linebreak", "--typecheck"])
        .write_stdin("@param x: the value\n")
        .assert()
        .failure()
        .stderr(predicate::str::contains("no type declaration"));
}

#[test]
fn warn_policy_continues_with_diagnostics() {
    let assert = cmd()
        .args(["-m", "linebreak", "--typecheck", "--irregular", "warn"])
        .write_stdin("@param x: the value\n")
        .assert()
        .success()
        .stderr(predicate::str::contains("warning:"));
    let output = String::from_utf8(assert.get_output().stdout.clone()).unwrap();
    // Best-effort output: the open parameter was still flushed.
    assert_eq!(output, "<b>x</b> the value</br>\n");
}

#[test]
fn ignore_policy_stays_silent() {
    cmd()
        .args(["-m", "linebreak", "--typecheck", "--irregular", "ignore"])
        .write_stdin("@param x: the value\n")
        .assert()
        .success()
        .stderr(predicate::str::is_empty());
}

// -- configuration errors --

#[test]
fn invalid_delimiter_fails() {
    cmd()
        .args(["-d", "%"])
        .write_stdin("")
        .assert()
        .failure()
        .stderr(predicate::str::contains("':' or '@'"));
}

#[test]
fn invalid_mode_fails() {
    cmd()
        .args(["-m", "xml"])
        .write_stdin("")
        .assert()
        .failure()
        .stderr(predicate::str::contains("unknown output mode"));
}

#[test]
fn unknown_policy_fails() {
    cmd()
        .args(["--irregular", "panic"])
        .write_stdin("")
        .assert()
        .failure()
        .stderr(predicate::str::contains("irregularity policy"));
}

// -- generator invocation --

#[cfg(unix)]
fn write_stub_generator(dir: &std::path::Path, body: &str) -> std::path::PathBuf {
    use std::os::unix::fs::PermissionsExt;

    let script = dir.join("gen.sh");
    std::fs::write(&script, format!("#!/bin/sh\n{body}\n")).unwrap();
    std::fs::set_permissions(&script, std::fs::Permissions::from_mode(0o755)).unwrap();
    script
}

#[cfg(unix)]
#[test]
fn generator_receives_html_args_and_staged_file() {
    let dir = TempDir::new().unwrap();
    let source = dir.path().join("module.py");
    std::fs::copy(fixture_path("module.py"), &source).unwrap();

    let args_file = dir.path().join("args.txt");
    let script = write_stub_generator(
        dir.path(),
        &format!("printf '%s\\n' \"$@\" > {}\nexit 0", args_file.display()),
    );

    cmd()
        .args(["-m", "linebreak"])
        .args(["--generate", script.to_str().unwrap()])
        .args(["--html-dir", dir.path().to_str().unwrap()])
        .arg(source.to_str().unwrap())
        .assert()
        .success();

    let args = std::fs::read_to_string(&args_file).unwrap();
    assert!(args.contains("--html"), "got args: {args}");
    assert!(args.contains("--html-dir"), "got args: {args}");
    assert!(args.contains("docprep_"), "staged file missing: {args}");

    // The staged temporary file is gone once the run completes.
    let leftover: Vec<_> = std::fs::read_dir(dir.path())
        .unwrap()
        .filter_map(|e| e.ok())
        .filter(|e| e.file_name().to_string_lossy().starts_with("docprep_"))
        .collect();
    assert!(leftover.is_empty());
}

#[cfg(unix)]
#[test]
fn generator_failure_is_fatal() {
    let dir = TempDir::new().unwrap();
    let source = dir.path().join("module.py");
    std::fs::copy(fixture_path("module.py"), &source).unwrap();

    let script = write_stub_generator(dir.path(), "exit 3");

    cmd()
        .args(["-m", "linebreak"])
        .args(["--generate", script.to_str().unwrap()])
        .arg(source.to_str().unwrap())
        .assert()
        .failure()
        .stderr(predicate::str::contains("exited"));
}
