//! End-to-end CLI behavior, exercised by spawning the built binary.

use std::io::Write;
use std::process::{Command, Output, Stdio};
use std::time::Duration;

fn modpipe(args: &[&str], stdin: &[u8]) -> Output {
    let mut child = Command::new(env!("CARGO_BIN_EXE_modpipe"))
        .args(args)
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .expect("spawn modpipe");
    // A process that fails before reading stdin may close the pipe first;
    // the assertions on its output cover that case.
    let _ = child
        .stdin
        .take()
        .expect("stdin handle")
        .write_all(stdin);
    child.wait_with_output().expect("await modpipe")
}

#[test]
fn iterate_generate_encodes_line_by_line() {
    let out = modpipe(&["encode/base64", "-i", "-g"], b"abcd\nefgh\n");
    assert!(out.status.success(), "stderr: {:?}", out.stderr);
    assert_eq!(out.stdout, b"YWJjZAo=\nZWZnaAo=\n");
}

#[test]
fn global_flags_work_before_the_module_path() {
    let out = modpipe(&["-i", "-g", "encode/base64"], b"abcd\nefgh\n");
    assert!(out.status.success(), "stderr: {:?}", out.stderr);
    assert_eq!(out.stdout, b"YWJjZAo=\nZWZnaAo=\n");
}

#[test]
fn default_run_encodes_the_whole_buffer() {
    let out = modpipe(&["encode/base64"], b"abcd\nefgh\n");
    assert!(out.status.success(), "stderr: {:?}", out.stderr);
    assert_eq!(out.stdout, b"YWJjZAplZmdoCg==");
}

#[test]
fn iterate_without_generate_concatenates_records() {
    let out = modpipe(&["encode/base64", "-i"], b"abcd\nefgh\n");
    assert!(out.status.success(), "stderr: {:?}", out.stderr);
    assert_eq!(out.stdout, b"YWJjZAo=ZWZnaAo=");
}

#[test]
fn module_options_parse_after_the_path() {
    let out = modpipe(&["sample/flip", "--count", "2", "-g"], b"abcdef");
    assert!(out.status.success(), "stderr: {:?}", out.stderr);
    assert_eq!(out.stdout, b"efcdab\n");
}

#[test]
fn unknown_module_exits_not_found() {
    let out = modpipe(&["no/such/module"], b"");
    assert_eq!(out.status.code(), Some(4));
    // Redirected stderr carries the JSON envelope.
    let stderr = String::from_utf8(out.stderr).expect("utf8 stderr");
    assert!(stderr.contains("NotFound"), "stderr: {stderr}");
}

#[test]
fn malformed_module_path_exits_invalid_path() {
    let out = modpipe(&["encode//base64"], b"");
    assert_eq!(out.status.code(), Some(3));
}

#[test]
fn unknown_module_option_exits_usage() {
    let out = modpipe(&["sample/echo", "--bogus"], b"");
    assert_eq!(out.status.code(), Some(2));
}

#[test]
fn no_module_prints_help_and_exits_usage() {
    let out = modpipe(&[], b"");
    assert_eq!(out.status.code(), Some(2));
    let stdout = String::from_utf8(out.stdout).expect("utf8 stdout");
    assert!(stdout.contains("Usage"), "stdout: {stdout}");
}

#[test]
fn input_file_replaces_stdin() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("payload");
    std::fs::write(&path, b"abcd\n").expect("write fixture");

    let out = modpipe(
        &["encode/base64", "--input", path.to_str().expect("utf8 path")],
        b"ignored",
    );
    assert!(out.status.success(), "stderr: {:?}", out.stderr);
    assert_eq!(out.stdout, b"YWJjZAo=");
}

#[test]
fn output_file_replaces_stdout() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("result");

    let out = modpipe(
        &["encode/base64", "-o", path.to_str().expect("utf8 path")],
        b"abcd\n",
    );
    assert!(out.status.success(), "stderr: {:?}", out.stderr);
    assert!(out.stdout.is_empty());
    assert_eq!(std::fs::read(&path).expect("read result"), b"YWJjZAo=");
}

#[test]
fn list_prints_the_full_catalog() {
    let out = modpipe(&["--list"], b"");
    assert!(out.status.success(), "stderr: {:?}", out.stderr);
    let listing = String::from_utf8(out.stdout).expect("utf8 stdout");
    for path in [
        "encode/base64",
        "decode/base64",
        "encode/hex",
        "decode/hex",
        "digest/sha256",
        "sample/echo",
        "sample/flip",
        "sample/date",
    ] {
        assert!(listing.contains(path), "missing {path} in:\n{listing}");
    }
}

#[test]
fn module_help_shows_declared_and_cross_cutting_options() {
    let out = modpipe(&["sample/flip", "--help"], b"");
    assert!(out.status.success(), "stderr: {:?}", out.stderr);
    let help = String::from_utf8(out.stdout).expect("utf8 stdout");
    assert!(help.contains("--count"), "help: {help}");
    assert!(help.contains("--iterate"), "help: {help}");
}

#[test]
fn verbose_logs_module_load_diagnostics() {
    let out = modpipe(&["-v", "encode/base64"], b"abcd\n");
    assert!(out.status.success(), "stderr: {:?}", out.stderr);
    let stderr = String::from_utf8_lossy(&out.stderr);
    assert!(stderr.contains("loading module"), "stderr: {stderr}");
}

#[test]
fn verbose_after_the_module_path_logs_load_diagnostics() {
    let out = modpipe(&["encode/base64", "--verbose"], b"abcd\n");
    assert!(out.status.success(), "stderr: {:?}", out.stderr);
    let stderr = String::from_utf8_lossy(&out.stderr);
    assert!(stderr.contains("loading module"), "stderr: {stderr}");
}

#[test]
fn repeated_interrupts_stop_a_blocked_read() {
    let mut child = Command::new(env!("CARGO_BIN_EXE_modpipe"))
        .args(["encode/base64", "-i", "-g"])
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .expect("spawn modpipe");
    // Hold stdin open so the transform stays blocked in its read.
    std::thread::sleep(Duration::from_millis(300));

    let pid = child.id().to_string();
    for _ in 0..2 {
        let _ = Command::new("kill").args(["-INT", &pid]).status();
        std::thread::sleep(Duration::from_millis(200));
        if child.try_wait().expect("poll child").is_some() {
            break;
        }
    }

    let mut status = None;
    for _ in 0..20 {
        if let Some(done) = child.try_wait().expect("poll child") {
            status = Some(done);
            break;
        }
        std::thread::sleep(Duration::from_millis(100));
    }
    let Some(status) = status else {
        let _ = child.kill();
        panic!("process survived repeated interrupts while blocked on stdin");
    };
    assert!(!status.success());
}

#[test]
fn decode_pipeline_round_trips() {
    let encoded = modpipe(&["encode/hex"], b"round trip");
    assert!(encoded.status.success());
    let decoded = modpipe(&["decode/hex"], &encoded.stdout);
    assert!(decoded.status.success(), "stderr: {:?}", decoded.stderr);
    assert_eq!(decoded.stdout, b"round trip");
}
