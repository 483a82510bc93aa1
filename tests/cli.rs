#![cfg(unix)]

use std::io::Write;
use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};
use std::sync::{Mutex, MutexGuard, OnceLock};

fn shell_path() -> &'static str {
    env!("CARGO_BIN_EXE_simple_shell")
}

/// Scripts are written and then executed by a child; tests run one at a time so no
/// concurrently forked process still holds a script open for writing when it is exec'd.
fn lock_scripts() -> MutexGuard<'static, ()> {
    static MUTEX: OnceLock<Mutex<()>> = OnceLock::new();
    MUTEX
        .get_or_init(|| Mutex::new(()))
        .lock()
        .unwrap_or_else(|e| e.into_inner())
}

fn write_script(dir: &Path, name: &str, body: &str) -> PathBuf {
    let path = dir.join(name);
    std::fs::write(&path, format!("#!/bin/sh\n{body}\n")).unwrap();
    std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o755)).unwrap();
    path
}

struct Run {
    code: i32,
    stdout: String,
    stderr: String,
}

fn run_shell(input: &str, path: Option<&str>) -> Run {
    let mut cmd = Command::new(shell_path());
    cmd.stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .env_remove("RUST_LOG");
    match path {
        Some(p) => cmd.env("PATH", p),
        None => cmd.env_remove("PATH"),
    };
    let mut child = cmd.spawn().expect("spawn shell");
    child
        .stdin
        .take()
        .unwrap()
        .write_all(input.as_bytes())
        .unwrap();
    let output = child.wait_with_output().expect("wait shell");
    Run {
        code: output.status.code().expect("shell exited normally"),
        stdout: String::from_utf8(output.stdout).unwrap(),
        stderr: String::from_utf8(output.stderr).unwrap(),
    }
}

#[test]
fn eof_on_empty_input_exits_zero() {
    let _lock = lock_scripts();
    let run = run_shell("", Some("/bin:/usr/bin"));
    assert_eq!(run.code, 0);
    assert!(run.stdout.is_empty(), "no prompt when stdin is not a terminal");
    assert!(run.stderr.is_empty());
}

#[test]
fn blank_lines_are_skipped() {
    let _lock = lock_scripts();
    let run = run_shell("\n   \n\t\t\n", Some("/bin:/usr/bin"));
    assert_eq!(run.code, 0);
    assert!(run.stdout.is_empty());
    assert!(run.stderr.is_empty());
}

#[test]
fn exit_with_status() {
    let _lock = lock_scripts();
    let run = run_shell("exit 42\nexit 1\n", Some("/bin:/usr/bin"));
    assert_eq!(run.code, 42);
}

#[test]
fn exit_status_is_reduced_modulo_256() {
    let _lock = lock_scripts();
    let run = run_shell("exit 300\n", None);
    assert_eq!(run.code, 44);
}

#[test]
fn exit_without_status_uses_last_command() {
    let _lock = lock_scripts();
    let dir = tempfile::tempdir().unwrap();
    write_script(dir.path(), "seven", "exit 7");
    let run = run_shell("seven\nexit\n", dir.path().to_str());
    assert_eq!(run.code, 7);
    assert!(run.stderr.is_empty());
}

#[test]
fn exit_without_status_skips_builtins() {
    let _lock = lock_scripts();
    let dir = tempfile::tempdir().unwrap();
    write_script(dir.path(), "seven", "exit 7");
    let run = run_shell("seven\nenv\nexit abc\nexit\n", dir.path().to_str());
    assert_eq!(run.code, 7);

    let run = run_shell("exit abc\nexit\n", None);
    assert_eq!(run.code, 0);
}

#[test]
fn not_found_keeps_the_loop_running() {
    let _lock = lock_scripts();
    let run = run_shell("foobarbaz\nexit 5\n", Some("/bin:/usr/bin"));
    assert_eq!(run.code, 5);
    assert_eq!(
        run.stderr,
        format!("{}: 1: foobarbaz: not found\n", shell_path())
    );
}

#[test]
fn not_found_status_is_127() {
    let _lock = lock_scripts();
    let run = run_shell("foobarbaz\n", Some("/bin:/usr/bin"));
    assert_eq!(run.code, 127);
}

#[test]
fn illegal_exit_number_is_rejected() {
    let _lock = lock_scripts();
    let run = run_shell("exit abc\nenv\n", None);
    assert_eq!(run.code, 0);
    assert_eq!(
        run.stderr,
        format!("{}: 1: exit: Illegal number: abc\n", shell_path())
    );
}

#[test]
fn env_prints_inherited_variables() {
    let _lock = lock_scripts();
    let mut cmd = Command::new(shell_path());
    cmd.env("SIMPLE_SHELL_TEST_VAR", "some value")
        .stdin(Stdio::piped())
        .stdout(Stdio::piped());
    let mut child = cmd.spawn().unwrap();
    child.stdin.take().unwrap().write_all(b"env\n").unwrap();
    let output = child.wait_with_output().unwrap();
    assert_eq!(output.status.code(), Some(0));
    let stdout = String::from_utf8(output.stdout).unwrap();
    assert!(stdout.lines().any(|l| l == "SIMPLE_SHELL_TEST_VAR=some value"));
}

#[test]
fn first_path_directory_wins() {
    let _lock = lock_scripts();
    let first = tempfile::tempdir().unwrap();
    let second = tempfile::tempdir().unwrap();
    write_script(first.path(), "which_one", "echo first");
    write_script(second.path(), "which_one", "echo second");
    let path = format!("{}:{}", first.path().display(), second.path().display());
    let run = run_shell("which_one\n", Some(&path));
    assert_eq!(run.stdout, "first\n");
    assert_eq!(run.code, 0);
}

#[test]
fn arguments_reach_the_child() {
    let _lock = lock_scripts();
    let dir = tempfile::tempdir().unwrap();
    write_script(dir.path(), "args", "echo \"$#:$1:$2\"");
    let run = run_shell("  args   one\ttwo  \n", dir.path().to_str());
    assert_eq!(run.stdout, "2:one:two\n");
}

#[test]
fn explicit_path_runs_without_path_variable() {
    let _lock = lock_scripts();
    let dir = tempfile::tempdir().unwrap();
    let script = write_script(dir.path(), "hello", "echo hello");
    let run = run_shell(&format!("{}\n", script.display()), None);
    assert_eq!(run.stdout, "hello\n");
    assert_eq!(run.code, 0);
}

#[test]
fn signal_termination_maps_to_128_plus_signal() {
    let _lock = lock_scripts();
    let dir = tempfile::tempdir().unwrap();
    write_script(dir.path(), "suicide", "kill -KILL $$");
    let run = run_shell("suicide\nexit\n", dir.path().to_str());
    assert_eq!(run.code, 137);
}

#[test]
fn loop_continues_after_signal() {
    let _lock = lock_scripts();
    let dir = tempfile::tempdir().unwrap();
    write_script(dir.path(), "suicide", "kill -TERM $$");
    write_script(dir.path(), "after", "echo still here");
    let run = run_shell("suicide\nafter\n", dir.path().to_str());
    assert_eq!(run.stdout, "still here\n");
    assert_eq!(run.code, 0);
}

#[test]
fn empty_path_segment_is_not_current_directory() {
    let _lock = lock_scripts();
    let dir = tempfile::tempdir().unwrap();
    write_script(dir.path(), "local_tool", "echo ran");
    let mut cmd = Command::new(shell_path());
    cmd.current_dir(dir.path())
        .env("PATH", ":/nonexistent:")
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped());
    let mut child = cmd.spawn().unwrap();
    child.stdin.take().unwrap().write_all(b"local_tool\n").unwrap();
    let output = child.wait_with_output().unwrap();
    assert_eq!(output.status.code(), Some(127));
    assert!(output.stdout.is_empty());
    assert!(String::from_utf8_lossy(&output.stderr).ends_with("1: local_tool: not found\n"));
}

#[test]
fn help_flag_prints_usage() {
    let _lock = lock_scripts();
    let output = Command::new(shell_path())
        .arg("--help")
        .output()
        .unwrap();
    assert_eq!(output.status.code(), Some(0));
    assert!(String::from_utf8_lossy(&output.stdout).contains("Usage:"));
}
