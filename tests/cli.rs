//! Command-line integration tests
//!
//! Source files are written to temporary directories and checked through
//! both the library driver and the built binaries.

use go_analyzer::cli::{parse_args, run, Mode};
use go_analyzer::Config;
use std::fs;
use std::path::PathBuf;
use std::process::Command;
use tempfile::TempDir;

fn write_source(dir: &TempDir, name: &str, source: &str) -> PathBuf {
    let path = dir.path().join(name);
    fs::write(&path, source).expect("write source");
    path
}

fn run_mode(mode: Mode, args: &[&str]) -> (u8, String) {
    let args = parse_args(mode, args.iter().copied()).expect("args");
    let mut out = Vec::new();
    let code = run(mode, &args, Config::default(), &mut out).expect("run");
    (code, String::from_utf8(out).expect("utf8"))
}

#[test]
fn test_check_reports_errors_one_per_line() {
    let dir = TempDir::new().expect("tempdir");
    let path = write_source(&dir, "dup.go", "package main\nvar x int = 10\nvar x int = 20\n");
    let path = path.to_str().expect("path");

    let (code, out) = run_mode(Mode::Check, &[path]);
    assert_eq!(code, 1);
    assert_eq!(out, "semantic:3:5: redeclared in this scope: x\n");
}

#[test]
fn test_clean_file_exits_zero() {
    let dir = TempDir::new().expect("tempdir");
    let path = write_source(&dir, "ok.go", "package main\n\nfunc main() {\n\tx := 1\n\tx++\n}\n");
    let path = path.to_str().expect("path");

    for mode in [Mode::Lex, Mode::Parse, Mode::Check] {
        let (code, out) = run_mode(mode, &[path]);
        assert_eq!(code, 0, "{:?}", mode);
        assert!(out.is_empty());
    }
}

#[test]
fn test_phases_only_run_as_far_as_requested() {
    let dir = TempDir::new().expect("tempdir");
    let path = write_source(&dir, "brk.go", "package main\nfunc main() { break }\n");
    let path = path.to_str().expect("path");

    assert_eq!(run_mode(Mode::Parse, &[path]).0, 0);
    assert_eq!(run_mode(Mode::Check, &[path]).0, 1);
}

#[test]
fn test_full_report() {
    let dir = TempDir::new().expect("tempdir");
    let path = write_source(&dir, "main.go", "package main\nfunc main() {\n\tfor i := 0; i < 3; i++ {\n\t}\n}\n");
    let path = path.to_str().expect("path");

    let (_, out) = run_mode(Mode::Check, &["--report", path]);
    assert!(out.contains("Symbol table"));
    assert!(out.contains("For loops"));
    assert!(out.contains("total errors: 0"));

    let (_, out) = run_mode(Mode::Lex, &["--report", path]);
    assert!(out.contains("FOR(for) at line 3"));
}

#[test]
fn test_json_output() {
    let dir = TempDir::new().expect("tempdir");
    let path = write_source(&dir, "main.go", "package main\nconst PI float64 = 3.14\nfunc main() { PI = 3 }\n");
    let path = path.to_str().expect("path");

    let (code, out) = run_mode(Mode::Check, &["--json", path]);
    assert_eq!(code, 1);
    let value: serde_json::Value = serde_json::from_str(&out).expect("json");
    assert_eq!(value["semantic_errors"][0]["kind"], "assign_to_constant");
    assert_eq!(value["semantic_errors"][0]["position"]["line"], 3);
}

#[test]
fn test_max_errors_flag() {
    let dir = TempDir::new().expect("tempdir");
    let path = write_source(&dir, "many.go", "package main\nfunc main() {\n\ta = 1\n\tb = 2\n\tc = 3\n}\n");
    let path = path.to_str().expect("path");

    let (_, out) = run_mode(Mode::Check, &["--max-errors", "1", path]);
    assert_eq!(out.lines().count(), 1);
    let (_, out) = run_mode(Mode::Check, &[path]);
    assert_eq!(out.lines().count(), 3);
}

#[test]
fn test_binary_exit_codes() {
    let dir = TempDir::new().expect("tempdir");
    let bad = write_source(&dir, "bad.go", "package main\nfunc main() { continue }\n");

    let output = Command::new(env!("CARGO_BIN_EXE_go_check"))
        .arg(&bad)
        .output()
        .expect("run go_check");
    assert_eq!(output.status.code(), Some(1));
    assert_eq!(
        String::from_utf8_lossy(&output.stdout),
        "semantic:2:15: continue outside loop/switch\n"
    );

    let missing = dir.path().join("missing.go");
    let output = Command::new(env!("CARGO_BIN_EXE_go_lex"))
        .arg(&missing)
        .output()
        .expect("run go_lex");
    assert_eq!(output.status.code(), Some(2));

    let output = Command::new(env!("CARGO_BIN_EXE_go_parse")).output().expect("run go_parse");
    assert_eq!(output.status.code(), Some(2));
    assert!(String::from_utf8_lossy(&output.stderr).contains("Usage: go_parse"));
}
