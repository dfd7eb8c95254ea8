//! The `check` command against real directories.

#![allow(clippy::unwrap_used, clippy::expect_used, reason = "Tests can panic")]

use std::fs;
use std::path::PathBuf;

use lunac::commands::{check_paths, parse_check_args, CheckArgs, CheckReport};
use lunac::WorkspaceError;
use pretty_assertions::assert_eq;

fn args(raw: &[&str]) -> Vec<String> {
    raw.iter().map(|s| (*s).to_owned()).collect()
}

fn run(args: &CheckArgs) -> (CheckReport, String) {
    let mut out = Vec::new();
    let report = check_paths(args, &mut out, false).expect("check runs");
    (report, String::from_utf8(out).expect("utf-8 output"))
}

#[test]
fn parses_paths_and_config() {
    let parsed = parse_check_args(&args(&["-c", "cfg.json", "src", "lib"])).unwrap();
    assert_eq!(
        parsed,
        CheckArgs {
            config: Some(PathBuf::from("cfg.json")),
            paths: vec![PathBuf::from("src"), PathBuf::from("lib")],
        }
    );
    let inline = parse_check_args(&args(&["--config=x.json", "."])).unwrap();
    assert_eq!(inline.config, Some(PathBuf::from("x.json")));
}

#[test]
fn rejects_bad_arguments() {
    assert!(parse_check_args(&args(&[])).is_err());
    assert!(parse_check_args(&args(&["--config"])).is_err());
    assert!(parse_check_args(&args(&["--fast", "src"])).is_err());
}

#[test]
fn reports_every_problem_with_its_location() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(
        dir.path().join("point.lua"),
        "---@class Point\n---@field x number\nlocal Point = {}\n",
    )
    .unwrap();
    fs::create_dir(dir.path().join("src")).unwrap();
    fs::write(
        dir.path().join("src/use.lua"),
        "---@param p Point\nfunction move(p) end\n\nmove(nil)\nmove({})\nstray.value\n",
    )
    .unwrap();
    fs::write(dir.path().join("notes.txt"), "not lua").unwrap();

    let check = CheckArgs {
        config: None,
        paths: vec![dir.path().to_path_buf()],
    };
    let (report, output) = run(&check);
    assert_eq!(
        report,
        CheckReport {
            files: 2,
            errors: 1,
            warnings: 1,
        }
    );

    let lines: Vec<&str> = output.lines().collect();
    assert_eq!(lines.len(), 3, "{output}");
    assert!(lines[0].ends_with("use.lua:4:6: warning[E2001]: argument type `nil` does not match parameter `p` of type `Point`"), "{output}");
    assert!(lines[1].ends_with("use.lua:6:1: error[E1002]: non-complete statement"), "{output}");
    assert_eq!(lines[2], "1 error and 1 warning");
}

#[test]
fn settings_file_switches_checks_off() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(
        dir.path().join("a.lua"),
        "---@param n number\nfunction twice(n) end\ntwice(\"x\")\n",
    )
    .unwrap();
    let config = dir.path().join("settings.json");
    fs::write(
        &config,
        r#"{ "luna": { "diagnostics": { "parameterValidation": false } } }"#,
    )
    .unwrap();

    let strict = CheckArgs {
        config: None,
        paths: vec![dir.path().to_path_buf()],
    };
    assert_eq!(run(&strict).0.warnings, 1);

    let relaxed = CheckArgs {
        config: Some(config),
        ..strict
    };
    let (report, output) = run(&relaxed);
    assert_eq!(report.warnings, 0);
    assert_eq!(output.trim(), "no problems found");
}

#[test]
fn missing_paths_are_an_error() {
    let dir = tempfile::tempdir().unwrap();
    let check = CheckArgs {
        config: None,
        paths: vec![dir.path().join("nowhere")],
    };
    let result = check_paths(&check, Vec::new(), false);
    assert!(matches!(result, Err(WorkspaceError::NotFound(_))));
}
