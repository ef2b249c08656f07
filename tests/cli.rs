//! # End-to-end tests for the CLI
#![cfg(not(miri))]

use assert_cmd::Command;
use std::process::Output;

fn run(args: &[&str], stdin: &str) -> Output {
  Command::cargo_bin(env!("CARGO_PKG_NAME"))
    .unwrap()
    .args(args)
    .write_stdin(stdin)
    .output()
    .unwrap()
}

#[test]
fn parse_prints_the_syntax_tree() {
  let output = run(&["parse", "-"], "contract C { uint256 x; }");

  assert!(output.status.success());
  let stdout = String::from_utf8(output.stdout).unwrap();
  assert!(stdout.contains("\"type\": \"SourceUnit\""));
  assert!(stdout.contains("\"type\": \"ContractDefinition\""));
  assert!(stdout.contains("\"name\": \"C\""));
}

#[test]
fn parse_compact_output() {
  let output = run(&["parse", "--compact", "-"], "contract C { }");

  assert!(output.status.success());
  let stdout = String::from_utf8(output.stdout).unwrap();
  assert!(stdout.contains("\"type\":\"SourceUnit\""));
  assert_eq!(stdout.lines().count(), 1);
}

#[test]
fn parse_with_locations() {
  let output = run(&["parse", "--loc", "--range", "-"], "contract C { }");

  assert!(output.status.success());
  let stdout = String::from_utf8(output.stdout).unwrap();
  assert!(stdout.contains("\"loc\""));
  assert!(stdout.contains("\"range\""));
}

#[test]
fn parse_reports_errors() {
  let output = run(&["parse", "-"], "contract C { invalid syntax here }");

  assert!(!output.status.success());
  assert!(output.stdout.is_empty());
  let stderr = String::from_utf8(output.stderr).unwrap();
  assert!(stderr.contains("Error"));
}

#[test]
fn parse_tolerant_still_outputs_a_tree() {
  let output = run(
    &["parse", "--tolerant", "-"],
    "contract C { invalid syntax here }",
  );

  assert!(output.status.success());
  let stdout = String::from_utf8(output.stdout).unwrap();
  assert!(stdout.contains("\"type\": \"SourceUnit\""));
}

#[test]
fn validate_accepts_valid_syntax() {
  let output = run(&["validate", "-"], "contract C { uint256 x; }");

  assert!(output.status.success());
  assert_eq!(String::from_utf8(output.stdout).unwrap(), "Syntax OK\n");
}

#[test]
fn validate_rejects_invalid_syntax() {
  let output = run(&["validate", "-"], "contract C { uint }");

  assert!(!output.status.success());
  assert!(output.stdout.is_empty());
  let stderr = String::from_utf8(output.stderr).unwrap();
  assert!(stderr.contains("Syntax errors found:"));
  assert!(stderr.contains("line 1:"));
}

#[test]
fn version_detect_reports_the_pragma() {
  let output = run(
    &["version-detect", "-"],
    "pragma solidity ^0.8.0;\ncontract C { }",
  );

  assert!(output.status.success());
  let expected = "Pragma: ^0.8.0\nVersion: 0.8.0\nConstraint: ^\n";
  assert_eq!(String::from_utf8(output.stdout).unwrap(), expected);
}
