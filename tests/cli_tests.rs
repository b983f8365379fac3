//! Integration tests for the clone-recall CLI

use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use std::path::Path;
use tempfile::tempdir;

use clone_recall::core::model::{
    CloneType, DetectedReport, Fragment, FragmentSize, Functionality, Locality, ReferenceClone,
    Tool,
};
use clone_recall::io::store::{BenchmarkSnapshot, ToolDetections};

/// Test helper to get the CLI binary
fn clone_recall_cmd() -> Command {
    Command::cargo_bin("clone-recall").unwrap()
}

fn type1(id: i64, lines: u32) -> ReferenceClone {
    ReferenceClone {
        id,
        clone_type: CloneType::Type1,
        similarity: None,
        first: Fragment::new(format!("p{id}/A.java"), 1, lines),
        second: Fragment::new(format!("p{id}/B.java"), 1, lines),
        first_size: FragmentSize::default(),
        second_size: FragmentSize::default(),
        judges: 2,
        confidence: 1,
        locality: Locality::Inter,
        functionality: Some(7),
        internal: false,
    }
}

/// Writes a small benchmark where tool 1 finds one of three clones
fn write_benchmark(dir: &Path) -> std::path::PathBuf {
    let snapshot = BenchmarkSnapshot {
        version: "cli-bench".to_string(),
        tools: vec![Tool {
            id: 1,
            name: "Deckard".to_string(),
            description: "tree-based detector".to_string(),
        }],
        functionalities: vec![Functionality {
            id: 7,
            name: "Zip Files".to_string(),
            description: String::new(),
        }],
        clones: vec![type1(1, 12), type1(2, 12), type1(3, 3)],
        detections: vec![ToolDetections {
            tool_id: 1,
            reports: vec![DetectedReport::new(
                Fragment::new("p1/A.java", 1, 12),
                Fragment::new("p1/B.java", 2, 12),
            )],
        }],
    };

    let path = dir.join("benchmark.json");
    fs::write(&path, serde_json::to_string_pretty(&snapshot).unwrap()).unwrap();
    path
}

#[test]
fn test_help_lists_subcommands() {
    clone_recall_cmd()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("evaluate"))
        .stdout(predicate::str::contains("print-default-config"))
        .stdout(predicate::str::contains("list-matchers"));
}

#[test]
fn test_print_default_config() {
    clone_recall_cmd()
        .arg("print-default-config")
        .assert()
        .success()
        .stdout(predicate::str::contains("matcher: CoverageMatcher 0.7"))
        .stdout(predicate::str::contains("similarity_type: both"));
}

#[test]
fn test_list_matchers() {
    clone_recall_cmd()
        .arg("list-matchers")
        .assert()
        .success()
        .stdout(predicate::str::contains("CoverageMatcher"));
}

#[test]
fn test_evaluate_writes_report() {
    let dir = tempdir().unwrap();
    let store = write_benchmark(dir.path());
    let output = dir.path().join("deckard.report");

    clone_recall_cmd()
        .args(["evaluate", "1", "--store"])
        .arg(&store)
        .arg("-o")
        .arg(&output)
        .assert()
        .success();

    let report = fs::read_to_string(&output).unwrap();
    assert!(report.contains("Tool: 1 - Deckard"));
    assert!(report.contains("Type-1: 1 / 3 = 0.3333"));
    assert!(report.contains("name: Zip Files"));
}

#[test]
fn test_evaluate_applies_flags_over_config_file() {
    let dir = tempdir().unwrap();
    let store = write_benchmark(dir.path());
    let output = dir.path().join("deckard.report");
    let config = dir.path().join("eval.yml");
    fs::write(&config, "filter:\n  lines:\n    min: 10\nmin_similarity: 50\n").unwrap();

    clone_recall_cmd()
        .args(["evaluate", "1", "--store"])
        .arg(&store)
        .arg("-o")
        .arg(&output)
        .arg("--config")
        .arg(&config)
        .args(["--min-judges", "3", "--matcher", "CoverageMatcher 0.9 pairwise"])
        .assert()
        .success();

    let report = fs::read_to_string(&output).unwrap();
    assert!(report.contains("Min Lines: 10"));
    assert!(report.contains("Min Judges: 3"));
    assert!(report.contains("Minimum Similarity: 50"));
    assert!(report.contains("pairwise coverage"));
    // min_judges 3 leaves no clone in scope
    assert!(report.contains("Type-1: 0 / 0 = n/a"));
}

#[test]
fn test_unknown_tool_fails() {
    let dir = tempdir().unwrap();
    let store = write_benchmark(dir.path());

    clone_recall_cmd()
        .args(["evaluate", "42", "--store"])
        .arg(&store)
        .arg("-o")
        .arg(dir.path().join("out.report"))
        .assert()
        .failure()
        .stderr(predicate::str::contains("There is no such tool with ID 42"));
}

#[test]
fn test_unknown_matcher_fails() {
    let dir = tempdir().unwrap();
    let store = write_benchmark(dir.path());

    clone_recall_cmd()
        .args(["evaluate", "1", "--store"])
        .arg(&store)
        .arg("-o")
        .arg(dir.path().join("out.report"))
        .args(["--matcher", "ExactMatcher"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Unknown clone matcher 'ExactMatcher'"));
}

#[test]
fn test_invalid_matcher_config_fails() {
    let dir = tempdir().unwrap();
    let store = write_benchmark(dir.path());

    clone_recall_cmd()
        .args(["evaluate", "1", "--store"])
        .arg(&store)
        .arg("-o")
        .arg(dir.path().join("out.report"))
        .args(["--matcher", "CoverageMatcher 1.5"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Configuration error in CoverageMatcher"));
}

#[test]
fn test_unwritable_output_fails() {
    let dir = tempdir().unwrap();
    let store = write_benchmark(dir.path());

    clone_recall_cmd()
        .args(["evaluate", "1", "--store"])
        .arg(&store)
        .arg("-o")
        .arg(dir.path().join("no-such-dir").join("out.report"))
        .assert()
        .failure()
        .stderr(predicate::str::contains("Cannot write report"));
}

#[test]
fn test_missing_store_fails() {
    let dir = tempdir().unwrap();

    clone_recall_cmd()
        .args(["evaluate", "1", "--store"])
        .arg(dir.path().join("missing.json"))
        .arg("-o")
        .arg(dir.path().join("out.report"))
        .assert()
        .failure()
        .stderr(predicate::str::contains("Store error"));
}

#[test]
fn test_invalid_min_similarity_fails() {
    let dir = tempdir().unwrap();
    let store = write_benchmark(dir.path());

    clone_recall_cmd()
        .args(["evaluate", "1", "--store"])
        .arg(&store)
        .arg("-o")
        .arg(dir.path().join("out.report"))
        .args(["--min-similarity", "42"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("min_similarity"));
}

#[test]
fn test_rust_log_overrides_default_level() {
    let dir = tempdir().unwrap();
    let store = write_benchmark(dir.path());

    clone_recall_cmd()
        .env("RUST_LOG", "debug")
        .args(["evaluate", "1", "--store"])
        .arg(&store)
        .arg("-o")
        .arg(dir.path().join("debug.report"))
        .assert()
        .success()
        .stderr(predicate::str::contains("Selected 3 of 3 reference clones"));

    clone_recall_cmd()
        .env_remove("RUST_LOG")
        .args(["evaluate", "1", "--store"])
        .arg(&store)
        .arg("-o")
        .arg(dir.path().join("info.report"))
        .assert()
        .success()
        .stderr(predicate::str::contains("Selected").not());
}
