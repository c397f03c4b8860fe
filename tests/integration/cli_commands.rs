#![allow(missing_docs)]

use std::fs;
use std::path::{Path, PathBuf};

use assert_cmd::cargo::cargo_bin_cmd;
use assert_cmd::Command;
use serde_json::Value;
use tempfile::TempDir;

fn write_input(dir: &TempDir, name: &str, body: &str) -> PathBuf {
    let path = dir.path().join(name);
    fs::write(&path, body).expect("write input");
    path
}

/// Runs the binary isolated from the user's config file and log settings.
fn rbtree(dir: &Path) -> Command {
    let mut cmd = cargo_bin_cmd!("rbtree");
    cmd.env("RBTREE_CONFIG", dir.join("absent-config.toml"))
        .env_remove("RUST_LOG");
    cmd
}

fn stdout_text(cmd: &mut Command) -> String {
    let output = cmd.assert().success().get_output().stdout.clone();
    String::from_utf8(output).expect("utf8 stdout")
}

fn failure_stderr(cmd: &mut Command) -> String {
    let output = cmd.assert().code(1).get_output().stderr.clone();
    String::from_utf8_lossy(&output).into_owned()
}

fn json_stdout(cmd: &mut Command) -> Value {
    let output = cmd.assert().success().get_output().stdout.clone();
    serde_json::from_slice(&output).expect("json output")
}

#[test]
fn load_exports_dot() {
    let dir = TempDir::new().expect("tempdir");
    let input = write_input(&dir, "words.txt", "alpha\nbeta\ngamma\n");
    let dot = dir.path().join("tree.dot");

    let json = json_stdout(
        rbtree(dir.path())
            .args(["--format", "json", "load"])
            .arg(&input)
            .arg("--export")
            .arg(&dot),
    );
    assert_eq!(json["records_read"], 3);
    assert_eq!(json["nodes_inserted"], 3);
    assert_eq!(json["trailing_bytes_ignored"], 0);
    assert_eq!(json["exported_to"], dot.display().to_string());

    let rendered = fs::read_to_string(&dot).expect("dot file");
    assert!(rendered.starts_with("digraph RBTree {"));
    assert_eq!(rendered.matches("[label=").count(), 3);
    assert_eq!(rendered.matches(" -> ").count(), 2);
}

#[test]
fn load_ignores_unterminated_tail() {
    let dir = TempDir::new().expect("tempdir");
    let input = write_input(&dir, "tail.txt", "one\ntwo\nthr");
    let json = json_stdout(
        rbtree(dir.path())
            .args(["--format", "json", "load"])
            .arg(&input),
    );
    assert_eq!(json["records_read"], 2);
    assert_eq!(json["trailing_bytes_ignored"], 3);
}

#[test]
fn verify_full_succeeds() {
    let dir = TempDir::new().expect("tempdir");
    let body: String = (0..500).map(|i| format!("record-{i}\n")).collect();
    let input = write_input(&dir, "records.txt", &body);
    let json = json_stdout(
        rbtree(dir.path())
            .args(["--format", "json", "verify", "--level", "full"])
            .arg(&input),
    );
    assert_eq!(json["level"], "full");
    assert_eq!(json["success"], true);
    assert_eq!(json["counts"]["nodes_reachable"], 500);
}

#[test]
fn verify_accepts_repeated_lines() {
    let dir = TempDir::new().expect("tempdir");
    let json = json_stdout(
        rbtree(dir.path())
            .args(["--format", "json", "verify"])
            .write_stdin("a\na\na\nb\na\nb\na\n"),
    );
    assert_eq!(json["success"], true, "{json}");
    assert_eq!(json["counts"]["nodes_reachable"], 7);

    let text = stdout_text(rbtree(dir.path()).arg("verify").write_stdin("a\na\na\n"));
    assert!(text.contains("all invariants hold"), "{text}");
}

#[test]
fn verify_text_reports_success() {
    let dir = TempDir::new().expect("tempdir");
    let input = write_input(&dir, "small.txt", "a\nb\nc\nd\n");
    let text = stdout_text(rbtree(dir.path()).arg("verify").arg(&input));
    assert!(text.contains("all invariants hold"), "{text}");
}

#[test]
fn stats_reads_stdin() {
    let dir = TempDir::new().expect("tempdir");
    let json = json_stdout(
        rbtree(dir.path())
            .args(["--format", "json", "stats"])
            .write_stdin("w\nx\ny\nz\nz\n"),
    );
    assert_eq!(json["tree"]["len"], 5);
    assert_eq!(json["tree"]["duplicate_keys"], 1);
    assert_eq!(json["storage"]["slots"], 6);
}

#[test]
fn config_file_sets_row_width_and_flag_overrides() {
    let dir = TempDir::new().expect("tempdir");
    let input = write_input(&dir, "rows.txt", "1\n2\n3\n4\n5\n6\n7\n8\n9\n");
    let config = write_input(&dir, "config.toml", "[tree]\nrow_shift = 2\n");

    let json = json_stdout(
        rbtree(dir.path())
            .env("RBTREE_CONFIG", &config)
            .args(["--format", "json", "stats"])
            .arg(&input),
    );
    assert_eq!(json["storage"]["row_width"], 4);
    assert_eq!(json["storage"]["rows"], 3);

    let json = json_stdout(
        rbtree(dir.path())
            .env("RBTREE_CONFIG", &config)
            .args(["--format", "json", "--row-shift", "3", "stats"])
            .arg(&input),
    );
    assert_eq!(json["storage"]["row_width"], 8);
    assert_eq!(json["storage"]["rows"], 2);
}

#[test]
fn hash_prints_keys() {
    let dir = TempDir::new().expect("tempdir");
    let text = stdout_text(rbtree(dir.path()).args(["hash", "a", "hello"]));
    assert_eq!(text, "0x00000006ca2e9442  a\n0x7ac91aedd058144b  hello\n");

    let json = json_stdout(rbtree(dir.path()).args(["--format", "json", "hash", "hello"]));
    assert_eq!(json[0]["input"], "hello");
    assert_eq!(json[0]["key"].as_u64(), Some(0x7ac9_1aed_d058_144b));
}

#[test]
fn invalid_row_shift_exits_with_error() {
    let dir = TempDir::new().expect("tempdir");
    let input = write_input(&dir, "x.txt", "x\n");
    let stderr = failure_stderr(rbtree(dir.path()).args(["--row-shift", "0", "load"]).arg(&input));
    assert!(stderr.contains("error: invalid options"), "{stderr}");
}

#[test]
fn missing_input_exits_with_error() {
    let dir = TempDir::new().expect("tempdir");
    let stderr = failure_stderr(
        rbtree(dir.path())
            .arg("load")
            .arg(dir.path().join("nowhere.txt")),
    );
    assert!(stderr.contains("failed to open"), "{stderr}");
}
