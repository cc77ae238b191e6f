//! E2E CLI tests covering:
//! - `gw dfs` / `gw bfs` over tree and adjacency documents, JSON and TOML
//! - `gw cycles` output and exit status
//! - `graphwalk.toml` defaults and flag overrides
//! - `gw config get/show`
//!
//! Each test runs `gw` as a subprocess in an isolated temp directory.

use assert_cmd::Command;
use predicates::prelude::*;
use serde_json::Value;
use std::path::Path;
use tempfile::TempDir;

// ---------------------------------------------------------------------------
// Test Harness
// ---------------------------------------------------------------------------

/// Build a Command targeting the `gw` binary, rooted in `dir` with an empty
/// user config.
fn gw_cmd(dir: &Path) -> Command {
    let mut cmd = Command::new(assert_cmd::cargo::cargo_bin!("gw"));
    cmd.current_dir(dir);
    cmd.env("XDG_CONFIG_HOME", dir.join(".xdg"));
    cmd.env("GRAPHWALK_LOG", "error");
    cmd.env_remove("FORMAT");
    cmd
}

fn write(dir: &Path, name: &str, content: &str) {
    std::fs::write(dir.join(name), content).expect("write fixture");
}

/// Run with `--format json` and parse stdout.
fn run_json(dir: &Path, args: &[&str]) -> Value {
    let output = gw_cmd(dir)
        .args(args)
        .args(["--format", "json"])
        .output()
        .expect("gw should not crash");
    assert!(
        output.status.success(),
        "gw {args:?} failed: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    serde_json::from_slice(&output.stdout).expect("valid JSON")
}

fn node_ids(report: &Value) -> Vec<String> {
    report["nodes"]
        .as_array()
        .expect("nodes array")
        .iter()
        .map(|n| n["id"].as_str().expect("id").to_string())
        .collect()
}

const TREE: &str = r#"{
  "name": "root",
  "children": [
    {"name": "src", "children": [{"name": "lib.rs"}, {"name": "main.rs"}]},
    {"name": "README.md"}
  ]
}"#;

const PIPELINE: &str = r#"
root = "fetch"

[edges]
fetch = ["build", "lint"]
build = "test"
lint = "test"
test = "deploy"
"#;

const CYCLIC: &str = r#"{"root": "a", "edges": {"a": ["b"], "b": ["c"], "c": ["a"]}}"#;

// ---------------------------------------------------------------------------
// dfs / bfs
// ---------------------------------------------------------------------------

#[test]
fn dfs_tree_post_order_by_name() {
    let dir = TempDir::new().expect("tempdir");
    write(dir.path(), "tree.json", TREE);

    let report = run_json(dir.path(), &["dfs", "tree.json", "--id", "name"]);
    assert_eq!(report["algorithm"], "dfs");
    assert_eq!(report["order"], "post-order");
    assert_eq!(report["strategy"], "recursive");
    assert_eq!(report["root"], "root");
    assert_eq!(node_ids(&report), ["lib.rs", "main.rs", "src", "README.md", "root"]);
    assert_eq!(report["edges"].as_array().map(Vec::len), Some(4));
}

#[test]
fn dfs_strategies_agree() {
    let dir = TempDir::new().expect("tempdir");
    write(dir.path(), "pipeline.toml", PIPELINE);

    let recursive = run_json(dir.path(), &["dfs", "pipeline.toml", "--order", "pre"]);
    let iterative = run_json(
        dir.path(),
        &["dfs", "pipeline.toml", "--order", "pre", "--strategy", "iterative"],
    );
    assert_eq!(recursive["nodes"], iterative["nodes"]);
    assert_eq!(recursive["edges"], iterative["edges"]);
    assert_eq!(node_ids(&recursive), ["fetch", "build", "test", "deploy", "lint"]);

    let lint_to_test = recursive["edges"]
        .as_array()
        .expect("edges")
        .iter()
        .find(|e| e["from"] == "lint")
        .expect("lint edge");
    assert_eq!(lint_to_test["kind"], "cross");
}

#[test]
fn bfs_reports_levels() {
    let dir = TempDir::new().expect("tempdir");
    write(dir.path(), "pipeline.toml", PIPELINE);

    let report = run_json(dir.path(), &["bfs", "pipeline.toml", "--order", "pre"]);
    let levels: Vec<(String, u64)> = report["nodes"]
        .as_array()
        .expect("nodes")
        .iter()
        .map(|n| {
            (
                n["id"].as_str().expect("id").to_string(),
                n["level"].as_u64().expect("level"),
            )
        })
        .collect();
    assert_eq!(
        levels,
        [
            ("fetch".to_string(), 0),
            ("build".to_string(), 1),
            ("lint".to_string(), 1),
            ("test".to_string(), 2),
            ("deploy".to_string(), 3),
        ]
    );
    assert!(report.get("strategy").is_none());
}

#[test]
fn text_output_is_line_oriented() {
    let dir = TempDir::new().expect("tempdir");
    write(dir.path(), "pipeline.toml", PIPELINE);

    gw_cmd(dir.path())
        .args(["bfs", "pipeline.toml", "--format", "text"])
        .assert()
        .success()
        .stdout(predicate::str::contains("node fetch level=0"))
        .stdout(predicate::str::contains("edge fetch build tree level=1"));
}

#[test]
fn format_env_selects_json() {
    let dir = TempDir::new().expect("tempdir");
    write(dir.path(), "tree.json", TREE);

    let output = gw_cmd(dir.path())
        .args(["dfs", "tree.json"])
        .env("FORMAT", "json")
        .output()
        .expect("run");
    assert!(output.status.success());
    let report: Value = serde_json::from_slice(&output.stdout).expect("valid JSON");
    // Content identity by default.
    assert!(report["root"].as_str().is_some_and(|id| id.starts_with("blake3:")));
}

#[test]
fn undirected_flag_walks_edges_backwards() {
    let dir = TempDir::new().expect("tempdir");
    write(dir.path(), "g.json", r#"{"edges": {"b": ["a"], "c": ["b"]}}"#);

    let directed = run_json(dir.path(), &["dfs", "g.json", "--root", "a", "--order", "pre"]);
    assert_eq!(node_ids(&directed), ["a"]);

    let undirected = run_json(
        dir.path(),
        &["dfs", "g.json", "--root", "a", "--order", "pre", "--undirected"],
    );
    assert_eq!(node_ids(&undirected), ["a", "b", "c"]);
    assert_eq!(undirected["directed"], false);
}

// ---------------------------------------------------------------------------
// cycles
// ---------------------------------------------------------------------------

#[test]
fn cycles_reports_path_and_fails() {
    let dir = TempDir::new().expect("tempdir");
    write(dir.path(), "cyclic.json", CYCLIC);

    gw_cmd(dir.path())
        .args(["cycles", "cyclic.json", "--format", "text"])
        .assert()
        .failure()
        .stdout(predicate::str::contains("a -> b -> c -> a"));
}

#[test]
fn cycles_on_dag_succeeds() {
    let dir = TempDir::new().expect("tempdir");
    write(dir.path(), "pipeline.toml", PIPELINE);

    gw_cmd(dir.path())
        .args(["cycles", "pipeline.toml", "--format", "text"])
        .assert()
        .success()
        .stdout(predicate::str::diff("No cycle found.\n"));
}

#[test]
fn dfs_detect_cycles_emits_structured_error() {
    let dir = TempDir::new().expect("tempdir");
    write(dir.path(), "cyclic.json", CYCLIC);

    let output = gw_cmd(dir.path())
        .args(["dfs", "cyclic.json", "--detect-cycles", "--format", "json"])
        .output()
        .expect("run");
    assert!(!output.status.success());

    let stderr = String::from_utf8_lossy(&output.stderr);
    let json_end = stderr.find("\n}").map_or(stderr.len(), |i| i + 2);
    let err: Value = serde_json::from_str(&stderr[..json_end]).expect("JSON error on stderr");
    assert_eq!(err["error"]["error_code"], "E2001");
    assert!(
        err["error"]["message"]
            .as_str()
            .is_some_and(|m| m.contains("a → b → c → a"))
    );
}

#[test]
fn missing_file_fails_with_path() {
    let dir = TempDir::new().expect("tempdir");
    gw_cmd(dir.path())
        .args(["dfs", "nope.json"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("nope.json"));
}

// ---------------------------------------------------------------------------
// config
// ---------------------------------------------------------------------------

#[test]
fn project_config_sets_defaults_and_flags_override() {
    let dir = TempDir::new().expect("tempdir");
    write(dir.path(), "tree.json", TREE);
    write(
        dir.path(),
        "graphwalk.toml",
        "[traversal]\norder = \"pre\"\nstrategy = \"iterative\"\n\n[input]\nid = \"name\"\n",
    );

    let report = run_json(dir.path(), &["dfs", "tree.json"]);
    assert_eq!(report["order"], "pre-order");
    assert_eq!(report["strategy"], "iterative");
    assert_eq!(node_ids(&report), ["root", "src", "lib.rs", "main.rs", "README.md"]);

    let report = run_json(dir.path(), &["dfs", "tree.json", "--order", "post"]);
    assert_eq!(report["order"], "post-order");
}

#[test]
fn config_output_format_is_used_when_piped() {
    let dir = TempDir::new().expect("tempdir");
    write(dir.path(), "pipeline.toml", PIPELINE);
    write(dir.path(), "graphwalk.toml", "[output]\nformat = \"json\"\n");

    let output = gw_cmd(dir.path())
        .args(["cycles", "pipeline.toml"])
        .output()
        .expect("run");
    assert!(output.status.success());
    let payload: Value = serde_json::from_slice(&output.stdout).expect("valid JSON");
    assert_eq!(payload["cycle"], serde_json::json!([]));
}

#[test]
fn config_get_reads_merged_values() {
    let dir = TempDir::new().expect("tempdir");
    write(dir.path(), "graphwalk.toml", "[input]\nchildren = \"deps\"\n");

    gw_cmd(dir.path())
        .args(["config", "get", "input.children", "--format", "text"])
        .assert()
        .success()
        .stdout(predicate::str::diff("deps\n"));

    gw_cmd(dir.path())
        .args(["config", "get", "traversal.strategy", "--format", "text"])
        .assert()
        .success()
        .stdout(predicate::str::diff("recursive\n"));

    gw_cmd(dir.path())
        .args(["config", "get", "traversal.bogus"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("unknown config key"));
}

#[test]
fn user_config_is_overridden_by_project() {
    let dir = TempDir::new().expect("tempdir");
    let user_dir = dir.path().join(".xdg/graphwalk");
    std::fs::create_dir_all(&user_dir).expect("mkdir");
    std::fs::write(
        user_dir.join("config.toml"),
        "[traversal]\ndirected = false\nstrategy = \"iterative\"\n",
    )
    .expect("write user config");
    write(dir.path(), "graphwalk.toml", "[traversal]\nstrategy = \"recursive\"\n");

    let effective = run_json(dir.path(), &["config", "show"]);
    assert_eq!(effective["traversal"]["directed"], false);
    assert_eq!(effective["traversal"]["strategy"], "recursive");

    let user = run_json(dir.path(), &["config", "show", "--user"]);
    assert_eq!(user["traversal"]["strategy"], "iterative");
}

#[test]
fn invalid_config_is_reported() {
    let dir = TempDir::new().expect("tempdir");
    write(dir.path(), "graphwalk.toml", "[traversal]\norder = \"sideways\"\n");

    gw_cmd(dir.path())
        .args(["config", "show"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("error[E1002]: Invalid graphwalk configuration"))
        .stderr(predicate::str::contains("suggestion: Fix syntax in graphwalk.toml"));
}

#[test]
fn broken_config_emits_coded_json_error() {
    let dir = TempDir::new().expect("tempdir");
    write(dir.path(), "graph.json", TREE);
    write(dir.path(), "graphwalk.toml", "[traversal\norder = ");

    let output = gw_cmd(dir.path())
        .args(["dfs", "graph.json", "--format", "json"])
        .output()
        .expect("run");
    assert!(!output.status.success());
    assert!(output.stdout.is_empty());

    let stderr = String::from_utf8_lossy(&output.stderr);
    let json_end = stderr.find("\n}").map_or(stderr.len(), |i| i + 2);
    let err: Value = serde_json::from_str(&stderr[..json_end]).expect("JSON error on stderr");
    assert_eq!(err["error"]["error_code"], "E1002");
    assert!(
        err["error"]["message"]
            .as_str()
            .is_some_and(|m| m.contains("graphwalk.toml")),
        "{stderr}"
    );
    assert!(err["error"]["suggestion"].is_string());
}
