#![allow(missing_docs)]

use std::fs;
use std::path::{Path, PathBuf};

use assert_cmd::cargo::cargo_bin_cmd;
use serde_json::Value;
use tempfile::TempDir;

struct Workspace {
    dir: TempDir,
    categories: PathBuf,
    edges: PathBuf,
    pages: PathBuf,
}

impl Workspace {
    fn path(&self, name: &str) -> PathBuf {
        self.dir.path().join(name)
    }
}

fn setup() -> Workspace {
    let dir = TempDir::new().expect("tempdir");
    let write = |name: &str, body: &str| {
        let path = dir.path().join(name);
        fs::write(&path, body).expect("write fixture");
        path
    };
    let categories = write(
        "categories.csv",
        "id,label,cost\n100,A,1.0\n200,B,2.0\n300,C,0.5\n",
    );
    let edges = write("edges.csv", "parent,child\n100,200\n200,300\n");
    let pages = write("pages.csv", "category,page\n200,42\n");
    Workspace {
        dir,
        categories,
        edges,
        pages,
    }
}

fn run_json(ws: &Workspace, input: &[&Path], args: &[&str]) -> Value {
    let mut cmd = cargo_bin_cmd!("catgraph");
    cmd.env_remove("CATGRAPH_CONFIG")
        .env_remove("CATGRAPH_LOG")
        .arg("--config")
        .arg(ws.path("absent.toml"))
        .args(["--format", "json"]);
    if let [snapshot] = input {
        cmd.arg("--snapshot").arg(snapshot);
    } else {
        cmd.arg("--categories")
            .arg(&ws.categories)
            .arg("--edges")
            .arg(&ws.edges)
            .arg("--pages")
            .arg(&ws.pages);
    }
    let output = cmd
        .args(args)
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();
    serde_json::from_slice(&output).expect("valid json")
}

#[test]
fn stats_emits_json() {
    let ws = setup();
    let json = run_json(&ws, &[], &["stats"]);
    assert_eq!(json["categories"], 3);
    assert_eq!(json["edges"], 2);
    assert_eq!(json["page_memberships"], 1);
    assert_eq!(json["minimum_cost"], 0.5);
    assert_eq!(json["language"], "en");
}

#[test]
fn relation_commands_report_sparse_ids() {
    let ws = setup();
    let children = run_json(&ws, &[], &["children", "100"]);
    assert_eq!(children["relation"], "children");
    assert_eq!(children["items"], serde_json::json!([200]));

    let parents = run_json(&ws, &[], &["parents", "300"]);
    assert_eq!(parents["items"], serde_json::json!([200]));

    let pages = run_json(&ws, &[], &["pages", "200"]);
    assert_eq!(pages["items"], serde_json::json!([42]));
}

#[test]
fn unknown_id_is_not_an_error() {
    let ws = setup();
    let children = run_json(&ws, &[], &["children", "999"]);
    assert_eq!(children["known"], false);
    assert_eq!(children["items"], serde_json::json!([]));

    let lookup = run_json(&ws, &[], &["lookup", "999"]);
    assert_eq!(lookup["found"], false);
    assert!(lookup["index"].is_null());
}

#[test]
fn lookup_reports_dense_index() {
    let ws = setup();
    let lookup = run_json(&ws, &[], &["lookup", "300"]);
    assert_eq!(lookup["found"], true);
    assert_eq!(lookup["index"], 2);
    assert_eq!(lookup["label"], "C");
    assert_eq!(lookup["cost"], 0.5);
}

#[test]
fn export_then_load_snapshot() {
    let ws = setup();
    let out = ws.path("graph.snap");
    let report = run_json(&ws, &[], &["export", "--out", out.to_str().unwrap()]);
    assert_eq!(report["categories"], 3);
    assert_eq!(report["compressed"], true);
    assert!(out.exists(), "snapshot file should be created");

    let children = run_json(&ws, &[out.as_path()], &["children", "100"]);
    assert_eq!(children["items"], serde_json::json!([200]));
    let stats = run_json(&ws, &[out.as_path()], &["stats"]);
    assert_eq!(stats["minimum_cost"], 0.5);
}

#[test]
fn missing_input_fails() {
    let ws = setup();
    cargo_bin_cmd!("catgraph")
        .env_remove("CATGRAPH_CONFIG")
        .arg("--config")
        .arg(ws.path("absent.toml"))
        .arg("stats")
        .assert()
        .failure();
}

#[test]
fn config_file_supplies_sources() {
    let ws = setup();
    let config = ws.path("config.toml");
    fs::write(
        &config,
        format!(
            "[graph]\nlanguage = \"de\"\n\n[source]\ncategories = {:?}\nedges = {:?}\n",
            ws.categories, ws.edges
        ),
    )
    .unwrap();
    let output = cargo_bin_cmd!("catgraph")
        .env_remove("CATGRAPH_CONFIG")
        .arg("--config")
        .arg(&config)
        .args(["--format", "json", "stats"])
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();
    let json: Value = serde_json::from_slice(&output).expect("valid json");
    assert_eq!(json["language"], "de");
    assert_eq!(json["edges"], 2);
    assert_eq!(json["page_memberships"], 0);
}

#[test]
fn negative_uniform_cost_is_rejected() {
    let ws = setup();
    let output = cargo_bin_cmd!("catgraph")
        .env_remove("CATGRAPH_CONFIG")
        .arg("--config")
        .arg(ws.path("absent.toml"))
        .arg("--categories")
        .arg(&ws.categories)
        .arg("--uniform-cost=-1")
        .arg("stats")
        .assert()
        .failure()
        .get_output()
        .stderr
        .clone();
    let stderr = String::from_utf8_lossy(&output);
    assert!(stderr.contains("uniform cost must be finite"), "{stderr}");
}
