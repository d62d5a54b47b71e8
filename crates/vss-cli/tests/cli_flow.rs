//! Integration tests for the VSS CLI.
//!
//! These tests exercise the complete flow: seed the demo catalog, build
//! indexes, query, and drop. They run against the actual `vss` binary via
//! `assert_cmd`, pinned to a temporary data directory and the deterministic
//! mock embedding provider, so results are reproducible offline.

mod common;

use predicates::prelude::*;
use std::fs;
use tempfile::TempDir;

use common::vss_cmd;

fn seed_and_create(data_dir: &std::path::Path) {
    vss_cmd(data_dir).arg("seed").assert().success();
    vss_cmd(data_dir)
        .args(["create", "vss_products"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Published index `vss_products`"));
}

// ============================================================================
// Integration Tests
// ============================================================================

#[test]
fn test_seed_create_and_query_like() {
    let temp = TempDir::new().expect("create temp dir");
    let data = temp.path();

    vss_cmd(data)
        .arg("seed")
        .assert()
        .success()
        .stdout(predicate::str::contains("Seeded 7 demo products"));
    assert!(data.join("records.jsonl").exists());

    vss_cmd(data)
        .args(["create", "vss_products", "--metric", "l2"])
        .assert()
        .success()
        .stdout(predicate::str::contains("7 vectors"));
    assert!(data.join("indexes.json").exists());

    // Querying like a stored record returns the record itself first, at
    // distance zero.
    let output = vss_cmd(data)
        .args(["query", "vss_products", "--like", "id:7", "-k", "2", "--json"])
        .output()
        .expect("run query");
    assert!(output.status.success());

    let response: serde_json::Value =
        serde_json::from_slice(&output.stdout).expect("valid JSON response");
    assert_eq!(response["indexName"], "vss_products");
    assert_eq!(response["metric"], "l2");
    let results = response["results"].as_array().expect("results array");
    assert_eq!(results.len(), 2);
    assert_eq!(results[0]["id"], "id:7");
    assert_eq!(results[0]["distance"], 0.0);
    assert_ne!(results[1]["id"], "id:7");
}

#[test]
fn test_query_table_output_shows_attributes() {
    let temp = TempDir::new().expect("create temp dir");
    seed_and_create(temp.path());

    vss_cmd(temp.path())
        .args(["query", "vss_products", "--like", "id:7", "-k", "2"])
        .assert()
        .success()
        .stdout(predicate::str::contains("id:7"))
        .stdout(predicate::str::contains("Long boots"))
        .stdout(predicate::str::contains("2 matches in `vss_products`"));
}

#[test]
fn test_filter_returns_only_matching_category() {
    let temp = TempDir::new().expect("create temp dir");
    seed_and_create(temp.path());

    let output = vss_cmd(temp.path())
        .args([
            "query",
            "vss_products",
            "--text",
            "a purse for the office",
            "-k",
            "7",
            "--filter",
            "Category=Purse",
            "--json",
        ])
        .output()
        .expect("run query");
    assert!(output.status.success());

    let response: serde_json::Value =
        serde_json::from_slice(&output.stdout).expect("valid JSON response");
    let results = response["results"].as_array().expect("results array");

    // The catalog holds four purses; shoes never leak in.
    assert_eq!(results.len(), 4);
    for result in results {
        let id = result["id"].as_str().expect("id");
        assert!(["id:1", "id:3", "id:5", "id:6"].contains(&id));
    }
}

#[test]
fn test_k_above_population_clamps() {
    let temp = TempDir::new().expect("create temp dir");
    seed_and_create(temp.path());

    let output = vss_cmd(temp.path())
        .args(["query", "vss_products", "--like", "id:1", "-k", "50", "--json"])
        .output()
        .expect("run query");
    assert!(output.status.success());

    let response: serde_json::Value =
        serde_json::from_slice(&output.stdout).expect("valid JSON response");
    assert_eq!(response["results"].as_array().expect("results").len(), 7);
}

#[test]
fn test_drop_missing_index_is_tolerated() {
    let temp = TempDir::new().expect("create temp dir");

    vss_cmd(temp.path())
        .args(["drop", "missing"])
        .assert()
        .success()
        .stdout(predicate::str::contains("does not exist"));
}

#[test]
fn test_drop_existing_index() {
    let temp = TempDir::new().expect("create temp dir");
    seed_and_create(temp.path());

    vss_cmd(temp.path())
        .args(["drop", "vss_products"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Dropped index `vss_products`"));

    // The index is gone for subsequent queries.
    vss_cmd(temp.path())
        .args(["query", "vss_products", "--like", "id:1"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Index not found"));
}

#[test]
fn test_query_unknown_index_fails() {
    let temp = TempDir::new().expect("create temp dir");
    vss_cmd(temp.path()).arg("seed").assert().success();

    vss_cmd(temp.path())
        .args(["query", "nope", "--like", "id:1"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Index not found"));
}

#[test]
fn test_status_reports_counts() {
    let temp = TempDir::new().expect("create temp dir");
    seed_and_create(temp.path());

    let output = vss_cmd(temp.path())
        .args(["status", "--json"])
        .output()
        .expect("run status");
    assert!(output.status.success());

    let stats: serde_json::Value =
        serde_json::from_slice(&output.stdout).expect("valid JSON stats");
    assert_eq!(stats["records"], 7);
    assert_eq!(stats["vectors"], 7);
    let indexes = stats["indexes"].as_array().expect("indexes array");
    assert_eq!(indexes.len(), 1);
    assert_eq!(indexes[0]["name"], "vss_products");
    assert_eq!(indexes[0]["count"], 7);
}

#[test]
fn test_add_and_rm_roundtrip() {
    let temp = TempDir::new().expect("create temp dir");
    let data = temp.path();

    // Two records with explicit vectors; no embedding provider needed.
    let input = temp.path().join("input.jsonl");
    fs::write(
        &input,
        concat!(
            r#"{"record":{"id":"v:1","attrs":{"Category":{"tag":"Purse"}}},"vector":[0.0,0.0]}"#,
            "\n",
            r#"{"record":{"id":"v:2","attrs":{"Category":{"tag":"Shoes"}}},"vector":[1.0,0.0]}"#,
            "\n",
        ),
    )
    .expect("write input");

    vss_cmd(data)
        .arg("add")
        .arg(&input)
        .assert()
        .success()
        .stdout(predicate::str::contains("Added 2 records"));

    vss_cmd(data)
        .args(["create", "small"])
        .assert()
        .success()
        .stdout(predicate::str::contains("2 vectors, dim 2"));

    let output = vss_cmd(data)
        .args(["query", "small", "--vector", "0.0,0.1", "-k", "1", "--json"])
        .output()
        .expect("run query");
    assert!(output.status.success());
    let response: serde_json::Value =
        serde_json::from_slice(&output.stdout).expect("valid JSON response");
    assert_eq!(response["results"][0]["id"], "v:1");

    vss_cmd(data)
        .args(["rm", "v:1"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Removed 1 of 1"));

    // Rebuild picks up the removal.
    vss_cmd(data).args(["create", "small"]).assert().success();
    let output = vss_cmd(data)
        .args(["status", "--json"])
        .output()
        .expect("run status");
    let stats: serde_json::Value =
        serde_json::from_slice(&output.stdout).expect("valid JSON stats");
    assert_eq!(stats["records"], 1);
    assert_eq!(stats["indexes"][0]["count"], 1);
}

#[test]
fn test_ivf_create_and_query() {
    let temp = TempDir::new().expect("create temp dir");
    let data = temp.path();
    vss_cmd(data).arg("seed").assert().success();

    vss_cmd(data)
        .args([
            "create",
            "vss_products",
            "--algorithm",
            "ivf",
            "--partitions",
            "3",
        ])
        .assert()
        .success()
        .stdout(predicate::str::contains("ivf_flat"));

    // Probing every partition behaves like exact search.
    let output = vss_cmd(data)
        .args([
            "query",
            "vss_products",
            "--like",
            "id:2",
            "-k",
            "7",
            "--nprobe",
            "3",
            "--json",
        ])
        .output()
        .expect("run query");
    assert!(output.status.success());
    let response: serde_json::Value =
        serde_json::from_slice(&output.stdout).expect("valid JSON response");
    assert_eq!(response["results"].as_array().expect("results").len(), 7);
    assert_eq!(response["results"][0]["id"], "id:2");
}
