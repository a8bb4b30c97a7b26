use std::fs;
use std::path::{Path, PathBuf};

use assert_cmd::Command;
use predicates::prelude::*;
use predicates::str::contains;
use serde_json::Value;
use tempfile::{tempdir, TempDir};

const CSV: &str = "app,db_col,srv_col\nA,d1,s1\nB,d2,\nA,d3,s3\n";
const SCHEMA: &str = r#"{
  "APPLICATION_SERVICE_NAME": "app",
  "SERVICE_MAPPINGS": [
    {
      "DB_CI_NAME": "db_col",
      "DB_CI_TYPE": "",
      "SERVER_CI_NAME": "srv_col",
      "SERVER_CI_TYPE": "",
      "CLOUD_COMPONENT": "",
      "LOAD_BALANCER": ""
    }
  ]
}"#;

fn workspace() -> (TempDir, PathBuf) {
    let dir = tempdir().expect("temp dir");
    let csv_path = dir.path().join("input.csv");
    fs::write(&csv_path, CSV).expect("write csv");
    (dir, csv_path)
}

fn write(dir: &Path, name: &str, contents: &str) -> PathBuf {
    let path = dir.join(name);
    fs::write(&path, contents).expect("write file");
    path
}

fn bin() -> Command {
    let mut cmd = Command::cargo_bin("csv-schema-mapper").expect("binary exists");
    cmd.env_remove("LLM_MODEL")
        .env_remove("LLM_ENDPOINT")
        .env_remove("LLM_API_KEY");
    cmd
}

fn read_json(path: &Path) -> Value {
    serde_json::from_str(&fs::read_to_string(path).expect("read output")).expect("parse output")
}

#[test]
fn apply_groups_rows_by_service() {
    let (dir, csv_path) = workspace();
    let schema_path = write(dir.path(), "schema.json", SCHEMA);
    let output_path = dir.path().join("out.json");

    bin()
        .args(["apply", "--input"])
        .arg(&csv_path)
        .arg("--schema")
        .arg(&schema_path)
        .arg("--output")
        .arg(&output_path)
        .args(["--chunk-size", "1"])
        .assert()
        .success();

    let output = read_json(&output_path);
    let groups = output.as_array().expect("array");
    assert_eq!(groups.len(), 2);
    assert_eq!(groups[0]["APPLICATION_SERVICE_NAME"], "A");
    assert_eq!(groups[0]["SERVICE_MAPPINGS"][1]["DB_CI_NAME"], "d3");
    assert_eq!(groups[1]["APPLICATION_SERVICE_NAME"], "B");
    assert_eq!(groups[1]["SERVICE_MAPPINGS"][0]["SERVER_CI_NAME"], "");
}

#[test]
fn run_with_saved_response_writes_schema_and_output() {
    let (dir, csv_path) = workspace();
    let response_path = write(
        dir.path(),
        "response.txt",
        &format!("```json\n{}\n```", SCHEMA),
    );
    let output_path = dir.path().join("out.json");
    let schema_out = dir.path().join("inferred.json");

    bin()
        .args(["run", "--input"])
        .arg(&csv_path)
        .arg("--output")
        .arg(&output_path)
        .arg("--save-schema")
        .arg(&schema_out)
        .arg("--response-file")
        .arg(&response_path)
        .assert()
        .success();

    assert_eq!(read_json(&output_path).as_array().map(Vec::len), Some(2));
    assert_eq!(read_json(&schema_out)["APPLICATION_SERVICE_NAME"], "app");
}

#[test]
fn saved_response_overrides_model_from_environment() {
    let (dir, csv_path) = workspace();
    let response_path = write(dir.path(), "response.txt", SCHEMA);
    let output_path = dir.path().join("out.json");

    bin()
        .env("LLM_MODEL", "llama3")
        .env("LLM_ENDPOINT", "http://127.0.0.1:9/v1/chat/completions")
        .args(["run", "--input"])
        .arg(&csv_path)
        .arg("--output")
        .arg(&output_path)
        .arg("--response-file")
        .arg(&response_path)
        .assert()
        .success();

    assert_eq!(read_json(&output_path).as_array().map(Vec::len), Some(2));
}

#[test]
fn run_with_bad_response_leaves_no_output() {
    let (dir, csv_path) = workspace();
    let response_path = write(dir.path(), "response.txt", "Sorry, I can't help with that.");
    let output_path = dir.path().join("out.json");

    bin()
        .args(["run", "--input"])
        .arg(&csv_path)
        .arg("--output")
        .arg(&output_path)
        .arg("--response-file")
        .arg(&response_path)
        .assert()
        .failure()
        .stderr(contains("Malformed schema"));

    assert!(!output_path.exists());
}

#[test]
fn run_without_model_configuration_fails() {
    let (dir, csv_path) = workspace();
    bin()
        .args(["run", "--input"])
        .arg(&csv_path)
        .arg("--output")
        .arg(dir.path().join("out.json"))
        .assert()
        .failure()
        .stderr(contains("No model configured"));
}

#[test]
fn validate_strict_rejects_missing_column() {
    let (dir, csv_path) = workspace();
    let schema_path = write(
        dir.path(),
        "schema.json",
        &SCHEMA.replace(r#""LOAD_BALANCER": """#, r#""LOAD_BALANCER": "lb""#),
    );

    bin()
        .args(["validate", "--input"])
        .arg(&csv_path)
        .arg("--schema")
        .arg(&schema_path)
        .assert()
        .success();

    bin()
        .args(["validate", "--strict", "--input"])
        .arg(&csv_path)
        .arg("--schema")
        .arg(&schema_path)
        .assert()
        .failure()
        .stderr(contains("Column 'lb' not found"));
}

#[test]
fn validate_strict_lists_every_missing_column() {
    let (dir, csv_path) = workspace();
    let schema_path = write(
        dir.path(),
        "schema.json",
        &SCHEMA
            .replace(r#""CLOUD_COMPONENT": """#, r#""CLOUD_COMPONENT": "cloud""#)
            .replace(r#""LOAD_BALANCER": """#, r#""LOAD_BALANCER": "lb""#),
    );

    bin()
        .args(["validate", "--strict", "--input"])
        .arg(&csv_path)
        .arg("--schema")
        .arg(&schema_path)
        .assert()
        .failure()
        .stderr(contains("CLOUD_COMPONENT: Column 'cloud' not found"))
        .stderr(contains("LOAD_BALANCER: Column 'lb' not found"))
        .stderr(contains("failed with 2 error(s)"));
}

#[test]
fn prompt_prints_headers_and_samples() {
    let (_dir, csv_path) = workspace();
    bin()
        .args(["prompt", "--sample-rows", "1", "--input"])
        .arg(&csv_path)
        .assert()
        .success()
        .stdout(contains(r#"["app","db_col","srv_col"]"#))
        .stdout(contains(r#"["A","d1","s1"]"#))
        .stdout(contains(r#"["B","d2",""]"#).not());
}

#[test]
fn generated_template_is_a_loadable_schema() {
    let (dir, csv_path) = workspace();
    let template_path = dir.path().join("schema.jsonc");

    bin()
        .args(["generate-schema", "--output"])
        .arg(&template_path)
        .assert()
        .success();

    // The annotated template names columns this CSV does not have
    bin()
        .args(["validate", "--input"])
        .arg(&csv_path)
        .arg("--schema")
        .arg(&template_path)
        .assert()
        .failure()
        .stderr(contains("Application"));
}
