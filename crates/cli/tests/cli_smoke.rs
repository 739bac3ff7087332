use assert_cmd::Command;
use pretty_assertions::assert_eq;
use serde_json::Value;
use std::fs;
use tempfile::TempDir;

const BATCH: &str = r#"{
  "classes": [
    {"name": "User", "source": "static"},
    {"name": "User", "superclass": "ApplicationRecord", "source": "runtime"},
    {"name": "ApplicationRecord"},
    {"name": "UserMailer", "dependencies": ["User"]},
    {"name": "Signup", "dependencies": ["UserMailer"]},
    {"name": "A", "dependencies": ["B"]},
    {"name": "B", "dependencies": ["A"]}
  ],
  "methods": [
    {"name": "save", "owner": "User", "scope": "instance", "visibility": "public"}
  ]
}"#;

fn workspace() -> (TempDir, String) {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("batch.json");
    fs::write(&path, BATCH).unwrap();
    let path = path.to_string_lossy().into_owned();
    (dir, path)
}

fn cli() -> Command {
    Command::cargo_bin("context-symbols").unwrap()
}

fn stdout_of(args: &[&str]) -> String {
    let output = cli().args(args).output().unwrap();
    assert!(
        output.status.success(),
        "stderr: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    String::from_utf8(output.stdout).unwrap()
}

#[test]
fn resolve_prints_merged_result() {
    let (_dir, input) = workspace();
    let value: Value = serde_json::from_str(&stdout_of(&["resolve", "--input", &input])).unwrap();

    let users: Vec<&Value> = value["classes"]
        .as_array()
        .unwrap()
        .iter()
        .filter(|c| c["fqname"] == "User")
        .collect();
    assert_eq!(users.len(), 1);
    assert_eq!(users[0]["superclass"], "ApplicationRecord");
    assert_eq!(
        users[0]["provenance"]["sources"],
        serde_json::json!(["runtime", "static"])
    );
}

#[test]
fn resolve_reads_stdin() {
    let output = cli()
        .args(["resolve", "--input", "-"])
        .write_stdin(r#"{"modules": [{"name": "Helpers"}]}"#)
        .output()
        .unwrap();
    assert!(output.status.success());
    let value: Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(value["modules"][0]["fqname"], "Helpers");
}

#[test]
fn summary_reports_counts_and_findings() {
    let (_dir, input) = workspace();
    let stdout = stdout_of(&["summary", "--input", &input]);
    let first = stdout.lines().next().unwrap();
    assert!(first.starts_with("classes=6 modules=0 methods=1"), "{first}");
    assert!(stdout.contains("warning: dependency cycle: A -> B -> A"));
}

#[test]
fn dependents_follow_hops() {
    let (_dir, input) = workspace();
    assert_eq!(
        stdout_of(&["dependents", "User", "--input", &input]),
        "UserMailer\t1\n"
    );
    assert_eq!(
        stdout_of(&["dependents", "User", "--hops", "2", "--input", &input]),
        "Signup\t2\nUserMailer\t1\n"
    );
}

#[test]
fn dependents_of_unknown_symbol_fails() {
    let (_dir, input) = workspace();
    cli()
        .args(["dependents", "Nope", "--input", &input])
        .assert()
        .failure();
}

#[test]
fn cycles_and_search() {
    let (_dir, input) = workspace();
    assert_eq!(
        stdout_of(&["cycles", "--input", &input]),
        "dependency: A -> B -> A\n"
    );

    let search: Value =
        serde_json::from_str(&stdout_of(&["search", "user", "--input", &input])).unwrap();
    assert_eq!(search["hits"][0]["fqname"], "User");
    assert_eq!(search["hits"][0]["match_kind"], "exact");
}

#[test]
fn schema_describes_the_batch() {
    let schema: Value = serde_json::from_str(&stdout_of(&["schema"])).unwrap();
    assert!(schema["properties"]["classes"].is_object());
}

#[test]
fn bad_container_is_an_error() {
    cli()
        .args(["resolve", "--input", "-"])
        .write_stdin("[1, 2, 3]")
        .assert()
        .failure();
}

#[test]
fn invalid_config_is_rejected() {
    let (dir, input) = workspace();
    let config = dir.path().join("resolver.toml");
    fs::write(&config, "[confidence]\nbase = -1.0\n").unwrap();

    cli()
        .args(["summary", "--config", config.to_str().unwrap(), "--input", &input])
        .assert()
        .failure();
}
