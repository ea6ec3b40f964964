//! Integration tests for the ragbridge binary
//!
//! None of these reach a real RAGFlow service: they rely on incomplete
//! configuration or an unreachable endpoint, both of which must leave
//! requests untouched.

use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use tempfile::TempDir;

fn ragbridge_cmd() -> Command {
    let mut cmd = Command::cargo_bin("ragbridge").unwrap();
    cmd.env_remove("RAGBRIDGE_BASE_URL")
        .env_remove("RAGBRIDGE_API_KEY")
        .env_remove("RAGBRIDGE_KB_IDS")
        .env_remove("RUST_LOG");
    cmd
}

fn write_config(dir: &TempDir, content: &str) -> String {
    let path = dir.path().join("config.yml");
    fs::write(&path, content).unwrap();
    path.to_str().unwrap().to_string()
}

const REQUEST: &str = r#"{
  "original_query": "What is the capital of France?",
  "system_prompt": "You are a helpful assistant.",
  "conversation_history": [{"role": "user", "content": "Hi"}],
  "contexts": []
}"#;

#[test]
fn test_config_masks_api_key() {
    let dir = TempDir::new().unwrap();
    let config = write_config(
        &dir,
        "ragflow_api_key: \"ragflow-verysecretvalue\"\nragflow_kb_ids: [\"kb-0123456789\"]\n",
    );

    ragbridge_cmd()
        .arg("--config")
        .arg(&config)
        .arg("config")
        .assert()
        .success()
        .stdout(predicate::str::contains("******tvalue"))
        .stdout(predicate::str::contains("ragflow-verysecretvalue").not())
        .stdout(predicate::str::contains("system_prompt"));
}

#[test]
fn test_config_json_output() {
    let dir = TempDir::new().unwrap();
    let config = write_config(&dir, "rag_injection_method: user_prompt\n");

    let output = ragbridge_cmd()
        .arg("--config")
        .arg(&config)
        .arg("--format")
        .arg("json")
        .arg("config")
        .output()
        .unwrap();
    assert!(output.status.success());

    let json: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(json["rag_injection_method"], "user_prompt");
    assert_eq!(json["ragflow_base_url"], "http://127.0.0.1:8000/");
}

#[test]
fn test_invalid_injection_method_fails_at_startup() {
    let dir = TempDir::new().unwrap();
    let config = write_config(&dir, "rag_injection_method: everywhere\n");

    ragbridge_cmd()
        .arg("--config")
        .arg(&config)
        .arg("config")
        .assert()
        .code(3)
        .stderr(predicate::str::contains("Configuration error"));
}

#[test]
fn test_augment_incomplete_config_passes_through() {
    let dir = TempDir::new().unwrap();
    let config = write_config(&dir, "");

    let output = ragbridge_cmd()
        .arg("--config")
        .arg(&config)
        .arg("augment")
        .write_stdin(REQUEST)
        .output()
        .unwrap();
    assert!(output.status.success());

    let before: serde_json::Value = serde_json::from_str(REQUEST).unwrap();
    let after: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(before, after);
}

#[test]
fn test_augment_unreachable_service_passes_through() {
    let dir = TempDir::new().unwrap();
    let config = write_config(
        &dir,
        "ragflow_base_url: \"http://127.0.0.1:9/\"\n\
         ragflow_api_key: \"key\"\n\
         ragflow_kb_ids: [\"kb\"]\n\
         retrieval:\n  timeout_secs: 2\n",
    );
    let request_path = dir.path().join("request.json");
    fs::write(&request_path, REQUEST).unwrap();

    let output = ragbridge_cmd()
        .arg("--config")
        .arg(&config)
        .arg("augment")
        .arg(&request_path)
        .arg("--method")
        .arg("insert-system-prompt")
        .output()
        .unwrap();
    assert!(output.status.success());

    let before: serde_json::Value = serde_json::from_str(REQUEST).unwrap();
    let after: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(before, after);
}

#[test]
fn test_retrieve_without_results() {
    let dir = TempDir::new().unwrap();
    let config = write_config(&dir, "");

    ragbridge_cmd()
        .arg("--config")
        .arg(&config)
        .arg("retrieve")
        .arg("sai's")
        .arg("story")
        .assert()
        .success()
        .stdout(predicate::str::contains("No relevant content found."));
}

#[test]
fn test_retrieve_requires_question() {
    ragbridge_cmd().arg("retrieve").assert().failure();
}
