//! Integration tests for the `solarpoll` binary.
//!
//! Config commands run against temp files; `once` runs against a wiremock
//! server standing in for the monitoring API.
#![allow(clippy::unwrap_used)]

use std::io::Write;
use std::path::Path;

use assert_cmd::cargo::cargo_bin_cmd;
use predicates::prelude::*;
use serde_json::json;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

// ── Helpers ─────────────────────────────────────────────────────────

/// Build a command with env isolation so tests never read a real config.
fn solarpoll_cmd() -> assert_cmd::Command {
    let mut cmd = cargo_bin_cmd!("solarpoll");
    cmd.env("HOME", "/tmp/solarpoll-cli-test-nonexistent")
        .env("XDG_CONFIG_HOME", "/tmp/solarpoll-cli-test-nonexistent")
        .env_remove("SOLARPOLL_CONFIG")
        .env_remove("SOLARPOLL_API_KEY")
        .env_remove("SOLARPOLL_INTERVAL")
        .env_remove("SOLARPOLL_OUTPUT")
        .env_remove("RUST_LOG");
    cmd
}

fn write_config(contents: &str) -> tempfile::NamedTempFile {
    let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
    file.write_all(contents.as_bytes()).unwrap();
    file
}

fn input_config(api_base: &str, name: &str) -> String {
    format!(
        r#"
[[inputs]]
name = "{name}"
site_id = "4242"
serial_number = "7E1A2B3C-9F"
api_key = "cli-secret"
time_zone = "UTC"
api_base = "{api_base}"
"#
    )
}

fn body() -> serde_json::Value {
    json!({
        "data": {
            "count": 2,
            "telemetries": [
                {
                    "date": "2024-06-15 10:00:00",
                    "totalActivePower": 2048.0,
                    "inverterMode": "MPPT",
                    "L1Data": { "acVoltage": 230.4, "cosPhi": 0.98 }
                },
                {
                    "date": "2024-06-15 10:05:00",
                    "totalActivePower": 2100.5,
                    "inverterMode": "MPPT",
                    "L1Data": { "acVoltage": 231.0, "cosPhi": 0.97 }
                }
            ]
        }
    })
}

async fn mock_api(status: u16) -> MockServer {
    let server = MockServer::start().await;
    let template = if status == 200 {
        ResponseTemplate::new(200).set_body_json(body())
    } else {
        ResponseTemplate::new(status)
    };
    Mock::given(method("GET"))
        .and(path("/equipment/4242/7E1A2B3C-9F/data"))
        .and(query_param("api_key", "cli-secret"))
        .respond_with(template)
        .mount(&server)
        .await;
    server
}

/// Run the binary off the async runtime so wiremock keeps serving.
async fn run_once(config: &Path, extra: &[&str]) -> std::process::Output {
    let config = config.to_path_buf();
    let extra: Vec<String> = extra.iter().map(|s| (*s).to_owned()).collect();
    tokio::task::spawn_blocking(move || {
        solarpoll_cmd()
            .arg("--config")
            .arg(&config)
            .arg("once")
            .args(&extra)
            .output()
            .unwrap()
    })
    .await
    .unwrap()
}

// ── Basic invocation ────────────────────────────────────────────────

#[test]
fn test_no_args_shows_help() {
    let output = solarpoll_cmd().output().unwrap();
    assert_eq!(output.status.code(), Some(2));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("Usage"), "Expected usage in:\n{stderr}");
}

#[test]
fn test_help_lists_commands() {
    solarpoll_cmd().arg("--help").assert().success().stdout(
        predicate::str::contains("run")
            .and(predicate::str::contains("once"))
            .and(predicate::str::contains("config")),
    );
}

#[test]
fn test_version_flag() {
    solarpoll_cmd()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("solarpoll"));
}

// ── Config commands ─────────────────────────────────────────────────

#[test]
fn test_config_sample_prints_inputs_table() {
    solarpoll_cmd()
        .args(["config", "sample"])
        .assert()
        .success()
        .stdout(
            predicate::str::contains("[[inputs]]")
                .and(predicate::str::contains("site_id"))
                .and(predicate::str::contains("time_zone")),
        );
}

#[test]
fn test_config_show_redacts_api_key() {
    let file = write_config(&input_config("https://monitoringapi.solaredge.com", "roof"));
    solarpoll_cmd()
        .arg("--config")
        .arg(file.path())
        .args(["config", "show"])
        .assert()
        .success()
        .stdout(
            predicate::str::contains("site_id = \"4242\"")
                .and(predicate::str::contains("********"))
                .and(predicate::str::contains("cli-secret").not()),
        );
}

#[test]
fn test_missing_config_file_exits_not_found() {
    solarpoll_cmd()
        .args(["--config", "/tmp/solarpoll-cli-test-nonexistent/nope.toml"])
        .args(["config", "show"])
        .assert()
        .code(4)
        .stderr(predicate::str::contains("not found"));
}

#[test]
fn test_invalid_input_exits_usage() {
    let file = write_config(
        r#"
[[inputs]]
site_id = ""
serial_number = "A"
api_key = "k"
"#,
    );
    solarpoll_cmd()
        .arg("--config")
        .arg(file.path())
        .arg("once")
        .assert()
        .code(2)
        .stderr(predicate::str::contains("site_id"));
}

#[test]
fn test_missing_api_key_exits_auth() {
    let file = write_config(
        r#"
[[inputs]]
name = "roof"
site_id = "1"
serial_number = "A"
"#,
    );
    solarpoll_cmd()
        .arg("--config")
        .arg(file.path())
        .arg("once")
        .assert()
        .code(3)
        .stderr(predicate::str::contains("roof"));
}

// ── once ────────────────────────────────────────────────────────────

#[tokio::test(flavor = "multi_thread")]
async fn test_once_writes_line_protocol() {
    let server = mock_api(200).await;
    let file = write_config(&input_config(&server.uri(), "solaredge"));

    let output = run_once(file.path(), &[]).await;
    assert!(output.status.success(), "{output:?}");

    let stdout = String::from_utf8(output.stdout).unwrap();
    let lines: Vec<&str> = stdout.lines().collect();
    assert_eq!(lines.len(), 2, "{stdout}");
    assert!(lines[0].starts_with("solaredge response_time="));
    assert!(lines[0].contains("totalActivePower=2048"));
    assert!(lines[0].contains("inverterMode=\"MPPT\""));
    assert!(lines[0].ends_with(" 1718445600000000000"));
    assert!(lines[1].contains("totalActivePower=2100.5"));
}

#[tokio::test(flavor = "multi_thread")]
async fn test_once_json_output() {
    let server = mock_api(200).await;
    let file = write_config(&input_config(&server.uri(), "roof"));

    let output = run_once(file.path(), &["--output", "json"]).await;
    assert!(output.status.success(), "{output:?}");

    let stdout = String::from_utf8(output.stdout).unwrap();
    let first: serde_json::Value = serde_json::from_str(stdout.lines().next().unwrap()).unwrap();
    assert_eq!(first["measurement"], "roof");
    assert_eq!(first["fields"]["acVoltage"], 230.4);
    assert_eq!(first["timestamp"], "2024-06-15T10:00:00Z");
}

#[tokio::test(flavor = "multi_thread")]
async fn test_once_unknown_input_name() {
    let server = mock_api(200).await;
    let file = write_config(&input_config(&server.uri(), "roof"));

    let output = run_once(file.path(), &["--input", "garage"]).await;
    assert_eq!(output.status.code(), Some(4));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("garage"), "{stderr}");
    assert!(server.received_requests().await.unwrap().is_empty());
}

#[tokio::test(flavor = "multi_thread")]
async fn test_once_server_error_fails_without_output() {
    let server = mock_api(503).await;
    let file = write_config(&input_config(&server.uri(), "roof"));

    let output = run_once(file.path(), &[]).await;
    assert_eq!(output.status.code(), Some(1));
    assert!(output.stdout.is_empty());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("roof"), "{stderr}");
    assert!(!stderr.contains("cli-secret"), "{stderr}");
}
