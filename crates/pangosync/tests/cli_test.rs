//! Integration tests for the `pangosync` CLI binary.
//!
//! Argument parsing, help, completions, and settings handling run without
//! any server; the end-to-end cases point the binary at a wiremock
//! Pangolin API.
#![allow(clippy::unwrap_used)]

use std::io::Write as _;

use assert_cmd::cargo::cargo_bin_cmd;
use predicates::prelude::*;
use serde_json::json;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

// ── Helpers ─────────────────────────────────────────────────────────

/// Build a [`Command`] for the `pangosync` binary with env isolation.
///
/// Clears all `PANGOSYNC_*` env vars and points config directories at a
/// nonexistent path so tests never touch the user's real settings.
fn pangosync_cmd() -> assert_cmd::Command {
    let mut cmd = cargo_bin_cmd!("pangosync");
    cmd.env("HOME", "/tmp/pangosync-cli-test-nonexistent")
        .env("XDG_CONFIG_HOME", "/tmp/pangosync-cli-test-nonexistent")
        .env_remove("RUST_LOG")
        .env_remove("PANGOSYNC_CONFIG")
        .env_remove("PANGOSYNC_API_URL")
        .env_remove("PANGOSYNC_ORG_ID")
        .env_remove("PANGOSYNC_API_KEY")
        .env_remove("PANGOSYNC_OUTPUT")
        .env_remove("PANGOSYNC_INSECURE")
        .env_remove("PANGOSYNC_TIMEOUT")
        .env_remove("PANGOSYNC_STRICT")
        .env_remove("PANGOSYNC_ON_EXISTING");
    cmd
}

/// Concatenate stdout + stderr from a command output for flexible matching.
fn combined_output(output: &std::process::Output) -> String {
    let stdout = String::from_utf8_lossy(&output.stdout);
    let stderr = String::from_utf8_lossy(&output.stderr);
    format!("{stdout}{stderr}")
}

fn settings_file(contents: &str) -> tempfile::NamedTempFile {
    let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
    file.write_all(contents.as_bytes()).unwrap();
    file
}

fn ok(data: serde_json::Value) -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_json(json!({ "success": true, "data": data }))
}

/// Mount the three listings the resource cache is built from.
async fn mount_listings(server: &MockServer, resources: serde_json::Value) {
    Mock::given(method("GET"))
        .and(path("/v1/org/home/resources"))
        .respond_with(ok(json!({ "resources": resources })))
        .mount(server)
        .await;
    Mock::given(method("GET"))
        .and(path("/v1/org/home/domains"))
        .respond_with(ok(json!({
            "domains": [{ "domainId": "d-1", "baseDomain": "example.com" }]
        })))
        .mount(server)
        .await;
    Mock::given(method("GET"))
        .and(path("/v1/org/home/sites"))
        .respond_with(ok(json!({
            "sites": [{ "siteId": 3, "name": "site-a", "niceId": "brave-otter" }]
        })))
        .mount(server)
        .await;
}

fn server_settings(server: &MockServer, extra: &str) -> tempfile::NamedTempFile {
    settings_file(&format!(
        "api_url = \"{}/v1\"\norg_id = \"home\"\napi_key = \"secret-key\"\n{extra}",
        server.uri()
    ))
}

// ── Basic invocation ────────────────────────────────────────────────

#[test]
fn test_no_args_shows_help() {
    let output = pangosync_cmd().output().unwrap();
    assert_eq!(output.status.code(), Some(2), "Expected exit code 2");
    let text = combined_output(&output);
    assert!(text.contains("Usage"), "Expected 'Usage' in output:\n{text}");
}

#[test]
fn test_help_flag() {
    pangosync_cmd().arg("--help").assert().success().stdout(
        predicate::str::contains("Pangolin")
            .and(predicate::str::contains("sync"))
            .and(predicate::str::contains("resources"))
            .and(predicate::str::contains("hosts")),
    );
}

#[test]
fn test_version_flag() {
    pangosync_cmd()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("pangosync"));
}

#[test]
fn test_sync_help_lists_flags() {
    pangosync_cmd().args(["sync", "--help"]).assert().success().stdout(
        predicate::str::contains("--cleanup")
            .and(predicate::str::contains("--update"))
            .and(predicate::str::contains("--strict")),
    );
}

#[test]
fn test_invalid_subcommand() {
    pangosync_cmd()
        .arg("frobnicate")
        .assert()
        .failure()
        .code(2);
}

#[test]
fn test_cleanup_flags_conflict() {
    pangosync_cmd()
        .args(["sync", "--cleanup", "--no-cleanup"])
        .assert()
        .failure()
        .code(2);
}

// ── Shell completions ───────────────────────────────────────────────

#[test]
fn test_completions_bash() {
    pangosync_cmd()
        .args(["completions", "bash"])
        .assert()
        .success()
        .stdout(predicate::str::is_empty().not());
}

#[test]
fn test_completions_zsh() {
    pangosync_cmd()
        .args(["completions", "zsh"])
        .assert()
        .success()
        .stdout(predicate::str::contains("pangosync"));
}

#[test]
fn test_completions_fish() {
    pangosync_cmd()
        .args(["completions", "fish"])
        .assert()
        .success()
        .stdout(predicate::str::is_empty().not());
}

// ── Settings ────────────────────────────────────────────────────────

#[test]
fn test_missing_settings_is_config_error() {
    let output = pangosync_cmd().arg("resources").output().unwrap();
    assert_eq!(output.status.code(), Some(4));
    let text = combined_output(&output);
    assert!(
        text.contains("Settings file not found"),
        "Expected missing-settings message:\n{text}"
    );
}

#[test]
fn test_explicit_missing_settings_file() {
    pangosync_cmd()
        .args(["--config", "/tmp/pangosync-cli-test-nonexistent/nope.toml", "sites"])
        .assert()
        .failure()
        .code(4);
}

#[test]
fn test_invalid_api_url_setting() {
    let file = settings_file("api_url = \"not a url\"\norg_id = \"home\"\n");
    pangosync_cmd()
        .arg("--config")
        .arg(file.path())
        .arg("domains")
        .assert()
        .failure()
        .code(4)
        .stderr(predicate::str::contains("api_url"));
}

#[test]
fn test_missing_api_key_is_auth_error() {
    let file = settings_file("api_url = \"http://127.0.0.1:9/v1\"\norg_id = \"home\"\n");
    pangosync_cmd()
        .arg("--config")
        .arg(file.path())
        .arg("sites")
        .assert()
        .failure()
        .code(3);
}

#[test]
fn test_config_path_prints_override() {
    pangosync_cmd()
        .args(["--config", "/etc/pangosync/custom.toml", "config", "path"])
        .assert()
        .success()
        .stdout(predicate::str::contains("/etc/pangosync/custom.toml"));
}

#[test]
fn test_config_show_redacts_api_key() {
    let file = settings_file(
        "api_url = \"https://pangolin.example.com/v1\"\n\
         org_id = \"home\"\n\
         api_key = \"super-secret\"\n",
    );
    pangosync_cmd()
        .arg("--config")
        .arg(file.path())
        .args(["config", "show"])
        .assert()
        .success()
        .stdout(
            predicate::str::contains("********")
                .and(predicate::str::contains("pangolin.example.com"))
                .and(predicate::str::contains("super-secret").not()),
        );
}

#[test]
fn test_hosts_unknown_site() {
    let file = settings_file("api_url = \"https://pangolin.example.com/v1\"\norg_id = \"home\"\n");
    pangosync_cmd()
        .arg("--config")
        .arg(file.path())
        .args(["hosts", "--site", "nowhere"])
        .assert()
        .failure()
        .code(4)
        .stderr(predicate::str::contains("nowhere"));
}

// ── Against a mock Pangolin ─────────────────────────────────────────

#[tokio::test(flavor = "multi_thread")]
async fn test_resources_json_lists_cache() {
    let server = MockServer::start().await;
    mount_listings(
        &server,
        json!([{
            "resourceId": 1,
            "name": "grafana.example.com",
            "http": true,
            "protocol": "tcp",
            "fullDomain": "grafana.example.com",
            "siteId": 3
        }]),
    )
    .await;
    let file = server_settings(&server, "");

    pangosync_cmd()
        .arg("--config")
        .arg(file.path())
        .args(["resources", "-o", "json"])
        .assert()
        .success()
        .stdout(
            predicate::str::contains("grafana.example.com")
                .and(predicate::str::contains("site-a")),
        );
}

#[tokio::test(flavor = "multi_thread")]
async fn test_sync_creates_static_tcp_forward() {
    let server = MockServer::start().await;
    mount_listings(&server, json!([])).await;
    Mock::given(method("PUT"))
        .and(path("/v1/org/home/site/3/resource"))
        .respond_with(ok(json!({ "resourceId": 42 })))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("PUT"))
        .and(path("/v1/resource/42/target"))
        .respond_with(ok(json!({ "targetId": 9 })))
        .expect(1)
        .mount(&server)
        .await;
    let file = server_settings(
        &server,
        "[[static_tcp_forwards]]\n\
         site_name = \"site-a\"\n\
         source_port = 5000\n\
         target_host = \"10.0.0.8\"\n\
         target_port = 5000\n",
    );

    pangosync_cmd()
        .arg("--config")
        .arg(file.path())
        .args(["sync", "-o", "plain"])
        .assert()
        .success()
        .stdout(predicate::str::contains("created"));
}

#[tokio::test(flavor = "multi_thread")]
async fn test_sync_strict_exits_six_on_failure() {
    let server = MockServer::start().await;
    mount_listings(&server, json!([])).await;
    Mock::given(method("PUT"))
        .and(path("/v1/org/home/site/3/resource"))
        .respond_with(ResponseTemplate::new(500).set_body_json(json!({
            "success": false,
            "message": "boom"
        })))
        .mount(&server)
        .await;
    let file = server_settings(
        &server,
        "[[static_tcp_forwards]]\n\
         site_name = \"site-a\"\n\
         source_port = 5000\n\
         target_host = \"10.0.0.8\"\n\
         target_port = 5000\n",
    );

    // Without --strict a failed forward is reported but the run succeeds
    pangosync_cmd()
        .arg("--config")
        .arg(file.path())
        .args(["sync", "-o", "plain"])
        .assert()
        .success()
        .stdout(predicate::str::contains("failed"));

    pangosync_cmd()
        .arg("--config")
        .arg(file.path())
        .args(["sync", "--strict", "-o", "plain"])
        .assert()
        .failure()
        .code(6);
}

#[tokio::test(flavor = "multi_thread")]
async fn test_sync_continues_when_resources_unavailable() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v1/org/home/resources"))
        .respond_with(ResponseTemplate::new(500).set_body_string("down"))
        .mount(&server)
        .await;
    let file = server_settings(&server, "cleanup_orphaned_resources = true\n");

    pangosync_cmd()
        .arg("--config")
        .arg(file.path())
        .arg("sync")
        .assert()
        .success()
        .stdout(
            predicate::str::contains("resource snapshot unavailable")
                .and(predicate::str::contains("cleanup skipped")),
        );

    pangosync_cmd()
        .arg("--config")
        .arg(file.path())
        .args(["sync", "--strict"])
        .assert()
        .failure()
        .code(6);

    pangosync_cmd()
        .arg("--config")
        .arg(file.path())
        .arg("resources")
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("Could not load resources"));
}
