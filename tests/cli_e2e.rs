//! End-to-end CLI tests for the liquipedia-fetch binary.

// `Command::cargo_bin` is deprecated in assert_cmd >=2.0.17 in favor of
// `cargo::cargo_bin_cmd!` macro. Suppressed until migration to the new API.
#![allow(deprecated)]

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;
use wiremock::matchers::{method, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Command with config lookup pointed at an empty directory.
fn isolated_command(config_home: &TempDir) -> Command {
    let mut cmd = Command::cargo_bin("liquipedia-fetch").unwrap();
    cmd.env("XDG_CONFIG_HOME", config_home.path())
        .env("HOME", config_home.path())
        .env_remove("RUST_LOG");
    cmd
}

async fn mount_team_liquid(mock_server: &MockServer) {
    Mock::given(method("GET"))
        .and(query_param("action", "parse"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "parse": {"text": {"*": "<html>stub</html>"}}
        })))
        .mount(mock_server)
        .await;
    Mock::given(method("GET"))
        .and(query_param("prop", "revisions"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "query": {"pages": {"500": {"revisions": [{"slots": {"main": {"*": "{{Infobox}}"}}}]}}}
        })))
        .mount(mock_server)
        .await;
    Mock::given(method("GET"))
        .and(query_param("action", "query"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "query": {"pages": {"500": {"ns": 0, "title": "Team Liquid"}}}
        })))
        .mount(mock_server)
        .await;
}

#[test]
fn test_binary_help_lists_options() {
    let config_home = TempDir::new().unwrap();
    isolated_command(&config_home)
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("--cache-dir"))
        .stdout(predicate::str::contains("--json"));
}

#[test]
fn test_binary_rejects_foreign_origin() {
    let config_home = TempDir::new().unwrap();
    isolated_command(&config_home)
        .arg("-q")
        .arg("https://example.com/dota2/Team_Liquid")
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("origin mismatch"));
}

#[test]
fn test_binary_rejects_unknown_config_key() {
    let config_home = TempDir::new().unwrap();
    let config_path = config_home.path().join("custom.toml");
    std::fs::write(&config_path, "concurrency = 4\n").unwrap();

    isolated_command(&config_home)
        .arg("--config")
        .arg(&config_path)
        .arg("https://liquipedia.net/dota2/Team_Liquid")
        .assert()
        .failure()
        .stderr(predicate::str::contains("Unknown configuration key"));
}

#[tokio::test]
async fn test_binary_prints_json_bundle() {
    let mock_server = MockServer::start().await;
    mount_team_liquid(&mock_server).await;

    let config_home = TempDir::new().unwrap();
    let output = isolated_command(&config_home)
        .arg("-q")
        .arg("--json")
        .arg("--origin")
        .arg(mock_server.uri())
        .arg(format!("{}/dota2/Team_Liquid", mock_server.uri()))
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();

    let bundle: serde_json::Value = serde_json::from_slice(&output).unwrap();
    assert_eq!(bundle["renderedMarkup"], "<html>stub</html>");
    assert_eq!(bundle["rawMarkup"], "{{Infobox}}");
    assert_eq!(bundle["gameNamespace"], "dota2");
    assert_eq!(bundle["pageId"], "500");
}

#[tokio::test]
async fn test_binary_uses_config_file_and_cache_dir() {
    let mock_server = MockServer::start().await;
    mount_team_liquid(&mock_server).await;

    let config_home = TempDir::new().unwrap();
    let cache_dir = config_home.path().join("cache");
    let config_dir = config_home.path().join("liquipedia-fetch");
    std::fs::create_dir_all(&config_dir).unwrap();
    std::fs::write(
        config_dir.join("config.toml"),
        format!(
            "api_base_url = \"{}\"\ncache_dir = \"{}\"\n",
            mock_server.uri(),
            cache_dir.display()
        ),
    )
    .unwrap();

    isolated_command(&config_home)
        .arg("-q")
        .arg("https://liquipedia.net/dota2/Team_Liquid")
        .assert()
        .success()
        .stdout(predicate::str::contains("page id:   500"));

    assert!(cache_dir.join("500-html.text").exists());
    assert!(cache_dir.join("500-wikitext.text").exists());
}
