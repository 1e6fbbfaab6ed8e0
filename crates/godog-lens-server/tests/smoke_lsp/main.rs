//! End-to-end smoke tests for the `godog-lens-lsp` binary.
//!
//! These tests start the language server as a child process and talk to it
//! over stdin/stdout, covering CLI parsing, the lifecycle handshake, index
//! construction and the request handlers.

#![expect(
    clippy::expect_used,
    clippy::indexing_slicing,
    reason = "smoke tests use explicit panics and indexing for clarity"
)]

mod wire;

use std::path::PathBuf;

use lsp_types::Url;
use serde_json::{Value, json};
use tempfile::TempDir;

use wire::LspClient;

const LOGIN_FEATURE: &str = concat!(
    "Feature: Login\n",
    "  Scenario: Valid creds\n",
    "    Given a user\n",
    "  Scenario: Bad creds\n",
);

fn module_with_login_feature(dir: &TempDir) -> PathBuf {
    let features = dir.path().join("features");
    std::fs::create_dir_all(&features).expect("create features dir");
    std::fs::write(dir.path().join("go.mod"), "module example.com/demo\n").expect("write go.mod");
    let path = features.join("login.feature");
    std::fs::write(&path, LOGIN_FEATURE).expect("write feature");
    path
}

fn start(dir: &TempDir, options: Value) -> LspClient {
    let root_uri = Url::from_directory_path(dir.path()).expect("dir URI");
    let mut client = LspClient::spawn(&[]);
    client.initialize(root_uri.as_str(), options);
    client
}

#[test]
fn smoke_initialize_and_shutdown() {
    let dir = TempDir::new().expect("temp dir");
    let root_uri = Url::from_directory_path(dir.path()).expect("dir URI");

    let mut client = LspClient::spawn(&[]);
    let response = client.initialize(root_uri.as_str(), Value::Null);

    let caps = &response["result"]["capabilities"];
    assert!(caps["codeLensProvider"].is_object(), "expected codeLensProvider");
    let commands = caps["executeCommandProvider"]["commands"]
        .as_array()
        .expect("advertised commands");
    assert!(commands.contains(&json!("godog.runScenario")));
    assert!(commands.contains(&json!("godog.resolveReference")));
    assert_eq!(response["result"]["serverInfo"]["name"], "godog-lens-lsp");

    client.shutdown();
}

#[test]
fn smoke_code_lens_runs_headers() {
    let dir = TempDir::new().expect("temp dir");
    let feature = module_with_login_feature(&dir);
    let mut client = start(&dir, Value::Null);

    let uri = Url::from_file_path(&feature).expect("feature URI");
    let response = client.request(
        "textDocument/codeLens",
        json!({ "textDocument": { "uri": uri.as_str() } }),
    );
    let lenses = response["result"].as_array().expect("code lenses");
    assert_eq!(lenses.len(), 3);
    assert_eq!(lenses[0]["command"]["title"], "▶ Run Feature");
    assert_eq!(lenses[2]["range"]["start"]["line"], 3);
    assert_eq!(lenses[2]["command"]["command"], "godog.runScenario");
    assert_eq!(lenses[2]["command"]["arguments"][1], "Bad creds");

    client.shutdown();
}

#[test]
fn smoke_execute_command_uses_initialization_options() {
    let dir = TempDir::new().expect("temp dir");
    let feature = module_with_login_feature(&dir);
    let mut client = start(&dir, json!({ "godog": { "program": "gotestsum" } }));

    let response = client.request(
        "workspace/executeCommand",
        json!({
            "command": "godog.runScenario",
            "arguments": ["Login", "Valid creds", feature.to_string_lossy()],
        }),
    );
    let target = &response["result"];
    assert_eq!(target["command"], r#"gotestsum test -v . -run "/Login/Valid_creds$""#);
    assert_eq!(
        target["workingDirectory"].as_str().map(PathBuf::from),
        Some(dir.path().to_path_buf())
    );

    let response = client.request(
        "workspace/executeCommand",
        json!({
            "command": "godog.resolveReference",
            "arguments": ["Login/Bad creds:4"],
        }),
    );
    assert_eq!(response["result"]["lineNumber"], 3);

    client.shutdown();
}

#[test]
fn smoke_unknown_command_is_rejected() {
    let dir = TempDir::new().expect("temp dir");
    let mut client = start(&dir, Value::Null);

    let response = client.request(
        "workspace/executeCommand",
        json!({ "command": "godog.nope", "arguments": [] }),
    );
    assert_eq!(response["error"]["code"], -32602);

    client.shutdown();
}

#[test]
fn smoke_unsaved_buffer_gets_lenses() {
    let dir = TempDir::new().expect("temp dir");
    let mut client = start(&dir, Value::Null);
    let path = dir.path().join("draft.feature");
    let uri = Url::from_file_path(&path).expect("draft URI");

    client.notify(
        "textDocument/didOpen",
        json!({
            "textDocument": {
                "uri": uri.as_str(),
                "languageId": "gherkin",
                "version": 1,
                "text": "Feature: Draft\n",
            }
        }),
    );
    let response = client.request(
        "textDocument/codeLens",
        json!({ "textDocument": { "uri": uri.as_str() } }),
    );
    assert_eq!(response["result"][0]["command"]["arguments"][0], "Draft");

    client.shutdown();
}
