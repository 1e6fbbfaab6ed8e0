//! `workspace/executeCommand` handler.
//!
//! Commands compute results for the client; none of them spawns a process.
//!
//! | Command                   | Arguments                                 | Result            |
//! |---------------------------|-------------------------------------------|-------------------|
//! | `godog.runFeature`        | `[featureName, filePath]`                 | `RunTarget`       |
//! | `godog.runScenario`       | `[featureName?, scenarioName, filePath]`  | `RunTarget`       |
//! | `godog.resolveReference`  | `[fragment]`                              | `Location \| null` |
//! | `godog.detectLinks`       | `[line]`                                  | `TerminalLink[]`  |
//! | `godog.testTree`          | `[]`                                      | `TestItem[]`      |
//! | `godog.runTests`          | `[id, ...]`                               | `RunTarget[]`     |

use std::path::PathBuf;

use async_lsp::ResponseError;
use lsp_types::ExecuteCommandParams;
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use tokio_util::sync::CancellationToken;
use tracing::debug;

use super::util::response_error;
use crate::error::ServerError;
use crate::links::detect_links;
use crate::resolve::Resolver;
use crate::run_target::RunRequest;
use crate::server::ServerState;
use crate::test_tree::{build_test_tree, run_targets_for_ids};

/// Run a whole feature.
pub const RUN_FEATURE: &str = "godog.runFeature";
/// Run one scenario.
pub const RUN_SCENARIO: &str = "godog.runScenario";
/// Resolve a reference fragment to a location.
pub const RESOLVE_REFERENCE: &str = "godog.resolveReference";
/// Find references in a line of runner output.
pub const DETECT_LINKS: &str = "godog.detectLinks";
/// List features and scenarios as a test tree.
pub const TEST_TREE: &str = "godog.testTree";
/// Run the test tree items with the given ids.
pub const RUN_TESTS: &str = "godog.runTests";

/// Every command the server executes.
pub const COMMANDS: [&str; 6] = [
    RUN_FEATURE,
    RUN_SCENARIO,
    RESOLVE_REFERENCE,
    DETECT_LINKS,
    TEST_TREE,
    RUN_TESTS,
];

/// Handle a `workspace/executeCommand` request.
///
/// # Errors
///
/// Returns `InvalidParams` for unknown commands or malformed arguments, and
/// `InvalidRequest` when a command needs the feature index but no workspace
/// is open.
pub fn handle_execute_command(
    state: &mut ServerState,
    params: ExecuteCommandParams,
) -> Result<Option<Value>, ResponseError> {
    debug!(command = %params.command, "executing command");
    execute(state, &params.command, params.arguments)
        .map(Some)
        .map_err(|err| response_error(&err))
}

fn execute(
    state: &mut ServerState,
    command: &str,
    arguments: Vec<Value>,
) -> Result<Value, ServerError> {
    match command {
        RUN_FEATURE => {
            let (feature, file): (String, PathBuf) = parse_arguments(command, arguments)?;
            to_json(&RunRequest::feature(file, feature).target(state.run_config()))
        }
        RUN_SCENARIO => {
            let (feature, scenario, file): (Option<String>, String, PathBuf) =
                parse_arguments(command, arguments)?;
            to_json(&RunRequest::scenario(file, feature, scenario).target(state.run_config()))
        }
        RESOLVE_REFERENCE => {
            let (fragment,): (String,) = parse_arguments(command, arguments)?;
            let index = state.index_mut().ok_or(ServerError::NotInitialised)?;
            to_json(&Resolver::new(index).resolve_fragment(&fragment))
        }
        DETECT_LINKS => {
            let (line,): (String,) = parse_arguments(command, arguments)?;
            to_json(&detect_links(&line, &CancellationToken::new()))
        }
        TEST_TREE => {
            let index = state.index_mut().ok_or(ServerError::NotInitialised)?;
            index.ensure_initialized();
            to_json(&build_test_tree(index.records()))
        }
        RUN_TESTS => {
            let ids: Vec<String> = parse_arguments(command, arguments)?;
            let (index, run_config, _) = state
                .index_with_context()
                .ok_or(ServerError::NotInitialised)?;
            index.ensure_initialized();
            let tree = build_test_tree(index.records());
            to_json(&run_targets_for_ids(&tree, &ids, run_config))
        }
        other => Err(ServerError::InvalidCommand(format!("unknown command '{other}'"))),
    }
}

fn parse_arguments<T: DeserializeOwned>(
    command: &str,
    arguments: Vec<Value>,
) -> Result<T, ServerError> {
    serde_json::from_value(Value::Array(arguments))
        .map_err(|err| ServerError::InvalidCommand(format!("{command}: {err}")))
}

fn to_json(value: &impl Serialize) -> Result<Value, ServerError> {
    serde_json::to_value(value).map_err(|err| ServerError::InvalidCommand(err.to_string()))
}

#[cfg(test)]
#[expect(
    clippy::expect_used,
    reason = "tests require explicit panic messages for debugging failures"
)]
mod tests {
    use super::*;
    use crate::config::ServerConfig;
    use rstest::rstest;
    use serde_json::json;
    use std::fs;
    use tempfile::TempDir;

    fn run(
        state: &mut ServerState,
        command: &str,
        arguments: Vec<Value>,
    ) -> Result<Value, ServerError> {
        execute(state, command, arguments)
    }

    fn field<'a>(value: &'a Value, pointer: &str) -> &'a Value {
        value.pointer(pointer).unwrap_or(&Value::Null)
    }

    fn workspace_state(dir: &TempDir) -> ServerState {
        fs::write(
            dir.path().join("login.feature"),
            "Feature: Login\n  Scenario: Valid creds\n  Scenario: Bad creds\n",
        )
        .expect("write feature");
        let mut state = ServerState::new(ServerConfig::default());
        state
            .open_workspace(dir.path().to_path_buf())
            .expect("open workspace");
        state
    }

    #[test]
    fn run_scenario_formats_a_target() {
        let mut state = ServerState::new(ServerConfig::default());
        let value = run(
            &mut state,
            RUN_SCENARIO,
            vec![json!("My Feat"), json!("My Scen"), json!("/a/b/f.feature")],
        )
        .expect("run scenario");
        assert_eq!(
            field(&value, "/command"),
            &json!("go test -v . -run \"/My_Feat/My_Scen$\"")
        );
        assert_eq!(
            field(&value, "/terminalName"),
            &json!("Cucumber Godog: /My_Feat/My_Scen$")
        );
    }

    #[test]
    fn run_scenario_accepts_missing_feature() {
        let mut state = ServerState::new(ServerConfig::default());
        let value = run(
            &mut state,
            RUN_SCENARIO,
            vec![Value::Null, json!("Only"), json!("/a/b/f.feature")],
        )
        .expect("run scenario");
        assert_eq!(field(&value, "/pattern"), &json!("//Only$"));
    }

    #[test]
    fn run_feature_follows_updated_configuration() {
        let mut state = ServerState::new(ServerConfig::default());
        state.set_run_config(crate::config::RunConfig {
            program: "gotestsum".into(),
            program_argument: "--".into(),
            ..crate::config::RunConfig::default()
        });
        let value = run(
            &mut state,
            RUN_FEATURE,
            vec![json!("Login"), json!("/a/b/f.feature")],
        )
        .expect("run feature");
        assert_eq!(
            field(&value, "/command"),
            &json!("gotestsum -- -run \"/Login/\"")
        );
    }

    #[test]
    fn resolve_reference_returns_location_or_null() {
        let dir = TempDir::new().expect("temp dir");
        let mut state = workspace_state(&dir);
        let found = run(&mut state, RESOLVE_REFERENCE, vec![json!("Login/Bad creds:3")])
            .expect("resolve");
        assert_eq!(
            found,
            json!({
                "filePath": dir.path().join("login.feature"),
                "lineNumber": 2
            })
        );
        let missing = run(&mut state, RESOLVE_REFERENCE, vec![json!("Nope")]).expect("resolve");
        assert_eq!(missing, Value::Null);
    }

    #[test]
    fn detect_links_reports_utf16_positions() {
        let mut state = ServerState::new(ServerConfig::default());
        let value = run(&mut state, DETECT_LINKS, vec![json!("Feature: Login")]).expect("links");
        assert_eq!(field(&value, "/0/start"), &json!(9));
        assert_eq!(field(&value, "/0/length"), &json!(5));
        assert_eq!(field(&value, "/0/reference/kind"), &json!("feature"));
    }

    #[test]
    fn test_tree_and_run_tests_use_the_index() {
        let dir = TempDir::new().expect("temp dir");
        let mut state = workspace_state(&dir);
        let tree = run(&mut state, TEST_TREE, vec![]).expect("test tree");
        let feature_id = field(&tree, "/0/id").clone();
        assert_eq!(field(&tree, "/0/children").as_array().map(Vec::len), Some(2));

        let targets = run(&mut state, RUN_TESTS, vec![feature_id]).expect("run tests");
        let patterns: Vec<&str> = targets
            .as_array()
            .expect("array of targets")
            .iter()
            .filter_map(|t| t.get("pattern").and_then(Value::as_str))
            .collect();
        assert_eq!(patterns, vec!["/Login/Valid_creds$", "/Login/Bad_creds$"]);
    }

    #[rstest]
    #[case(RESOLVE_REFERENCE, vec![json!("x")])]
    #[case(TEST_TREE, vec![])]
    #[case(RUN_TESTS, vec![json!("feature:/x:y")])]
    fn index_commands_need_a_workspace(#[case] command: &str, #[case] arguments: Vec<Value>) {
        let mut state = ServerState::new(ServerConfig::default());
        assert!(matches!(
            run(&mut state, command, arguments),
            Err(ServerError::NotInitialised)
        ));
    }

    #[rstest]
    #[case("godog.unknown", vec![])]
    #[case(RUN_FEATURE, vec![json!("only one")])]
    #[case(RUN_SCENARIO, vec![json!(1), json!(2), json!(3)])]
    #[case(DETECT_LINKS, vec![])]
    fn malformed_requests_are_invalid_params(#[case] command: &str, #[case] arguments: Vec<Value>) {
        let mut state = ServerState::new(ServerConfig::default());
        let err = handle_execute_command(
            &mut state,
            ExecuteCommandParams {
                command: command.to_owned(),
                arguments,
                work_done_progress_params: lsp_types::WorkDoneProgressParams::default(),
            },
        )
        .expect_err("malformed request");
        assert_eq!(err.code, async_lsp::ErrorCode::INVALID_PARAMS);
    }
}
