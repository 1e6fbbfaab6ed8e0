//! `textDocument/codeLens` handler.

use std::path::Path;

use async_lsp::ResponseError;
use lsp_types::{CodeLens, CodeLensParams, Command, Position, Range};
use serde_json::{Value, json};
use tracing::debug;

use super::commands::{RUN_FEATURE, RUN_SCENARIO};
use super::util::{is_feature_file_path, url_to_path};
use crate::actions::{RunAction, run_actions};
use crate::server::ServerState;
use crate::util::utf16_len;

/// Handle a code lens request for one document.
///
/// Each feature and scenario header gets a lens spanning its line, whose
/// command runs that feature or scenario. Documents that are not `.feature`
/// files, or that lie outside a workspace, yield no lenses.
///
/// # Errors
///
/// Currently always returns `Ok`.
pub fn handle_code_lens(
    state: &mut ServerState,
    params: CodeLensParams,
) -> Result<Option<Vec<CodeLens>>, ResponseError> {
    let uri = params.text_document.uri;
    let Some(path) = url_to_path(&uri) else {
        debug!(%uri, "ignoring code lens request for non-file URI");
        return Ok(None);
    };
    if !is_feature_file_path(&path) {
        return Ok(None);
    }
    let Some((index, _, open_documents)) = state.index_with_context() else {
        return Ok(None);
    };

    let text = open_documents
        .get(&path)
        .cloned()
        .or_else(|| index.read_full_text(&path).ok());
    let actions = run_actions(index, &path, text.as_deref());
    let lines: Vec<&str> = text.as_deref().map(|t| t.lines().collect()).unwrap_or_default();

    Ok(Some(
        actions
            .iter()
            .map(|action| to_code_lens(action, &path, &lines))
            .collect(),
    ))
}

fn to_code_lens(action: &RunAction, path: &Path, lines: &[&str]) -> CodeLens {
    let end = usize::try_from(action.line)
        .ok()
        .and_then(|n| lines.get(n))
        .map_or(0, |line| utf16_len(line));
    let request = &action.request;
    let command = if request.scenario_name.is_some() {
        RUN_SCENARIO
    } else {
        RUN_FEATURE
    };
    let arguments: Vec<Value> = std::iter::once(json!(request.feature_name))
        .chain(request.scenario_name.iter().map(|scenario| json!(scenario)))
        .chain(std::iter::once(json!(path.to_string_lossy())))
        .collect();
    CodeLens {
        range: Range::new(Position::new(action.line, 0), Position::new(action.line, end)),
        command: Some(Command {
            title: action.title().to_owned(),
            command: command.to_owned(),
            arguments: Some(arguments),
        }),
        data: None,
    }
}

#[cfg(test)]
#[expect(
    clippy::expect_used,
    reason = "tests require explicit panic messages for debugging failures"
)]
mod tests {
    use super::*;
    use crate::config::ServerConfig;
    use lsp_types::{TextDocumentIdentifier, Url};
    use std::fs;
    use tempfile::TempDir;

    fn params(path: &Path) -> CodeLensParams {
        CodeLensParams {
            text_document: TextDocumentIdentifier::new(
                Url::from_file_path(path).expect("file URI"),
            ),
            work_done_progress_params: lsp_types::WorkDoneProgressParams::default(),
            partial_result_params: lsp_types::PartialResultParams::default(),
        }
    }

    #[test]
    fn lenses_cover_header_lines_with_run_commands() {
        let dir = TempDir::new().expect("temp dir");
        let path = dir.path().join("login.feature");
        fs::write(&path, "Feature: Login\n  Scenario: Valid creds\n").expect("write feature");
        let mut state = ServerState::new(ServerConfig::default());
        state
            .open_workspace(dir.path().to_path_buf())
            .expect("open workspace");

        let lenses = handle_code_lens(&mut state, params(&path))
            .expect("code lens request")
            .expect("lenses for indexed document");
        assert_eq!(lenses.len(), 2);

        let feature = lenses.first().expect("feature lens");
        assert_eq!(feature.range, Range::new(Position::new(0, 0), Position::new(0, 14)));
        let command = feature.command.as_ref().expect("feature command");
        assert_eq!(command.title, "▶ Run Feature");
        assert_eq!(command.command, "godog.runFeature");
        assert_eq!(
            command.arguments,
            Some(vec![json!("Login"), json!(path.to_string_lossy())])
        );

        let scenario = lenses.get(1).expect("scenario lens");
        assert_eq!(scenario.range.end, Position::new(1, 23));
        let command = scenario.command.as_ref().expect("scenario command");
        assert_eq!(command.command, "godog.runScenario");
        assert_eq!(
            command.arguments,
            Some(vec![json!("Login"), json!("Valid creds"), json!(path.to_string_lossy())])
        );
    }

    #[test]
    fn open_buffer_is_used_for_unsaved_documents() {
        let dir = TempDir::new().expect("temp dir");
        let path = dir.path().join("draft.feature");
        let mut state = ServerState::new(ServerConfig::default());
        state
            .open_workspace(dir.path().to_path_buf())
            .expect("open workspace");
        state.set_open_document(path.clone(), "Scenario: early\n".to_owned());

        let lenses = handle_code_lens(&mut state, params(&path))
            .expect("code lens request")
            .expect("lenses for open buffer");
        let arguments = lenses
            .first()
            .and_then(|lens| lens.command.as_ref())
            .and_then(|command| command.arguments.clone());
        assert_eq!(
            arguments,
            Some(vec![Value::Null, json!("early"), json!(path.to_string_lossy())])
        );
    }

    #[test]
    fn other_documents_get_no_lenses_and_leave_the_index_alone() {
        let dir = TempDir::new().expect("temp dir");
        fs::write(dir.path().join("a.feature"), "Feature: A\n").expect("write feature");
        let mut state = ServerState::new(ServerConfig::default());
        state
            .open_workspace(dir.path().to_path_buf())
            .expect("open workspace");
        state.index_mut().expect("index").rebuild();

        fs::write(dir.path().join("b.feature"), "Feature: B\n").expect("write feature");
        let go_file = dir.path().join("main_test.go");
        fs::write(&go_file, "package main\n").expect("write go file");

        let result = handle_code_lens(&mut state, params(&go_file)).expect("code lens request");
        assert!(result.is_none());
        let records = state.index().map(|index| index.records().len());
        assert_eq!(records, Some(1));
    }

    #[test]
    fn no_workspace_means_no_lenses() {
        let mut state = ServerState::new(ServerConfig::default());
        let path = std::env::temp_dir().join("x.feature");
        let result = handle_code_lens(&mut state, params(&path)).expect("code lens request");
        assert!(result.is_none());
    }
}
