//! Workspace notification handlers.

use lsp_types::{DidChangeConfigurationParams, DidChangeWatchedFilesParams};
use tracing::{debug, info, warn};

use super::util::{is_feature_file_path, url_to_path};
use crate::config::RunConfig;
use crate::server::ServerState;

/// Handle `workspace/didChangeWatchedFiles` notifications.
///
/// Any created, changed or deleted `.feature` document triggers one full
/// index rebuild, however many events the batch carries.
pub fn handle_did_change_watched_files(
    state: &mut ServerState,
    params: DidChangeWatchedFilesParams,
) {
    let touched = params
        .changes
        .iter()
        .filter_map(|event| url_to_path(&event.uri))
        .filter(|path| is_feature_file_path(path))
        .count();
    if touched == 0 {
        return;
    }
    if let Some(index) = state.index_mut() {
        debug!(files = touched, "feature files changed; rebuilding index");
        index.rebuild();
    }
}

/// Handle `workspace/didChangeConfiguration` notifications.
///
/// A malformed payload is logged and the previous run configuration kept.
pub fn handle_did_change_configuration(
    state: &mut ServerState,
    params: DidChangeConfigurationParams,
) {
    match RunConfig::from_settings(&params.settings) {
        Ok(run_config) => {
            info!(program = %run_config.program, "run configuration updated");
            state.set_run_config(run_config);
        }
        Err(e) => warn!(error = %e, "keeping previous run configuration"),
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
    use lsp_types::{FileChangeType, FileEvent, Url};
    use serde_json::json;
    use std::fs;
    use tempfile::TempDir;

    fn event(path: &std::path::Path, typ: FileChangeType) -> FileEvent {
        FileEvent::new(Url::from_file_path(path).expect("file URI"), typ)
    }

    #[test]
    fn feature_events_rebuild_the_index() {
        let dir = TempDir::new().expect("temp dir");
        let mut state = ServerState::new(ServerConfig::default());
        state
            .open_workspace(dir.path().to_path_buf())
            .expect("open workspace");
        let login = dir.path().join("login.feature");
        fs::write(&login, "Feature: Login\n").expect("write feature");

        handle_did_change_watched_files(
            &mut state,
            DidChangeWatchedFilesParams {
                changes: vec![event(&login, FileChangeType::CREATED)],
            },
        );
        assert_eq!(state.index().map(|i| i.records().len()), Some(1));

        fs::remove_file(&login).expect("delete feature");
        handle_did_change_watched_files(
            &mut state,
            DidChangeWatchedFilesParams {
                changes: vec![event(&login, FileChangeType::DELETED)],
            },
        );
        assert_eq!(state.index().map(|i| i.records().len()), Some(0));
    }

    #[test]
    fn unrelated_events_are_ignored() {
        let dir = TempDir::new().expect("temp dir");
        let mut state = ServerState::new(ServerConfig::default());
        state
            .open_workspace(dir.path().to_path_buf())
            .expect("open workspace");
        fs::write(dir.path().join("login.feature"), "Feature: Login\n").expect("write feature");

        handle_did_change_watched_files(
            &mut state,
            DidChangeWatchedFilesParams {
                changes: vec![event(&dir.path().join("go.mod"), FileChangeType::CHANGED)],
            },
        );
        assert_eq!(state.index().map(|i| i.records().len()), Some(0));
    }

    #[test]
    fn configuration_changes_replace_run_options() {
        let mut state = ServerState::new(ServerConfig::default());
        handle_did_change_configuration(
            &mut state,
            DidChangeConfigurationParams {
                settings: json!({ "godog": { "programArgument": "test -count=1 ./..." } }),
            },
        );
        assert_eq!(state.run_config().program_argument, "test -count=1 ./...");

        handle_did_change_configuration(
            &mut state,
            DidChangeConfigurationParams {
                settings: json!(null),
            },
        );
        assert_eq!(state.run_config().program_argument, "test -count=1 ./...");
    }
}
