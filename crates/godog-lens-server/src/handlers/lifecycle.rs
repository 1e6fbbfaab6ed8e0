//! LSP lifecycle handlers for initialisation and shutdown.
//!
//! This module implements the lifecycle protocol handlers required by the
//! LSP specification: `initialize`, `initialized`, and `shutdown`. The
//! feature index lives exactly as long as the session: it is created on
//! `initialize`, filled on `initialized` and disposed of on `shutdown`.

use std::path::PathBuf;

use async_lsp::ResponseError;
use lsp_types::{InitializeParams, InitializeResult, InitializedParams, ServerInfo, Url};
use tracing::{info, warn};

use super::util::{response_error, url_to_path};
use crate::config::RunConfig;
use crate::error::ServerError;
use crate::server::{ServerState, build_server_capabilities};

/// Name reported to clients in `serverInfo`.
pub const SERVER_NAME: &str = "godog-lens-lsp";

/// Handle the `initialize` request from the client.
///
/// Records client capabilities and workspace folders, opens the feature
/// index for the workspace root and reads run options from
/// `initializationOptions`.
///
/// # Errors
///
/// Returns a `ResponseError` when the server is already initialised.
///
/// A missing workspace root, malformed globs or malformed run options are
/// logged as warnings and do not fail the request.
pub fn handle_initialise(
    state: &mut ServerState,
    params: InitializeParams,
) -> Result<InitializeResult, ResponseError> {
    if state.is_initialised() {
        return Err(response_error(&ServerError::AlreadyInitialised));
    }

    #[expect(
        deprecated,
        reason = "Some clients still populate root_uri instead of workspace_folders."
    )]
    let InitializeParams {
        capabilities,
        workspace_folders,
        root_uri,
        initialization_options,
        ..
    } = params;
    state.set_client_capabilities(capabilities);

    if let Some(folders) = workspace_folders {
        state.set_workspace_folders(folders);
    }

    match extract_workspace_path(state.workspace_folders(), root_uri.as_ref()) {
        Some(root) => {
            if let Err(e) = state.open_workspace(root) {
                warn!(error = %e, "feature index unavailable");
            }
        }
        None => warn!("no file workspace root provided; feature index disabled"),
    }

    if let Some(options) = initialization_options {
        match RunConfig::from_settings(&options) {
            Ok(run_config) => state.set_run_config(run_config),
            Err(e) => warn!(error = %e, "ignoring initialization options"),
        }
    }

    Ok(InitializeResult {
        capabilities: build_server_capabilities(),
        server_info: Some(ServerInfo {
            name: SERVER_NAME.to_string(),
            version: Some(env!("CARGO_PKG_VERSION").to_string()),
        }),
    })
}

/// Handle the `initialized` notification from the client.
///
/// Marks the server ready and builds the feature index.
pub fn handle_initialised(state: &mut ServerState, _params: InitializedParams) {
    state.mark_initialised();
    if let Some(index) = state.index_mut() {
        index.rebuild();
    }
    info!("server initialised");
}

/// Handle the `shutdown` request from the client.
///
/// Disposes of the feature index. Per the LSP specification, the server
/// does not exit until it receives the `exit` notification.
///
/// # Errors
///
/// Currently always returns `Ok(())`.
pub fn handle_shutdown(state: &mut ServerState) -> Result<(), ResponseError> {
    info!("shutdown request received");
    state.close_workspace();
    Ok(())
}

/// Extract a workspace path from workspace folders.
///
/// Returns the path of the first workspace folder with a file:// scheme. When
/// no folders are provided, the root URI is used (for single-root clients).
fn extract_workspace_path(
    workspace_folders: &[lsp_types::WorkspaceFolder],
    root_uri: Option<&Url>,
) -> Option<PathBuf> {
    workspace_folders
        .first()
        .and_then(|f| url_to_path(&f.uri))
        .or_else(|| root_uri.and_then(url_to_path))
}

#[cfg(test)]
#[expect(
    clippy::expect_used,
    reason = "tests require explicit panic messages for debugging failures"
)]
mod tests {
    use super::*;
    use crate::config::ServerConfig;
    use lsp_types::{ClientCapabilities, WorkspaceFolder};
    use rstest::{fixture, rstest};
    use serde_json::json;
    use std::fs;
    use tempfile::TempDir;

    #[fixture]
    fn create_test_state() -> ServerState {
        ServerState::new(ServerConfig::default())
    }

    #[fixture]
    fn create_init_params() -> InitializeParams {
        InitializeParams {
            capabilities: ClientCapabilities::default(),
            workspace_folders: None,
            ..Default::default()
        }
    }

    fn folder(path: &std::path::Path) -> WorkspaceFolder {
        WorkspaceFolder {
            uri: Url::from_file_path(path).expect("valid path"),
            name: "folder".to_string(),
        }
    }

    #[rstest]
    fn handle_initialise_stores_client_capabilities(
        mut create_test_state: ServerState,
        create_init_params: InitializeParams,
    ) {
        let result = handle_initialise(&mut create_test_state, create_init_params);

        assert!(result.is_ok());
        assert!(create_test_state.client_capabilities().is_some());
    }

    #[rstest]
    fn handle_initialise_returns_server_info(
        mut create_test_state: ServerState,
        create_init_params: InitializeParams,
    ) {
        let init_result = handle_initialise(&mut create_test_state, create_init_params)
            .expect("initialisation should succeed");

        let info = init_result.server_info.expect("should have server info");
        assert_eq!(info.name, "godog-lens-lsp");
        assert!(info.version.is_some());
    }

    #[rstest]
    fn handle_initialise_fails_when_already_initialised(
        mut create_test_state: ServerState,
        create_init_params: InitializeParams,
    ) {
        create_test_state.mark_initialised();

        let result = handle_initialise(&mut create_test_state, create_init_params);

        assert!(result.is_err());
    }

    #[rstest]
    fn handle_initialise_without_root_leaves_index_closed(
        mut create_test_state: ServerState,
        create_init_params: InitializeParams,
    ) {
        handle_initialise(&mut create_test_state, create_init_params).expect("initialise");
        assert!(create_test_state.index().is_none());
    }

    #[rstest]
    fn handle_initialise_reads_run_options(mut create_test_state: ServerState) {
        let params = InitializeParams {
            initialization_options: Some(json!({ "godog": { "program": "gotestsum" } })),
            ..Default::default()
        };
        handle_initialise(&mut create_test_state, params).expect("initialise");
        assert_eq!(create_test_state.run_config().program, "gotestsum");
    }

    #[rstest]
    fn handle_initialise_keeps_defaults_for_malformed_options(mut create_test_state: ServerState) {
        let params = InitializeParams {
            initialization_options: Some(json!({ "program": ["go"] })),
            ..Default::default()
        };
        handle_initialise(&mut create_test_state, params).expect("initialise");
        assert_eq!(create_test_state.run_config(), &RunConfig::default());
    }

    #[rstest]
    fn initialised_builds_index_and_shutdown_disposes_it(mut create_test_state: ServerState) {
        let dir = TempDir::new().expect("temp dir");
        fs::write(dir.path().join("a.feature"), "Feature: A\n").expect("write feature");
        let params = InitializeParams {
            workspace_folders: Some(vec![folder(dir.path())]),
            ..Default::default()
        };

        handle_initialise(&mut create_test_state, params).expect("initialise");
        assert_eq!(create_test_state.workspace_root(), Some(dir.path()));
        handle_initialised(&mut create_test_state, InitializedParams {});
        assert!(create_test_state.is_initialised());
        let features = create_test_state.index().map(|i| i.records().len());
        assert_eq!(features, Some(1));

        handle_shutdown(&mut create_test_state).expect("shutdown");
        assert!(create_test_state.index().is_none());
    }

    #[test]
    fn extract_workspace_path_from_folders() {
        #[cfg(windows)]
        let test_path = PathBuf::from("C:\\folder\\path");
        #[cfg(not(windows))]
        let test_path = PathBuf::from("/folder/path");

        let path = extract_workspace_path(&[folder(&test_path)], None);
        assert_eq!(path, Some(test_path));
    }

    #[test]
    fn extract_workspace_path_returns_none_when_empty() {
        assert!(extract_workspace_path(&[], None).is_none());
    }

    #[test]
    fn extract_workspace_path_uses_root_uri_when_no_folders() {
        #[cfg(windows)]
        let test_path = PathBuf::from("C:\\folder\\path");
        #[cfg(not(windows))]
        let test_path = PathBuf::from("/folder/path");

        let root_uri = Url::from_file_path(&test_path).expect("valid path");
        assert_eq!(extract_workspace_path(&[], Some(&root_uri)), Some(test_path));
    }
}
