//! Text document notification handlers.
//!
//! Open documents are tracked in full so run actions can be offered for
//! unsaved buffers. Saving a `.feature` document rebuilds the feature index.

use lsp_types::{
    DidChangeTextDocumentParams, DidCloseTextDocumentParams, DidOpenTextDocumentParams,
    DidSaveTextDocumentParams,
};
use tracing::debug;

use super::util::{is_feature_file_path, url_to_path};
use crate::server::ServerState;

/// Handle `textDocument/didOpen` notifications.
pub fn handle_did_open_text_document(state: &mut ServerState, params: DidOpenTextDocumentParams) {
    let document = params.text_document;
    let Some(path) = url_to_path(&document.uri) else {
        debug!(uri = %document.uri, "ignoring didOpen for non-file URI");
        return;
    };
    state.set_open_document(path, document.text);
}

/// Handle `textDocument/didChange` notifications.
///
/// The server asks for full synchronisation, so the last change carries the
/// complete text.
pub fn handle_did_change_text_document(
    state: &mut ServerState,
    params: DidChangeTextDocumentParams,
) {
    let Some(path) = url_to_path(&params.text_document.uri) else {
        return;
    };
    if let Some(change) = params.content_changes.into_iter().last() {
        state.set_open_document(path, change.text);
    }
}

/// Handle `textDocument/didClose` notifications.
pub fn handle_did_close_text_document(
    state: &mut ServerState,
    params: DidCloseTextDocumentParams,
) {
    if let Some(path) = url_to_path(&params.text_document.uri) {
        state.close_document(&path);
    }
}

/// Handle `textDocument/didSave` notifications.
///
/// Saving a `.feature` document triggers a full index rebuild; other
/// documents are ignored.
pub fn handle_did_save_text_document(state: &mut ServerState, params: DidSaveTextDocumentParams) {
    let uri = params.text_document.uri;
    let Some(path) = url_to_path(&uri) else {
        debug!(%uri, "ignoring didSave for non-file URI");
        return;
    };
    if !is_feature_file_path(&path) {
        return;
    }
    if let Some(text) = params.text {
        state.set_open_document(path.clone(), text);
    }
    if let Some(index) = state.index_mut() {
        debug!(path = %path.display(), "feature saved; rebuilding index");
        index.rebuild();
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
    use lsp_types::{
        TextDocumentContentChangeEvent, TextDocumentIdentifier, TextDocumentItem, Url,
        VersionedTextDocumentIdentifier,
    };
    use std::fs;
    use std::path::Path;
    use tempfile::TempDir;

    fn uri(path: &Path) -> Url {
        Url::from_file_path(path).expect("file URI")
    }

    #[test]
    fn open_change_close_tracks_document_text() {
        let mut state = ServerState::new(ServerConfig::default());
        let path = std::env::temp_dir().join("draft.feature");

        handle_did_open_text_document(
            &mut state,
            DidOpenTextDocumentParams {
                text_document: TextDocumentItem::new(
                    uri(&path),
                    "gherkin".into(),
                    1,
                    "Feature: Draft".into(),
                ),
            },
        );
        assert_eq!(state.open_document(&path), Some("Feature: Draft"));

        handle_did_change_text_document(
            &mut state,
            DidChangeTextDocumentParams {
                text_document: VersionedTextDocumentIdentifier::new(uri(&path), 2),
                content_changes: vec![TextDocumentContentChangeEvent {
                    range: None,
                    range_length: None,
                    text: "Feature: Final".into(),
                }],
            },
        );
        assert_eq!(state.open_document(&path), Some("Feature: Final"));

        handle_did_close_text_document(
            &mut state,
            DidCloseTextDocumentParams {
                text_document: TextDocumentIdentifier::new(uri(&path)),
            },
        );
        assert_eq!(state.open_document(&path), None);
    }

    #[test]
    fn saving_a_feature_rebuilds_the_index() {
        let dir = TempDir::new().expect("temp dir");
        let mut state = ServerState::new(ServerConfig::default());
        state
            .open_workspace(dir.path().to_path_buf())
            .expect("open workspace");

        let path = dir.path().join("login.feature");
        fs::write(&path, "Feature: Login\n").expect("write feature");
        handle_did_save_text_document(
            &mut state,
            DidSaveTextDocumentParams {
                text_document: TextDocumentIdentifier::new(uri(&path)),
                text: None,
            },
        );

        let names: Vec<String> = state
            .index()
            .map(|index| index.records().iter().map(|r| r.name.clone()).collect())
            .unwrap_or_default();
        assert_eq!(names, vec!["Login"]);
    }

    #[test]
    fn saving_other_documents_leaves_the_index_alone() {
        let dir = TempDir::new().expect("temp dir");
        let mut state = ServerState::new(ServerConfig::default());
        state
            .open_workspace(dir.path().to_path_buf())
            .expect("open workspace");
        fs::write(dir.path().join("login.feature"), "Feature: Login\n").expect("write feature");

        handle_did_save_text_document(
            &mut state,
            DidSaveTextDocumentParams {
                text_document: TextDocumentIdentifier::new(uri(&dir.path().join("main_test.go"))),
                text: None,
            },
        );
        assert_eq!(state.index().map(|i| i.records().len()), Some(0));
    }
}
