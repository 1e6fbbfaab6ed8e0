//! Core language server state and capability advertisement.
//!
//! This module defines the central state shared across all LSP handlers. The
//! feature index is owned here: it is created when the client initialises
//! the server with a workspace root and disposed of on shutdown.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use lsp_types::{
    ClientCapabilities, CodeLensOptions, ExecuteCommandOptions, SaveOptions, ServerCapabilities,
    TextDocumentSyncCapability, TextDocumentSyncKind, TextDocumentSyncOptions,
    TextDocumentSyncSaveOptions, WorkspaceFolder,
};
use tracing::info;

use crate::config::{RunConfig, ServerConfig};
use crate::discovery::WorkspaceFiles;
use crate::error::ServerError;
use crate::handlers::COMMANDS;
use crate::indexing::FeatureIndex;

/// Central state shared across all LSP handlers.
///
/// This struct holds the in-memory state of the language server. It is
/// passed to handlers via the async-lsp router.
#[derive(Debug)]
pub struct ServerState {
    /// Client capabilities received during initialisation.
    client_capabilities: Option<ClientCapabilities>,
    /// Workspace folders from the client.
    workspace_folders: Vec<WorkspaceFolder>,
    /// Root the feature index scans.
    workspace_root: Option<PathBuf>,
    /// Feature index for the workspace root, once initialised.
    index: Option<FeatureIndex>,
    /// Run configuration supplied by the client.
    run_config: RunConfig,
    /// Text of documents the client holds open.
    open_documents: HashMap<PathBuf, String>,
    /// Whether the server has been initialised.
    initialised: bool,
    /// Configuration loaded from environment and CLI.
    config: ServerConfig,
}

impl ServerState {
    /// Create a new server state with the given configuration.
    ///
    /// # Examples
    ///
    /// ```
    /// use godog_lens_server::config::ServerConfig;
    /// use godog_lens_server::server::ServerState;
    ///
    /// let state = ServerState::new(ServerConfig::default());
    /// assert!(!state.is_initialised());
    /// assert!(state.index().is_none());
    /// ```
    #[must_use]
    pub fn new(config: ServerConfig) -> Self {
        Self {
            client_capabilities: None,
            workspace_folders: Vec::new(),
            workspace_root: None,
            index: None,
            run_config: RunConfig::default(),
            open_documents: HashMap::new(),
            initialised: false,
            config,
        }
    }

    /// Store client capabilities received during initialisation.
    pub fn set_client_capabilities(&mut self, capabilities: ClientCapabilities) {
        self.client_capabilities = Some(capabilities);
    }

    /// Access the stored client capabilities, if any.
    #[must_use]
    pub fn client_capabilities(&self) -> Option<&ClientCapabilities> {
        self.client_capabilities.as_ref()
    }

    /// Store workspace folders provided by the client.
    pub fn set_workspace_folders(&mut self, folders: Vec<WorkspaceFolder>) {
        self.workspace_folders = folders;
    }

    /// Access the workspace folders provided by the client.
    #[must_use]
    pub fn workspace_folders(&self) -> &[WorkspaceFolder] {
        &self.workspace_folders
    }

    /// Root directory the feature index scans, if known.
    #[must_use]
    pub fn workspace_root(&self) -> Option<&Path> {
        self.workspace_root.as_deref()
    }

    /// Create the feature index for `root`, replacing any previous one.
    ///
    /// # Errors
    ///
    /// Returns `ServerError::Discovery` when the configured globs do not
    /// compile.
    pub fn open_workspace(&mut self, root: PathBuf) -> Result<(), ServerError> {
        let globs = self.config.file_globs()?;
        info!(root = %root.display(), "opening workspace");
        self.index = Some(FeatureIndex::new(WorkspaceFiles::new(&root), globs));
        self.workspace_root = Some(root);
        Ok(())
    }

    /// Dispose of the feature index.
    pub fn close_workspace(&mut self) {
        if let Some(mut index) = self.index.take() {
            index.clear();
            info!("feature index disposed");
        }
    }

    /// The feature index, if a workspace is open.
    #[must_use]
    pub fn index(&self) -> Option<&FeatureIndex> {
        self.index.as_ref()
    }

    /// Mutable access to the feature index, if a workspace is open.
    pub fn index_mut(&mut self) -> Option<&mut FeatureIndex> {
        self.index.as_mut()
    }

    /// Split borrow of the index and the read-only state handlers need with
    /// it.
    pub(crate) fn index_with_context(
        &mut self,
    ) -> Option<(&mut FeatureIndex, &RunConfig, &HashMap<PathBuf, String>)> {
        let index = self.index.as_mut()?;
        Some((index, &self.run_config, &self.open_documents))
    }

    /// Current run configuration.
    #[must_use]
    pub fn run_config(&self) -> &RunConfig {
        &self.run_config
    }

    /// Replace the run configuration.
    pub fn set_run_config(&mut self, run_config: RunConfig) {
        self.run_config = run_config;
    }

    /// Record the full text of an open document.
    pub fn set_open_document(&mut self, path: PathBuf, text: String) {
        self.open_documents.insert(path, text);
    }

    /// Forget a closed document.
    pub fn close_document(&mut self, path: &Path) {
        self.open_documents.remove(path);
    }

    /// Text of an open document, if the client holds it open.
    #[must_use]
    pub fn open_document(&self, path: &Path) -> Option<&str> {
        self.open_documents.get(path).map(String::as_str)
    }

    /// Access the current server configuration.
    #[must_use]
    pub fn config(&self) -> &ServerConfig {
        &self.config
    }

    /// Mark the server as initialised.
    pub fn mark_initialised(&mut self) {
        self.initialised = true;
    }

    /// Check if the server is initialised.
    #[must_use]
    pub fn is_initialised(&self) -> bool {
        self.initialised
    }
}

/// Build the server capabilities to advertise to the client.
///
/// Documents are synchronised in full, saves carry no text, and run actions
/// are offered as code lenses backed by the execute-command list.
#[must_use]
pub fn build_server_capabilities() -> ServerCapabilities {
    ServerCapabilities {
        text_document_sync: Some(TextDocumentSyncCapability::Options(
            TextDocumentSyncOptions {
                open_close: Some(true),
                change: Some(TextDocumentSyncKind::FULL),
                save: Some(TextDocumentSyncSaveOptions::SaveOptions(SaveOptions {
                    include_text: Some(false),
                })),
                ..TextDocumentSyncOptions::default()
            },
        )),
        code_lens_provider: Some(CodeLensOptions {
            resolve_provider: Some(false),
        }),
        execute_command_provider: Some(ExecuteCommandOptions {
            commands: COMMANDS.iter().map(|&command| command.to_owned()).collect(),
            ..ExecuteCommandOptions::default()
        }),
        ..ServerCapabilities::default()
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

    #[test]
    fn new_state_is_not_initialised() {
        let state = ServerState::new(ServerConfig::default());
        assert!(!state.is_initialised());
        assert!(state.client_capabilities().is_none());
        assert!(state.workspace_root().is_none());
        assert!(state.index().is_none());
        assert!(state.workspace_folders().is_empty());
        assert_eq!(state.run_config(), &RunConfig::default());
    }

    #[test]
    fn mark_initialised_sets_flag() {
        let mut state = ServerState::new(ServerConfig::default());
        state.mark_initialised();
        assert!(state.is_initialised());
    }

    #[test]
    fn workspace_lifecycle_owns_the_index() {
        let mut state = ServerState::new(ServerConfig::default());
        state
            .open_workspace(PathBuf::from("/w"))
            .expect("default globs compile");
        assert_eq!(state.workspace_root(), Some(Path::new("/w")));
        assert!(state.index().is_some());

        state.close_workspace();
        assert!(state.index().is_none());
    }

    #[test]
    fn invalid_globs_prevent_opening_a_workspace() {
        let config = ServerConfig {
            feature_glob: "[".to_owned(),
            ..ServerConfig::default()
        };
        let mut state = ServerState::new(config);
        assert!(matches!(
            state.open_workspace(PathBuf::from("/w")),
            Err(ServerError::Discovery(_))
        ));
        assert!(state.index().is_none());
    }

    #[test]
    fn open_documents_are_tracked_until_closed() {
        let mut state = ServerState::new(ServerConfig::default());
        let path = PathBuf::from("/w/a.feature");
        state.set_open_document(path.clone(), "Feature: A".to_owned());
        assert_eq!(state.open_document(&path), Some("Feature: A"));
        state.close_document(&path);
        assert_eq!(state.open_document(&path), None);
    }

    #[test]
    fn capabilities_advertise_sync_lenses_and_commands() {
        let capabilities = build_server_capabilities();
        assert!(capabilities.text_document_sync.is_some());
        assert!(capabilities.code_lens_provider.is_some());
        let commands = capabilities
            .execute_command_provider
            .map(|options| options.commands)
            .unwrap_or_default();
        assert!(commands.contains(&"godog.runScenario".to_owned()));
        assert_eq!(commands.len(), COMMANDS.len());
    }
}
