//! Shared test support utilities for godog-lens-server tests.
//!
//! Builds a throwaway Go module on disk and drives it through the same
//! `initialize`/`initialized` handshake the binary performs, so tests see
//! a server state with a populated feature index.

use std::path::{Path, PathBuf};

use lsp_types::{InitializeParams, InitializedParams, Url, WorkspaceFolder};
use tempfile::TempDir;

use crate::config::{RunConfig, ServerConfig};
use crate::handlers::{handle_initialise, handle_initialised};
use crate::indexing::FeatureIndex;
use crate::server::ServerState;

/// Newtype wrapper for workspace-relative file names.
#[derive(Debug, Clone)]
pub struct Filename(pub(crate) String);

impl From<&str> for Filename {
    fn from(s: &str) -> Self {
        Self(s.into())
    }
}

impl From<String> for Filename {
    fn from(s: String) -> Self {
        Self(s)
    }
}

/// Newtype wrapper for file contents.
#[derive(Debug, Clone)]
pub struct FileContent(pub(crate) String);

impl From<&str> for FileContent {
    fn from(s: &str) -> Self {
        Self(s.into())
    }
}

impl From<String> for FileContent {
    fn from(s: String) -> Self {
        Self(s)
    }
}

/// An initialised server over a temporary workspace.
pub struct TestWorkspace {
    /// Temporary directory holding the workspace files.
    pub dir: TempDir,
    /// Server state after the initialise handshake.
    pub state: ServerState,
}

impl TestWorkspace {
    /// Absolute path of a workspace-relative file.
    #[must_use]
    pub fn path(&self, relative: &str) -> PathBuf {
        self.dir.path().join(relative)
    }

    /// The workspace feature index.
    ///
    /// # Panics
    ///
    /// Panics if the handshake did not open the workspace.
    #[expect(clippy::expect_used, reason = "a missing index is a test setup bug")]
    pub fn index(&mut self) -> &mut FeatureIndex {
        self.state.index_mut().expect("workspace index")
    }

    /// Write (or overwrite) a file after the workspace was built.
    ///
    /// # Panics
    ///
    /// Panics if the file cannot be written.
    pub fn write(&self, relative: &str, content: &str) -> PathBuf {
        let path = self.path(relative);
        write_file(&path, content);
        path
    }
}

/// Builder for temporary workspaces with feature and Go files.
pub struct WorkspaceBuilder {
    dir: TempDir,
    files: Vec<(String, String)>,
    config: ServerConfig,
    run_config: Option<RunConfig>,
}

impl WorkspaceBuilder {
    /// Create a builder over a fresh temp directory.
    ///
    /// # Panics
    ///
    /// Panics if the temporary directory cannot be created.
    #[expect(clippy::expect_used, reason = "builder panics on temp dir failure")]
    #[must_use]
    pub fn new() -> Self {
        Self {
            dir: TempDir::new().expect("temp dir"),
            files: Vec::new(),
            config: ServerConfig::default(),
            run_config: None,
        }
    }

    /// Add a file at a workspace-relative path; parent directories are
    /// created on build.
    #[must_use]
    pub fn with_file(
        mut self,
        filename: impl Into<Filename>,
        content: impl Into<FileContent>,
    ) -> Self {
        self.files.push((filename.into().0, content.into().0));
        self
    }

    /// Mark the workspace root as a Go module.
    #[must_use]
    pub fn with_go_module(self) -> Self {
        self.with_file("go.mod", "module example.com/demo\n\ngo 1.22\n")
    }

    /// Use a server configuration other than the default.
    #[must_use]
    pub fn with_config(mut self, config: ServerConfig) -> Self {
        self.config = config;
        self
    }

    /// Send run options as `initializationOptions`.
    #[must_use]
    pub fn with_run_config(mut self, run_config: RunConfig) -> Self {
        self.run_config = Some(run_config);
        self
    }

    /// Write the files and run the initialise handshake.
    ///
    /// # Panics
    ///
    /// Panics if a file cannot be written or the handshake fails.
    #[expect(clippy::expect_used, reason = "builder panics on setup failure")]
    #[must_use]
    pub fn build(self) -> TestWorkspace {
        for (filename, content) in &self.files {
            write_file(&self.dir.path().join(filename), content);
        }

        let mut state = ServerState::new(self.config);
        let uri = Url::from_directory_path(self.dir.path()).expect("workspace URI");
        let params = InitializeParams {
            workspace_folders: Some(vec![WorkspaceFolder {
                uri,
                name: "workspace".to_owned(),
            }]),
            initialization_options: self
                .run_config
                .map(|run_config| serde_json::to_value(run_config).expect("serialise run config")),
            ..InitializeParams::default()
        };
        handle_initialise(&mut state, params).expect("initialise");
        handle_initialised(&mut state, InitializedParams {});

        TestWorkspace {
            dir: self.dir,
            state,
        }
    }
}

impl Default for WorkspaceBuilder {
    fn default() -> Self {
        Self::new()
    }
}

#[expect(clippy::expect_used, reason = "test helper panics on write failure")]
fn write_file(path: &Path, content: &str) {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).expect("create parent directories");
    }
    std::fs::write(path, content).expect("write workspace file");
}
