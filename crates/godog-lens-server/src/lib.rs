//! Feature index and language server for godog test suites.
//!
//! This crate keeps an index of the `Feature:` and `Scenario:` headers in a
//! workspace's `.feature` documents and builds editor tooling on top of it:
//! run actions on header lines, `go test -run` invocations for a feature or
//! scenario, and clickable references in runner output.
//!
//! # Overview
//!
//! - [`indexing`]: document parsing and the workspace-wide
//!   [`FeatureIndex`](indexing::FeatureIndex)
//! - [`resolve`]: reference fragments to source locations
//! - [`run_target`]: commands and working directories for `go test`
//! - [`links`]: reference detection in runner output
//! - [`handlers`]: the LSP surface served by the `godog-lens-lsp` binary
//!
//! # Configuration
//!
//! The server can be configured via environment variables:
//!
//! - `GODOG_LENS_LOG_LEVEL`: Log verbosity (trace, debug, info, warn, error)
//! - `GODOG_LENS_FEATURE_GLOB`: Documents to index (default `**/*.feature`)
//! - `GODOG_LENS_EXCLUDE_GLOB`: Documents to skip (default
//!   `**/node_modules/**`)
//!
//! Run options (`program`, `programArgument`, `programWorkingDirectory`,
//! `testPatternFormat`) come from the client.
//!
//! # Example
//!
//! ```no_run
//! use godog_lens_server::discovery::{FileGlobs, WorkspaceFiles};
//! use godog_lens_server::indexing::FeatureIndex;
//! use godog_lens_server::resolve::Resolver;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let globs = FileGlobs::new("**/*.feature", "**/node_modules/**")?;
//! let mut index = FeatureIndex::new(WorkspaceFiles::new("/path/to/module"), globs);
//! index.rebuild();
//! let location = Resolver::new(&mut index).resolve_fragment("Login/Valid creds:7");
//! # let _ = location;
//! # Ok(())
//! # }
//! ```

pub mod actions;
pub mod config;
pub mod discovery;
pub mod error;
pub mod handlers;
pub mod indexing;
pub mod links;
pub mod logging;
pub mod resolve;
pub mod run_target;
pub mod server;
pub mod test_tree;
pub mod util;

/// Test support utilities for unit and integration tests.
///
/// This module is hidden from documentation as it's intended for internal
/// test use only.
#[cfg(any(test, feature = "test-support"))]
#[doc(hidden)]
pub mod test_support;
