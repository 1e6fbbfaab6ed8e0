//! Workspace file discovery.
//!
//! This module lists the feature documents that feed the index and reads
//! their contents. The index only talks to the [`FeatureFileSource`] trait,
//! so tests and alternative hosts can supply their own file set.

mod workspace;

pub use workspace::{DiscoveryError, FeatureFileSource, FileGlobs, WorkspaceFiles};
