//! Glob-driven listing of feature documents under a workspace root.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use globset::{Glob, GlobBuilder, GlobMatcher};
use thiserror::Error;
use tracing::debug;
use walkdir::WalkDir;

/// Errors raised while preparing file discovery.
#[derive(Debug, Error)]
pub enum DiscoveryError {
    /// A configured glob could not be compiled.
    #[error("invalid glob '{pattern}': {source}")]
    InvalidGlob {
        /// The pattern as configured.
        pattern: String,
        /// The underlying compilation error.
        #[source]
        source: globset::Error,
    },
}

/// Compiled include and exclude globs.
///
/// Both globs are matched against paths relative to the workspace root, with
/// `/` as the separator. `*` does not cross directory boundaries; use `**`
/// for that.
#[derive(Debug, Clone)]
pub struct FileGlobs {
    include: GlobMatcher,
    exclude: Option<GlobMatcher>,
}

impl FileGlobs {
    /// Compile an include glob and an optional exclude glob.
    ///
    /// An empty exclude glob excludes nothing.
    ///
    /// # Errors
    ///
    /// Returns [`DiscoveryError::InvalidGlob`] when either pattern is
    /// malformed.
    ///
    /// # Examples
    ///
    /// ```
    /// use std::path::Path;
    /// use godog_lens_server::discovery::FileGlobs;
    ///
    /// let globs = FileGlobs::new("**/*.feature", "**/node_modules/**").unwrap();
    /// assert!(globs.is_match(Path::new("features/login.feature")));
    /// assert!(!globs.is_match(Path::new("web/node_modules/x/a.feature")));
    /// ```
    pub fn new(include: &str, exclude: &str) -> Result<Self, DiscoveryError> {
        let include = compile(include)?;
        let exclude = if exclude.trim().is_empty() {
            None
        } else {
            Some(compile(exclude)?)
        };
        Ok(Self { include, exclude })
    }

    /// Whether a root-relative path is selected by these globs.
    #[must_use]
    pub fn is_match(&self, relative: &Path) -> bool {
        self.include.is_match(relative)
            && !self
                .exclude
                .as_ref()
                .is_some_and(|exclude| exclude.is_match(relative))
    }
}

fn compile(pattern: &str) -> Result<GlobMatcher, DiscoveryError> {
    let glob: Glob = GlobBuilder::new(pattern)
        .literal_separator(true)
        .build()
        .map_err(|source| DiscoveryError::InvalidGlob {
            pattern: pattern.to_owned(),
            source,
        })?;
    Ok(glob.compile_matcher())
}

/// Access to the documents the feature index is built from.
pub trait FeatureFileSource {
    /// List every file selected by `globs`, in a stable order.
    fn list_matching_files(&self, globs: &FileGlobs) -> Vec<PathBuf>;

    /// Read the full text of one file.
    ///
    /// # Errors
    ///
    /// Returns the underlying I/O error when the file cannot be read.
    fn read_full_text(&self, path: &Path) -> io::Result<String>;
}

/// Feature documents on disk below a workspace root.
#[derive(Debug, Clone)]
pub struct WorkspaceFiles {
    root: PathBuf,
}

impl WorkspaceFiles {
    /// Create a file source rooted at `root`.
    #[must_use]
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }
}

impl FeatureFileSource for WorkspaceFiles {
    fn list_matching_files(&self, globs: &FileGlobs) -> Vec<PathBuf> {
        let walker = WalkDir::new(&self.root)
            .follow_links(false)
            .sort_by_file_name();

        let mut files = Vec::new();
        for entry in walker {
            let entry = match entry {
                Ok(entry) => entry,
                Err(err) => {
                    debug!(error = %err, "skipping unreadable directory entry");
                    continue;
                }
            };
            if !entry.file_type().is_file() {
                continue;
            }
            let Ok(relative) = entry.path().strip_prefix(&self.root) else {
                continue;
            };
            if globs.is_match(relative) {
                files.push(entry.into_path());
            }
        }
        debug!(root = %self.root.display(), files = files.len(), "listed feature files");
        files
    }

    /// Bytes that are not valid UTF-8 are replaced with U+FFFD rather than
    /// failing the read.
    fn read_full_text(&self, path: &Path) -> io::Result<String> {
        let bytes = fs::read(path)?;
        Ok(String::from_utf8_lossy(&bytes).into_owned())
    }
}

#[cfg(test)]
#[expect(
    clippy::expect_used,
    reason = "tests require explicit panic messages for debugging failures"
)]
mod tests {
    use super::*;
    use rstest::{fixture, rstest};
    use tempfile::TempDir;

    fn write(root: &Path, relative: &str, content: &str) {
        let path = root.join(relative);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).expect("create parent dirs");
        }
        fs::write(path, content).expect("write file");
    }

    #[fixture]
    fn workspace() -> TempDir {
        let dir = TempDir::new().expect("temp dir");
        write(dir.path(), "features/login.feature", "Feature: Login\n");
        write(dir.path(), "features/nested/logout.feature", "Feature: Logout\n");
        write(dir.path(), "a.feature", "Feature: A\n");
        write(dir.path(), "node_modules/pkg/vendored.feature", "Feature: V\n");
        write(dir.path(), "features/notes.md", "# notes\n");
        dir
    }

    fn relative_names(root: &Path, files: &[PathBuf]) -> Vec<String> {
        files
            .iter()
            .map(|p| {
                p.strip_prefix(root)
                    .expect("listed file under root")
                    .to_string_lossy()
                    .replace('\\', "/")
            })
            .collect()
    }

    #[rstest]
    fn lists_feature_files_in_name_order_excluding_node_modules(workspace: TempDir) {
        let globs = FileGlobs::new("**/*.feature", "**/node_modules/**").expect("globs");
        let source = WorkspaceFiles::new(workspace.path());
        let files = source.list_matching_files(&globs);
        assert_eq!(
            relative_names(workspace.path(), &files),
            vec![
                "a.feature",
                "features/login.feature",
                "features/nested/logout.feature",
            ]
        );
    }

    #[rstest]
    fn empty_exclude_keeps_everything(workspace: TempDir) {
        let globs = FileGlobs::new("**/*.feature", "").expect("globs");
        let files = WorkspaceFiles::new(workspace.path()).list_matching_files(&globs);
        assert_eq!(files.len(), 4);
    }

    #[rstest]
    fn single_star_does_not_cross_directories(workspace: TempDir) {
        let globs = FileGlobs::new("features/*.feature", "").expect("globs");
        let files = WorkspaceFiles::new(workspace.path()).list_matching_files(&globs);
        assert_eq!(
            relative_names(workspace.path(), &files),
            vec!["features/login.feature"]
        );
    }

    #[test]
    fn missing_root_lists_nothing() {
        let globs = FileGlobs::new("**/*.feature", "").expect("globs");
        let source = WorkspaceFiles::new("/definitely/not/a/real/root");
        assert!(source.list_matching_files(&globs).is_empty());
    }

    #[rstest]
    fn reads_file_contents(workspace: TempDir) {
        let source = WorkspaceFiles::new(workspace.path());
        let text = source
            .read_full_text(&workspace.path().join("a.feature"))
            .expect("readable file");
        assert_eq!(text, "Feature: A\n");
    }

    #[rstest]
    fn non_utf8_bytes_are_replaced_not_rejected(workspace: TempDir) {
        let path = workspace.path().join("cafe.feature");
        fs::write(&path, b"Feature: Caf\xe9\n").expect("write latin-1 file");
        let source = WorkspaceFiles::new(workspace.path());
        let text = source.read_full_text(&path).expect("lossy read");
        assert_eq!(text, "Feature: Caf\u{FFFD}\n");
    }

    #[rstest]
    fn missing_file_is_an_io_error(workspace: TempDir) {
        let source = WorkspaceFiles::new(workspace.path());
        let err = source
            .read_full_text(&workspace.path().join("gone.feature"))
            .expect_err("missing file");
        assert_eq!(err.kind(), io::ErrorKind::NotFound);
    }

    #[rstest]
    #[case("[", "")]
    #[case("**/*.feature", "{a,")]
    fn malformed_globs_are_rejected(#[case] include: &str, #[case] exclude: &str) {
        let err = FileGlobs::new(include, exclude).expect_err("malformed glob");
        assert!(err.to_string().starts_with("invalid glob"));
    }
}
