//! The workspace-wide cache of feature records.

use std::io;
use std::path::{Path, PathBuf};

use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use super::{FeatureRecord, ParseReadError, parse_feature_document};
use crate::discovery::{FeatureFileSource, FileGlobs, WorkspaceFiles};

/// Cache of every feature record in the workspace.
///
/// The index is rebuilt wholesale: each rebuild lists the matching files
/// again, parses all of them and replaces the previous records. Records are
/// ordered by file listing order and then by position within the file.
///
/// An empty index is indistinguishable from an unbuilt one, so
/// [`ensure_initialized`](Self::ensure_initialized) rescans a workspace with
/// no feature files on every call.
#[derive(Debug)]
pub struct FeatureIndex<S = WorkspaceFiles> {
    source: S,
    globs: FileGlobs,
    records: Vec<FeatureRecord>,
}

impl<S: FeatureFileSource> FeatureIndex<S> {
    /// Create an empty index over `source`.
    #[must_use]
    pub fn new(source: S, globs: FileGlobs) -> Self {
        Self {
            source,
            globs,
            records: Vec::new(),
        }
    }

    /// Rescan every matching file and replace the cached records.
    pub fn rebuild(&mut self) {
        self.rebuild_cancellable(&CancellationToken::new());
    }

    /// Rescan every matching file unless `token` is cancelled first.
    ///
    /// Records are committed only once all files have been parsed. A
    /// cancelled rebuild leaves the previous records untouched and returns
    /// `false`.
    pub fn rebuild_cancellable(&mut self, token: &CancellationToken) -> bool {
        let files = self.source.list_matching_files(&self.globs);
        if files.is_empty() {
            debug!("no feature files matched; clearing index");
            self.records.clear();
            return true;
        }

        let mut records = Vec::new();
        for path in &files {
            if token.is_cancelled() {
                debug!("feature index rebuild cancelled");
                return false;
            }
            match self.parse_file(path) {
                Ok(parsed) => records.extend(parsed),
                Err(err) => warn!(error = %err, "skipping unreadable feature file"),
            }
        }

        info!(
            files = files.len(),
            features = records.len(),
            "rebuilt feature index"
        );
        self.records = records;
        true
    }

    fn parse_file(&self, path: &Path) -> Result<Vec<FeatureRecord>, ParseReadError> {
        let text = self
            .source
            .read_full_text(path)
            .map_err(|source| ParseReadError {
                path: path.to_path_buf(),
                source,
            })?;
        Ok(parse_feature_document(path, &text))
    }

    /// Build the index if it holds no records.
    pub fn ensure_initialized(&mut self) {
        if self.records.is_empty() {
            self.rebuild();
        }
    }

    /// Drop every cached record.
    pub fn clear(&mut self) {
        self.records.clear();
    }

    /// All cached records in index order.
    #[must_use]
    pub fn records(&self) -> &[FeatureRecord] {
        &self.records
    }

    /// First record declared in the file at `path`.
    #[must_use]
    pub fn find_by_path(&self, path: &Path) -> Option<&FeatureRecord> {
        self.records.iter().find(|record| record.file_path == path)
    }

    /// Every record declared in the file at `path`, in document order.
    pub fn records_for_path<'a>(
        &'a self,
        path: &'a Path,
    ) -> impl Iterator<Item = &'a FeatureRecord> + 'a {
        self.records
            .iter()
            .filter(move |record| record.file_path == path)
    }

    /// First record whose feature name equals `name`.
    #[must_use]
    pub fn find_by_name(&self, name: &str) -> Option<&FeatureRecord> {
        self.records.iter().find(|record| record.name == name)
    }

    /// First record declaring a scenario named `name`, with that scenario's
    /// line.
    #[must_use]
    pub fn find_scenario(&self, name: &str) -> Option<(&FeatureRecord, u32)> {
        self.records
            .iter()
            .find_map(|record| record.scenario_line(name).map(|line| (record, line)))
    }

    /// List the matching files afresh, bypassing the cache.
    #[must_use]
    pub fn list_files(&self) -> Vec<PathBuf> {
        self.source.list_matching_files(&self.globs)
    }

    /// Read one file through the index's source.
    ///
    /// # Errors
    ///
    /// Returns the underlying I/O error when the file cannot be read.
    pub fn read_full_text(&self, path: &Path) -> io::Result<String> {
        self.source.read_full_text(path)
    }

    /// The file source backing this index.
    #[must_use]
    pub fn source(&self) -> &S {
        &self.source
    }
}

#[cfg(test)]
#[expect(
    clippy::expect_used,
    reason = "tests require explicit panic messages for debugging failures"
)]
mod tests {
    use super::*;
    use std::cell::Cell;
    use std::collections::BTreeMap;

    /// In-memory file set that counts how often it is listed.
    #[derive(Default)]
    struct MemoryFiles {
        files: BTreeMap<PathBuf, Option<String>>,
        listings: Cell<usize>,
    }

    impl MemoryFiles {
        fn with(mut self, path: &str, text: &str) -> Self {
            self.files.insert(PathBuf::from(path), Some(text.to_owned()));
            self
        }

        fn with_unreadable(mut self, path: &str) -> Self {
            self.files.insert(PathBuf::from(path), None);
            self
        }
    }

    impl FeatureFileSource for MemoryFiles {
        fn list_matching_files(&self, _globs: &FileGlobs) -> Vec<PathBuf> {
            self.listings.set(self.listings.get() + 1);
            self.files.keys().cloned().collect()
        }

        fn read_full_text(&self, path: &Path) -> io::Result<String> {
            self.files
                .get(path)
                .cloned()
                .flatten()
                .ok_or_else(|| io::Error::new(io::ErrorKind::PermissionDenied, "denied"))
        }
    }

    fn index_over(files: MemoryFiles) -> FeatureIndex<MemoryFiles> {
        let globs = FileGlobs::new("**/*.feature", "").expect("globs");
        FeatureIndex::new(files, globs)
    }

    fn two_features() -> MemoryFiles {
        MemoryFiles::default()
            .with(
                "/w/a_login.feature",
                "Feature: Login\n\n\n\n\n  Scenario: Valid creds\n\n\n\n  Scenario: Bad creds\n",
            )
            .with("/w/b_logout.feature", "Feature: Logout\n")
    }

    #[test]
    fn rebuild_orders_records_by_file_then_position() {
        let mut index = index_over(two_features());
        index.rebuild();
        let names: Vec<&str> = index.records().iter().map(|r| r.name.as_str()).collect();
        assert_eq!(names, vec!["Login", "Logout"]);

        let login = index.find_by_name("Login").expect("login indexed");
        assert_eq!(login.line_number, 0);
        assert_eq!(login.scenario_line("Valid creds"), Some(5));
        assert_eq!(login.scenario_line("Bad creds"), Some(9));
    }

    #[test]
    fn rebuild_is_idempotent() {
        let mut index = index_over(two_features());
        index.rebuild();
        let first = index.records().to_vec();
        index.rebuild();
        assert_eq!(index.records(), first.as_slice());
    }

    #[test]
    fn unreadable_files_are_skipped() {
        let files = two_features().with_unreadable("/w/c_locked.feature");
        let mut index = index_over(files);
        index.rebuild();
        assert_eq!(index.records().len(), 2);
        assert!(index.find_by_path(Path::new("/w/c_locked.feature")).is_none());
    }

    #[test]
    fn empty_listing_clears_previous_records() {
        let mut index = index_over(two_features());
        index.rebuild();
        index.source.files.clear();
        index.rebuild();
        assert!(index.records().is_empty());
    }

    #[test]
    fn ensure_initialized_only_rebuilds_when_empty() {
        let mut index = index_over(two_features());
        index.ensure_initialized();
        index.ensure_initialized();
        assert_eq!(index.source().listings.get(), 1);
    }

    #[test]
    fn ensure_initialized_rescans_an_empty_workspace_every_time() {
        let mut index = index_over(MemoryFiles::default());
        index.ensure_initialized();
        index.ensure_initialized();
        assert_eq!(index.source().listings.get(), 2);
    }

    #[test]
    fn cancelled_rebuild_keeps_previous_records() {
        let mut index = index_over(two_features());
        index.rebuild();
        index.source.files.remove(Path::new("/w/b_logout.feature"));

        let token = CancellationToken::new();
        token.cancel();
        assert!(!index.rebuild_cancellable(&token));
        assert_eq!(index.records().len(), 2);
    }

    #[test]
    fn lookups_return_first_match() {
        let files = MemoryFiles::default()
            .with("/w/a.feature", "Feature: Dup\n  Scenario: s\n")
            .with("/w/b.feature", "Feature: Dup\n  Scenario: s\n");
        let mut index = index_over(files);
        index.rebuild();

        let by_name = index.find_by_name("Dup").expect("duplicate name indexed");
        assert_eq!(by_name.file_path, Path::new("/w/a.feature"));
        let (owner, line) = index.find_scenario("s").expect("scenario indexed");
        assert_eq!((owner.file_path.as_path(), line), (Path::new("/w/a.feature"), 1));
        assert!(index.find_by_name("dup").is_none());
    }

    #[test]
    fn records_for_path_returns_every_feature_in_the_file() {
        let files = MemoryFiles::default().with("/w/multi.feature", "Feature: A\nFeature: B\n");
        let mut index = index_over(files);
        index.rebuild();
        let path = Path::new("/w/multi.feature");
        let names: Vec<&str> = index.records_for_path(path).map(|r| r.name.as_str()).collect();
        assert_eq!(names, vec!["A", "B"]);
        assert_eq!(index.find_by_path(path).map(|r| r.name.as_str()), Some("A"));
    }

    #[test]
    fn clear_drops_records() {
        let mut index = index_over(two_features());
        index.rebuild();
        index.clear();
        assert!(index.records().is_empty());
    }
}
