//! Resolution of free-text references to source locations.
//!
//! Resolution runs in two named stages. [`Resolver::try_index`] answers from
//! the cached records; when that misses, [`Resolver::try_rescan`] lists the
//! matching files again and searches their text directly. When several
//! records match, the first in index order wins.

mod reference;

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tokio_util::sync::CancellationToken;
use tracing::debug;

pub use reference::Reference;

use crate::discovery::{FeatureFileSource, WorkspaceFiles};
use crate::indexing::FeatureIndex;

/// A resolved position in a feature document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Location {
    /// Document containing the reference target.
    pub file_path: PathBuf,
    /// Zero-based line of the target.
    pub line_number: u32,
}

impl Location {
    /// Create a location from a path and zero-based line.
    #[must_use]
    pub fn new(file_path: impl Into<PathBuf>, line_number: u32) -> Self {
        Self {
            file_path: file_path.into(),
            line_number,
        }
    }
}

/// Resolves references against a feature index.
///
/// The resolver borrows the index mutably only so it can build it on first
/// use; it never changes the cached records otherwise.
pub struct Resolver<'a, S = WorkspaceFiles> {
    index: &'a mut FeatureIndex<S>,
}

impl<'a, S: FeatureFileSource> Resolver<'a, S> {
    /// Create a resolver over `index`.
    #[must_use]
    pub fn new(index: &'a mut FeatureIndex<S>) -> Self {
        Self { index }
    }

    /// Parse and resolve a textual fragment.
    #[must_use]
    pub fn resolve_fragment(&mut self, fragment: &str) -> Option<Location> {
        self.resolve(&Reference::parse(fragment))
    }

    /// Resolve a reference, building the index first if it is empty.
    ///
    /// Returns `None` when nothing matches.
    #[must_use]
    pub fn resolve(&mut self, reference: &Reference) -> Option<Location> {
        self.resolve_cancellable(reference, &CancellationToken::new())
    }

    /// Resolve a reference, stopping the rescan early if `token` is
    /// cancelled.
    #[must_use]
    pub fn resolve_cancellable(
        &mut self,
        reference: &Reference,
        token: &CancellationToken,
    ) -> Option<Location> {
        self.index.ensure_initialized();
        let location = self
            .try_index(reference)
            .or_else(|| self.try_rescan(reference, token));
        match &location {
            Some(found) => debug!(
                %reference,
                path = %found.file_path.display(),
                line = found.line_number,
                "resolved reference"
            ),
            None => debug!(%reference, "reference not found"),
        }
        location
    }

    /// Answer from cached records only.
    #[must_use]
    pub fn try_index(&self, reference: &Reference) -> Option<Location> {
        let index = &*self.index;
        match reference {
            Reference::Feature { name } => index
                .find_by_name(name)
                .map(|record| Location::new(&record.file_path, record.line_number)),
            Reference::Scenario { name } => index
                .find_scenario(name)
                .map(|(record, line)| Location::new(&record.file_path, line)),
            Reference::Qualified { feature, line, .. } => index
                .find_by_name(feature)
                .map(|record| Location::new(&record.file_path, declared_to_zero_based(*line))),
            Reference::Annotated {
                scenario,
                source_path,
                line,
            } => index
                .records()
                .iter()
                .find(|record| path_ends_with(&record.file_path, source_path))
                .or_else(|| {
                    index
                        .records()
                        .iter()
                        .find(|record| record.has_scenario(scenario))
                })
                .map(|record| Location::new(&record.file_path, declared_to_zero_based(*line))),
            Reference::Name { name } => self
                .try_index(&Reference::Feature { name: name.clone() })
                .or_else(|| self.try_index(&Reference::Scenario { name: name.clone() })),
        }
    }

    /// Search freshly listed files, bypassing the cache.
    ///
    /// Only feature lookups and annotated scenarios have a rescan stage;
    /// other references resolve from the cache alone.
    #[must_use]
    pub fn try_rescan(&self, reference: &Reference, token: &CancellationToken) -> Option<Location> {
        match reference {
            Reference::Feature { name } | Reference::Name { name } => self
                .scan_for_header(name, token)
                .map(|(path, line)| Location::new(path, line)),
            Reference::Qualified { feature, line, .. } => self
                .scan_for_header(feature, token)
                .map(|(path, _)| Location::new(path, declared_to_zero_based(*line))),
            Reference::Annotated {
                source_path, line, ..
            } => self
                .index
                .list_files()
                .into_iter()
                .find(|path| path_ends_with(path, source_path))
                .map(|path| Location::new(path, declared_to_zero_based(*line))),
            Reference::Scenario { .. } => None,
        }
    }

    /// First listed file containing `Feature: <name>`, with the line of the
    /// first occurrence.
    fn scan_for_header(&self, name: &str, token: &CancellationToken) -> Option<(PathBuf, u32)> {
        let needle = format!("Feature: {name}");
        for path in self.index.list_files() {
            if token.is_cancelled() {
                debug!("reference rescan cancelled");
                return None;
            }
            let Ok(text) = self.index.read_full_text(&path) else {
                debug!(path = %path.display(), "skipping unreadable file during rescan");
                continue;
            };
            if !text.contains(&needle) {
                continue;
            }
            let line = text
                .lines()
                .position(|line| line.contains(&needle))
                .and_then(|n| u32::try_from(n).ok())
                .unwrap_or_default();
            return Some((path, line));
        }
        None
    }
}

/// Convert a declared 1-based line to zero-based, clamping at zero.
fn declared_to_zero_based(line: u32) -> u32 {
    line.saturating_sub(1)
}

/// Whether `path` ends with the `/`-separated components of `suffix`.
fn path_ends_with(path: &Path, suffix: &str) -> bool {
    let suffix = suffix.trim_start_matches("./");
    !suffix.is_empty() && path.ends_with(Path::new(suffix))
}

#[cfg(test)]
#[expect(
    clippy::expect_used,
    reason = "tests require explicit panic messages for debugging failures"
)]
mod tests {
    use super::*;
    use crate::discovery::FileGlobs;
    use rstest::{fixture, rstest};
    use std::fs;
    use tempfile::TempDir;

    const LOGIN: &str = concat!(
        "Feature: Login\n",
        "\n",
        "  Background:\n",
        "    Given a user\n",
        "\n",
        "  Scenario: Valid creds\n",
        "    When they log in\n",
        "\n",
        "\n",
        "  Scenario: Bad creds\n",
    );

    struct Fixture {
        dir: TempDir,
        index: FeatureIndex,
    }

    impl Fixture {
        fn path(&self, relative: &str) -> PathBuf {
            self.dir.path().join(relative)
        }
    }

    #[fixture]
    fn workspace() -> Fixture {
        let dir = TempDir::new().expect("temp dir");
        let features = dir.path().join("features");
        fs::create_dir_all(&features).expect("features dir");
        fs::write(features.join("login.feature"), LOGIN).expect("write login");
        fs::write(
            features.join("logout.feature"),
            "Feature: Logout\n  Scenario: Bye\n",
        )
        .expect("write logout");
        let globs = FileGlobs::new("**/*.feature", "").expect("globs");
        let index = FeatureIndex::new(WorkspaceFiles::new(dir.path()), globs);
        Fixture { dir, index }
    }

    #[rstest]
    fn qualified_reference_uses_declared_line(mut workspace: Fixture) {
        let login = workspace.path("features/login.feature");
        let location = Resolver::new(&mut workspace.index).resolve_fragment("Login/Valid creds:7");
        assert_eq!(location, Some(Location::new(login, 6)));
    }

    #[rstest]
    fn declared_line_wins_over_cached_line(mut workspace: Fixture) {
        let login = workspace.path("features/login.feature");
        let location = Resolver::new(&mut workspace.index).resolve_fragment("Login/Valid creds:40");
        assert_eq!(location, Some(Location::new(login, 39)));
    }

    #[rstest]
    fn declared_line_zero_clamps(mut workspace: Fixture) {
        let location = Resolver::new(&mut workspace.index).resolve_fragment("Login/Valid creds:0");
        assert_eq!(location.map(|l| l.line_number), Some(0));
    }

    #[rstest]
    #[case("Login", "features/login.feature", 0)]
    #[case("Open feature: Logout", "features/logout.feature", 0)]
    #[case("Valid creds", "features/login.feature", 5)]
    #[case("Open scenario: Bad creds", "features/login.feature", 9)]
    #[case("Bye", "features/logout.feature", 1)]
    fn unqualified_names_resolve_from_the_index(
        mut workspace: Fixture,
        #[case] fragment: &str,
        #[case] file: &str,
        #[case] line: u32,
    ) {
        let expected = workspace.path(file);
        let location = Resolver::new(&mut workspace.index).resolve_fragment(fragment);
        assert_eq!(location, Some(Location::new(expected, line)));
    }

    #[rstest]
    fn annotated_reference_prefers_matching_path(mut workspace: Fixture) {
        let logout = workspace.path("features/logout.feature");
        let reference = Reference::Annotated {
            scenario: "Valid creds".into(),
            source_path: "features/logout.feature".into(),
            line: 2,
        };
        let location = Resolver::new(&mut workspace.index).resolve(&reference);
        assert_eq!(location, Some(Location::new(logout, 1)));
    }

    #[rstest]
    fn annotated_reference_falls_back_to_scenario_owner(mut workspace: Fixture) {
        let login = workspace.path("features/login.feature");
        let reference = Reference::Annotated {
            scenario: "Bad creds".into(),
            source_path: "elsewhere/login.feature".into(),
            line: 10,
        };
        let location = Resolver::new(&mut workspace.index).resolve(&reference);
        assert_eq!(location, Some(Location::new(login, 9)));
    }

    #[rstest]
    fn annotated_reference_rescans_unindexed_files(mut workspace: Fixture) {
        let empty = workspace.path("features/empty.feature");
        fs::write(&empty, "# no feature header yet\n").expect("write empty");
        let reference = Reference::Annotated {
            scenario: "Unknown".into(),
            source_path: "features/empty.feature".into(),
            line: 3,
        };
        let location = Resolver::new(&mut workspace.index).resolve(&reference);
        assert_eq!(location, Some(Location::new(empty, 2)));
    }

    #[rstest]
    fn feature_missing_from_cache_is_found_by_rescan(mut workspace: Fixture) {
        workspace.index.rebuild();
        let late = workspace.path("features/late.feature");
        fs::write(&late, "# comment\nFeature: Late arrival\n").expect("write late");

        let location = Resolver::new(&mut workspace.index).resolve_fragment("Late arrival");
        assert_eq!(location, Some(Location::new(late, 1)));
    }

    #[rstest]
    fn cancelled_rescan_reports_not_found(mut workspace: Fixture) {
        workspace.index.rebuild();
        fs::write(workspace.path("features/late.feature"), "Feature: Late\n").expect("write late");
        let token = CancellationToken::new();
        token.cancel();

        let reference = Reference::Feature {
            name: "Late".into(),
        };
        let location = Resolver::new(&mut workspace.index).resolve_cancellable(&reference, &token);
        assert_eq!(location, None);
    }

    #[rstest]
    #[case("Nope")]
    #[case("Open scenario: Nope")]
    #[case("Nope/Valid creds:3")]
    fn unknown_references_are_not_found(mut workspace: Fixture, #[case] fragment: &str) {
        assert_eq!(
            Resolver::new(&mut workspace.index).resolve_fragment(fragment),
            None
        );
    }

    #[test]
    fn first_of_duplicate_feature_names_wins() {
        let dir = TempDir::new().expect("temp dir");
        fs::write(dir.path().join("a.feature"), "Feature: Dup\n").expect("write a");
        fs::write(dir.path().join("b.feature"), "\nFeature: Dup\n").expect("write b");
        let globs = FileGlobs::new("**/*.feature", "").expect("globs");
        let mut index = FeatureIndex::new(WorkspaceFiles::new(dir.path()), globs);

        let location = Resolver::new(&mut index).resolve_fragment("Dup");
        assert_eq!(location, Some(Location::new(dir.path().join("a.feature"), 0)));
    }

    #[rstest]
    #[case("/w/features/login.feature", "features/login.feature", true)]
    #[case("/w/features/login.feature", "./features/login.feature", true)]
    #[case("/w/features/login.feature", "login.feature", true)]
    #[case("/w/features/xlogin.feature", "login.feature", false)]
    #[case("/w/features/login.feature", "", false)]
    fn path_suffix_matching_is_component_wise(
        #[case] path: &str,
        #[case] suffix: &str,
        #[case] expected: bool,
    ) {
        assert_eq!(path_ends_with(Path::new(path), suffix), expected);
    }
}
