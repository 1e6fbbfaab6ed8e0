//! "Run" actions anchored on feature and scenario header lines.

use std::path::Path;

use godog_lens_patterns::{Header, classify};
use tracing::debug;

use crate::discovery::FeatureFileSource;
use crate::indexing::{FeatureIndex, FeatureRecord};
use crate::run_target::RunRequest;

/// Title of the action on a `Feature:` line.
pub const RUN_FEATURE_TITLE: &str = "▶ Run Feature";
/// Title of the action on a `Scenario:` or `Scenario Outline:` line.
pub const RUN_SCENARIO_TITLE: &str = "▶ Run Scenario";

/// A run action for one header line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunAction {
    /// Zero-based line the action is anchored on.
    pub line: u32,
    /// The run the action starts.
    pub request: RunRequest,
}

impl RunAction {
    /// Display title of the action.
    #[must_use]
    pub fn title(&self) -> &'static str {
        if self.request.scenario_name.is_some() {
            RUN_SCENARIO_TITLE
        } else {
            RUN_FEATURE_TITLE
        }
    }
}

/// Collect the run actions for the document at `path`.
///
/// Cached records are used when the index knows the document. Otherwise the
/// document is scanned directly, from `document_text` when the editor holds
/// it open or from disk, and the index is rebuilt afterwards so the next
/// request is served from the cache. Scenarios that precede every feature
/// header in a directly scanned document carry no feature name.
pub fn run_actions<S: FeatureFileSource>(
    index: &mut FeatureIndex<S>,
    path: &Path,
    document_text: Option<&str>,
) -> Vec<RunAction> {
    index.ensure_initialized();

    let cached: Vec<RunAction> = index
        .records_for_path(path)
        .flat_map(actions_for_record)
        .collect();
    if !cached.is_empty() {
        return cached;
    }

    debug!(path = %path.display(), "document not indexed; scanning directly");
    let actions = document_text.map_or_else(
        || {
            index
                .read_full_text(path)
                .map(|text| scan_document(path, &text))
                .unwrap_or_default()
        },
        |text| scan_document(path, text),
    );
    index.rebuild();
    actions
}

fn actions_for_record(record: &FeatureRecord) -> Vec<RunAction> {
    let mut actions = vec![RunAction {
        line: record.line_number,
        request: RunRequest::feature(&record.file_path, &record.name),
    }];
    for scenario in &record.scenario_names {
        let Some(line) = record.scenario_line(scenario) else {
            continue;
        };
        actions.push(RunAction {
            line,
            request: RunRequest::scenario(
                &record.file_path,
                Some(record.name.clone()),
                scenario.as_str(),
            ),
        });
    }
    actions
}

fn scan_document(path: &Path, text: &str) -> Vec<RunAction> {
    let mut actions = Vec::new();
    let mut current_feature: Option<&str> = None;
    for (index, line) in text.lines().enumerate() {
        let Some(header) = classify(line) else {
            continue;
        };
        let Ok(line) = u32::try_from(index) else {
            break;
        };
        let request = match header {
            Header::Feature(name) => {
                current_feature = Some(name);
                RunRequest::feature(path, name)
            }
            Header::Scenario(name) | Header::ScenarioOutline(name) => {
                RunRequest::scenario(path, current_feature.map(str::to_owned), name)
            }
        };
        actions.push(RunAction { line, request });
    }
    actions
}

#[cfg(test)]
#[expect(
    clippy::expect_used,
    reason = "tests require explicit panic messages for debugging failures"
)]
mod tests {
    use super::*;
    use crate::discovery::{FileGlobs, WorkspaceFiles};
    use std::fs;
    use tempfile::TempDir;

    fn summary(actions: &[RunAction]) -> Vec<(u32, &'static str, Option<&str>, Option<&str>)> {
        actions
            .iter()
            .map(|a| {
                (
                    a.line,
                    a.title(),
                    a.request.feature_name.as_deref(),
                    a.request.scenario_name.as_deref(),
                )
            })
            .collect()
    }

    fn index_for(dir: &TempDir) -> FeatureIndex {
        let globs = FileGlobs::new("**/*.feature", "").expect("globs");
        FeatureIndex::new(WorkspaceFiles::new(dir.path()), globs)
    }

    #[test]
    fn indexed_document_uses_cached_records() {
        let dir = TempDir::new().expect("temp dir");
        let path = dir.path().join("login.feature");
        fs::write(&path, "Feature: Login\n  Scenario: Valid creds\n  Scenario Outline: Bad <n>\n")
            .expect("write feature");
        let mut index = index_for(&dir);

        let actions = run_actions(&mut index, &path, None);
        assert_eq!(
            summary(&actions),
            vec![
                (0, RUN_FEATURE_TITLE, Some("Login"), None),
                (1, RUN_SCENARIO_TITLE, Some("Login"), Some("Valid creds")),
                (2, RUN_SCENARIO_TITLE, Some("Login"), Some("Bad <n>")),
            ]
        );
        assert!(actions.iter().all(|a| a.request.file_path == path));
    }

    #[test]
    fn unindexed_document_is_scanned_and_index_rebuilt() {
        let dir = TempDir::new().expect("temp dir");
        fs::write(dir.path().join("other.feature"), "Feature: Other\n").expect("write other");
        let mut index = index_for(&dir);
        index.rebuild();

        let path = dir.path().join("draft.feature");
        fs::write(&path, "Feature: Draft\n").expect("write draft");
        let unsaved = "Scenario: orphan\nFeature: Draft\n  Scenario: first\n";

        let actions = run_actions(&mut index, &path, Some(unsaved));
        assert_eq!(
            summary(&actions),
            vec![
                (0, RUN_SCENARIO_TITLE, None, Some("orphan")),
                (1, RUN_FEATURE_TITLE, Some("Draft"), None),
                (2, RUN_SCENARIO_TITLE, Some("Draft"), Some("first")),
            ]
        );
        assert!(index.find_by_path(&path).is_some());
    }

    #[test]
    fn unreadable_unindexed_document_has_no_actions() {
        let dir = TempDir::new().expect("temp dir");
        let mut index = index_for(&dir);
        let actions = run_actions(&mut index, &dir.path().join("missing.feature"), None);
        assert!(actions.is_empty());
    }
}
