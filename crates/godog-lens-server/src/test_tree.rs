//! A test-explorer view of the feature index.
//!
//! Features become parent items and their scenarios children. Item ids are
//! stable across rebuilds as long as the path and names do not change:
//! `feature:<path>:<feature>` and `scenario:<path>:<feature>:<scenario>`.
//! Names may contain `:`, so ids are looked up in the tree rather than
//! split apart.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::config::RunConfig;
use crate::indexing::FeatureRecord;
use crate::run_target::{RunRequest, RunTarget};

/// Whether an item stands for a feature or a scenario.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum TestItemKind {
    /// A `Feature:` block.
    Feature,
    /// A `Scenario:` or `Scenario Outline:` block.
    Scenario,
}

/// One node of the test tree.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TestItem {
    /// Stable identifier.
    pub id: String,
    /// Display label.
    pub label: String,
    /// Node kind.
    pub kind: TestItemKind,
    /// Owning feature name.
    pub feature_name: String,
    /// Scenario name, for scenario items.
    pub scenario_name: Option<String>,
    /// Declaring document.
    pub file_path: PathBuf,
    /// Zero-based header line.
    pub line: u32,
    /// Scenario items beneath a feature.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<TestItem>,
}

impl TestItem {
    fn request(&self) -> RunRequest {
        RunRequest {
            file_path: self.file_path.clone(),
            feature_name: Some(self.feature_name.clone()),
            scenario_name: self.scenario_name.clone(),
        }
    }
}

/// Id of a feature item.
#[must_use]
pub fn feature_id(record: &FeatureRecord) -> String {
    format!("feature:{}:{}", record.file_path.display(), record.name)
}

/// Id of a scenario item.
#[must_use]
pub fn scenario_id(record: &FeatureRecord, scenario: &str) -> String {
    format!(
        "scenario:{}:{}:{scenario}",
        record.file_path.display(),
        record.name
    )
}

/// Build the tree for `records`, in index order.
///
/// A scenario name repeated within one feature yields a single child.
#[must_use]
pub fn build_test_tree(records: &[FeatureRecord]) -> Vec<TestItem> {
    records.iter().map(feature_item).collect()
}

fn feature_item(record: &FeatureRecord) -> TestItem {
    let mut children: Vec<TestItem> = Vec::new();
    for scenario in &record.scenario_names {
        let id = scenario_id(record, scenario);
        if children.iter().any(|child| child.id == id) {
            continue;
        }
        let Some(line) = record.scenario_line(scenario) else {
            continue;
        };
        children.push(TestItem {
            id,
            label: scenario.clone(),
            kind: TestItemKind::Scenario,
            feature_name: record.name.clone(),
            scenario_name: Some(scenario.clone()),
            file_path: record.file_path.clone(),
            line,
            children: Vec::new(),
        });
    }
    TestItem {
        id: feature_id(record),
        label: record.name.clone(),
        kind: TestItemKind::Feature,
        feature_name: record.name.clone(),
        scenario_name: None,
        file_path: record.file_path.clone(),
        line: record.line_number,
        children,
    }
}

/// Format run targets for the items named by `ids`.
///
/// A feature with scenarios expands to one target per scenario; a feature
/// without scenarios runs as a whole. Unknown ids are skipped.
#[must_use]
pub fn run_targets_for_ids(
    tree: &[TestItem],
    ids: &[String],
    config: &RunConfig,
) -> Vec<RunTarget> {
    let mut targets = Vec::new();
    for id in ids {
        let Some(item) = find_item(tree, id) else {
            debug!(%id, "skipping unknown test item");
            continue;
        };
        if item.children.is_empty() {
            targets.push(item.request().target(config));
        } else {
            targets.extend(item.children.iter().map(|child| child.request().target(config)));
        }
    }
    targets
}

fn find_item<'a>(items: &'a [TestItem], id: &str) -> Option<&'a TestItem> {
    items.iter().find_map(|item| {
        if item.id == id {
            Some(item)
        } else {
            find_item(&item.children, id)
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn records() -> Vec<FeatureRecord> {
        let mut login = FeatureRecord::new("Login", "/w/login.feature", 0);
        login.push_scenario("Valid creds", 5);
        login.push_scenario("Bad: creds", 9);
        login.push_scenario("Valid creds", 12);
        let logout = FeatureRecord::new("Logout", "/w/logout.feature", 1);
        vec![login, logout]
    }

    fn ids(items: &[TestItem]) -> Vec<&str> {
        items.iter().map(|i| i.id.as_str()).collect()
    }

    #[test]
    fn tree_mirrors_index_order() {
        let tree = build_test_tree(&records());
        assert_eq!(
            ids(&tree),
            vec!["feature:/w/login.feature:Login", "feature:/w/logout.feature:Logout"]
        );
        let login_children = tree.first().map(|f| ids(&f.children)).unwrap_or_default();
        assert_eq!(
            login_children,
            vec![
                "scenario:/w/login.feature:Login:Valid creds",
                "scenario:/w/login.feature:Login:Bad: creds",
            ]
        );
        let lines: Vec<u32> = tree
            .first()
            .map(|f| f.children.iter().map(|c| c.line).collect())
            .unwrap_or_default();
        assert_eq!(lines, vec![12, 9]);
    }

    #[test]
    fn feature_ids_expand_to_their_scenarios() {
        let tree = build_test_tree(&records());
        let targets = run_targets_for_ids(
            &tree,
            &["feature:/w/login.feature:Login".to_owned()],
            &RunConfig::default(),
        );
        let patterns: Vec<&str> = targets.iter().map(|t| t.pattern.as_str()).collect();
        assert_eq!(patterns, vec!["/Login/Valid_creds$", "/Login/Bad__creds$"]);
    }

    #[test]
    fn childless_features_and_scenarios_run_directly() {
        let tree = build_test_tree(&records());
        let targets = run_targets_for_ids(
            &tree,
            &[
                "feature:/w/logout.feature:Logout".to_owned(),
                "scenario:/w/login.feature:Login:Bad: creds".to_owned(),
                "feature:/w/missing.feature:Gone".to_owned(),
            ],
            &RunConfig::default(),
        );
        let patterns: Vec<&str> = targets.iter().map(|t| t.pattern.as_str()).collect();
        assert_eq!(patterns, vec!["/Logout/", "/Login/Bad__creds$"]);
    }

    #[test]
    fn items_serialise_camel_case() {
        let tree = build_test_tree(&records());
        let json = serde_json::to_value(tree.get(1)).ok();
        assert_eq!(
            json,
            Some(serde_json::json!({
                "id": "feature:/w/logout.feature:Logout",
                "label": "Logout",
                "kind": "feature",
                "featureName": "Logout",
                "scenarioName": null,
                "filePath": "/w/logout.feature",
                "line": 1
            }))
        );
    }
}
