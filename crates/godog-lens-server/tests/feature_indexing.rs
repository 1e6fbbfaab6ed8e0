//! Behavioural tests for building and refreshing the feature index.

#![expect(
    clippy::expect_used,
    reason = "integration tests use explicit panics for clarity"
)]

mod support;

use std::path::PathBuf;

use godog_lens_server::config::ServerConfig;
use godog_lens_server::handlers::handle_did_change_watched_files;
use lsp_types::{DidChangeWatchedFilesParams, FileChangeType, FileEvent, Url};
use support::{WorkspaceBuilder, login_workspace, save};

#[test]
fn initialised_workspace_indexes_feature_documents() {
    let mut workspace = login_workspace();
    let login = workspace.path("e2e/features/login.feature");
    let billing = workspace.path("e2e/features/billing.feature");

    let index = workspace.index();
    let mut names: Vec<&str> = index.records().iter().map(|r| r.name.as_str()).collect();
    names.sort_unstable();
    assert_eq!(names, vec!["Billing", "Login"]);

    let record = index.find_by_path(&login).expect("login record");
    assert_eq!(record.line_number, 0);
    assert_eq!(record.scenario_names, vec!["Valid creds", "Locked <kind>"]);
    assert_eq!(record.scenario_line("Locked <kind>"), Some(3));

    let record = index.find_by_path(&billing).expect("billing record");
    assert_eq!(record.line_number, 1);
    assert_eq!(record.scenario_line("Valid creds"), Some(4));
}

#[test]
fn excluded_directories_are_not_indexed() {
    let mut workspace = login_workspace();
    let index = workspace.index();
    assert!(index.find_by_name("Vendored").is_none());
    assert!(
        index
            .list_files()
            .iter()
            .all(|path| !path.components().any(|c| c.as_os_str() == "node_modules"))
    );
}

#[test]
fn custom_globs_narrow_the_index() {
    let config = ServerConfig::default().apply_overrides(
        None,
        Some("specs/**/*.feature".to_owned()),
        Some(String::new()),
    );
    let mut workspace = WorkspaceBuilder::new()
        .with_config(config)
        .with_file("specs/a.feature", "Feature: In specs\n")
        .with_file("other/b.feature", "Feature: Elsewhere\n")
        .build();
    let index = workspace.index();
    assert!(index.find_by_name("In specs").is_some());
    assert!(index.find_by_name("Elsewhere").is_none());
}

#[test]
fn saving_a_feature_document_refreshes_the_index() {
    let mut workspace = login_workspace();
    let path = workspace.write(
        "e2e/features/login.feature",
        "Feature: Sign in\n  Scenario: Renamed\n",
    );
    save(&mut workspace.state, &path);

    let index = workspace.index();
    assert!(index.find_by_name("Login").is_none());
    let record = index.find_by_name("Sign in").expect("renamed feature");
    assert_eq!(record.file_path, path);
    assert!(record.has_scenario("Renamed"));
}

#[test]
fn deleting_a_watched_document_drops_its_records() {
    let mut workspace = login_workspace();
    let path: PathBuf = workspace.path("e2e/features/billing.feature");
    std::fs::remove_file(&path).expect("remove feature");

    handle_did_change_watched_files(
        &mut workspace.state,
        DidChangeWatchedFilesParams {
            changes: vec![FileEvent::new(
                Url::from_file_path(&path).expect("file URI"),
                FileChangeType::DELETED,
            )],
        },
    );

    let index = workspace.index();
    assert!(index.find_by_name("Billing").is_none());
    assert!(index.find_by_name("Login").is_some());
}

#[test]
fn documents_with_non_utf8_bytes_are_still_indexed() {
    let mut workspace = WorkspaceBuilder::new()
        .with_file("features/other.feature", "Feature: Other\n")
        .build();
    let path = workspace.path("features/cafe.feature");
    std::fs::write(&path, b"Feature: Caf\xe9\n  Scenario: Order\n").expect("write latin-1 file");
    save(&mut workspace.state, &path);

    let index = workspace.index();
    let record = index.find_by_path(&path).expect("latin-1 document indexed");
    assert_eq!(record.name, "Caf\u{FFFD}");
    assert_eq!(record.scenario_line("Order"), Some(1));
    assert!(index.find_by_name("Other").is_some());
}
