//! Shared test support utilities for godog-lens-server integration tests.
//!
//! This module re-exports utilities from the crate's `test_support` module,
//! providing a single source of truth for test infrastructure.

#![allow(
    unused_imports,
    dead_code,
    reason = "each test binary uses a different subset of helpers"
)]

pub use godog_lens_server::test_support::{TestWorkspace, WorkspaceBuilder};

use lsp_types::{DidSaveTextDocumentParams, TextDocumentIdentifier, Url};
use std::path::Path;

use godog_lens_server::handlers::handle_did_save_text_document;
use godog_lens_server::server::ServerState;

/// Simulate the client saving `path`.
#[expect(clippy::expect_used, reason = "test helper uses expect for clarity")]
pub fn save(state: &mut ServerState, path: &Path) {
    let uri = Url::from_file_path(path).expect("file URI");
    handle_did_save_text_document(
        state,
        DidSaveTextDocumentParams {
            text_document: TextDocumentIdentifier { uri },
            text: None,
        },
    );
}

/// A small Go module with two feature documents and one excluded copy.
pub fn login_workspace() -> TestWorkspace {
    WorkspaceBuilder::new()
        .with_go_module()
        .with_file("e2e/steps_test.go", "package e2e\n")
        .with_file(
            "e2e/features/login.feature",
            concat!(
                "Feature: Login\n",
                "  Scenario: Valid creds\n",
                "    Given a user\n",
                "  Scenario Outline: Locked <kind>\n",
                "    Given a <kind> account\n",
            ),
        )
        .with_file(
            "e2e/features/billing.feature",
            concat!(
                "@billing\n",
                "Feature: Billing\n",
                "  Background:\n",
                "    Given a card\n",
                "  Scenario: Valid creds\n",
            ),
        )
        .with_file(
            "node_modules/pkg/login.feature",
            "Feature: Vendored\n  Scenario: Ignored\n",
        )
        .build()
}
