//! Stateless text recognisers shared by the godog-lens crates.
//!
//! The crate groups the pure, allocation-light helpers that the server builds
//! on:
//!
//! - [`classify`] recognises `Feature:`, `Scenario:` and `Scenario Outline:`
//!   header lines in a feature document.
//! - [`sanitize_name`] and [`render_test_pattern`] turn feature and scenario
//!   names into the `-run` filter handed to `go test`.
//! - [`find_link_matches`] spots feature and scenario references in one line
//!   of runner output.
//!
//! None of these functions keep state between calls, so they can be used
//! from any thread without coordination.

mod errors;
mod header;
mod link;
mod sanitize;
mod template;

pub use errors::PatternError;
pub use header::{Header, classify};
pub use link::{LinkKind, LinkMatch, SourceAnnotation, find_link_matches};
pub use sanitize::sanitize_name;
pub use template::{
    FEATURE_FILE_PATH, FEATURE_NAME, PatternInputs, SANITIZED_FEATURE_NAME,
    SANITIZED_SCENARIO_NAME, SCENARIO_NAME, render_test_pattern, validate_template,
};
