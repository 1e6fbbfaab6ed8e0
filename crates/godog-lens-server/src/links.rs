//! Clickable references in runner output.
//!
//! Each line of `go test` output is scanned for feature and scenario
//! references. Positions are reported in UTF-16 code units so they can be
//! handed to an editor unchanged.

use godog_lens_patterns::{LinkKind, LinkMatch, find_link_matches};
use serde::{Deserialize, Serialize};
use tokio_util::sync::CancellationToken;

use crate::resolve::Reference;
use crate::util::{byte_col_to_utf16_col, utf16_len};

/// A reference found in one line of output.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TerminalLink {
    /// UTF-16 column where the link starts.
    pub start: u32,
    /// Link length in UTF-16 code units.
    pub length: u32,
    /// What the link points at.
    pub reference: Reference,
    /// Hover text for the link; [`Reference::parse`] reads it back.
    pub tooltip: String,
}

/// Find every reference in `line`.
///
/// Annotated scenarios come first, then features, plain scenarios and
/// scenario outlines. A line that carries an annotated scenario yields no
/// plain scenario link. The scan stops early once `token` is cancelled,
/// keeping the links found so far.
///
/// # Examples
///
/// ```
/// use godog_lens_server::links::detect_links;
/// use tokio_util::sync::CancellationToken;
///
/// let links = detect_links("Feature: Login", &CancellationToken::new());
/// assert_eq!(links.len(), 1);
/// assert_eq!((links[0].start, links[0].length), (9, 5));
/// assert_eq!(links[0].tooltip, "Open feature: Login");
/// ```
#[must_use]
pub fn detect_links(line: &str, token: &CancellationToken) -> Vec<TerminalLink> {
    find_link_matches(line, || !token.is_cancelled())
        .into_iter()
        .map(|found| to_terminal_link(line, &found))
        .collect()
}

fn to_terminal_link(line: &str, found: &LinkMatch<'_>) -> TerminalLink {
    let name = found.name.to_owned();
    let reference = match (found.kind, found.annotation) {
        (LinkKind::Feature, _) => Reference::Feature { name },
        (LinkKind::AnnotatedScenario, Some(annotation)) => Reference::Annotated {
            scenario: name,
            source_path: annotation.path.to_owned(),
            line: annotation.line,
        },
        (LinkKind::Scenario | LinkKind::ScenarioOutline | LinkKind::AnnotatedScenario, _) => {
            Reference::Scenario { name }
        }
    };
    let tooltip = reference.to_string();
    TerminalLink {
        start: byte_col_to_utf16_col(line, found.start),
        length: utf16_len(found.name),
        reference,
        tooltip,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn links(line: &str) -> Vec<TerminalLink> {
        detect_links(line, &CancellationToken::new())
    }

    #[test]
    fn annotated_scenario_links_to_its_source() {
        let line = "  Scenario: Valid creds          # features/login.feature:6";
        assert_eq!(
            links(line),
            vec![TerminalLink {
                start: 12,
                length: 11,
                reference: Reference::Annotated {
                    scenario: "Valid creds".into(),
                    source_path: "features/login.feature".into(),
                    line: 6,
                },
                tooltip: "Open scenario: Valid creds # features/login.feature:6".into(),
            }]
        );
    }

    #[rstest]
    #[case("Feature: Login", 9, 5, "Open feature: Login")]
    #[case("    Scenario: Bye", 14, 3, "Open scenario: Bye")]
    #[case("  Scenario Outline: eat <n>", 20, 7, "Open scenario: eat <n>")]
    fn plain_headers_link_after_keyword(
        #[case] line: &str,
        #[case] start: u32,
        #[case] length: u32,
        #[case] tooltip: &str,
    ) {
        let found = links(line);
        let first = found.first().map(|l| (l.start, l.length, l.tooltip.as_str()));
        assert_eq!(first, Some((start, length, tooltip)));
    }

    #[test]
    fn positions_are_utf16_columns() {
        let found = links("🚀 Feature: Café");
        let first = found.first().map(|l| (l.start, l.length));
        // The rocket takes two UTF-16 units and four bytes.
        assert_eq!(first, Some((12, 4)));
    }

    #[test]
    fn cancelled_scan_finds_nothing() {
        let token = CancellationToken::new();
        token.cancel();
        assert!(detect_links("Feature: Login", &token).is_empty());
    }

    #[test]
    fn ordinary_output_has_no_links() {
        assert!(links("ok  \texample.com/shop\t0.012s").is_empty());
    }
}
