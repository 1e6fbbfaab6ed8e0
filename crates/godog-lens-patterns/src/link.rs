//! Recognisers for feature and scenario references in runner output.
//!
//! godog prints headers such as `Feature: Login` and, in its pretty format,
//! annotates each scenario with its source position:
//!
//! ```text
//!   Scenario: Valid creds          # features/login.feature:7
//! ```
//!
//! [`find_link_matches`] reports every such reference in one line together
//! with the byte offset of the referenced name.

use std::sync::LazyLock;

use regex::Regex;

// The `unreachable!()` calls below are safe because every pattern is a
// compile-time constant that has been validated and cannot fail to compile.

/// `Scenario: <name> # <path>:<line>`, as printed by godog's pretty format.
static ANNOTATED_SCENARIO_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\s*Scenario: ([^\n#]+)\s+# ([^:]+):(\d+)").unwrap_or_else(|_| unreachable!())
});
/// `Feature: <name>` anywhere in the line.
static FEATURE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"Feature: ([^\n]+)").unwrap_or_else(|_| unreachable!()));
/// `Scenario: <name>` anywhere in the line.
static SCENARIO_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"Scenario: ([^\n]+)").unwrap_or_else(|_| unreachable!()));
/// `Scenario Outline: <name>` anywhere in the line.
static SCENARIO_OUTLINE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"Scenario Outline: ([^\n]+)").unwrap_or_else(|_| unreachable!()));

const FEATURE_PREFIX: &str = "Feature: ";
const SCENARIO_PREFIX: &str = "Scenario: ";
const SCENARIO_OUTLINE_PREFIX: &str = "Scenario Outline: ";

/// The kind of reference found in a line of output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LinkKind {
    /// `Feature: <name>`
    Feature,
    /// `Scenario: <name>`
    Scenario,
    /// `Scenario Outline: <name>`
    ScenarioOutline,
    /// `Scenario: <name> # <path>:<line>`
    AnnotatedScenario,
}

/// Source position printed next to an annotated scenario.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SourceAnnotation<'a> {
    /// Path as printed by the runner, usually relative to the package.
    pub path: &'a str,
    /// Declared 1-based line number.
    pub line: u32,
}

/// A reference recognised in a line of output.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LinkMatch<'a> {
    /// Which recogniser produced the match.
    pub kind: LinkKind,
    /// The referenced name with surrounding whitespace removed.
    pub name: &'a str,
    /// Byte offset of the link start within the line.
    pub start: usize,
    /// Source annotation, present only for [`LinkKind::AnnotatedScenario`].
    pub annotation: Option<SourceAnnotation<'a>>,
}

/// Find every feature and scenario reference in `line`.
///
/// Matches are reported annotated scenarios first, then features, plain
/// scenarios and scenario outlines. Plain `Scenario:` matches are skipped
/// when the line carries an annotated scenario, so each scenario yields a
/// single link. `keep_going` is polled before each match and ends the scan
/// early when it returns `false`.
///
/// # Examples
/// ```
/// use godog_lens_patterns::{LinkKind, find_link_matches};
///
/// let line = "  Scenario: Valid creds   # features/login.feature:7";
/// let matches = find_link_matches(line, || true);
/// assert_eq!(matches.len(), 1);
/// let first = &matches[0];
/// assert_eq!(first.kind, LinkKind::AnnotatedScenario);
/// assert_eq!(first.name, "Valid creds");
/// assert_eq!(first.annotation.map(|a| a.line), Some(7));
/// ```
pub fn find_link_matches(line: &str, mut keep_going: impl FnMut() -> bool) -> Vec<LinkMatch<'_>> {
    let mut matches = Vec::new();

    for caps in ANNOTATED_SCENARIO_RE.captures_iter(line) {
        if !keep_going() {
            return matches;
        }
        let (Some(name), Some(path), Some(number)) = (caps.get(1), caps.get(2), caps.get(3))
        else {
            continue;
        };
        let Ok(declared) = number.as_str().parse::<u32>() else {
            continue;
        };
        let name = name.as_str().trim();
        if name.is_empty() {
            continue;
        }
        matches.push(LinkMatch {
            kind: LinkKind::AnnotatedScenario,
            name,
            start: line.find(name).unwrap_or_default(),
            annotation: Some(SourceAnnotation {
                path: path.as_str().trim(),
                line: declared,
            }),
        });
    }
    let has_annotated = !matches.is_empty();

    let plain: [(&Regex, LinkKind, &str); 3] = [
        (&*FEATURE_RE, LinkKind::Feature, FEATURE_PREFIX),
        (&*SCENARIO_RE, LinkKind::Scenario, SCENARIO_PREFIX),
        (
            &*SCENARIO_OUTLINE_RE,
            LinkKind::ScenarioOutline,
            SCENARIO_OUTLINE_PREFIX,
        ),
    ];
    for (re, kind, prefix) in plain {
        if kind == LinkKind::Scenario && has_annotated {
            continue;
        }
        for caps in re.captures_iter(line) {
            if !keep_going() {
                return matches;
            }
            let (Some(whole), Some(name)) = (caps.get(0), caps.get(1)) else {
                continue;
            };
            let name = name.as_str().trim();
            if name.is_empty() {
                continue;
            }
            matches.push(LinkMatch {
                kind,
                name,
                start: whole.start() + prefix.len(),
                annotation: None,
            });
        }
    }

    matches
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(line: &str) -> Vec<LinkKind> {
        find_link_matches(line, || true)
            .into_iter()
            .map(|m| m.kind)
            .collect()
    }

    #[test]
    fn finds_feature_header() {
        let matches = find_link_matches("Feature: Login", || true);
        assert_eq!(
            matches,
            vec![LinkMatch {
                kind: LinkKind::Feature,
                name: "Login",
                start: 9,
                annotation: None,
            }]
        );
    }

    #[test]
    fn annotated_scenario_suppresses_plain_scenario_match() {
        let line = "    Scenario: Bad creds        # features/login.feature:11";
        assert_eq!(kinds(line), vec![LinkKind::AnnotatedScenario]);
        let matches = find_link_matches(line, || true);
        let annotated = matches.first().map(|m| (m.name, m.start, m.annotation));
        assert_eq!(
            annotated,
            Some((
                "Bad creds",
                14,
                Some(SourceAnnotation {
                    path: "features/login.feature",
                    line: 11,
                })
            ))
        );
    }

    #[test]
    fn plain_scenario_and_outline_are_reported_separately() {
        assert_eq!(kinds("Scenario: one"), vec![LinkKind::Scenario]);
        assert_eq!(
            kinds("Scenario Outline: eat <n>"),
            vec![LinkKind::ScenarioOutline]
        );
    }

    #[test]
    fn outline_offset_skips_keyword() {
        let matches = find_link_matches("  Scenario Outline: eat", || true);
        assert_eq!(matches.first().map(|m| m.start), Some(20));
    }

    #[test]
    fn unrelated_output_has_no_matches() {
        assert!(kinds("--- PASS: TestFeatures (0.01s)").is_empty());
        assert!(kinds("").is_empty());
    }

    #[test]
    fn blank_names_yield_no_links() {
        let matches = find_link_matches("Scenario:   # f.feature:3", || true);
        assert!(
            matches
                .iter()
                .all(|m| m.kind != LinkKind::AnnotatedScenario && !m.name.is_empty())
        );
        assert!(kinds("Feature:    ").is_empty());
    }

    #[test]
    fn oversized_line_numbers_are_ignored() {
        let line = "Scenario: big # f.feature:99999999999";
        assert!(
            find_link_matches(line, || true)
                .iter()
                .all(|m| m.kind != LinkKind::AnnotatedScenario)
        );
    }

    #[test]
    fn stops_when_asked() {
        let mut budget = 1;
        let matches = find_link_matches("Feature: a Scenario Outline: b", || {
            let go = budget > 0;
            budget -= 1;
            go
        });
        assert_eq!(matches.len(), 1);
    }
}
