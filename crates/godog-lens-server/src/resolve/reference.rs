//! Free-text references to features and scenarios.

use std::fmt;

use serde::{Deserialize, Serialize};

const OPEN_FEATURE: &str = "Open feature:";
const OPEN_SCENARIO: &str = "Open scenario:";
const ANNOTATION_SEPARATOR: &str = " # ";

/// A parsed reference to a feature or scenario.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum Reference {
    /// A feature named explicitly.
    Feature {
        /// Feature name.
        name: String,
    },
    /// A scenario named explicitly, without its feature.
    Scenario {
        /// Scenario name.
        name: String,
    },
    /// `<feature>/<scenario>:<line>` with a declared 1-based line.
    #[serde(rename_all = "camelCase")]
    Qualified {
        /// Feature name.
        feature: String,
        /// Scenario name.
        scenario: String,
        /// Declared 1-based line.
        line: u32,
    },
    /// A scenario as annotated in runner output: `<scenario> # <path>:<line>`.
    #[serde(rename_all = "camelCase")]
    Annotated {
        /// Scenario name.
        scenario: String,
        /// Source path as printed, usually relative.
        source_path: String,
        /// Declared 1-based line.
        line: u32,
    },
    /// A bare name that may be either a feature or a scenario.
    Name {
        /// Feature or scenario name.
        name: String,
    },
}

impl Reference {
    /// Parse a textual fragment.
    ///
    /// Accepted forms:
    ///
    /// - `Open feature: <name>`
    /// - `Open scenario: <name>`
    /// - `Open scenario: <feature>/<scenario>:<line>`
    /// - `<scenario> # <path>:<line>`, optionally after `Open scenario:`
    /// - `<feature>/<scenario>:<line>`
    /// - `<name>`
    ///
    /// Names are trimmed. Anything that is not a well-formed qualified or
    /// annotated reference falls back to a name.
    ///
    /// # Examples
    ///
    /// ```
    /// use godog_lens_server::resolve::Reference;
    ///
    /// assert_eq!(
    ///     Reference::parse("Login/Valid creds:7"),
    ///     Reference::Qualified {
    ///         feature: "Login".into(),
    ///         scenario: "Valid creds".into(),
    ///         line: 7,
    ///     }
    /// );
    /// assert_eq!(
    ///     Reference::parse("Open feature: Login"),
    ///     Reference::Feature { name: "Login".into() }
    /// );
    /// ```
    #[must_use]
    pub fn parse(fragment: &str) -> Self {
        let fragment = fragment.trim();

        if let Some(rest) = fragment.strip_prefix(OPEN_FEATURE) {
            return Self::Feature {
                name: rest.trim().to_owned(),
            };
        }

        if let Some(rest) = fragment.strip_prefix(OPEN_SCENARIO) {
            let rest = rest.trim();
            return parse_annotated(rest)
                .or_else(|| parse_qualified(rest))
                .unwrap_or_else(|| Self::Scenario {
                    name: rest.to_owned(),
                });
        }

        parse_annotated(fragment)
            .or_else(|| parse_qualified(fragment))
            .unwrap_or_else(|| Self::Name {
                name: fragment.to_owned(),
            })
    }
}

fn parse_annotated(text: &str) -> Option<Reference> {
    let (scenario, location) = text.rsplit_once(ANNOTATION_SEPARATOR)?;
    let (source_path, line) = split_line_suffix(location.trim())?;
    let scenario = scenario.trim();
    if scenario.is_empty() || source_path.is_empty() {
        return None;
    }
    Some(Reference::Annotated {
        scenario: scenario.to_owned(),
        source_path: source_path.to_owned(),
        line,
    })
}

fn parse_qualified(text: &str) -> Option<Reference> {
    let mut parts = text.split('/');
    let (Some(feature), Some(scenario_part), None) = (parts.next(), parts.next(), parts.next())
    else {
        return None;
    };
    let (scenario, line) = split_line_suffix(scenario_part)?;
    Some(Reference::Qualified {
        feature: feature.trim().to_owned(),
        scenario: scenario.trim().to_owned(),
        line,
    })
}

/// Split `<text>:<digits>` at its last colon.
fn split_line_suffix(text: &str) -> Option<(&str, u32)> {
    let (head, digits) = text.rsplit_once(':')?;
    let line = digits.trim().parse().ok()?;
    Some((head.trim(), line))
}

impl fmt::Display for Reference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Feature { name } => write!(f, "{OPEN_FEATURE} {name}"),
            Self::Scenario { name } => write!(f, "{OPEN_SCENARIO} {name}"),
            Self::Qualified {
                feature,
                scenario,
                line,
            } => write!(f, "{OPEN_SCENARIO} {feature}/{scenario}:{line}"),
            Self::Annotated {
                scenario,
                source_path,
                line,
            } => write!(
                f,
                "{OPEN_SCENARIO} {scenario}{ANNOTATION_SEPARATOR}{source_path}:{line}"
            ),
            Self::Name { name } => f.write_str(name),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn qualified(feature: &str, scenario: &str, line: u32) -> Reference {
        Reference::Qualified {
            feature: feature.to_owned(),
            scenario: scenario.to_owned(),
            line,
        }
    }

    fn name(text: &str) -> Reference {
        Reference::Name {
            name: text.to_owned(),
        }
    }

    #[rstest]
    #[case("Login/Valid creds:7", qualified("Login", "Valid creds", 7))]
    #[case(" Login / Valid creds : 12 ", qualified("Login", "Valid creds", 12))]
    #[case("Open scenario: Login/Valid creds:7", qualified("Login", "Valid creds", 7))]
    #[case("Login", name("Login"))]
    #[case("Login/Valid creds", name("Login/Valid creds"))]
    #[case("a/b/c:3", name("a/b/c:3"))]
    #[case("Login/Valid creds:seven", name("Login/Valid creds:seven"))]
    #[case("Login/Valid creds:-1", name("Login/Valid creds:-1"))]
    fn parses_bare_and_qualified_fragments(#[case] fragment: &str, #[case] expected: Reference) {
        assert_eq!(Reference::parse(fragment), expected);
    }

    #[rstest]
    #[case("Open feature: Login", Reference::Feature { name: "Login".into() })]
    #[case("Open feature:   ", Reference::Feature { name: String::new() })]
    #[case("Open scenario: Valid creds", Reference::Scenario { name: "Valid creds".into() })]
    fn parses_prefixed_fragments(#[case] fragment: &str, #[case] expected: Reference) {
        assert_eq!(Reference::parse(fragment), expected);
    }

    #[test]
    fn parses_annotated_fragment() {
        assert_eq!(
            Reference::parse("Open scenario: Bad creds # features/login.feature:11"),
            Reference::Annotated {
                scenario: "Bad creds".into(),
                source_path: "features/login.feature".into(),
                line: 11,
            }
        );
    }

    #[rstest]
    #[case(Reference::Feature { name: "Login".into() })]
    #[case(Reference::Scenario { name: "Valid creds".into() })]
    #[case(qualified("Login", "Valid creds", 7))]
    #[case(Reference::Annotated {
        scenario: "Bad creds".into(),
        source_path: "features/login.feature".into(),
        line: 11,
    })]
    #[case(name("Logout"))]
    fn display_text_parses_back(#[case] reference: Reference) {
        assert_eq!(Reference::parse(&reference.to_string()), reference);
    }

    #[test]
    fn serialises_with_kind_tag() {
        let json = serde_json::to_value(Reference::Annotated {
            scenario: "s".into(),
            source_path: "f.feature".into(),
            line: 2,
        })
        .ok();
        assert_eq!(
            json,
            Some(serde_json::json!({
                "kind": "annotated",
                "scenario": "s",
                "sourcePath": "f.feature",
                "line": 2
            }))
        );
    }
}
