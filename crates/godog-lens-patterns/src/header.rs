//! Feature-document header classification.

use std::sync::LazyLock;

use regex::Regex;

/// Matches a `Feature:`, `Scenario:` or `Scenario Outline:` header line.
///
/// The `unreachable!()` is safe here because this is a compile-time constant
/// regex pattern that has been validated and cannot fail to compile.
static HEADER_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\s*(Feature|Scenario Outline|Scenario):(.*)$").unwrap_or_else(|_| unreachable!())
});

/// A header line recognised in a feature document.
///
/// The borrowed name is the text after the keyword's colon with surrounding
/// whitespace removed. It may be empty.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Header<'a> {
    /// `Feature: <name>`
    Feature(&'a str),
    /// `Scenario: <name>`
    Scenario(&'a str),
    /// `Scenario Outline: <name>`
    ScenarioOutline(&'a str),
}

impl<'a> Header<'a> {
    /// The trimmed name following the keyword.
    #[must_use]
    pub const fn name(&self) -> &'a str {
        match self {
            Self::Feature(name) | Self::Scenario(name) | Self::ScenarioOutline(name) => name,
        }
    }

    /// Whether the header opens a scenario (plain or outline).
    ///
    /// Indexing treats both shapes identically.
    #[must_use]
    pub const fn is_scenario(&self) -> bool {
        matches!(self, Self::Scenario(_) | Self::ScenarioOutline(_))
    }
}

/// Classify a single line of a feature document.
///
/// The keyword must be the first non-whitespace text on the line and must be
/// followed directly by a colon. Lines that do not match return `None`.
///
/// # Examples
/// ```
/// use godog_lens_patterns::{Header, classify};
///
/// assert_eq!(classify("Feature: Login"), Some(Header::Feature("Login")));
/// assert_eq!(
///     classify("    Scenario Outline:  eating <n>  "),
///     Some(Header::ScenarioOutline("eating <n>"))
/// );
/// assert_eq!(classify("  Given a user"), None);
/// ```
#[must_use]
pub fn classify(line: &str) -> Option<Header<'_>> {
    let caps = HEADER_RE.captures(line)?;
    let keyword = caps.get(1)?.as_str();
    let name = caps.get(2).map_or("", |m| m.as_str().trim());
    match keyword {
        "Feature" => Some(Header::Feature(name)),
        "Scenario" => Some(Header::Scenario(name)),
        "Scenario Outline" => Some(Header::ScenarioOutline(name)),
        _ => None,
    }
}
