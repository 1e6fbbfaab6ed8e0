//! `testPatternFormat` placeholder substitution.
//!
//! A template is a plain string containing zero or more `${...}`
//! placeholders. Rendering replaces every occurrence of each recognised
//! placeholder. Templates that contain no recognised placeholder are treated
//! as legacy settings and replaced by a fixed default pattern chosen from
//! which names are present.

use crate::errors::PatternError;
use crate::sanitize::sanitize_name;

/// Placeholder for the raw feature name.
pub const FEATURE_NAME: &str = "${featureName}";
/// Placeholder for the raw scenario name.
pub const SCENARIO_NAME: &str = "${scenarioName}";
/// Placeholder for the sanitised feature name.
pub const SANITIZED_FEATURE_NAME: &str = "${sanitizedFeatureName}";
/// Placeholder for the sanitised scenario name.
pub const SANITIZED_SCENARIO_NAME: &str = "${sanitizedScenarioName}";
/// Placeholder for the feature file path.
pub const FEATURE_FILE_PATH: &str = "${featureFilePath}";

const KNOWN_PLACEHOLDERS: [&str; 5] = [
    FEATURE_NAME,
    SCENARIO_NAME,
    SANITIZED_FEATURE_NAME,
    SANITIZED_SCENARIO_NAME,
    FEATURE_FILE_PATH,
];

/// Values available to a run-pattern template.
///
/// Empty names are treated as absent, mirroring how editors pass "no
/// scenario" when a whole feature is run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PatternInputs<'a> {
    /// Feature name, if the run targets a feature.
    pub feature_name: Option<&'a str>,
    /// Scenario name, if the run targets a scenario.
    pub scenario_name: Option<&'a str>,
    /// Path of the feature file the run was started from.
    pub feature_file_path: &'a str,
}

impl<'a> PatternInputs<'a> {
    /// Build inputs, normalising empty names to `None`.
    #[must_use]
    pub fn new(
        feature_file_path: &'a str,
        feature_name: Option<&'a str>,
        scenario_name: Option<&'a str>,
    ) -> Self {
        Self {
            feature_name: feature_name.filter(|name| !name.is_empty()),
            scenario_name: scenario_name.filter(|name| !name.is_empty()),
            feature_file_path,
        }
    }
}

/// Render the `-run` filter for the given template and names.
///
/// Returns an empty string when neither a feature nor a scenario name is
/// present; callers omit the `-run` argument in that case.
///
/// # Examples
/// ```
/// use godog_lens_patterns::{PatternInputs, render_test_pattern};
///
/// let inputs = PatternInputs::new("/a/b/f.feature", Some("My Feat"), Some("My Scen"));
/// assert_eq!(
///     render_test_pattern("/${sanitizedFeatureName}/${sanitizedScenarioName}$", &inputs),
///     "/My_Feat/My_Scen$"
/// );
///
/// // A template without placeholders falls back to the default shape.
/// assert_eq!(render_test_pattern("legacy", &inputs), "/My_Feat/My_Scen$");
/// ```
#[must_use]
pub fn render_test_pattern(template: &str, inputs: &PatternInputs<'_>) -> String {
    if inputs.feature_name.is_none() && inputs.scenario_name.is_none() {
        return String::new();
    }

    let sanitized_feature = inputs.feature_name.map(sanitize_name).unwrap_or_default();
    let sanitized_scenario = inputs.scenario_name.map(sanitize_name).unwrap_or_default();

    let substitutions = [
        (FEATURE_NAME, inputs.feature_name.unwrap_or_default()),
        (SCENARIO_NAME, inputs.scenario_name.unwrap_or_default()),
        (SANITIZED_FEATURE_NAME, sanitized_feature.as_str()),
        (SANITIZED_SCENARIO_NAME, sanitized_scenario.as_str()),
        (FEATURE_FILE_PATH, inputs.feature_file_path),
    ];

    let mut rendered = template.to_owned();
    for (placeholder, value) in substitutions {
        if rendered.contains(placeholder) {
            rendered = rendered.replace(placeholder, value);
        }
    }

    if rendered == template {
        return default_pattern(&sanitized_feature, &sanitized_scenario, inputs);
    }
    rendered
}

fn default_pattern(feature: &str, scenario: &str, inputs: &PatternInputs<'_>) -> String {
    match (inputs.feature_name, inputs.scenario_name) {
        (Some(_), Some(_)) => format!("/{feature}/{scenario}$"),
        (None, Some(_)) => format!("//{scenario}$"),
        (Some(_), None) => format!("/{feature}/"),
        (None, None) => String::new(),
    }
}

/// Check a template for malformed or unknown placeholders.
///
/// # Errors
///
/// Returns [`PatternError::UnterminatedPlaceholder`] when a `${` has no
/// closing brace and [`PatternError::UnknownPlaceholder`] when the braces
/// enclose a name the formatter does not substitute.
pub fn validate_template(template: &str) -> Result<(), PatternError> {
    let mut offset = 0usize;
    while let Some(rest) = template.get(offset..) {
        let Some(open) = rest.find("${") else {
            break;
        };
        let position = offset + open;
        let after_open = rest.get(open..).unwrap_or_default();
        let Some(close) = after_open.find('}') else {
            return Err(PatternError::UnterminatedPlaceholder { position });
        };
        let placeholder = after_open.get(..=close).unwrap_or_default();
        if !KNOWN_PLACEHOLDERS.contains(&placeholder) {
            let name = placeholder
                .trim_start_matches("${")
                .trim_end_matches('}')
                .to_owned();
            return Err(PatternError::UnknownPlaceholder { name, position });
        }
        offset = position + placeholder.len();
    }
    Ok(())
}
