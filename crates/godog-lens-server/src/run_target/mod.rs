//! `go test` invocations for a feature or scenario.
//!
//! Nothing here spawns a process. A [`RunTarget`] describes the command,
//! the directory to run it in and the terminal presentation; the editor
//! decides how to execute it.

mod working_dir;

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use godog_lens_patterns::{PatternInputs, render_test_pattern};
use serde::{Deserialize, Serialize};
use tracing::debug;

pub use working_dir::{nearest_test_directory, resolve_working_directory};

use crate::config::RunConfig;

const TERMINAL_PREFIX: &str = "Cucumber Godog";
const COLOUR_ENV: [(&str, &str); 4] = [
    ("FORCE_COLOR", "1"),
    ("COLORTERM", "truecolor"),
    ("TERM", "xterm-256color"),
    ("GO_TEST_COLOR", "1"),
];

/// A ready-to-run test invocation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RunTarget {
    /// Full shell command line.
    pub command: String,
    /// Directory to run the command in.
    pub working_directory: PathBuf,
    /// The `-run` filter, empty when the whole package runs.
    pub pattern: String,
    /// Name for the terminal hosting the run.
    pub terminal_name: String,
    /// Environment forcing coloured output.
    pub env: BTreeMap<String, String>,
}

/// What a run should cover.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RunRequest {
    /// Feature document the run was started from.
    pub file_path: PathBuf,
    /// Feature to run, if any.
    pub feature_name: Option<String>,
    /// Scenario to run, if any.
    pub scenario_name: Option<String>,
}

impl RunRequest {
    /// Run a whole feature.
    #[must_use]
    pub fn feature(file_path: impl Into<PathBuf>, feature_name: impl Into<String>) -> Self {
        Self {
            file_path: file_path.into(),
            feature_name: Some(feature_name.into()),
            scenario_name: None,
        }
    }

    /// Run a single scenario, optionally qualified by its feature.
    #[must_use]
    pub fn scenario(
        file_path: impl Into<PathBuf>,
        feature_name: Option<String>,
        scenario_name: impl Into<String>,
    ) -> Self {
        Self {
            file_path: file_path.into(),
            feature_name,
            scenario_name: Some(scenario_name.into()),
        }
    }

    /// Format the run target for this request.
    #[must_use]
    pub fn target(&self, config: &RunConfig) -> RunTarget {
        format_run_target(
            config,
            &self.file_path,
            self.feature_name.as_deref(),
            self.scenario_name.as_deref(),
        )
    }
}

/// Build the command and working directory for a run.
///
/// The command is `<program> <programArgument> -run "<pattern>"`; the
/// `-run` argument is omitted when neither name is given.
///
/// # Examples
///
/// ```
/// use std::path::Path;
/// use godog_lens_server::config::RunConfig;
/// use godog_lens_server::run_target::format_run_target;
///
/// let target = format_run_target(
///     &RunConfig::default(),
///     Path::new("/a/b/f.feature"),
///     Some("My Feat"),
///     Some("My Scen"),
/// );
/// assert_eq!(target.command, r#"go test -v . -run "/My_Feat/My_Scen$""#);
/// assert_eq!(target.terminal_name, "Cucumber Godog: /My_Feat/My_Scen$");
/// ```
#[must_use]
pub fn format_run_target(
    config: &RunConfig,
    file_path: &Path,
    feature_name: Option<&str>,
    scenario_name: Option<&str>,
) -> RunTarget {
    let path_text = file_path.to_string_lossy();
    let inputs = PatternInputs::new(&path_text, feature_name, scenario_name);
    let pattern = render_test_pattern(&config.test_pattern_format, &inputs);

    let run_arg = if pattern.is_empty() {
        String::new()
    } else {
        format!("-run \"{pattern}\"")
    };
    let command = format!("{} {} {run_arg}", config.program, config.program_argument)
        .trim()
        .to_owned();
    let working_directory =
        resolve_working_directory(file_path, &config.program_working_directory);

    let terminal_name = if pattern.is_empty() {
        format!("{TERMINAL_PREFIX}: All")
    } else {
        format!("{TERMINAL_PREFIX}: {pattern}")
    };
    let env = COLOUR_ENV
        .iter()
        .map(|(key, value)| ((*key).to_owned(), (*value).to_owned()))
        .collect();

    debug!(
        %command,
        cwd = %working_directory.display(),
        "formatted run target"
    );
    RunTarget {
        command,
        working_directory,
        pattern,
        terminal_name,
        env,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    const FEATURE: &str = "/a/b/f.feature";

    fn config(template: &str) -> RunConfig {
        RunConfig {
            test_pattern_format: template.to_owned(),
            ..RunConfig::default()
        }
    }

    #[test]
    fn default_configuration_targets_a_scenario() {
        let target = format_run_target(
            &RunConfig::default(),
            Path::new(FEATURE),
            Some("My Feat"),
            Some("My Scen"),
        );
        assert_eq!(target.command, "go test -v . -run \"/My_Feat/My_Scen$\"");
        assert_eq!(target.pattern, "/My_Feat/My_Scen$");
    }

    #[rstest]
    #[case(Some("Login"), None, "go test -v . -run \"/Login/\"")]
    #[case(None, Some("Valid creds"), "go test -v . -run \"//Valid_creds$\"")]
    #[case(None, None, "go test -v .")]
    fn legacy_template_commands(
        #[case] feature: Option<&str>,
        #[case] scenario: Option<&str>,
        #[case] expected: &str,
    ) {
        let target = format_run_target(&config("legacy"), Path::new(FEATURE), feature, scenario);
        assert_eq!(target.command, expected);
    }

    #[test]
    fn empty_pattern_runs_everything() {
        let target = format_run_target(&RunConfig::default(), Path::new(FEATURE), None, None);
        assert_eq!(target.pattern, "");
        assert_eq!(target.terminal_name, "Cucumber Godog: All");
    }

    #[test]
    fn empty_program_argument_leaves_single_space() {
        let config = RunConfig {
            program: "richgo".into(),
            program_argument: String::new(),
            ..RunConfig::default()
        };
        let target = format_run_target(&config, Path::new(FEATURE), Some("F"), None);
        assert_eq!(target.command, "richgo  -run \"/F/\"");
    }

    #[test]
    fn template_can_use_the_feature_path() {
        let target = format_run_target(
            &config("${featureFilePath}"),
            Path::new(FEATURE),
            Some("F"),
            None,
        );
        assert_eq!(target.pattern, FEATURE);
    }

    #[test]
    fn environment_forces_colour() {
        let target = format_run_target(&RunConfig::default(), Path::new(FEATURE), None, None);
        assert_eq!(target.env.get("FORCE_COLOR").map(String::as_str), Some("1"));
        assert_eq!(target.env.get("TERM").map(String::as_str), Some("xterm-256color"));
        assert_eq!(target.env.len(), 4);
    }

    #[test]
    fn requests_format_through_the_same_path() {
        let request = RunRequest::scenario(FEATURE, Some("My Feat".into()), "My Scen");
        assert_eq!(
            request.target(&RunConfig::default()).pattern,
            "/My_Feat/My_Scen$"
        );
        let request = RunRequest::feature(FEATURE, "My Feat");
        assert_eq!(request.target(&RunConfig::default()).pattern, "/My_Feat/");
    }
}
