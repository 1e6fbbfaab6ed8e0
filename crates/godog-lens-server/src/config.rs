//! Server and run configuration.
//!
//! [`ServerConfig`] controls the process itself and is read from environment
//! variables prefixed with `GODOG_LENS_`, with CLI flags taking precedence.
//! [`RunConfig`] is the user-facing run-target configuration supplied by the
//! editor through `initializationOptions` and
//! `workspace/didChangeConfiguration`.

use std::env;
use std::str::FromStr;

use godog_lens_patterns::validate_template;
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::discovery::FileGlobs;
use crate::error::ServerError;

/// Log level enumeration matching tracing crate levels.
///
/// Defaults to `Info` when not specified.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogLevel {
    /// Most verbose logging, includes all trace spans.
    Trace,
    /// Debug-level information for development.
    Debug,
    /// Standard informational messages.
    #[default]
    Info,
    /// Warning messages for potentially problematic situations.
    Warn,
    /// Error messages for failures.
    Error,
}

impl FromStr for LogLevel {
    type Err = ServerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "trace" => Ok(Self::Trace),
            "debug" => Ok(Self::Debug),
            "info" => Ok(Self::Info),
            "warn" | "warning" => Ok(Self::Warn),
            "error" => Ok(Self::Error),
            _ => Err(ServerError::InvalidConfig(format!(
                "unknown log level '{s}', expected one of: trace, debug, info, warn, error"
            ))),
        }
    }
}

impl LogLevel {
    /// Convert to a tracing filter directive string.
    #[must_use]
    pub fn as_filter_str(&self) -> &'static str {
        match self {
            Self::Trace => "trace",
            Self::Debug => "debug",
            Self::Info => "info",
            Self::Warn => "warn",
            Self::Error => "error",
        }
    }
}

/// Glob selecting the documents that feed the feature index.
pub const DEFAULT_FEATURE_GLOB: &str = "**/*.feature";
/// Glob excluding vendored trees from the feature index.
pub const DEFAULT_EXCLUDE_GLOB: &str = "**/node_modules/**";

const LOG_LEVEL_VAR: &str = "GODOG_LENS_LOG_LEVEL";
const FEATURE_GLOB_VAR: &str = "GODOG_LENS_FEATURE_GLOB";
const EXCLUDE_GLOB_VAR: &str = "GODOG_LENS_EXCLUDE_GLOB";

/// Configuration for the language server process.
///
/// # Environment Variables
///
/// - `GODOG_LENS_LOG_LEVEL`: log level (trace, debug, info, warn, error)
/// - `GODOG_LENS_FEATURE_GLOB`: documents to index (default `**/*.feature`)
/// - `GODOG_LENS_EXCLUDE_GLOB`: documents to skip (default
///   `**/node_modules/**`)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: LogLevel,
    /// Glob, relative to the workspace root, selecting feature documents.
    pub feature_glob: String,
    /// Glob, relative to the workspace root, excluding documents.
    pub exclude_glob: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            log_level: LogLevel::default(),
            feature_glob: DEFAULT_FEATURE_GLOB.to_owned(),
            exclude_glob: DEFAULT_EXCLUDE_GLOB.to_owned(),
        }
    }
}

impl ServerConfig {
    /// Load configuration from environment variables.
    ///
    /// Falls back to defaults for missing values.
    ///
    /// # Errors
    ///
    /// Returns `ServerError::InvalidConfig` if an environment variable contains
    /// an invalid value.
    pub fn from_env() -> Result<Self, ServerError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Load configuration through an arbitrary variable lookup.
    ///
    /// # Errors
    ///
    /// Returns `ServerError::InvalidConfig` if the log level is unknown or a
    /// glob is empty.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ServerError> {
        let log_level = match lookup(LOG_LEVEL_VAR) {
            Some(val) => val.parse()?,
            None => LogLevel::default(),
        };

        let feature_glob = lookup(FEATURE_GLOB_VAR)
            .unwrap_or_else(|| DEFAULT_FEATURE_GLOB.to_owned());
        if feature_glob.trim().is_empty() {
            return Err(ServerError::InvalidConfig(format!(
                "{FEATURE_GLOB_VAR} must not be empty"
            )));
        }

        let exclude_glob = lookup(EXCLUDE_GLOB_VAR)
            .unwrap_or_else(|| DEFAULT_EXCLUDE_GLOB.to_owned());

        Ok(Self {
            log_level,
            feature_glob,
            exclude_glob,
        })
    }

    /// Apply optional overrides to an existing configuration.
    ///
    /// This is intended for CLI overrides that should take precedence over
    /// environment-based defaults.
    #[must_use]
    pub fn apply_overrides(
        mut self,
        log_level: Option<LogLevel>,
        feature_glob: Option<String>,
        exclude_glob: Option<String>,
    ) -> Self {
        if let Some(level) = log_level {
            self.log_level = level;
        }

        if let Some(glob) = feature_glob {
            self.feature_glob = glob;
        }

        if let Some(glob) = exclude_glob {
            self.exclude_glob = glob;
        }

        self
    }

    /// Create a new configuration with the specified log level.
    #[must_use]
    pub fn with_log_level(mut self, level: LogLevel) -> Self {
        self.log_level = level;
        self
    }

    /// Compile the include and exclude globs.
    ///
    /// # Errors
    ///
    /// Returns `ServerError::Discovery` when either glob is malformed.
    pub fn file_globs(&self) -> Result<FileGlobs, ServerError> {
        Ok(FileGlobs::new(&self.feature_glob, &self.exclude_glob)?)
    }
}

/// Settings section the editor nests run options under.
pub const SETTINGS_SECTION: &str = "godog";

/// Run-target options recognised from the editor.
///
/// Keys are camelCase on the wire; absent keys take their defaults and
/// unknown keys are ignored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RunConfig {
    /// Executable to run.
    pub program: String,
    /// Fixed argument string placed after the program.
    pub program_argument: String,
    /// Working directory, resolved against the feature file's directory.
    pub program_working_directory: String,
    /// Template producing the `-run` filter.
    pub test_pattern_format: String,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            program: "go".to_owned(),
            program_argument: "test -v .".to_owned(),
            program_working_directory: "../".to_owned(),
            test_pattern_format: "/${sanitizedFeatureName}/${sanitizedScenarioName}$".to_owned(),
        }
    }
}

impl RunConfig {
    /// Read run options from an editor settings payload.
    ///
    /// The options may be given directly or nested under the
    /// [`SETTINGS_SECTION`] key. A template with malformed placeholders is
    /// accepted with a warning, since rendering falls back to the default
    /// pattern shape.
    ///
    /// # Errors
    ///
    /// Returns `ServerError::InvalidConfig` when the payload is not an object
    /// or a recognised option has the wrong type.
    pub fn from_settings(settings: &serde_json::Value) -> Result<Self, ServerError> {
        let section = settings.get(SETTINGS_SECTION).unwrap_or(settings);
        if !section.is_object() {
            return Err(ServerError::InvalidConfig(format!(
                "run settings must be an object, got {section}"
            )));
        }
        let config: Self = serde_json::from_value(section.clone())
            .map_err(|err| ServerError::InvalidConfig(err.to_string()))?;
        if let Err(err) = validate_template(&config.test_pattern_format) {
            warn!(
                template = %config.test_pattern_format,
                error = %err,
                "test pattern template will not substitute as written"
            );
        }
        Ok(config)
    }
}

#[cfg(test)]
#[expect(
    clippy::unwrap_used,
    clippy::expect_used,
    reason = "tests require explicit panic messages for debugging failures"
)]
mod tests {
    use super::*;
    use rstest::rstest;
    use serde_json::json;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| ((*k).to_owned(), (*v).to_owned()))
            .collect();
        move |key| vars.get(key).cloned()
    }

    #[rstest]
    #[case("trace", LogLevel::Trace)]
    #[case("debug", LogLevel::Debug)]
    #[case("info", LogLevel::Info)]
    #[case("warn", LogLevel::Warn)]
    #[case("warning", LogLevel::Warn)]
    #[case("error", LogLevel::Error)]
    #[case("DEBUG", LogLevel::Debug)]
    fn log_level_parses_valid_values(#[case] raw: &str, #[case] expected: LogLevel) {
        assert_eq!(raw.parse::<LogLevel>().ok(), Some(expected));
    }

    #[test]
    fn log_level_rejects_invalid_values() {
        let result = "invalid".parse::<LogLevel>();
        assert!(result.unwrap_err().to_string().contains("unknown log level"));
    }

    #[test]
    fn server_config_defaults_when_environment_is_empty() {
        let config = ServerConfig::from_lookup(lookup_from(&[])).expect("defaults");
        assert_eq!(config, ServerConfig::default());
        assert_eq!(config.feature_glob, "**/*.feature");
        assert_eq!(config.exclude_glob, "**/node_modules/**");
    }

    #[test]
    fn server_config_reads_environment() {
        let config = ServerConfig::from_lookup(lookup_from(&[
            ("GODOG_LENS_LOG_LEVEL", "debug"),
            ("GODOG_LENS_FEATURE_GLOB", "specs/**/*.feature"),
            ("GODOG_LENS_EXCLUDE_GLOB", ""),
        ]))
        .expect("valid environment");
        assert_eq!(config.log_level, LogLevel::Debug);
        assert_eq!(config.feature_glob, "specs/**/*.feature");
        assert_eq!(config.exclude_glob, "");
    }

    #[test]
    fn server_config_rejects_empty_feature_glob() {
        let err = ServerConfig::from_lookup(lookup_from(&[("GODOG_LENS_FEATURE_GLOB", " ")]))
            .unwrap_err();
        assert!(err.to_string().contains("must not be empty"));
    }

    #[test]
    fn server_config_apply_overrides_updates_selected_fields() {
        let config = ServerConfig::default().apply_overrides(
            Some(LogLevel::Error),
            Some("*.feature".to_owned()),
            None,
        );
        assert_eq!(config.log_level, LogLevel::Error);
        assert_eq!(config.feature_glob, "*.feature");
        assert_eq!(config.exclude_glob, DEFAULT_EXCLUDE_GLOB);
    }

    #[test]
    fn server_config_compiles_default_globs() {
        assert!(ServerConfig::default().file_globs().is_ok());
    }

    #[test]
    fn run_config_defaults_match_godog_conventions() {
        let config = RunConfig::default();
        assert_eq!(config.program, "go");
        assert_eq!(config.program_argument, "test -v .");
        assert_eq!(config.program_working_directory, "../");
        assert_eq!(
            config.test_pattern_format,
            "/${sanitizedFeatureName}/${sanitizedScenarioName}$"
        );
    }

    #[test]
    fn run_config_reads_nested_section_and_fills_defaults() {
        let settings = json!({
            "godog": { "program": "richgo", "programWorkingDirectory": "./" },
            "other": { "ignored": true }
        });
        let config = RunConfig::from_settings(&settings).expect("valid settings");
        assert_eq!(config.program, "richgo");
        assert_eq!(config.program_working_directory, "./");
        assert_eq!(config.program_argument, "test -v .");
    }

    #[test]
    fn run_config_reads_flat_settings() {
        let settings = json!({ "testPatternFormat": "${featureName}", "unknownKey": 1 });
        let config = RunConfig::from_settings(&settings).expect("valid settings");
        assert_eq!(config.test_pattern_format, "${featureName}");
    }

    #[rstest]
    #[case(json!(null))]
    #[case(json!("go"))]
    #[case(json!({ "program": 42 }))]
    fn run_config_rejects_malformed_settings(#[case] settings: serde_json::Value) {
        assert!(matches!(
            RunConfig::from_settings(&settings),
            Err(ServerError::InvalidConfig(_))
        ));
    }
}
