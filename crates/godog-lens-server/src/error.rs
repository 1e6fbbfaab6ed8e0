//! Semantic error types for the language server.
//!
//! Lookup misses are not errors in this crate: they are reported as `None`.
//! The types here cover configuration problems and protocol misuse.

use thiserror::Error;

use crate::discovery::DiscoveryError;

/// Errors that can occur during language server operations.
#[derive(Debug, Error)]
pub enum ServerError {
    /// An invalid configuration value was provided.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// Server received a request before initialisation completed.
    #[error("server not initialised")]
    NotInitialised,

    /// Server received a duplicate initialisation request.
    #[error("server already initialised")]
    AlreadyInitialised,

    /// The feature file globs could not be compiled.
    #[error(transparent)]
    Discovery(#[from] DiscoveryError),

    /// An execute-command request named an unknown command or carried
    /// arguments of the wrong shape.
    #[error("invalid command arguments: {0}")]
    InvalidCommand(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn not_initialised_error_displays_message() {
        let error = ServerError::NotInitialised;
        assert_eq!(error.to_string(), "server not initialised");
    }

    #[test]
    fn already_initialised_error_displays_message() {
        let error = ServerError::AlreadyInitialised;
        assert_eq!(error.to_string(), "server already initialised");
    }

    #[test]
    fn invalid_config_error_displays_message() {
        let error = ServerError::InvalidConfig("unknown log level".to_string());
        assert_eq!(
            error.to_string(),
            "invalid configuration: unknown log level"
        );
    }

    #[test]
    fn invalid_command_error_displays_message() {
        let error = ServerError::InvalidCommand("expected a string".to_string());
        assert_eq!(
            error.to_string(),
            "invalid command arguments: expected a string"
        );
    }

    #[test]
    fn discovery_error_is_transparent() {
        let Err(source) = crate::discovery::FileGlobs::new("[", "") else {
            panic!("an unclosed character class should not compile");
        };
        let expected = source.to_string();
        let error = ServerError::from(source);
        assert_eq!(error.to_string(), expected);
    }
}
