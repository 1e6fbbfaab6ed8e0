//! Handler utilities for LSP type conversions.

use std::ffi::OsStr;
use std::path::{Path, PathBuf};

use async_lsp::{ErrorCode, ResponseError};
use lsp_types::Url;

use crate::error::ServerError;

/// Convert a URL to a file system path.
///
/// Only handles `file://` URLs; returns `None` for other schemes.
#[must_use]
pub fn url_to_path(url: &Url) -> Option<PathBuf> {
    url.to_file_path().ok()
}

/// Whether `path` names a `.feature` document.
#[must_use]
pub fn is_feature_file_path(path: &Path) -> bool {
    path.extension()
        .and_then(OsStr::to_str)
        .is_some_and(|ext| ext.eq_ignore_ascii_case("feature"))
}

/// Convert a server error to an LSP response error.
#[must_use]
pub fn response_error(err: &ServerError) -> ResponseError {
    let code = match err {
        ServerError::InvalidCommand(_) | ServerError::InvalidConfig(_) => ErrorCode::INVALID_PARAMS,
        ServerError::NotInitialised
        | ServerError::AlreadyInitialised
        | ServerError::Discovery(_) => ErrorCode::INVALID_REQUEST,
    };
    ResponseError::new(code, err.to_string())
}

#[cfg(test)]
#[expect(
    clippy::expect_used,
    reason = "tests require explicit panic messages for debugging failures"
)]
mod tests {
    use super::*;
    use rstest::rstest;
    use std::str::FromStr;

    #[test]
    fn url_to_path_handles_file_url() {
        #[cfg(windows)]
        let test_path = PathBuf::from("C:\\test\\path");
        #[cfg(not(windows))]
        let test_path = PathBuf::from("/test/path");

        let url = Url::from_file_path(&test_path).expect("valid path");
        assert_eq!(url_to_path(&url), Some(test_path));
    }

    #[test]
    fn url_to_path_returns_none_for_non_file_url() {
        let url = Url::from_str("https://example.com/path").expect("valid URL");
        assert!(url_to_path(&url).is_none());
    }

    #[rstest]
    #[case("features/login.feature", true)]
    #[case("features/LOGIN.FEATURE", true)]
    #[case("login_test.go", false)]
    #[case("feature", false)]
    fn recognises_feature_documents(#[case] path: &str, #[case] expected: bool) {
        assert_eq!(is_feature_file_path(Path::new(path)), expected);
    }

    #[rstest]
    #[case(ServerError::InvalidCommand("x".into()), ErrorCode::INVALID_PARAMS)]
    #[case(ServerError::NotInitialised, ErrorCode::INVALID_REQUEST)]
    #[case(ServerError::AlreadyInitialised, ErrorCode::INVALID_REQUEST)]
    fn maps_errors_to_codes(#[case] err: ServerError, #[case] code: ErrorCode) {
        let response = response_error(&err);
        assert_eq!(response.code, code);
        assert_eq!(response.message, err.to_string());
    }
}
