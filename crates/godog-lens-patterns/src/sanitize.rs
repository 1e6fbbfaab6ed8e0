//! Name sanitisation for `go test -run` filters.

/// Replace every character outside `[A-Za-z0-9]` with `_`.
///
/// godog derives subtest names this way, so sanitised names can be used
/// directly inside a `-run` expression. Each Unicode scalar value maps to one
/// output character, which makes the function idempotent.
///
/// # Examples
/// ```
/// use godog_lens_patterns::sanitize_name;
///
/// assert_eq!(sanitize_name("a b"), "a_b");
/// assert_eq!(sanitize_name("Log-in (v2)"), "Log_in__v2_");
/// assert_eq!(sanitize_name(""), "");
/// ```
#[must_use]
pub fn sanitize_name(name: &str) -> String {
    name.chars()
        .map(|ch| if ch.is_ascii_alphanumeric() { ch } else { '_' })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("", "")]
    #[case("a b", "a_b")]
    #[case("My Feat", "My_Feat")]
    #[case("already_safe_123", "already_safe_123")]
    #[case("café", "caf_")]
    #[case("tabs\tand\nnewlines", "tabs_and_newlines")]
    fn sanitizes_names(#[case] input: &str, #[case] expected: &str) {
        assert_eq!(sanitize_name(input), expected);
    }

    #[rstest]
    #[case("User logs in (happy path)!")]
    #[case("日本語のシナリオ")]
    #[case("")]
    fn sanitizing_twice_matches_sanitizing_once(#[case] input: &str) {
        let once = sanitize_name(input);
        assert_eq!(sanitize_name(&once), once);
    }
}
