//! Shared utilities for LSP position handling.
//!
//! Editors measure columns in UTF-16 code units while Rust strings are
//! indexed by byte. These helpers convert between the two for a single line
//! of text.

/// Calculate UTF-16 code units for a character.
///
/// BMP characters (code points ≤ 0xFFFF) use 1 UTF-16 code unit.
/// Non-BMP characters (code points > 0xFFFF) use 2 UTF-16 code units (surrogate pair).
///
/// # Examples
///
/// ```
/// use godog_lens_server::util::utf16_code_units;
///
/// assert_eq!(utf16_code_units('a'), 1);
/// assert_eq!(utf16_code_units('é'), 1);
/// assert_eq!(utf16_code_units('😀'), 2);
/// ```
#[inline]
#[must_use]
pub fn utf16_code_units(ch: char) -> u32 {
    if u32::from(ch) <= 0xFFFF { 1 } else { 2 }
}

/// Convert a byte offset within `line` to a UTF-16 column.
///
/// Offsets past the end of the line yield the line's full UTF-16 length.
/// An offset inside a multi-byte character counts that character as
/// preceding the offset.
///
/// # Examples
///
/// ```
/// use godog_lens_server::util::byte_col_to_utf16_col;
///
/// // "é" is 2 bytes but 1 UTF-16 code unit
/// assert_eq!(byte_col_to_utf16_col("Feature: café", 14), 13);
/// ```
#[must_use]
pub fn byte_col_to_utf16_col(line: &str, byte_col: usize) -> u32 {
    line.char_indices()
        .take_while(|(byte_pos, _)| *byte_pos < byte_col)
        .map(|(_, ch)| utf16_code_units(ch))
        .sum::<u32>()
}

/// Length of `text` in UTF-16 code units.
#[must_use]
pub fn utf16_len(text: &str) -> u32 {
    text.chars().map(utf16_code_units).sum()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case('a', 1)]
    #[case(' ', 1)]
    #[case('é', 1)]
    #[case('日', 1)]
    #[case('\u{FFFF}', 1)]
    #[case('\u{10000}', 2)]
    #[case('🦀', 2)]
    fn utf16_code_units_by_plane(#[case] ch: char, #[case] expected: u32) {
        assert_eq!(utf16_code_units(ch), expected);
    }

    #[test]
    fn byte_col_ascii_only_line() {
        let line = "Feature: Login";
        assert_eq!(byte_col_to_utf16_col(line, 0), 0);
        assert_eq!(byte_col_to_utf16_col(line, 9), 9);
        assert_eq!(byte_col_to_utf16_col(line, 14), 14);
    }

    #[test]
    fn byte_col_after_non_bmp_character() {
        // 😀 is 4 bytes in UTF-8 but 2 UTF-16 code units
        let line = "hello😀world";
        assert_eq!(byte_col_to_utf16_col(line, 5), 5);
        assert_eq!(byte_col_to_utf16_col(line, 9), 7);
        assert_eq!(byte_col_to_utf16_col(line, 14), 12);
    }

    #[test]
    fn byte_col_cjk_characters() {
        let line = "日本語";
        assert_eq!(byte_col_to_utf16_col(line, 3), 1);
        assert_eq!(byte_col_to_utf16_col(line, 9), 3);
    }

    #[test]
    fn byte_col_beyond_line_length() {
        assert_eq!(byte_col_to_utf16_col("short", 100), 5);
        assert_eq!(byte_col_to_utf16_col("", 10), 0);
    }

    #[rstest]
    #[case("", 0)]
    #[case("Login", 5)]
    #[case("Crème brûlée", 12)]
    #[case("Ship 🚀 it", 10)]
    fn utf16_len_counts_code_units(#[case] text: &str, #[case] expected: u32) {
        assert_eq!(utf16_len(text), expected);
    }
}
