//! Translation of Marshal regexps into compiled [`regex::Regex`] patterns.
//!
//! Ruby stores a regexp as its source text plus an option byte. The options
//! that the `regex` crate understands are turned into an inline flag group in
//! front of the source; the rest have no equivalent and are dropped.
//!
//! In Ruby `^` and `$` always match at line boundaries, so every pattern is
//! compiled in multi-line mode. That mode is set on the builder and does not
//! show up in [`Pattern::as_str`].

use bitflags::bitflags;
use regex::{Regex, RegexBuilder};
use std::fmt;

bitflags! {
    /// Option bits of a Marshal regexp.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct RegexOptions: u8 {
        /// `i`: case-insensitive
        const IGNORECASE = 0b0000_0001;

        /// `x`: free-spacing mode, no translation
        const EXTENDED = 0b0000_0010;

        /// `m`: `.` also matches newline
        const MULTILINE = 0b0000_0100;
    }
}

impl RegexOptions {
    /// Creates options from the raw option byte, keeping unknown bits.
    #[must_use]
    pub const fn from_byte(byte: u8) -> Self {
        Self::from_bits_retain(byte)
    }

    /// Inline flag group for the translatable options, empty if none apply.
    #[must_use]
    pub fn inline_flags(self) -> &'static str {
        match (
            self.contains(Self::IGNORECASE),
            self.contains(Self::MULTILINE),
        ) {
            (true, true) => "(?is)",
            (true, false) => "(?i)",
            (false, true) => "(?s)",
            (false, false) => "",
        }
    }
}

/// A decoded regexp.
///
/// Two patterns are equal when their translated pattern text is equal.
///
/// # Examples
///
/// ```rust
/// use serde_marshal::{Pattern, RegexOptions};
///
/// let pattern = Pattern::translate("ab+c", RegexOptions::IGNORECASE).unwrap();
/// assert_eq!(pattern.as_str(), "(?i)ab+c");
/// assert!(pattern.regex().is_match("xABBCx"));
/// ```
#[derive(Clone, Debug)]
pub struct Pattern {
    source: String,
    options: RegexOptions,
    regex: Regex,
}

impl Pattern {
    /// Translates and compiles `source` with the given options.
    ///
    /// # Errors
    ///
    /// Returns the compile error if the translated pattern is not accepted by
    /// the `regex` crate.
    pub fn translate(source: &str, options: RegexOptions) -> Result<Self, regex::Error> {
        if options.contains(RegexOptions::EXTENDED) {
            tracing::warn!(source, "extended regexp option has no equivalent, ignored");
        }

        let translated = format!("{}{}", options.inline_flags(), source);
        let regex = RegexBuilder::new(&translated).multi_line(true).build()?;
        Ok(Pattern {
            source: source.to_string(),
            options,
            regex,
        })
    }

    /// Source text as stored in the stream.
    #[must_use]
    pub fn source(&self) -> &str {
        &self.source
    }

    /// Option bits as stored in the stream.
    #[must_use]
    pub fn options(&self) -> RegexOptions {
        self.options
    }

    /// The compiled pattern.
    #[must_use]
    pub fn regex(&self) -> &Regex {
        &self.regex
    }

    /// Translated pattern text, including any inline flag group.
    #[must_use]
    pub fn as_str(&self) -> &str {
        self.regex.as_str()
    }
}

impl PartialEq for Pattern {
    fn eq(&self, other: &Self) -> bool {
        self.as_str() == other.as_str()
    }
}

impl fmt::Display for Pattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "/{}/", self.source)?;
        if self.options.contains(RegexOptions::MULTILINE) {
            write!(f, "m")?;
        }
        if self.options.contains(RegexOptions::IGNORECASE) {
            write!(f, "i")?;
        }
        if self.options.contains(RegexOptions::EXTENDED) {
            write!(f, "x")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flag_table() {
        let cases = [
            (0u8, ""),
            (1, "(?i)"),
            (2, ""),
            (3, "(?i)"),
            (4, "(?s)"),
            (5, "(?is)"),
            (6, "(?s)"),
            (7, "(?is)"),
        ];
        for (byte, flags) in cases {
            assert_eq!(RegexOptions::from_byte(byte).inline_flags(), flags, "options {byte}");
        }
    }

    #[test]
    fn test_encoding_bits_ignored() {
        // FIXEDENCODING (16) on top of `i`
        assert_eq!(RegexOptions::from_byte(17).inline_flags(), "(?i)");
        assert_eq!(RegexOptions::from_byte(32).inline_flags(), "");
    }

    #[test]
    fn test_case_insensitive_match() {
        let pattern = Pattern::translate("hello", RegexOptions::IGNORECASE).unwrap();
        assert!(pattern.regex().is_match("HeLLo"));
        assert_eq!(pattern.source(), "hello");
    }

    #[test]
    fn test_dot_matches_newline() {
        let plain = Pattern::translate("a.b", RegexOptions::empty()).unwrap();
        assert!(!plain.regex().is_match("a\nb"));

        let dotall = Pattern::translate("a.b", RegexOptions::MULTILINE).unwrap();
        assert!(dotall.regex().is_match("a\nb"));
    }

    #[test]
    fn test_anchors_match_at_line_boundaries() {
        let pattern = Pattern::translate("^b$", RegexOptions::empty()).unwrap();
        assert!(pattern.regex().is_match("a\nb\nc"));
        assert_eq!(pattern.as_str(), "^b$");

        let whole = Pattern::translate("\\Ab\\z", RegexOptions::empty()).unwrap();
        assert!(!whole.regex().is_match("a\nb"));
        assert!(whole.regex().is_match("b"));
    }

    #[test]
    fn test_invalid_pattern() {
        assert!(Pattern::translate("(unclosed", RegexOptions::empty()).is_err());
    }

    #[test]
    fn test_display() {
        let pattern = Pattern::translate("a+", RegexOptions::from_byte(5)).unwrap();
        assert_eq!(pattern.to_string(), "/a+/mi");
    }
}
