//! The 8-digit MDN code that identifies a point of sale.

use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::CoreError;

pub const IDENTIFIER_LEN: usize = 8;

static PARTIAL_INPUT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[0-9]{0,8}$").expect("static regex is valid"));

/// Returns `true` if `text` is an acceptable in-progress value for the
/// identifier field: up to eight ASCII digits, nothing else.
#[must_use]
pub fn accepts_identifier_input(text: &str) -> bool {
    PARTIAL_INPUT.is_match(text)
}

/// A complete identifier: exactly [`IDENTIFIER_LEN`] ASCII digits.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct IdentifierCode(String);

impl IdentifierCode {
    /// Parses a complete identifier, trimming surrounding whitespace.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::InvalidIdentifier`] unless the trimmed value is
    /// exactly eight ASCII digits.
    pub fn parse(raw: &str) -> Result<Self, CoreError> {
        let trimmed = raw.trim();
        if trimmed.len() == IDENTIFIER_LEN && trimmed.bytes().all(|b| b.is_ascii_digit()) {
            Ok(Self(trimmed.to_string()))
        } else {
            Err(CoreError::InvalidIdentifier(raw.to_string()))
        }
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for IdentifierCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<String> for IdentifierCode {
    type Error = CoreError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<IdentifierCode> for String {
    fn from(value: IdentifierCode) -> Self {
        value.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn input_filter_accepts_empty_and_partial_digits() {
        assert!(accepts_identifier_input(""));
        assert!(accepts_identifier_input("8888"));
        assert!(accepts_identifier_input("88889999"));
    }

    #[test]
    fn input_filter_rejects_ninth_digit_and_non_digits() {
        assert!(!accepts_identifier_input("888899990"));
        assert!(!accepts_identifier_input("8888a"));
        assert!(!accepts_identifier_input(" 8888"));
        assert!(!accepts_identifier_input("-1234"));
        assert!(!accepts_identifier_input("١٢٣"));
    }

    #[test]
    fn parse_accepts_eight_digits_with_whitespace() {
        let code = IdentifierCode::parse(" 88889999\n").unwrap();
        assert_eq!(code.as_str(), "88889999");
    }

    #[test]
    fn parse_rejects_wrong_length() {
        assert!(IdentifierCode::parse("1234").is_err());
        assert!(IdentifierCode::parse("123456789").is_err());
        assert!(IdentifierCode::parse("").is_err());
    }

    #[test]
    fn parse_rejects_non_ascii_digits() {
        // Arabic-Indic digits are numeric but not ASCII.
        assert!(IdentifierCode::parse("١٢٣٤٥٦٧٨").is_err());
        assert!(IdentifierCode::parse("1234567x").is_err());
    }

    #[test]
    fn deserialize_validates() {
        let ok: IdentifierCode = serde_json::from_str("\"12345678\"").unwrap();
        assert_eq!(ok.to_string(), "12345678");
        assert!(serde_json::from_str::<IdentifierCode>("\"1234\"").is_err());
    }
}
