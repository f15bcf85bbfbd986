//! Validated numeric record identifiers.

use std::fmt;
use std::str::FromStr;
use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Smallest identifier accepted from a client.
pub const MIN_RECORD_ID: i64 = 1;

/// Largest identifier accepted from a client.
pub const MAX_RECORD_ID: i64 = 1_000_000;

static DIGITS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[0-9]+$").expect("digit pattern is a valid regex"));

/// Reasons a client-supplied identifier is rejected.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum IdError {
    #[error("empty ID")]
    Empty,

    #[error("non-numeric ID")]
    NonNumeric,

    #[error("ID out of bounds")]
    OutOfBounds,
}

/// A primary key that came from outside the process and passed validation.
///
/// Only strings of ASCII digits whose value lies in
/// [`MIN_RECORD_ID`]..=[`MAX_RECORD_ID`] parse successfully.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RecordId(i64);

impl RecordId {
    pub fn get(self) -> i64 {
        self.0
    }
}

impl FromStr for RecordId {
    type Err = IdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.is_empty() {
            return Err(IdError::Empty);
        }
        if !DIGITS.is_match(s) {
            return Err(IdError::NonNumeric);
        }
        // Digit strings too long for i64 are out of range by definition.
        let value: i64 = s.parse().map_err(|_| IdError::OutOfBounds)?;
        if !(MIN_RECORD_ID..=MAX_RECORD_ID).contains(&value) {
            return Err(IdError::OutOfBounds);
        }
        Ok(Self(value))
    }
}

impl fmt::Display for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<RecordId> for i64 {
    fn from(id: RecordId) -> Self {
        id.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_accepts_bounds() {
        assert_eq!("1".parse::<RecordId>().unwrap().get(), 1);
        assert_eq!("1000000".parse::<RecordId>().unwrap().get(), 1_000_000);
        assert_eq!("42".parse::<RecordId>().unwrap().get(), 42);
    }

    #[test]
    fn test_parse_rejects_out_of_bounds() {
        assert_eq!("0".parse::<RecordId>(), Err(IdError::OutOfBounds));
        assert_eq!("1000001".parse::<RecordId>(), Err(IdError::OutOfBounds));
        assert_eq!(
            "99999999999999999999999".parse::<RecordId>(),
            Err(IdError::OutOfBounds)
        );
    }

    #[test]
    fn test_parse_rejects_non_numeric() {
        assert_eq!("abc".parse::<RecordId>(), Err(IdError::NonNumeric));
        assert_eq!("-5".parse::<RecordId>(), Err(IdError::NonNumeric));
        assert_eq!("+5".parse::<RecordId>(), Err(IdError::NonNumeric));
        assert_eq!("1 ".parse::<RecordId>(), Err(IdError::NonNumeric));
        assert_eq!("1;DROP".parse::<RecordId>(), Err(IdError::NonNumeric));
        assert_eq!("１".parse::<RecordId>(), Err(IdError::NonNumeric));
    }

    #[test]
    fn test_parse_rejects_empty() {
        assert_eq!("".parse::<RecordId>(), Err(IdError::Empty));
    }

    #[test]
    fn test_leading_zeros_are_digits() {
        assert_eq!("007".parse::<RecordId>().unwrap().get(), 7);
    }

    #[test]
    fn test_display_and_serialization() {
        let id: RecordId = "17".parse().unwrap();
        assert_eq!(id.to_string(), "17");
        assert_eq!(serde_json::to_string(&id).unwrap(), "17");
    }
}
