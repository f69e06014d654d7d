//! Business-facing customer codes (`CUS-001`, `CUS-002`, ...).
//!
//! The store assigns opaque document IDs; staff refer to customers by a
//! sequential code instead. New codes are allocated as the highest existing
//! numeric suffix plus one. Allocation reads the current records and is not
//! transactional, so two concurrent creations may compute the same code.

use core::fmt;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Prefix shared by every customer code.
pub const CUSTOMER_CODE_PREFIX: &str = "CUS-";

/// Minimum number of digits in the numeric suffix.
const MIN_DIGITS: usize = 3;

/// Errors that can occur when parsing a [`CustomerCode`].
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum CustomerCodeError {
    /// The code does not start with `CUS-`.
    #[error("customer code must start with CUS-")]
    MissingPrefix,
    /// The suffix is not a number.
    #[error("customer code suffix must be numeric: {0}")]
    InvalidNumber(String),
}

/// A sequential customer code such as `CUS-007`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct CustomerCode(u32);

impl CustomerCode {
    /// The first code handed out in an empty collection.
    pub const FIRST: Self = Self(1);

    /// Create a code from its numeric suffix.
    #[must_use]
    pub const fn new(number: u32) -> Self {
        Self(number)
    }

    /// Numeric suffix of the code.
    #[must_use]
    pub const fn number(self) -> u32 {
        self.0
    }

    /// Parse a code such as `CUS-042`.
    ///
    /// # Errors
    ///
    /// Returns an error if the prefix is missing or the suffix is not a
    /// non-negative integer.
    pub fn parse(s: &str) -> Result<Self, CustomerCodeError> {
        let digits = s
            .trim()
            .strip_prefix(CUSTOMER_CODE_PREFIX)
            .ok_or(CustomerCodeError::MissingPrefix)?;

        if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
            return Err(CustomerCodeError::InvalidNumber(digits.to_owned()));
        }

        digits
            .parse::<u32>()
            .map(Self)
            .map_err(|_| CustomerCodeError::InvalidNumber(digits.to_owned()))
    }

    /// Allocate the code following the highest code among `existing`.
    ///
    /// Values that do not parse as customer codes are ignored. An empty (or
    /// entirely malformed) input yields [`CustomerCode::FIRST`].
    ///
    /// ```
    /// use bizdesk_core::CustomerCode;
    ///
    /// let next = CustomerCode::next_after(["CUS-001", "CUS-002", "CUS-005"]);
    /// assert_eq!(next.to_string(), "CUS-006");
    /// ```
    #[must_use]
    pub fn next_after<I, S>(existing: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        existing
            .into_iter()
            .filter_map(|code| Self::parse(code.as_ref()).ok())
            .map(Self::number)
            .max()
            .map_or(Self::FIRST, |max| Self(max.saturating_add(1)))
    }
}

impl fmt::Display for CustomerCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{CUSTOMER_CODE_PREFIX}{:0width$}", self.0, width = MIN_DIGITS)
    }
}

impl std::str::FromStr for CustomerCode {
    type Err = CustomerCodeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl Serialize for CustomerCode {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for CustomerCode {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Self::parse(&s).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_next_after_skips_gaps() {
        let next = CustomerCode::next_after(["CUS-001", "CUS-002", "CUS-005"]);
        assert_eq!(next.to_string(), "CUS-006");
    }

    #[test]
    fn test_next_after_empty_is_first() {
        let next = CustomerCode::next_after(Vec::<String>::new());
        assert_eq!(next, CustomerCode::FIRST);
        assert_eq!(next.to_string(), "CUS-001");
    }

    #[test]
    fn test_next_after_ignores_malformed() {
        let next = CustomerCode::next_after(["legacy", "CUS-", "CUS-01x", "CUS-009"]);
        assert_eq!(next.to_string(), "CUS-010");
    }

    #[test]
    fn test_next_after_is_order_independent() {
        let next = CustomerCode::next_after(["CUS-120", "CUS-004", "CUS-099"]);
        assert_eq!(next.to_string(), "CUS-121");
    }

    #[test]
    fn test_display_pads_to_three_digits() {
        assert_eq!(CustomerCode::new(7).to_string(), "CUS-007");
        assert_eq!(CustomerCode::new(42).to_string(), "CUS-042");
        assert_eq!(CustomerCode::new(1000).to_string(), "CUS-1000");
    }

    #[test]
    fn test_parse() {
        assert_eq!(CustomerCode::parse("CUS-123").unwrap().number(), 123);
        assert_eq!(CustomerCode::parse(" CUS-0007 ").unwrap().number(), 7);
        assert_eq!(
            CustomerCode::parse("CU-123"),
            Err(CustomerCodeError::MissingPrefix)
        );
        assert!(matches!(
            CustomerCode::parse("CUS-+12"),
            Err(CustomerCodeError::InvalidNumber(_))
        ));
    }

    #[test]
    fn test_serde_as_string() {
        let code = CustomerCode::new(12);
        assert_eq!(serde_json::to_string(&code).unwrap(), "\"CUS-012\"");
        let parsed: CustomerCode = serde_json::from_str("\"CUS-012\"").unwrap();
        assert_eq!(parsed, code);
    }
}
