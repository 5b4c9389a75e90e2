//! Nigerian mobile phone numbers.

use core::fmt;

use serde::{Deserialize, Serialize};

/// Errors that can occur when parsing a [`PhoneNumber`].
#[derive(thiserror::Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum PhoneError {
    #[error("Phone number is required")]
    Empty,
    #[error("Invalid Nigerian phone number")]
    Invalid,
}

/// A Nigerian mobile number in local (`08031234567`) or international
/// (`+2348031234567`) form.
///
/// The number must match `(+234|0)[789][01]` followed by eight digits.
/// The original spelling is preserved; [`PhoneNumber::pretty`] renders a
/// spaced form for display.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(transparent)]
pub struct PhoneNumber(String);

impl PhoneNumber {
    /// Parse a phone number from user input.
    ///
    /// # Errors
    ///
    /// Returns [`PhoneError::Empty`] for blank input and
    /// [`PhoneError::Invalid`] when the number does not match the pattern.
    pub fn parse(input: &str) -> Result<Self, PhoneError> {
        let s = input.trim();
        if s.is_empty() {
            return Err(PhoneError::Empty);
        }

        let subscriber = s
            .strip_prefix("+234")
            .or_else(|| s.strip_prefix('0'))
            .ok_or(PhoneError::Invalid)?;

        let bytes = subscriber.as_bytes();
        let valid = bytes.len() == 10
            && matches!(bytes.first(), Some(b'7' | b'8' | b'9'))
            && matches!(bytes.get(1), Some(b'0' | b'1'))
            && bytes.iter().all(u8::is_ascii_digit);

        if valid {
            Ok(Self(s.to_owned()))
        } else {
            Err(PhoneError::Invalid)
        }
    }

    /// Returns the number as entered.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Local form with a leading `0`, as the backend stores numbers.
    #[must_use]
    pub fn local(&self) -> String {
        self.0
            .strip_prefix("+234")
            .map_or_else(|| self.0.clone(), |rest| format!("0{rest}"))
    }

    /// Spaced display form: `+234 803 1234 567` or `0803 123 4567`.
    #[must_use]
    pub fn pretty(&self) -> String {
        let digits: String = self.0.chars().filter(char::is_ascii_digit).collect();
        if let Some(rest) = digits.strip_prefix("234")
            && rest.len() == 10
        {
            return format!("+234 {} {} {}", &rest[..3], &rest[3..7], &rest[7..]);
        }
        if digits.len() == 11 {
            return format!("{} {} {}", &digits[..4], &digits[4..7], &digits[7..]);
        }
        self.0.clone()
    }
}

impl fmt::Display for PhoneNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl core::str::FromStr for PhoneNumber {
    type Err = PhoneError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}
