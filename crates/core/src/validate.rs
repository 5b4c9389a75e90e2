//! Client-side input checks run before a request is sent.
//!
//! The backend validates everything again; these exist so obviously bad
//! input gets a precise message without a round trip.

use rust_decimal::Decimal;
use thiserror::Error;

use crate::types::{EmailError, OrderAction, OrderStatus, PhoneError, ViewerRole};

/// Smallest wallet top-up, in naira.
pub const MIN_TOP_UP: Decimal = Decimal::from_parts(100, 0, 0, false, 0);
/// Largest wallet top-up, in naira.
pub const MAX_TOP_UP: Decimal = Decimal::from_parts(100_000, 0, 0, false, 0);
/// Minimum length of a delivery message, after trimming.
pub const MIN_DELIVERY_MESSAGE_LEN: usize = 10;
/// Minimum password length.
pub const MIN_PASSWORD_LEN: usize = 8;

/// Input rejected before reaching the backend.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error(transparent)]
    Email(#[from] EmailError),

    #[error(transparent)]
    Phone(#[from] PhoneError),

    #[error("password must be at least {MIN_PASSWORD_LEN} characters")]
    PasswordTooShort,

    #[error("password must contain a lowercase letter, an uppercase letter and a digit")]
    PasswordTooWeak,

    #[error("passwords do not match")]
    PasswordMismatch,

    #[error("rating must be between 1 and 5")]
    RatingOutOfRange,

    #[error("quantity must be at least 1")]
    ZeroQuantity,

    #[error("please provide delivery details")]
    DeliveryMessageMissing,

    #[error("delivery details must be at least {MIN_DELIVERY_MESSAGE_LEN} characters")]
    DeliveryMessageTooShort,

    #[error("please provide a delivery address")]
    DeliveryAddressMissing,

    #[error("amount must be between ₦100 and ₦100,000")]
    TopUpOutOfRange,

    #[error("amount must be greater than zero")]
    NonPositiveAmount,

    #[error("your cart is empty")]
    EmptyCart,

    #[error("insufficient wallet balance: need {needed}, have {available}")]
    InsufficientBalance { needed: Decimal, available: Decimal },

    #[error("only {available} left in stock")]
    OutOfStock { available: i64 },

    #[error("cannot {action} a {status} order as the {role}")]
    ActionUnavailable {
        action: OrderAction,
        status: OrderStatus,
        role: ViewerRole,
    },
}

/// Check password strength.
///
/// # Errors
///
/// Returns an error if the password is shorter than eight characters or
/// lacks a lowercase letter, an uppercase letter, or a digit.
pub fn validate_password(password: &str) -> Result<(), ValidationError> {
    if password.chars().count() < MIN_PASSWORD_LEN {
        return Err(ValidationError::PasswordTooShort);
    }

    let has_lower = password.chars().any(char::is_lowercase);
    let has_upper = password.chars().any(char::is_uppercase);
    let has_digit = password.chars().any(|c| c.is_ascii_digit());

    if has_lower && has_upper && has_digit {
        Ok(())
    } else {
        Err(ValidationError::PasswordTooWeak)
    }
}

/// Check a password and its confirmation.
///
/// # Errors
///
/// Returns an error if the two differ or the password is too weak.
pub fn validate_new_password(password: &str, confirm: &str) -> Result<(), ValidationError> {
    if password != confirm {
        return Err(ValidationError::PasswordMismatch);
    }
    validate_password(password)
}

/// Check a star rating.
///
/// # Errors
///
/// Returns an error unless `stars` is within 1..=5.
pub const fn validate_rating(stars: u8) -> Result<u8, ValidationError> {
    if stars >= 1 && stars <= 5 {
        Ok(stars)
    } else {
        Err(ValidationError::RatingOutOfRange)
    }
}

/// Check a delivery message and return it trimmed.
///
/// # Errors
///
/// Returns an error if the message is blank or shorter than ten characters.
pub fn validate_delivery_message(message: &str) -> Result<&str, ValidationError> {
    let message = message.trim();
    if message.is_empty() {
        return Err(ValidationError::DeliveryMessageMissing);
    }
    if message.chars().count() < MIN_DELIVERY_MESSAGE_LEN {
        return Err(ValidationError::DeliveryMessageTooShort);
    }
    Ok(message)
}

/// Check a wallet top-up amount.
///
/// # Errors
///
/// Returns an error unless the amount is within ₦100..=₦100,000.
pub fn validate_top_up(amount: Decimal) -> Result<Decimal, ValidationError> {
    if (MIN_TOP_UP..=MAX_TOP_UP).contains(&amount) {
        Ok(amount)
    } else {
        Err(ValidationError::TopUpOutOfRange)
    }
}

/// Check that an amount is strictly positive.
///
/// # Errors
///
/// Returns an error for zero or negative amounts.
pub fn validate_positive(amount: Decimal) -> Result<Decimal, ValidationError> {
    if amount > Decimal::ZERO {
        Ok(amount)
    } else {
        Err(ValidationError::NonPositiveAmount)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_password_rules() {
        assert_eq!(validate_password("Ab1"), Err(ValidationError::PasswordTooShort));
        assert_eq!(
            validate_password("alllowercase1"),
            Err(ValidationError::PasswordTooWeak)
        );
        assert_eq!(
            validate_password("NoDigitsHere"),
            Err(ValidationError::PasswordTooWeak)
        );
        assert!(validate_password("Sup3rSecret").is_ok());
    }

    #[test]
    fn test_password_confirmation() {
        assert_eq!(
            validate_new_password("Sup3rSecret", "Sup3rSecreT"),
            Err(ValidationError::PasswordMismatch)
        );
        assert!(validate_new_password("Sup3rSecret", "Sup3rSecret").is_ok());
    }

    #[test]
    fn test_rating_range() {
        assert!(validate_rating(0).is_err());
        assert_eq!(validate_rating(1), Ok(1));
        assert_eq!(validate_rating(5), Ok(5));
        assert!(validate_rating(6).is_err());
    }

    #[test]
    fn test_delivery_message() {
        assert_eq!(
            validate_delivery_message("   "),
            Err(ValidationError::DeliveryMessageMissing)
        );
        assert_eq!(
            validate_delivery_message("  Ikeja   "),
            Err(ValidationError::DeliveryMessageTooShort)
        );
        assert_eq!(
            validate_delivery_message(" 12 Allen Avenue, Ikeja "),
            Ok("12 Allen Avenue, Ikeja")
        );
    }

    #[test]
    fn test_top_up_bounds() {
        assert!(validate_top_up(Decimal::from(99)).is_err());
        assert!(validate_top_up(Decimal::from(100)).is_ok());
        assert!(validate_top_up(Decimal::from(100_000)).is_ok());
        assert!(validate_top_up(Decimal::from(100_001)).is_err());
    }

    #[test]
    fn test_messages_are_user_facing() {
        assert_eq!(
            ValidationError::TopUpOutOfRange.to_string(),
            "amount must be between ₦100 and ₦100,000"
        );
        assert_eq!(
            ValidationError::DeliveryMessageTooShort.to_string(),
            "delivery details must be at least 10 characters"
        );
    }
}
