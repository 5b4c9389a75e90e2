//! Type-safe price representation using decimal arithmetic.
//!
//! All marketplace amounts are Nigerian Naira. The API sends them either as
//! JSON numbers or as decimal strings (`"1500.00"`); both deserialize into
//! [`rust_decimal::Decimal`] without loss.

use core::fmt;

use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};

/// A price with currency information.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Price {
    /// Amount in the currency's standard unit (e.g., naira, not kobo).
    pub amount: Decimal,
    /// ISO 4217 currency code.
    pub currency_code: CurrencyCode,
}

impl Price {
    /// Create a new price.
    #[must_use]
    pub const fn new(amount: Decimal, currency_code: CurrencyCode) -> Self {
        Self {
            amount,
            currency_code,
        }
    }

    /// Create a price in Nigerian Naira.
    #[must_use]
    pub const fn ngn(amount: Decimal) -> Self {
        Self::new(amount, CurrencyCode::NGN)
    }

    /// Format for display, e.g. `₦1,234.50`.
    ///
    /// ```
    /// use covu_core::Price;
    /// use rust_decimal::Decimal;
    ///
    /// assert_eq!(Price::ngn(Decimal::new(123_450, 2)).display(), "₦1,234.50");
    /// assert_eq!(Price::ngn(Decimal::from(-5000)).display(), "-₦5,000.00");
    /// ```
    #[must_use]
    pub fn display(&self) -> String {
        let rounded = self
            .amount
            .round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero);
        let sign = if rounded.is_sign_negative() && !rounded.is_zero() {
            "-"
        } else {
            ""
        };
        let text = format!("{:.2}", rounded.abs());
        let (whole, fraction) = text.split_once('.').unwrap_or((text.as_str(), "00"));

        format!(
            "{sign}{}{}.{fraction}",
            self.currency_code.symbol(),
            group_thousands(whole)
        )
    }
}

impl fmt::Display for Price {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.display())
    }
}

/// Insert `,` separators every three digits from the right.
fn group_thousands(digits: &str) -> String {
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }
    grouped
}

/// ISO 4217 currency codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum CurrencyCode {
    #[default]
    NGN,
    USD,
}

impl CurrencyCode {
    /// Currency symbol used in display strings.
    #[must_use]
    pub const fn symbol(self) -> &'static str {
        match self {
            Self::NGN => "₦",
            Self::USD => "$",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_groups_thousands() {
        assert_eq!(Price::ngn(Decimal::from(0)).display(), "₦0.00");
        assert_eq!(Price::ngn(Decimal::from(999)).display(), "₦999.00");
        assert_eq!(Price::ngn(Decimal::from(1000)).display(), "₦1,000.00");
        assert_eq!(
            Price::ngn(Decimal::from(1_234_567)).display(),
            "₦1,234,567.00"
        );
    }

    #[test]
    fn test_display_rounds_to_kobo() {
        assert_eq!(Price::ngn(Decimal::new(10_005, 3)).display(), "₦10.01");
    }

    #[test]
    fn test_amount_accepts_string_and_number() {
        let from_str: Decimal = serde_json::from_str("\"1500.00\"").expect("string amount");
        let from_num: Decimal = serde_json::from_str("1500").expect("numeric amount");
        assert_eq!(from_str, from_num);
    }
}
