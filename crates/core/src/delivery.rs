//! Delivery fees and direct-purchase quotes.

use rust_decimal::Decimal;

use crate::models::{StoreInfo, User};

/// Fee charged when buyer and store share a city and the store sets none.
pub const DEFAULT_WITHIN_LGA_FEE: Decimal = Decimal::from_parts(1500, 0, 0, false, 0);

/// Fee charged across cities, or when either location is unknown.
pub const DEFAULT_OUTSIDE_LGA_FEE: Decimal = Decimal::from_parts(2500, 0, 0, false, 0);

/// Delivery fee for shipping from `store` to `buyer`.
///
/// Buyer and store cities match case-insensitively after trimming. A
/// missing city on either side counts as a different city. Without store
/// info or a buyer profile the outside-LGA default applies.
///
/// ```
/// use covu_core::delivery::{delivery_fee, DEFAULT_OUTSIDE_LGA_FEE};
///
/// assert_eq!(delivery_fee(None, None), DEFAULT_OUTSIDE_LGA_FEE);
/// ```
#[must_use]
pub fn delivery_fee(buyer: Option<&User>, store: Option<&StoreInfo>) -> Decimal {
    let (Some(buyer), Some(store)) = (buyer, store) else {
        return DEFAULT_OUTSIDE_LGA_FEE;
    };

    let same_city = match (buyer.city.as_deref(), store.city.as_deref()) {
        (Some(buyer_city), Some(store_city)) => same_place(buyer_city, store_city),
        _ => false,
    };

    if same_city {
        store.delivery_within_lga.unwrap_or(DEFAULT_WITHIN_LGA_FEE)
    } else {
        store.delivery_outside_lga.unwrap_or(DEFAULT_OUTSIDE_LGA_FEE)
    }
}

fn same_place(a: &str, b: &str) -> bool {
    let (a, b) = (a.trim(), b.trim());
    !a.is_empty() && a.to_lowercase() == b.to_lowercase()
}

/// Price breakdown for buying one product straight from the wallet.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PurchaseQuote {
    pub subtotal: Decimal,
    pub delivery_fee: Decimal,
    pub total: Decimal,
}

impl PurchaseQuote {
    /// Quote `quantity` units at `unit_price` plus `delivery_fee`.
    ///
    /// Amounts saturate at the `Decimal` bounds.
    #[must_use]
    pub fn new(unit_price: Decimal, quantity: u32, delivery_fee: Decimal) -> Self {
        let subtotal = unit_price.saturating_mul(Decimal::from(quantity));
        Self {
            subtotal,
            delivery_fee,
            total: subtotal.saturating_add(delivery_fee),
        }
    }

    /// Whether `balance` covers the total.
    #[must_use]
    pub fn is_covered_by(&self, balance: Decimal) -> bool {
        balance >= self.total
    }

    /// Amount missing from `balance`, zero when covered.
    #[must_use]
    pub fn shortfall(&self, balance: Decimal) -> Decimal {
        self.total.saturating_sub(balance).max(Decimal::ZERO)
    }
}
