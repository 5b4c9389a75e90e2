//! Status enums for marketplace entities.
//!
//! The backend is not strict about casing (`"pending"`, `"PENDING"` and
//! `"Pending"` all appear), so order and escrow statuses deserialize
//! case-insensitively and fall back to an `Unknown` variant instead of
//! failing the whole response.

use core::fmt;
use core::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize};

/// Order lifecycle status as reported by the backend.
///
/// `Pending → Accepted → Delivered → Confirmed` is the success path;
/// `Pending | Accepted → Cancelled` is the failure path. The backend owns
/// the transitions; the client only mirrors them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum OrderStatus {
    #[default]
    Pending,
    Accepted,
    Delivered,
    Confirmed,
    Cancelled,
    /// A status this client does not recognize.
    Unknown,
}

impl OrderStatus {
    /// All statuses used as list filters, in lifecycle order.
    pub const FILTERS: [Self; 5] = [
        Self::Pending,
        Self::Accepted,
        Self::Delivered,
        Self::Confirmed,
        Self::Cancelled,
    ];

    /// Wire value of this status.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Accepted => "accepted",
            Self::Delivered => "delivered",
            Self::Confirmed => "confirmed",
            Self::Cancelled => "cancelled",
            Self::Unknown => "unknown",
        }
    }

    /// Whether no further transition can happen.
    #[must_use]
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Confirmed | Self::Cancelled)
    }

    fn parse_lenient(s: &str) -> Self {
        match s.trim().to_ascii_lowercase().as_str() {
            "pending" => Self::Pending,
            "accepted" => Self::Accepted,
            "delivered" => Self::Delivered,
            "confirmed" => Self::Confirmed,
            "cancelled" | "canceled" => Self::Cancelled,
            _ => Self::Unknown,
        }
    }
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OrderStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match Self::parse_lenient(s) {
            Self::Unknown => Err(format!("invalid order status: {s}")),
            status => Ok(status),
        }
    }
}

impl<'de> Deserialize<'de> for OrderStatus {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Ok(Self::parse_lenient(&raw))
    }
}

/// Escrow hold state for an order's payment.
///
/// Mirrored read-only from the backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EscrowStatus {
    /// Funds are held until the buyer confirms receipt.
    #[default]
    Held,
    /// Funds were released to the seller.
    Released,
    /// Funds were returned to the buyer.
    Refunded,
    /// A status this client does not recognize.
    Unknown,
}

impl EscrowStatus {
    /// Wire value of this status.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Held => "HELD",
            Self::Released => "RELEASED",
            Self::Refunded => "REFUNDED",
            Self::Unknown => "UNKNOWN",
        }
    }
}

impl fmt::Display for EscrowStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for EscrowStatus {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Ok(match raw.trim().to_ascii_uppercase().as_str() {
            "HELD" => Self::Held,
            "RELEASED" => Self::Released,
            "REFUNDED" => Self::Refunded,
            _ => Self::Unknown,
        })
    }
}

/// Which side of an order the current user is looking from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ViewerRole {
    /// The user placed the order (purchases tab).
    Buyer,
    /// The user owns the store that received the order (sales tab).
    Seller,
}

impl fmt::Display for ViewerRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Buyer => write!(f, "buyer"),
            Self::Seller => write!(f, "seller"),
        }
    }
}

/// A transition request a viewer can make on an order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OrderAction {
    /// Seller accepts a pending order.
    Accept,
    /// Seller marks an accepted order as delivered.
    Deliver,
    /// Buyer confirms receipt of a delivered order.
    Confirm,
    /// Buyer or seller cancels an order that is not yet delivered.
    Cancel,
}

impl OrderAction {
    /// Path segment of the action endpoint (`/orders/{id}/{segment}/`).
    #[must_use]
    pub const fn endpoint_segment(self) -> &'static str {
        match self {
            Self::Accept => "accept",
            Self::Deliver => "deliver",
            Self::Confirm => "confirm",
            Self::Cancel => "cancel",
        }
    }

    /// Button label for the action.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Accept => "Accept Order",
            Self::Deliver => "Mark Delivered",
            Self::Confirm => "Confirm Receipt",
            Self::Cancel => "Cancel Order",
        }
    }

    /// Status the backend moves the order to when the action succeeds.
    #[must_use]
    pub const fn target_status(self) -> OrderStatus {
        match self {
            Self::Accept => OrderStatus::Accepted,
            Self::Deliver => OrderStatus::Delivered,
            Self::Confirm => OrderStatus::Confirmed,
            Self::Cancel => OrderStatus::Cancelled,
        }
    }
}

impl fmt::Display for OrderAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.endpoint_segment())
    }
}

impl FromStr for OrderAction {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "accept" => Ok(Self::Accept),
            "deliver" => Ok(Self::Deliver),
            "confirm" => Ok(Self::Confirm),
            "cancel" => Ok(Self::Cancel),
            _ => Err(format!("invalid order action: {s}")),
        }
    }
}

/// How an order is paid for at checkout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum PaymentMethod {
    #[default]
    Wallet,
    Card,
}

impl FromStr for PaymentMethod {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "wallet" => Ok(Self::Wallet),
            "card" => Ok(Self::Card),
            _ => Err(format!("invalid payment method: {s}")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_order_status_is_case_insensitive() {
        let status: OrderStatus = serde_json::from_str("\"PENDING\"").expect("status");
        assert_eq!(status, OrderStatus::Pending);

        let status: OrderStatus = serde_json::from_str("\"Delivered\"").expect("status");
        assert_eq!(status, OrderStatus::Delivered);
    }

    #[test]
    fn test_unrecognized_order_status_is_unknown() {
        let status: OrderStatus = serde_json::from_str("\"disputed\"").expect("status");
        assert_eq!(status, OrderStatus::Unknown);
        assert!("disputed".parse::<OrderStatus>().is_err());
    }

    #[test]
    fn test_order_status_serializes_lowercase() {
        let json = serde_json::to_string(&OrderStatus::Cancelled).expect("serialize");
        assert_eq!(json, "\"cancelled\"");
    }

    #[test]
    fn test_escrow_status_roundtrips_screaming_case() {
        let status: EscrowStatus = serde_json::from_str("\"held\"").expect("escrow");
        assert_eq!(status, EscrowStatus::Held);
        assert_eq!(
            serde_json::to_string(&EscrowStatus::Released).expect("serialize"),
            "\"RELEASED\""
        );
    }

    #[test]
    fn test_terminal_statuses() {
        assert!(OrderStatus::Confirmed.is_terminal());
        assert!(OrderStatus::Cancelled.is_terminal());
        assert!(!OrderStatus::Delivered.is_terminal());
    }

    #[test]
    fn test_action_targets() {
        assert_eq!(OrderAction::Accept.target_status(), OrderStatus::Accepted);
        assert_eq!(OrderAction::Cancel.endpoint_segment(), "cancel");
        assert_eq!("deliver".parse::<OrderAction>(), Ok(OrderAction::Deliver));
    }
}
