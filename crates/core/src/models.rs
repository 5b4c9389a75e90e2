//! API resources mirrored by the client.
//!
//! The backend owns all of these; the client deserializes them leniently
//! (most fields optional) because list and detail endpoints return
//! different subsets of each resource.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::types::{
    EscrowStatus, OrderStatus, ProductId, RatingId, StoreId, TransactionId, UserId,
};

// =============================================================================
// Users
// =============================================================================

/// The signed-in user's profile.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: UserId,
    pub email: String,
    #[serde(default)]
    pub full_name: Option<String>,
    #[serde(default, alias = "phone_number")]
    pub phone: Option<String>,
    #[serde(default)]
    pub state: Option<String>,
    /// Local Government Area.
    #[serde(default)]
    pub lga: Option<String>,
    #[serde(default)]
    pub city: Option<String>,
    #[serde(default)]
    pub address: Option<String>,
    #[serde(default)]
    pub is_seller: bool,
    #[serde(default)]
    pub wallet_balance: Option<Decimal>,
}

impl User {
    /// Name to greet the user with.
    #[must_use]
    pub fn display_name(&self) -> &str {
        self.full_name
            .as_deref()
            .filter(|name| !name.trim().is_empty())
            .unwrap_or(&self.email)
    }
}

/// A reference to a buyer or seller as embedded in other resources.
///
/// Depending on the endpoint this is a bare ID, a name, or a small object.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PartyRef {
    Id(UserId),
    Name(String),
    Profile {
        #[serde(default)]
        id: Option<UserId>,
        #[serde(default)]
        full_name: Option<String>,
        #[serde(default)]
        email: Option<String>,
    },
}

impl PartyRef {
    /// Best available label for display.
    #[must_use]
    pub fn label(&self) -> String {
        match self {
            Self::Id(id) => format!("user #{id}"),
            Self::Name(name) => name.clone(),
            Self::Profile {
                id,
                full_name,
                email,
            } => full_name
                .clone()
                .or_else(|| email.clone())
                .or_else(|| id.map(|id| format!("user #{id}")))
                .unwrap_or_else(|| "unknown".to_owned()),
        }
    }
}

// =============================================================================
// Stores
// =============================================================================

/// A seller's shop.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Store {
    pub id: StoreId,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub city: Option<String>,
    #[serde(default)]
    pub state: Option<String>,
    #[serde(default)]
    pub lga: Option<String>,
    #[serde(default)]
    pub logo: Option<String>,
    #[serde(default, alias = "rating")]
    pub average_rating: Option<Decimal>,
    #[serde(default)]
    pub total_ratings: Option<u32>,
    #[serde(default)]
    pub delivery_within_lga: Option<Decimal>,
    #[serde(default)]
    pub delivery_outside_lga: Option<Decimal>,
    #[serde(default)]
    pub seller_id: Option<UserId>,
}

impl Store {
    /// Delivery information used for purchase quotes.
    #[must_use]
    pub fn delivery_info(&self) -> StoreInfo {
        StoreInfo {
            id: Some(self.id),
            name: Some(self.name.clone()),
            city: self.city.clone(),
            delivery_within_lga: self.delivery_within_lga,
            delivery_outside_lga: self.delivery_outside_lga,
        }
    }
}

/// Store summary embedded in product detail responses.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct StoreInfo {
    #[serde(default)]
    pub id: Option<StoreId>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub city: Option<String>,
    #[serde(default)]
    pub delivery_within_lga: Option<Decimal>,
    #[serde(default)]
    pub delivery_outside_lga: Option<Decimal>,
}

// =============================================================================
// Products
// =============================================================================

/// A product listed by a store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Product {
    pub id: ProductId,
    pub name: String,
    pub price: Decimal,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub stock: Option<i64>,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub image: Option<String>,
    /// Image URLs or image objects, depending on the endpoint.
    #[serde(default)]
    pub images: Vec<serde_json::Value>,
    #[serde(default)]
    pub store: Option<StoreId>,
    #[serde(default)]
    pub store_name: Option<String>,
    #[serde(default)]
    pub store_info: Option<StoreInfo>,
    #[serde(default, alias = "rating")]
    pub average_rating: Option<Decimal>,
}

impl Product {
    /// The first usable image URL, if any.
    #[must_use]
    pub fn primary_image(&self) -> Option<String> {
        self.image
            .clone()
            .filter(|url| !url.is_empty())
            .or_else(|| self.images.iter().find_map(image_url))
    }

    /// Store name from the product or its embedded store info.
    #[must_use]
    pub fn store_label(&self) -> Option<&str> {
        self.store_name
            .as_deref()
            .or_else(|| self.store_info.as_ref().and_then(|s| s.name.as_deref()))
    }

    /// Whether the product can be bought in the given quantity.
    #[must_use]
    pub fn has_stock_for(&self, quantity: u32) -> bool {
        self.stock.is_none_or(|stock| stock >= i64::from(quantity))
    }
}

/// Extract a URL from either `"https://..."` or `{"image": "..."}` /
/// `{"url": "..."}`.
fn image_url(value: &serde_json::Value) -> Option<String> {
    match value {
        serde_json::Value::String(url) if !url.is_empty() => Some(url.clone()),
        serde_json::Value::Object(map) => ["image", "url", "image_url"]
            .iter()
            .find_map(|key| map.get(*key).and_then(serde_json::Value::as_str))
            .map(str::to_owned),
        _ => None,
    }
}

// =============================================================================
// Orders
// =============================================================================

/// Product details frozen into an order when it was placed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct ProductSnapshot {
    #[serde(default)]
    pub id: Option<ProductId>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub price: Option<Decimal>,
    #[serde(default)]
    pub store_name: Option<String>,
    #[serde(default)]
    pub images: Vec<serde_json::Value>,
}

/// An order as mirrored from the backend.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Order {
    pub id: crate::types::OrderId,
    #[serde(default)]
    pub order_number: Option<String>,
    pub status: OrderStatus,
    #[serde(default)]
    pub escrow_status: Option<EscrowStatus>,
    #[serde(default)]
    pub buyer: Option<PartyRef>,
    #[serde(default)]
    pub seller: Option<PartyRef>,
    #[serde(default)]
    pub product_snapshot: Option<ProductSnapshot>,
    #[serde(default)]
    pub product_name: Option<String>,
    #[serde(default)]
    pub store_name: Option<String>,
    #[serde(default)]
    pub quantity: Option<u32>,
    #[serde(default)]
    pub product_price: Option<Decimal>,
    #[serde(default)]
    pub delivery_fee: Option<Decimal>,
    #[serde(default)]
    pub total_amount: Decimal,
    #[serde(default, alias = "delivery_address")]
    pub delivery_message: Option<String>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub accepted_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub delivered_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub confirmed_at: Option<DateTime<Utc>>,
}

impl Order {
    /// Product name from the snapshot, the flat field, or a placeholder.
    #[must_use]
    pub fn product_label(&self) -> &str {
        self.product_snapshot
            .as_ref()
            .and_then(|s| s.name.as_deref())
            .or(self.product_name.as_deref())
            .unwrap_or("Product")
    }

    /// Store name from the snapshot, the flat field, or a placeholder.
    #[must_use]
    pub fn store_label(&self) -> &str {
        self.product_snapshot
            .as_ref()
            .and_then(|s| s.store_name.as_deref())
            .or(self.store_name.as_deref())
            .unwrap_or("Store")
    }

    /// Order number if assigned, else the numeric ID.
    #[must_use]
    pub fn reference(&self) -> String {
        self.order_number
            .clone()
            .unwrap_or_else(|| self.id.to_string())
    }
}

// =============================================================================
// Wallet
// =============================================================================

/// Current wallet balance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct WalletBalance {
    #[serde(alias = "wallet_balance")]
    pub balance: Decimal,
}

/// Payment initialization returned when funding the wallet.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaymentInit {
    /// Hosted payment page the user must visit.
    pub authorization_url: String,
    /// Reference used to verify the payment afterwards.
    pub reference: String,
    #[serde(default)]
    pub access_code: Option<String>,
}

/// Envelope of the wallet funding endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FundWalletResponse {
    pub status: String,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub data: Option<PaymentInit>,
}

impl FundWalletResponse {
    /// The payment page, when the backend reports success.
    #[must_use]
    pub fn payment(&self) -> Option<&PaymentInit> {
        if self.status.eq_ignore_ascii_case("success") {
            self.data.as_ref()
        } else {
            None
        }
    }
}

/// Result of verifying a wallet payment by reference.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaymentVerification {
    pub status: String,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub amount: Option<Decimal>,
    #[serde(default, alias = "wallet_balance")]
    pub balance: Option<Decimal>,
}

impl PaymentVerification {
    /// Whether the payment was confirmed and credited.
    #[must_use]
    pub fn is_success(&self) -> bool {
        self.status.eq_ignore_ascii_case("success")
    }
}

/// Acknowledgement of a withdrawal request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Withdrawal {
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub reference: Option<String>,
    #[serde(default)]
    pub amount: Option<Decimal>,
}

/// A wallet ledger entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transaction {
    pub id: TransactionId,
    pub amount: Decimal,
    #[serde(default)]
    pub reference: Option<String>,
    #[serde(default, alias = "type")]
    pub transaction_type: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

// =============================================================================
// Ratings
// =============================================================================

/// A review left on a store or product.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rating {
    pub id: RatingId,
    pub rating: u8,
    #[serde(default)]
    pub review: Option<String>,
    #[serde(default)]
    pub user: Option<PartyRef>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

/// Aggregate rating for a store or product.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct RatingStats {
    #[serde(default)]
    pub average_rating: Option<Decimal>,
    #[serde(default)]
    pub total_ratings: u32,
    /// Count per star value, keyed `"1"`..`"5"`.
    #[serde(default)]
    pub distribution: BTreeMap<String, u32>,
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_order_deserializes_minimal_shape() {
        let order: Order = serde_json::from_value(json!({
            "id": 9,
            "status": "PENDING",
            "total_amount": "6500.00"
        }))
        .unwrap();

        assert_eq!(order.status, OrderStatus::Pending);
        assert_eq!(order.total_amount, Decimal::from(6500));
        assert_eq!(order.product_label(), "Product");
        assert_eq!(order.reference(), "9");
    }

    #[test]
    fn test_order_labels_prefer_snapshot() {
        let order: Order = serde_json::from_value(json!({
            "id": 1,
            "status": "delivered",
            "product_name": "Flat name",
            "store_name": "Flat store",
            "product_snapshot": {"name": "Ankara Dress", "store_name": "Ada's Closet"},
            "buyer": {"id": 3, "full_name": "Chidi"},
            "seller": 4
        }))
        .unwrap();

        assert_eq!(order.product_label(), "Ankara Dress");
        assert_eq!(order.store_label(), "Ada's Closet");
        assert_eq!(order.buyer.unwrap().label(), "Chidi");
        assert_eq!(order.seller.unwrap().label(), "user #4");
    }

    #[test]
    fn test_product_primary_image_fallbacks() {
        let product: Product = serde_json::from_value(json!({
            "id": 1,
            "name": "Wig",
            "price": 1000,
            "images": [{"image": "https://cdn/wig.jpg"}]
        }))
        .unwrap();
        assert_eq!(product.primary_image().as_deref(), Some("https://cdn/wig.jpg"));
        assert!(product.has_stock_for(1000));
    }

    #[test]
    fn test_product_stock_check() {
        let product: Product = serde_json::from_value(json!({
            "id": 1, "name": "Bag", "price": "2500.00", "stock": 2
        }))
        .unwrap();
        assert!(product.has_stock_for(2));
        assert!(!product.has_stock_for(3));
    }

    #[test]
    fn test_fund_wallet_payment_requires_success() {
        let response: FundWalletResponse = serde_json::from_value(json!({
            "status": "success",
            "data": {"authorization_url": "https://pay/abc", "reference": "ref-1"}
        }))
        .unwrap();
        assert_eq!(response.payment().unwrap().reference, "ref-1");

        let failed = FundWalletResponse {
            status: "error".to_owned(),
            ..response
        };
        assert!(failed.payment().is_none());
    }

    #[test]
    fn test_user_display_name_falls_back_to_email() {
        let user: User = serde_json::from_value(json!({
            "id": 1, "email": "a@b.ng", "full_name": "  "
        }))
        .unwrap();
        assert_eq!(user.display_name(), "a@b.ng");
        assert!(!user.is_seller);
    }
}
