//! Placing orders: cart checkout and direct purchase.
//!
//! Cart checkout sends every cart line as one order request and empties the
//! cart once the backend has created the order. Direct purchase buys one
//! product from the wallet, after quoting the delivery fee from the buyer's
//! and the store's cities.

use covu_core::PaymentMethod;
use covu_core::cart::Cart;
use covu_core::delivery::{PurchaseQuote, delivery_fee};
use covu_core::models::{Order, Product};
use covu_core::validate::{ValidationError, validate_delivery_message};
use covu_core::{PhoneNumber, ProductId};
use rust_decimal::Decimal;
use tracing::{info, instrument, warn};

use crate::cart::CartStore;
use crate::error::ApiError;
use crate::services::{CovuClient, CreateOrderRequest};

/// Delivery details collected at cart checkout.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckoutDetails {
    pub delivery_address: String,
    pub phone: PhoneNumber,
    pub notes: Option<String>,
    pub payment_method: PaymentMethod,
}

impl CheckoutDetails {
    /// Build the order request for `cart`.
    ///
    /// # Errors
    ///
    /// Returns an error if the cart is empty or the address is blank.
    pub fn order_request(&self, cart: &Cart) -> Result<CreateOrderRequest, ValidationError> {
        if cart.is_empty() {
            return Err(ValidationError::EmptyCart);
        }
        let delivery_address = self.delivery_address.trim();
        if delivery_address.is_empty() {
            return Err(ValidationError::DeliveryAddressMissing);
        }

        Ok(CreateOrderRequest::Cart {
            items: cart.checkout_lines(),
            delivery_address: delivery_address.to_owned(),
            phone: self.phone.local(),
            notes: self.notes.as_deref().map(str::trim).unwrap_or_default().to_owned(),
            payment_method: self.payment_method,
            total_amount: cart.total(),
        })
    }
}

/// What a direct purchase would cost, against the buyer's balance.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PurchasePreview {
    pub product: Product,
    pub quantity: u32,
    pub quote: PurchaseQuote,
    pub balance: Decimal,
}

impl PurchasePreview {
    /// Whether the wallet covers the total.
    #[must_use]
    pub fn is_affordable(&self) -> bool {
        self.quote.is_covered_by(self.balance)
    }

    /// Amount to top up before the purchase can go through.
    #[must_use]
    pub fn shortfall(&self) -> Decimal {
        self.quote.shortfall(self.balance)
    }

    /// Check stock and balance.
    ///
    /// # Errors
    ///
    /// Returns an error if the product is out of stock for the quantity or
    /// the wallet does not cover the total.
    pub fn check(&self) -> Result<(), ValidationError> {
        if !self.product.has_stock_for(self.quantity) {
            return Err(ValidationError::OutOfStock {
                available: self.product.stock.unwrap_or_default(),
            });
        }
        if !self.is_affordable() {
            return Err(ValidationError::InsufficientBalance {
                needed: self.quote.total,
                available: self.balance,
            });
        }
        Ok(())
    }
}

impl CovuClient {
    /// Place an order for everything in the cart.
    ///
    /// The cart is cleared only after the backend has created the order; a
    /// failed request leaves it untouched.
    ///
    /// # Errors
    ///
    /// Returns an error if the cart or details are invalid or the backend
    /// rejects the order.
    #[instrument(skip(self, cart, details), fields(lines = cart.items().len()))]
    pub async fn checkout(
        &self,
        cart: &mut CartStore,
        details: &CheckoutDetails,
    ) -> Result<Vec<Order>, ApiError> {
        let request = details.order_request(cart.cart())?;
        let orders = self.create_order(&request).await?;

        if let Err(e) = cart.clear() {
            warn!(error = %e, "Order placed but the cart could not be cleared");
        }
        info!(orders = orders.len(), "Checkout complete");
        Ok(orders)
    }

    /// Quote a direct purchase of `quantity` units of a product.
    ///
    /// The balance is taken from the profile, falling back to the wallet
    /// endpoint when the profile does not carry one.
    ///
    /// # Errors
    ///
    /// Returns an error if the quantity is zero or a request fails.
    #[instrument(skip(self), fields(product_id = %product_id))]
    pub async fn preview_purchase(
        &self,
        product_id: ProductId,
        quantity: u32,
    ) -> Result<PurchasePreview, ApiError> {
        if quantity == 0 {
            return Err(ValidationError::ZeroQuantity.into());
        }

        let product = self.get_product(product_id).await?;
        let buyer = self.get_profile().await?;
        let balance = match buyer.wallet_balance {
            Some(balance) => balance,
            None => self.wallet_balance().await?,
        };

        let fee = delivery_fee(Some(&buyer), product.store_info.as_ref());
        let quote = PurchaseQuote::new(product.price, quantity, fee);

        Ok(PurchasePreview {
            product,
            quantity,
            quote,
            balance,
        })
    }

    /// Buy a product straight from the wallet.
    ///
    /// # Errors
    ///
    /// Returns an error if the delivery message is too short, the product
    /// is out of stock, the wallet does not cover the total, or the backend
    /// rejects the order.
    #[instrument(skip(self, delivery_message), fields(product_id = %product_id))]
    pub async fn purchase(
        &self,
        product_id: ProductId,
        quantity: u32,
        delivery_message: &str,
    ) -> Result<Order, ApiError> {
        let delivery_message = validate_delivery_message(delivery_message)?;
        let preview = self.preview_purchase(product_id, quantity).await?;
        preview.check()?;

        let request = CreateOrderRequest::Direct {
            product_id,
            delivery_message: delivery_message.to_owned(),
            quantity,
        };
        let order = self
            .create_order(&request)
            .await?
            .into_iter()
            .next()
            .ok_or_else(|| {
                ApiError::Parse(<serde_json::Error as serde::de::Error>::custom(
                    "order endpoint returned no order",
                ))
            })?;

        info!(order_id = %order.id, total = %preview.quote.total, "Purchase placed");
        Ok(order)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use covu_core::CartItem;

    fn product(stock: Option<i64>) -> Product {
        serde_json::from_value(serde_json::json!({
            "id": 3,
            "name": "Ankara gown",
            "price": "12000",
            "stock": stock
        }))
        .unwrap()
    }

    fn details(address: &str) -> CheckoutDetails {
        CheckoutDetails {
            delivery_address: address.to_owned(),
            phone: PhoneNumber::parse("+2348031234567").unwrap(),
            notes: Some("  call on arrival ".to_owned()),
            payment_method: PaymentMethod::Wallet,
        }
    }

    fn preview(stock: Option<i64>, balance: i64) -> PurchasePreview {
        PurchasePreview {
            product: product(stock),
            quantity: 2,
            quote: PurchaseQuote::new(Decimal::from(12000), 2, Decimal::from(1500)),
            balance: Decimal::from(balance),
        }
    }

    #[test]
    fn test_empty_cart_is_rejected() {
        assert_eq!(
            details("12 Allen Avenue").order_request(&Cart::new()),
            Err(ValidationError::EmptyCart)
        );
    }

    #[test]
    fn test_blank_address_is_rejected() {
        let mut cart = Cart::new();
        cart.add_item(CartItem::new(&product(None), 1));
        assert_eq!(
            details("   ").order_request(&cart),
            Err(ValidationError::DeliveryAddressMissing)
        );
    }

    #[test]
    fn test_order_request_from_cart() {
        let mut cart = Cart::new();
        cart.add_item(CartItem::new(&product(None), 2));

        let CreateOrderRequest::Cart {
            items,
            phone,
            notes,
            total_amount,
            ..
        } = details(" 12 Allen Avenue ").order_request(&cart).unwrap()
        else {
            panic!("expected a cart order");
        };

        assert_eq!(items.len(), 1);
        assert_eq!(items[0].quantity, 2);
        assert_eq!(phone, "08031234567");
        assert_eq!(notes, "call on arrival");
        assert_eq!(total_amount, Decimal::from(24000));
    }

    #[test]
    fn test_preview_checks_balance() {
        assert!(preview(None, 25500).check().is_ok());
        assert_eq!(
            preview(None, 20000).check(),
            Err(ValidationError::InsufficientBalance {
                needed: Decimal::from(25500),
                available: Decimal::from(20000),
            })
        );
        assert_eq!(preview(None, 20000).shortfall(), Decimal::from(5500));
    }

    #[test]
    fn test_preview_checks_stock_first() {
        assert_eq!(
            preview(Some(1), 0).check(),
            Err(ValidationError::OutOfStock { available: 1 })
        );
    }
}
