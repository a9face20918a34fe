//! # Service Traits
//!
//! The asynchronous contract every storefront backend implements.
//!
//! `CheckoutService` is written once as plain `async fn`s. The callback and
//! cold stream styles are adapters over it (see [`crate::facade`]).
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │                  CheckoutService (trait)                     │
//! │  ├── create_checkout() / update_checkout()                   │
//! │  ├── complete_checkout() / get_checkout_completion_status()  │
//! │  ├── get_checkout() / get_shipping_rates()                   │
//! │  ├── store_credit_card()                                     │
//! │  ├── apply_gift_card() / remove_gift_card()                  │
//! │  └── remove_product_reservations_from_checkout()  (provided) │
//! └──────────────────────────────────────────────────────────────┘
//!                               ▲
//!                 ┌─────────────┴─────────────┐
//!        ┌────────┴─────────┐       ┌─────────┴────────┐
//!        │ ShopifyCheckout  │       │  CheckoutFacade  │
//!        │     Client       │       │ callback/stream  │
//!        └──────────────────┘       └──────────────────┘
//! ```

use crate::checkout::{Checkout, CreditCard, PaymentToken, ShippingRate};
use crate::customer::{Customer, CustomerToken, NewCustomer};
use crate::error::BuyResult;
use crate::validate::require_token;
use async_trait::async_trait;
use std::sync::Arc;

/// Checkout lifecycle operations.
///
/// Every method issues exactly one remote request, except where arguments
/// fail validation, in which case none is issued. Nothing is retried.
#[async_trait]
pub trait CheckoutService: Send + Sync {
    /// Create a checkout. The returned checkout carries its token.
    async fn create_checkout(&self, checkout: &Checkout) -> BuyResult<Checkout>;

    /// Update an existing checkout.
    ///
    /// Only the mutable subset is transmitted: email, shipping address,
    /// billing address, line items, discount, shipping rate and reservation
    /// time. Anything else set on `checkout` is ignored.
    async fn update_checkout(&self, checkout: &Checkout) -> BuyResult<Checkout>;

    /// Complete the checkout and process the payment session.
    ///
    /// # Arguments
    /// * `payment_token` - Required when `checkout.amount_due()` is above zero
    /// * `checkout` - Snapshot naming the checkout; only its token goes on the wire
    async fn complete_checkout(
        &self,
        payment_token: Option<&PaymentToken>,
        checkout: &Checkout,
    ) -> BuyResult<Checkout>;

    /// Single point-in-time check of whether completion has finished processing
    async fn get_checkout_completion_status(&self, checkout_token: &str) -> BuyResult<bool>;

    /// Fetch the current state of a checkout
    async fn get_checkout(&self, checkout_token: &str) -> BuyResult<Checkout>;

    /// Shipping rate candidates, in the order the storefront ranks them
    async fn get_shipping_rates(&self, checkout_token: &str) -> BuyResult<Vec<ShippingRate>>;

    /// Send card data to the card vault and get back a payment token
    async fn store_credit_card(
        &self,
        card: &CreditCard,
        checkout: &Checkout,
    ) -> BuyResult<PaymentToken>;

    /// Apply a gift card by code
    async fn apply_gift_card(&self, code: &str, checkout: &Checkout) -> BuyResult<Checkout>;

    /// Remove a previously applied gift card
    async fn remove_gift_card(&self, gift_card_id: u64, checkout: &Checkout) -> BuyResult<Checkout>;

    /// Release all inventory held for the checkout.
    ///
    /// This is `update_checkout` with a token-only checkout whose reservation
    /// time is 0, so every other field stays as it is on the storefront.
    async fn remove_product_reservations_from_checkout(
        &self,
        checkout_token: &str,
    ) -> BuyResult<Checkout> {
        let token = require_token(checkout_token)?;
        self.update_checkout(&Checkout::reservation_release(token))
            .await
    }

    /// Backend name (for logging)
    fn provider_name(&self) -> &'static str;
}

/// Customer account operations
#[async_trait]
pub trait CustomerService: Send + Sync {
    /// Register a new customer
    async fn create_customer(&self, customer: &NewCustomer) -> BuyResult<Customer>;

    /// Exchange credentials for an access token
    async fn login(&self, email: &str, password: &str) -> BuyResult<CustomerToken>;

    /// Fetch the customer a token belongs to
    async fn get_customer(&self, token: &CustomerToken) -> BuyResult<Customer>;

    /// Invalidate an access token
    async fn logout(&self, token: &CustomerToken) -> BuyResult<()>;
}

/// Type alias for a shared checkout backend (dynamic dispatch)
pub type BoxedCheckoutService = Arc<dyn CheckoutService>;
