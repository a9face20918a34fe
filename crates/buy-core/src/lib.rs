//! # buy-core
//!
//! Core types and traits for the buy-rs storefront checkout SDK.
//!
//! This crate provides:
//! - `CheckoutService` trait implemented by storefront backends
//! - `CustomerService` trait for customer accounts
//! - `Checkout`, `LineItem`, `ShippingRate`, `GiftCard`, `PaymentToken` for the checkout flow
//! - `CheckoutFacade` exposing every operation as async, callback and cold stream calls
//! - `BuyError` for typed error handling
//!
//! ## Example
//!
//! ```rust,ignore
//! use buy_core::{Checkout, CheckoutFacade};
//!
//! let facade = CheckoutFacade::new(Arc::new(client))?;
//!
//! // Create a checkout for two units of a variant
//! let checkout = facade
//!     .create_checkout(&Checkout::new().with_line_item(39072856, 2))
//!     .await?;
//!
//! // Pick a shipping rate
//! let token = checkout.require_token()?.to_string();
//! let rates = facade.get_shipping_rates(&token).await?;
//! let checkout = facade
//!     .update_checkout(&Checkout::with_token(&token).with_shipping_rate(rates[0].clone()))
//!     .await?;
//! ```

pub mod checkout;
pub mod customer;
pub mod error;
pub mod facade;
pub mod service;
pub mod stream;
pub mod task;
pub mod validate;

// Re-exports for convenience
pub use checkout::{
    Address, Checkout, CreditCard, Discount, GiftCard, LineItem, MarketingAttribution,
    OrderSummary, PaymentToken, ShippingRate,
};
pub use customer::{Customer, CustomerToken, NewCustomer};
pub use error::{BuyError, BuyResult, ErrorKind};
pub use facade::CheckoutFacade;
pub use service::{BoxedCheckoutService, CheckoutService, CustomerService};
pub use stream::{ColdCall, Single};
pub use task::{from_fns, Callback, CancellableTask, SplitCallback};
