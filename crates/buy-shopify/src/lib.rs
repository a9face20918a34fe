//! # buy-shopify
//!
//! Shopify storefront backend for buy-rs.
//!
//! This crate provides:
//!
//! 1. **ShopifyCheckoutClient** - `CheckoutService` over the storefront checkout API
//!    - Create, update and complete checkouts
//!    - Shipping rates and gift cards
//!    - Card tokenization through the card vault named by the checkout
//!
//! 2. **ShopifyCustomerClient** - `CustomerService` for customer accounts
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use buy_core::{Checkout, CheckoutFacade};
//! use buy_shopify::ShopifyCheckoutClient;
//! use std::sync::Arc;
//!
//! // Create client from environment
//! let client = ShopifyCheckoutClient::from_env()?;
//! let facade = CheckoutFacade::new(Arc::new(client))?;
//!
//! // Same operation, three styles
//! let checkout = facade.create_checkout(&Checkout::new().with_line_item(42, 1)).await?;
//! let task = facade.get_checkout_with_callback(token, |result| println!("{:?}", result));
//! let rates = facade.get_shipping_rates_stream(token).single().await?;
//! ```

mod api;
pub mod checkout;
pub mod config;
pub mod customer;
pub mod vault;
mod wire;

// Re-exports
pub use checkout::ShopifyCheckoutClient;
pub use config::ShopifyConfig;
pub use customer::ShopifyCustomerClient;
pub use vault::CardVaultClient;
