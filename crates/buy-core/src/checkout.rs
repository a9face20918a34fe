//! # Checkout Types
//!
//! Checkout, line item, payment and gift card types for buy-rs.
//! These mirror the storefront's checkout representation; read-only fields
//! are filled in by the server and ignored on the way out.

use crate::error::{BuyError, BuyResult};
use crate::validate::require_token;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// A postal address
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Address {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub first_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub company: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub address1: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub address2: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub city: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub province: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub province_code: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub country: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub country_code: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub zip: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
}

/// A line item in a checkout
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LineItem {
    /// Product variant being purchased
    pub variant_id: u64,

    /// Quantity
    pub quantity: u32,

    /// Custom line item properties (engraving text, gift notes...)
    #[serde(skip_serializing_if = "HashMap::is_empty")]
    pub properties: HashMap<String, String>,

    // Read-only, assigned by the storefront
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub product_id: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub variant_title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub price: Option<Decimal>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub line_price: Option<Decimal>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub requires_shipping: Option<bool>,
}

impl LineItem {
    /// Create a line item for a product variant
    pub fn new(variant_id: u64, quantity: u32) -> Self {
        Self {
            variant_id,
            quantity,
            ..Default::default()
        }
    }

    /// Add a custom property
    pub fn with_property(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.properties.insert(key.into(), value.into());
        self
    }
}

/// A discount code applied to a checkout
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Discount {
    pub code: String,
    /// Discounted amount, set by the storefront
    #[serde(skip_serializing_if = "Option::is_none")]
    pub amount: Option<Decimal>,
    /// Whether the code applies to the current line items
    #[serde(skip_serializing_if = "Option::is_none")]
    pub applicable: Option<bool>,
}

impl Discount {
    pub fn new(code: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            amount: None,
            applicable: None,
        }
    }
}

/// A shipping price quote for a checkout
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShippingRate {
    /// Rate handle, e.g. "shopify-Standard-10.00"
    pub id: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub price: Decimal,
    /// Earliest and latest expected delivery
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub delivery_range: Option<Vec<DateTime<Utc>>>,
}

/// A gift card applied to a checkout
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GiftCard {
    pub id: u64,
    /// Full code, only present when applying
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_characters: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub balance: Option<Decimal>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub amount_used: Option<Decimal>,
}

/// The order a completed checkout turned into
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderSummary {
    pub id: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status_url: Option<String>,
}

/// Where a checkout came from
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MarketingAttribution {
    pub medium: String,
    pub source: String,
}

impl MarketingAttribution {
    /// Attribution for a checkout started from a host application
    pub fn app(application_name: impl Into<String>) -> Self {
        Self {
            medium: "rust_app".to_string(),
            source: application_name.into(),
        }
    }
}

/// An in-progress purchase.
///
/// `token` is assigned by the storefront on creation and identifies the
/// checkout in every later call.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Checkout {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub token: Option<String>,

    // Mutable subset
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub shipping_address: Option<Address>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub billing_address: Option<Address>,
    pub line_items: Vec<LineItem>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub discount: Option<Discount>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub shipping_rate: Option<ShippingRate>,
    /// Seconds the line items' inventory is held; 0 releases it
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reservation_time: Option<i64>,

    // Creation-only attribution
    #[serde(skip_serializing_if = "Option::is_none")]
    pub channel_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub marketing_attribution: Option<MarketingAttribution>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub web_return_to_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub web_return_to_label: Option<String>,

    // Read-only, computed by the storefront
    #[serde(skip_serializing_if = "Option::is_none")]
    pub requires_shipping: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub taxes_included: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub currency: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub subtotal_price: Option<Decimal>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total_tax: Option<Decimal>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total_price: Option<Decimal>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub payment_due: Option<Decimal>,
    /// Card vault session endpoint for this checkout
    #[serde(skip_serializing_if = "Option::is_none")]
    pub payment_url: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub gift_cards: Vec<GiftCard>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub order: Option<OrderSummary>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub web_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
}

impl Checkout {
    /// Create an empty checkout
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a checkout from line items
    pub fn from_line_items(line_items: Vec<LineItem>) -> Self {
        Self {
            line_items,
            ..Default::default()
        }
    }

    /// A checkout that only names a token.
    ///
    /// Updating with it changes nothing server-side beyond what is set on it
    /// afterwards.
    pub fn with_token(token: impl Into<String>) -> Self {
        Self {
            token: Some(token.into()),
            ..Default::default()
        }
    }

    /// Token-only checkout whose reservation time is zero
    pub fn reservation_release(token: impl Into<String>) -> Self {
        Self {
            reservation_time: Some(0),
            ..Self::with_token(token)
        }
    }

    /// Add a line item
    pub fn add_line_item(&mut self, item: LineItem) {
        self.line_items.push(item);
    }

    /// Builder: add a variant with quantity
    pub fn with_line_item(mut self, variant_id: u64, quantity: u32) -> Self {
        self.add_line_item(LineItem::new(variant_id, quantity));
        self
    }

    /// Set customer email
    pub fn with_email(mut self, email: impl Into<String>) -> Self {
        self.email = Some(email.into());
        self
    }

    pub fn with_shipping_address(mut self, address: Address) -> Self {
        self.shipping_address = Some(address);
        self
    }

    pub fn with_billing_address(mut self, address: Address) -> Self {
        self.billing_address = Some(address);
        self
    }

    pub fn with_discount_code(mut self, code: impl Into<String>) -> Self {
        self.discount = Some(Discount::new(code));
        self
    }

    pub fn with_shipping_rate(mut self, rate: ShippingRate) -> Self {
        self.shipping_rate = Some(rate);
        self
    }

    pub fn with_reservation_time(mut self, seconds: i64) -> Self {
        self.reservation_time = Some(seconds);
        self
    }

    /// The checkout token, if the checkout has been created
    pub fn token(&self) -> Option<&str> {
        self.token.as_deref()
    }

    /// The checkout token, or an invalid-argument error
    pub fn require_token(&self) -> BuyResult<&str> {
        match self.token.as_deref() {
            Some(token) => require_token(token),
            None => Err(BuyError::invalid_argument("checkout has no token")),
        }
    }

    /// Amount still to be paid.
    ///
    /// Falls back to the total price when the storefront has not reported a
    /// payment due, and to zero when neither is known.
    pub fn amount_due(&self) -> Decimal {
        self.payment_due
            .or(self.total_price)
            .unwrap_or(Decimal::ZERO)
    }

    /// A completed checkout carries the order it produced
    pub fn is_completed(&self) -> bool {
        self.order.is_some()
    }

    /// Total number of units across line items
    pub fn item_count(&self) -> u32 {
        self.line_items.iter().map(|item| item.quantity).sum()
    }

    /// Record an applied gift card, replacing any entry with the same id
    pub fn add_gift_card(&mut self, gift_card: GiftCard) {
        self.gift_cards.retain(|card| card.id != gift_card.id);
        self.gift_cards.push(gift_card);
    }

    /// Drop a gift card by id. Returns true if it was present.
    pub fn remove_gift_card(&mut self, gift_card_id: u64) -> bool {
        let before = self.gift_cards.len();
        self.gift_cards.retain(|card| card.id != gift_card_id);
        self.gift_cards.len() != before
    }
}

/// Opaque single-use credential for a tokenized card
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaymentToken {
    pub payment_session_id: String,
}

impl PaymentToken {
    pub fn new(payment_session_id: impl Into<String>) -> Self {
        Self {
            payment_session_id: payment_session_id.into(),
        }
    }
}

/// Raw card data.
///
/// Only ever sent to the card vault. The number and verification value are
/// kept as secrets so they never show up in `Debug` output or logs.
#[derive(Debug, Clone)]
pub struct CreditCard {
    pub number: SecretString,
    pub first_name: String,
    pub last_name: String,
    pub month: u32,
    pub year: u32,
    pub verification_value: Option<SecretString>,
}

impl CreditCard {
    pub fn new(
        number: impl Into<String>,
        first_name: impl Into<String>,
        last_name: impl Into<String>,
        month: u32,
        year: u32,
    ) -> Self {
        Self {
            number: SecretString::from(number.into()),
            first_name: first_name.into(),
            last_name: last_name.into(),
            month,
            year,
            verification_value: None,
        }
    }

    pub fn with_verification_value(mut self, cvv: impl Into<String>) -> Self {
        self.verification_value = Some(SecretString::from(cvv.into()));
        self
    }

    /// Check the fields the vault cannot do without
    pub fn validate(&self) -> BuyResult<()> {
        let digits: String = self
            .number
            .expose_secret()
            .chars()
            .filter(|c| !c.is_whitespace())
            .collect();
        if digits.is_empty() {
            return Err(BuyError::invalid_argument("card number is empty"));
        }
        if !digits.chars().all(|c| c.is_ascii_digit()) {
            return Err(BuyError::invalid_argument(
                "card number must contain only digits",
            ));
        }
        if !(1..=12).contains(&self.month) {
            return Err(BuyError::invalid_argument(format!(
                "card expiry month {} is out of range",
                self.month
            )));
        }
        if self.year == 0 {
            return Err(BuyError::invalid_argument("card expiry year is missing"));
        }
        Ok(())
    }

    /// Last four digits, safe to display
    pub fn last_digits(&self) -> String {
        let number = self.number.expose_secret();
        let digits: Vec<char> = number.chars().filter(|c| c.is_ascii_digit()).collect();
        digits[digits.len().saturating_sub(4)..].iter().collect()
    }
}
