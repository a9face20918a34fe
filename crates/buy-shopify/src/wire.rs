//! JSON request and response envelopes for the storefront checkout API.

use buy_core::{
    Address, Checkout, CreditCard, Customer, GiftCard, LineItem, MarketingAttribution, NewCustomer,
};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use secrecy::ExposeSecret;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

// =============================================================================
// Requests
// =============================================================================

#[derive(Debug, Serialize)]
pub(crate) struct CheckoutEnvelope<T> {
    pub checkout: T,
}

#[derive(Debug, Serialize)]
pub(crate) struct LineItemInput<'a> {
    pub variant_id: u64,
    pub quantity: u32,
    #[serde(skip_serializing_if = "no_properties")]
    pub properties: &'a HashMap<String, String>,
}

fn no_properties(properties: &&HashMap<String, String>) -> bool {
    properties.is_empty()
}

impl<'a> From<&'a LineItem> for LineItemInput<'a> {
    fn from(item: &'a LineItem) -> Self {
        Self {
            variant_id: item.variant_id,
            quantity: item.quantity,
            properties: &item.properties,
        }
    }
}

#[derive(Debug, Serialize)]
pub(crate) struct DiscountInput<'a> {
    pub code: &'a str,
}

#[derive(Debug, Serialize)]
pub(crate) struct ShippingRateInput<'a> {
    pub id: &'a str,
}

/// Body of a create request
#[derive(Debug, Serialize)]
pub(crate) struct CheckoutCreate<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<&'a str>,
    pub line_items: Vec<LineItemInput<'a>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub shipping_address: Option<&'a Address>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub billing_address: Option<&'a Address>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub discount: Option<DiscountInput<'a>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reservation_time: Option<i64>,
    pub channel_id: &'a str,
    pub marketing_attribution: MarketingAttribution,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub web_return_to_url: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub web_return_to_label: Option<&'a str>,
}

/// Body of an update request: the mutable subset, nothing else.
///
/// Unset fields are omitted and stay as they are on the storefront. An empty
/// line item list counts as unset.
#[derive(Debug, Default, Serialize)]
pub(crate) struct CheckoutUpdate<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub shipping_address: Option<&'a Address>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub billing_address: Option<&'a Address>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub line_items: Option<Vec<LineItemInput<'a>>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub discount: Option<DiscountInput<'a>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub shipping_rate: Option<ShippingRateInput<'a>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reservation_time: Option<i64>,
}

impl<'a> From<&'a Checkout> for CheckoutUpdate<'a> {
    fn from(checkout: &'a Checkout) -> Self {
        Self {
            email: checkout.email.as_deref(),
            shipping_address: checkout.shipping_address.as_ref(),
            billing_address: checkout.billing_address.as_ref(),
            line_items: (!checkout.line_items.is_empty())
                .then(|| checkout.line_items.iter().map(LineItemInput::from).collect()),
            discount: checkout
                .discount
                .as_ref()
                .map(|d| DiscountInput { code: &d.code }),
            shipping_rate: checkout
                .shipping_rate
                .as_ref()
                .map(|r| ShippingRateInput { id: &r.id }),
            reservation_time: checkout.reservation_time,
        }
    }
}

/// Body of a complete request
#[derive(Debug, Default, Serialize)]
pub(crate) struct CompleteRequest<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub payment_session_id: Option<&'a str>,
}

#[derive(Debug, Serialize)]
pub(crate) struct GiftCardEnvelope<'a> {
    pub gift_card: GiftCardInput<'a>,
}

#[derive(Debug, Serialize)]
pub(crate) struct GiftCardInput<'a> {
    pub code: &'a str,
}

/// Card vault request. The only place card secrets are exposed, so no `Debug`.
#[derive(Serialize)]
pub(crate) struct CreditCardEnvelope<'a> {
    pub credit_card: CreditCardInput<'a>,
}

#[derive(Serialize)]
pub(crate) struct CreditCardInput<'a> {
    pub number: &'a str,
    pub first_name: &'a str,
    pub last_name: &'a str,
    pub month: u32,
    pub year: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub verification_value: Option<&'a str>,
}

impl<'a> From<&'a CreditCard> for CreditCardInput<'a> {
    fn from(card: &'a CreditCard) -> Self {
        Self {
            number: card.number.expose_secret(),
            first_name: &card.first_name,
            last_name: &card.last_name,
            month: card.month,
            year: card.year,
            verification_value: card
                .verification_value
                .as_ref()
                .map(|cvv| cvv.expose_secret()),
        }
    }
}

#[derive(Serialize)]
pub(crate) struct CustomerEnvelope<'a> {
    pub customer: CustomerInput<'a>,
}

#[derive(Serialize)]
pub(crate) struct CustomerInput<'a> {
    pub email: &'a str,
    pub password: &'a str,
    pub password_confirmation: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub first_name: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_name: Option<&'a str>,
    pub accepts_marketing: bool,
}

impl<'a> From<&'a NewCustomer> for CustomerInput<'a> {
    fn from(customer: &'a NewCustomer) -> Self {
        let password = customer.password.expose_secret();
        Self {
            email: &customer.email,
            password,
            password_confirmation: password,
            first_name: customer.first_name.as_deref(),
            last_name: customer.last_name.as_deref(),
            accepts_marketing: customer.accepts_marketing,
        }
    }
}

#[derive(Serialize)]
pub(crate) struct CredentialsEnvelope<'a> {
    pub token: Credentials<'a>,
}

#[derive(Serialize)]
pub(crate) struct Credentials<'a> {
    pub email: &'a str,
    pub password: &'a str,
}

// =============================================================================
// Responses
// =============================================================================

#[derive(Debug, Deserialize)]
pub(crate) struct CheckoutResponse {
    pub checkout: Checkout,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ShippingRatesResponse {
    #[serde(default)]
    pub shipping_rates: Vec<buy_core::ShippingRate>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct GiftCardResponse {
    pub gift_card: GiftCardWithCheckout,
}

#[derive(Debug, Deserialize)]
pub(crate) struct GiftCardWithCheckout {
    #[serde(flatten)]
    pub gift_card: GiftCard,
    #[serde(default)]
    pub checkout: Option<GiftCardCheckout>,
}

/// The slice of checkout state returned with a gift card
#[derive(Debug, Deserialize)]
pub(crate) struct GiftCardCheckout {
    #[serde(default)]
    pub payment_due: Option<Decimal>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct VaultSessionResponse {
    pub id: String,
}

#[derive(Debug, Deserialize)]
pub(crate) struct CustomerResponse {
    pub customer: Customer,
}

#[derive(Debug, Deserialize)]
pub(crate) struct CustomerTokenResponse {
    pub customer_token: CustomerTokenBody,
}

#[derive(Debug, Deserialize)]
pub(crate) struct CustomerTokenBody {
    pub access_token: String,
    pub customer_id: u64,
    #[serde(default)]
    pub expires_at: Option<DateTime<Utc>>,
}

/// Storefront error body: `{"errors": ...}` where the payload is a string or
/// a nested map of field errors
#[derive(Debug, Deserialize)]
pub(crate) struct ErrorResponse {
    pub errors: serde_json::Value,
}

impl ErrorResponse {
    /// Flatten the error payload into one line
    pub fn message(&self) -> String {
        let mut messages = Vec::new();
        collect_messages(&self.errors, &mut Vec::new(), &mut messages);
        if messages.is_empty() {
            self.errors.to_string()
        } else {
            messages.join("; ")
        }
    }
}

fn collect_messages(value: &serde_json::Value, path: &mut Vec<String>, out: &mut Vec<String>) {
    match value {
        serde_json::Value::String(message) => {
            if path.is_empty() {
                out.push(message.clone());
            } else {
                out.push(format!("{}: {}", path.join("."), message));
            }
        }
        serde_json::Value::Array(items) => {
            for item in items {
                collect_messages(item, path, out);
            }
        }
        serde_json::Value::Object(map) => {
            // Field errors look like {"code": "invalid", "message": "..."}
            if let Some(serde_json::Value::String(message)) = map.get("message") {
                let prefix = if path.is_empty() {
                    String::new()
                } else {
                    format!("{}: ", path.join("."))
                };
                out.push(format!("{}{}", prefix, message));
                return;
            }
            for (key, nested) in map {
                path.push(key.clone());
                collect_messages(nested, path, out);
                path.pop();
            }
        }
        _ => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use buy_core::ShippingRate;
    use serde_json::json;

    #[test]
    fn test_update_carries_only_mutable_fields() {
        let mut checkout = Checkout::with_token("tok")
            .with_email("buyer@example.com")
            .with_line_item(42, 1)
            .with_discount_code("SPRING")
            .with_reservation_time(300);
        checkout.total_price = Some(Decimal::new(1000, 2));
        checkout.payment_url = Some("https://vault.example.com".into());
        checkout.channel_id = Some("other".into());
        checkout.shipping_rate = Some(ShippingRate {
            id: "shopify-Standard-5.00".into(),
            title: "Standard".into(),
            price: Decimal::new(500, 2),
            delivery_range: None,
        });

        let body = serde_json::to_value(CheckoutUpdate::from(&checkout)).unwrap();
        let keys: Vec<&str> = body.as_object().unwrap().keys().map(String::as_str).collect();

        for key in &keys {
            assert!(
                [
                    "email",
                    "shipping_address",
                    "billing_address",
                    "line_items",
                    "discount",
                    "shipping_rate",
                    "reservation_time"
                ]
                .contains(key),
                "unexpected key {}",
                key
            );
        }
        assert_eq!(body["shipping_rate"], json!({"id": "shopify-Standard-5.00"}));
        assert_eq!(body["discount"], json!({"code": "SPRING"}));
        assert_eq!(body["line_items"], json!([{"variant_id": 42, "quantity": 1}]));
    }

    #[test]
    fn test_reservation_release_body() {
        let checkout = Checkout::reservation_release("tok");
        let body = serde_json::to_value(CheckoutUpdate::from(&checkout)).unwrap();

        assert_eq!(body, json!({"reservation_time": 0}));
    }

    #[test]
    fn test_complete_request_bodies() {
        assert_eq!(
            serde_json::to_value(CompleteRequest::default()).unwrap(),
            json!({})
        );
        assert_eq!(
            serde_json::to_value(CompleteRequest {
                payment_session_id: Some("east-1")
            })
            .unwrap(),
            json!({"payment_session_id": "east-1"})
        );
    }

    #[test]
    fn test_error_message_flattening() {
        let nested: ErrorResponse = serde_json::from_value(json!({
            "errors": {"checkout": {"email": [{"code": "invalid", "message": "is invalid"}]}}
        }))
        .unwrap();
        assert_eq!(nested.message(), "checkout.email: is invalid");

        let plain: ErrorResponse = serde_json::from_value(json!({"errors": "Not Found"})).unwrap();
        assert_eq!(plain.message(), "Not Found");
    }

    #[test]
    fn test_gift_card_response() {
        let response: GiftCardResponse = serde_json::from_value(json!({
            "gift_card": {
                "id": 11,
                "last_characters": "abcd",
                "amount_used": "5.00",
                "checkout": {"payment_due": "15.00"}
            }
        }))
        .unwrap();

        assert_eq!(response.gift_card.gift_card.id, 11);
        assert_eq!(
            response.gift_card.checkout.unwrap().payment_due,
            Some(Decimal::new(1500, 2))
        );
    }
}
