//! # Storefront Checkouts
//!
//! Implementation of the storefront checkout API.
//! This is the primary purchase flow for buy-rs.

use crate::api::{segment, ApiClient, PROVIDER};
use crate::config::ShopifyConfig;
use crate::customer::ShopifyCustomerClient;
use crate::vault::CardVaultClient;
use crate::wire::{
    CheckoutCreate, CheckoutEnvelope, CheckoutResponse, CheckoutUpdate, CompleteRequest,
    DiscountInput, GiftCardEnvelope, GiftCardInput, GiftCardResponse, LineItemInput,
    ShippingRatesResponse,
};
use async_trait::async_trait;
use buy_core::validate::{require_non_empty, require_payment, require_token};
use buy_core::{
    BuyError, BuyResult, Checkout, CheckoutService, CreditCard, PaymentToken, ShippingRate,
};
use reqwest::{Method, StatusCode};
use tracing::{debug, info, instrument};

/// Storefront checkout client
///
/// Every operation is a single request; nothing is cached or retried.
#[derive(Clone)]
pub struct ShopifyCheckoutClient {
    api: ApiClient,
    vault: CardVaultClient,
}

impl ShopifyCheckoutClient {
    /// Create a new checkout client
    pub fn new(config: ShopifyConfig) -> BuyResult<Self> {
        let api = ApiClient::new(config)?;
        Ok(Self {
            vault: CardVaultClient::new(api.clone()),
            api,
        })
    }

    /// Create from environment variables
    pub fn from_env() -> BuyResult<Self> {
        let config = ShopifyConfig::from_env()?;
        Self::new(config)
    }

    /// Customer client sharing this client's connection pool
    pub fn customers(&self) -> ShopifyCustomerClient {
        ShopifyCustomerClient::from_api(self.api.clone())
    }

    pub fn config(&self) -> &ShopifyConfig {
        self.api.config()
    }

    /// Build the create body, filling attribution from config where the
    /// checkout leaves it unset
    fn build_create<'a>(&'a self, checkout: &'a Checkout) -> CheckoutCreate<'a> {
        let config = self.api.config();

        CheckoutCreate {
            email: checkout.email.as_deref(),
            line_items: checkout.line_items.iter().map(LineItemInput::from).collect(),
            shipping_address: checkout.shipping_address.as_ref(),
            billing_address: checkout.billing_address.as_ref(),
            discount: checkout
                .discount
                .as_ref()
                .map(|d| DiscountInput { code: &d.code }),
            reservation_time: checkout.reservation_time,
            channel_id: checkout.channel_id.as_deref().unwrap_or(&config.channel_id),
            marketing_attribution: checkout
                .marketing_attribution
                .clone()
                .unwrap_or_else(|| config.marketing_attribution()),
            web_return_to_url: checkout
                .web_return_to_url
                .as_deref()
                .or(config.web_return_to_url.as_deref()),
            web_return_to_label: checkout
                .web_return_to_label
                .as_deref()
                .or(config.web_return_to_label.as_deref()),
        }
    }

    fn checkout_path(token: &str) -> String {
        format!("/api/checkouts/{}.json", segment(token))
    }

    fn checkout_subpath(token: &str, rest: &str) -> String {
        format!("/api/checkouts/{}/{}", segment(token), rest)
    }

    /// Decode a `{"checkout": ...}` body and make sure it names a checkout
    fn decode_checkout(response: &crate::api::RawResponse) -> BuyResult<Checkout> {
        let checkout = response.decode::<CheckoutResponse>()?.checkout;
        match checkout.token.as_deref() {
            Some(token) if !token.trim().is_empty() => Ok(checkout),
            _ => Err(BuyError::Decode(
                "storefront returned a checkout without a token".to_string(),
            )),
        }
    }
}

#[async_trait]
impl CheckoutService for ShopifyCheckoutClient {
    #[instrument(skip(self, checkout), fields(items = checkout.line_items.len()))]
    async fn create_checkout(&self, checkout: &Checkout) -> BuyResult<Checkout> {
        if checkout.line_items.is_empty() {
            return Err(BuyError::invalid_argument("checkout has no line items"));
        }
        if let Some(item) = checkout.line_items.iter().find(|item| item.quantity == 0) {
            return Err(BuyError::invalid_argument(format!(
                "line item for variant {} has quantity 0",
                item.variant_id
            )));
        }

        let body = CheckoutEnvelope {
            checkout: self.build_create(checkout),
        };
        debug!(
            "Creating checkout: {} items, channel={}",
            body.checkout.line_items.len(),
            body.checkout.channel_id
        );

        let response = self
            .api
            .execute(
                self.api
                    .request(Method::POST, "/api/checkouts.json")
                    .json(&body),
            )
            .await?;
        let created = Self::decode_checkout(&response)?;

        info!(checkout_token = ?created.token, "Created checkout");
        Ok(created)
    }

    #[instrument(skip(self, checkout), fields(checkout_token = ?checkout.token))]
    async fn update_checkout(&self, checkout: &Checkout) -> BuyResult<Checkout> {
        let token = checkout.require_token()?;
        let body = CheckoutEnvelope {
            checkout: CheckoutUpdate::from(checkout),
        };

        let response = self
            .api
            .execute(
                self.api
                    .request(Method::PATCH, &Self::checkout_path(token))
                    .json(&body),
            )
            .await?;
        let updated = Self::decode_checkout(&response)?;

        debug!("Updated checkout");
        Ok(updated)
    }

    #[instrument(skip(self, payment_token, checkout), fields(checkout_token = ?checkout.token, due = %checkout.amount_due()))]
    async fn complete_checkout(
        &self,
        payment_token: Option<&PaymentToken>,
        checkout: &Checkout,
    ) -> BuyResult<Checkout> {
        let token = checkout.require_token()?;
        require_payment(payment_token, checkout)?;

        let body = CompleteRequest {
            payment_session_id: payment_token.map(|t| t.payment_session_id.as_str()),
        };

        let response = self
            .api
            .execute(
                self.api
                    .request(
                        Method::POST,
                        &Self::checkout_subpath(token, "complete.json"),
                    )
                    .json(&body),
            )
            .await?;
        let completed = Self::decode_checkout(&response)?;

        info!("Submitted checkout for completion");
        Ok(completed)
    }

    #[instrument(skip(self))]
    async fn get_checkout_completion_status(&self, checkout_token: &str) -> BuyResult<bool> {
        let token = require_token(checkout_token)?;

        let response = self
            .api
            .execute(self.api.request(
                Method::GET,
                &Self::checkout_subpath(token, "processing.json"),
            ))
            .await?;

        match response.status {
            StatusCode::OK => Ok(true),
            StatusCode::ACCEPTED => Ok(false),
            other => Err(BuyError::Rejected {
                status: other.as_u16(),
                message: "unexpected completion status response".to_string(),
            }),
        }
    }

    #[instrument(skip(self))]
    async fn get_checkout(&self, checkout_token: &str) -> BuyResult<Checkout> {
        let token = require_token(checkout_token)?;

        let response = self
            .api
            .execute(self.api.request(Method::GET, &Self::checkout_path(token)))
            .await?;
        Self::decode_checkout(&response)
    }

    #[instrument(skip(self))]
    async fn get_shipping_rates(&self, checkout_token: &str) -> BuyResult<Vec<ShippingRate>> {
        let token = require_token(checkout_token)?;

        let response = self
            .api
            .execute(self.api.request(
                Method::GET,
                &Self::checkout_subpath(token, "shipping_rates.json?checkout"),
            ))
            .await?;

        // 202: rates are still being calculated
        if response.status == StatusCode::ACCEPTED {
            debug!("Shipping rates not ready yet");
            return Ok(Vec::new());
        }

        let rates = response.decode::<ShippingRatesResponse>()?.shipping_rates;
        debug!("Fetched {} shipping rates", rates.len());
        Ok(rates)
    }

    async fn store_credit_card(
        &self,
        card: &CreditCard,
        checkout: &Checkout,
    ) -> BuyResult<PaymentToken> {
        self.vault.store_credit_card(card, checkout).await
    }

    #[instrument(skip(self, code, checkout), fields(checkout_token = ?checkout.token))]
    async fn apply_gift_card(&self, code: &str, checkout: &Checkout) -> BuyResult<Checkout> {
        let code = require_non_empty("gift card code", code)?;
        let token = checkout.require_token()?;

        let body = GiftCardEnvelope {
            gift_card: GiftCardInput { code },
        };

        let response = self
            .api
            .execute(
                self.api
                    .request(
                        Method::POST,
                        &Self::checkout_subpath(token, "gift_cards.json"),
                    )
                    .json(&body),
            )
            .await?;
        let applied = response.decode::<GiftCardResponse>()?.gift_card;

        let mut updated = checkout.clone();
        if let Some(due) = applied.checkout.and_then(|c| c.payment_due) {
            updated.payment_due = Some(due);
        }
        info!(gift_card_id = applied.gift_card.id, "Applied gift card");
        updated.add_gift_card(applied.gift_card);
        Ok(updated)
    }

    #[instrument(skip(self, checkout), fields(checkout_token = ?checkout.token))]
    async fn remove_gift_card(&self, gift_card_id: u64, checkout: &Checkout) -> BuyResult<Checkout> {
        let token = checkout.require_token()?;

        let response = self
            .api
            .execute(self.api.request(
                Method::DELETE,
                &Self::checkout_subpath(token, &format!("gift_cards/{}.json", gift_card_id)),
            ))
            .await?;
        let removed = response.decode::<GiftCardResponse>()?.gift_card;

        let mut updated = checkout.clone();
        if let Some(due) = removed.checkout.and_then(|c| c.payment_due) {
            updated.payment_due = Some(due);
        }
        updated.remove_gift_card(gift_card_id);
        info!("Removed gift card");
        Ok(updated)
    }

    fn provider_name(&self) -> &'static str {
        PROVIDER
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use buy_core::MarketingAttribution;

    fn client() -> ShopifyCheckoutClient {
        let config = ShopifyConfig::new("demo.myshopify.com", "key", "chan-1")
            .with_application_name("Demo App")
            .with_web_return_to("demoapp://done", "Back to Demo");
        ShopifyCheckoutClient::new(config).unwrap()
    }

    #[test]
    fn test_paths() {
        assert_eq!(
            ShopifyCheckoutClient::checkout_path("abc"),
            "/api/checkouts/abc.json"
        );
        assert_eq!(
            ShopifyCheckoutClient::checkout_subpath("abc", "complete.json"),
            "/api/checkouts/abc/complete.json"
        );
    }

    #[test]
    fn test_create_body_takes_attribution_from_config() {
        let client = client();
        let checkout = Checkout::new().with_line_item(42, 2);
        let body = serde_json::to_value(client.build_create(&checkout)).unwrap();

        assert_eq!(body["channel_id"], "chan-1");
        assert_eq!(body["marketing_attribution"]["source"], "Demo App");
        assert_eq!(body["web_return_to_url"], "demoapp://done");
        assert_eq!(body["line_items"][0]["quantity"], 2);
    }

    #[test]
    fn test_create_body_prefers_checkout_values() {
        let client = client();
        let mut checkout = Checkout::new().with_line_item(42, 1);
        checkout.channel_id = Some("chan-override".into());
        checkout.marketing_attribution = Some(MarketingAttribution {
            medium: "email".into(),
            source: "newsletter".into(),
        });
        let body = serde_json::to_value(client.build_create(&checkout)).unwrap();

        assert_eq!(body["channel_id"], "chan-override");
        assert_eq!(body["marketing_attribution"]["medium"], "email");
    }

    #[tokio::test]
    async fn test_create_rejects_empty_checkout_before_sending() {
        let err = client().create_checkout(&Checkout::new()).await.unwrap_err();
        assert!(matches!(err, BuyError::InvalidArgument(_)));

        let err = client()
            .create_checkout(&Checkout::new().with_line_item(42, 0))
            .await
            .unwrap_err();
        assert!(matches!(err, BuyError::InvalidArgument(_)));
    }
}
