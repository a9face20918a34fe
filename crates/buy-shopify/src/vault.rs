//! # Card Vault
//!
//! Card tokenization against the vault endpoint named by a checkout's
//! `payment_url`. Raw card data goes here and nowhere else: the vault must
//! live on a different origin than the storefront API, and storefront
//! credentials are never sent to it.

use crate::api::ApiClient;
use crate::wire::{CreditCardEnvelope, CreditCardInput, VaultSessionResponse};
use buy_core::{BuyError, BuyResult, Checkout, CreditCard, PaymentToken};
use reqwest::Method;
use tracing::{info, instrument};
use url::Url;

/// Exchanges card data for single-use payment tokens
#[derive(Clone)]
pub struct CardVaultClient {
    api: ApiClient,
}

impl CardVaultClient {
    pub(crate) fn new(api: ApiClient) -> Self {
        Self { api }
    }

    /// Resolve and check the vault URL for `checkout`
    fn vault_url(&self, checkout: &Checkout) -> BuyResult<Url> {
        let payment_url = checkout
            .payment_url
            .as_deref()
            .filter(|url| !url.trim().is_empty())
            .ok_or_else(|| BuyError::invalid_argument("checkout has no payment url"))?;

        let vault = Url::parse(payment_url).map_err(|e| {
            BuyError::invalid_argument(format!("invalid payment url {}: {}", payment_url, e))
        })?;
        if !matches!(vault.scheme(), "https" | "http") {
            return Err(BuyError::invalid_argument(format!(
                "payment url must be http(s), got {}",
                vault.scheme()
            )));
        }

        let api = Url::parse(&self.api.config().api_base_url)
            .map_err(|e| BuyError::Configuration(format!("invalid API base url: {}", e)))?;
        if vault.origin() == api.origin() {
            return Err(BuyError::invalid_argument(
                "payment url points at the storefront API; card data must go to the card vault",
            ));
        }

        Ok(vault)
    }

    /// Post a card to the vault and return the payment token for `checkout`
    #[instrument(skip(self, card, checkout), fields(checkout_token = ?checkout.token, card_last_digits = %card.last_digits()))]
    pub async fn store_credit_card(
        &self,
        card: &CreditCard,
        checkout: &Checkout,
    ) -> BuyResult<PaymentToken> {
        card.validate()?;
        checkout.require_token()?;
        let url = self.vault_url(checkout)?;

        let body = CreditCardEnvelope {
            credit_card: CreditCardInput::from(card),
        };

        let response = self
            .api
            .execute(
                self.api
                    .external_request(Method::POST, url.as_str())
                    .json(&body),
            )
            .await?;
        let session: VaultSessionResponse = response.decode()?;

        if session.id.trim().is_empty() {
            return Err(BuyError::Decode(
                "card vault returned an empty session id".to_string(),
            ));
        }

        info!("Stored card in vault");
        Ok(PaymentToken::new(session.id))
    }
}
