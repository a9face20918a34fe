//! # Shopify Configuration
//!
//! Configuration management for the storefront client.
//! Loaded from environment variables or a TOML file; the API key is kept as a
//! secret and only exposed when building the authorization header.

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use buy_core::{BuyError, BuyResult, MarketingAttribution};
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use std::env;
use std::path::Path;

const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Storefront API configuration
#[derive(Debug, Clone)]
pub struct ShopifyConfig {
    /// Shop domain, e.g. "my-shop.myshopify.com"
    pub shop_domain: String,

    /// Storefront API key
    pub api_key: SecretString,

    /// Sales channel the checkouts are attributed to
    pub channel_id: String,

    /// Host application name, reported as the checkout source
    pub application_name: String,

    /// Where the web checkout sends the buyer back to
    pub web_return_to_url: Option<String>,

    /// Label for the web return link
    pub web_return_to_label: Option<String>,

    /// API base URL (for testing/mocking)
    pub api_base_url: String,

    /// Per-request timeout
    pub timeout_secs: u64,
}

/// On-disk shape of `config/shop.toml`
#[derive(Debug, Deserialize)]
struct ShopifyConfigFile {
    shop_domain: String,
    api_key: String,
    channel_id: String,
    #[serde(default)]
    application_name: Option<String>,
    #[serde(default)]
    web_return_to_url: Option<String>,
    #[serde(default)]
    web_return_to_label: Option<String>,
    #[serde(default)]
    api_base_url: Option<String>,
    #[serde(default)]
    timeout_secs: Option<u64>,
}

impl ShopifyConfig {
    /// Load configuration from environment variables.
    ///
    /// Required env vars:
    /// - `SHOPIFY_SHOP_DOMAIN`
    /// - `SHOPIFY_API_KEY`
    /// - `SHOPIFY_CHANNEL_ID`
    ///
    /// Optional: `SHOPIFY_APPLICATION_NAME`, `SHOPIFY_WEB_RETURN_TO_URL`,
    /// `SHOPIFY_WEB_RETURN_TO_LABEL`, `SHOPIFY_API_BASE_URL`.
    pub fn from_env() -> BuyResult<Self> {
        dotenvy::dotenv().ok(); // Load .env file if present

        let shop_domain = required_var("SHOPIFY_SHOP_DOMAIN")?;
        let api_key = required_var("SHOPIFY_API_KEY")?;
        let channel_id = required_var("SHOPIFY_CHANNEL_ID")?;

        let mut config = Self::new(shop_domain, api_key, channel_id);
        if let Ok(name) = env::var("SHOPIFY_APPLICATION_NAME") {
            config.application_name = name;
        }
        config.web_return_to_url = env::var("SHOPIFY_WEB_RETURN_TO_URL").ok();
        config.web_return_to_label = env::var("SHOPIFY_WEB_RETURN_TO_LABEL").ok();
        if let Ok(url) = env::var("SHOPIFY_API_BASE_URL") {
            config.api_base_url = url;
        }

        config.validate()?;
        Ok(config)
    }

    /// Parse configuration from TOML text
    pub fn from_toml_str(content: &str) -> BuyResult<Self> {
        let file: ShopifyConfigFile = toml::from_str(content)
            .map_err(|e| BuyError::Configuration(format!("invalid shop config: {}", e)))?;

        let mut config = Self::new(file.shop_domain, file.api_key, file.channel_id);
        if let Some(name) = file.application_name {
            config.application_name = name;
        }
        config.web_return_to_url = file.web_return_to_url;
        config.web_return_to_label = file.web_return_to_label;
        if let Some(url) = file.api_base_url {
            config.api_base_url = url;
        }
        if let Some(timeout) = file.timeout_secs {
            config.timeout_secs = timeout;
        }

        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a TOML file
    pub fn from_toml_file(path: impl AsRef<Path>) -> BuyResult<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| {
            BuyError::Configuration(format!("failed to read {}: {}", path.display(), e))
        })?;
        Self::from_toml_str(&content)
    }

    /// Create config with explicit values (for testing)
    pub fn new(
        shop_domain: impl Into<String>,
        api_key: impl Into<String>,
        channel_id: impl Into<String>,
    ) -> Self {
        let shop_domain = shop_domain.into();
        Self {
            api_base_url: format!("https://{}", shop_domain),
            shop_domain,
            api_key: SecretString::from(api_key.into()),
            channel_id: channel_id.into(),
            application_name: env!("CARGO_PKG_NAME").to_string(),
            web_return_to_url: None,
            web_return_to_label: None,
            timeout_secs: DEFAULT_TIMEOUT_SECS,
        }
    }

    /// Reject configurations that cannot possibly work
    pub fn validate(&self) -> BuyResult<()> {
        if self.shop_domain.trim().is_empty() {
            return Err(BuyError::Configuration("shop domain is empty".to_string()));
        }
        if self.shop_domain.contains("://") || self.shop_domain.contains('/') {
            return Err(BuyError::Configuration(format!(
                "shop domain must be a bare host name, got {}",
                self.shop_domain
            )));
        }
        if self.api_key.expose_secret().trim().is_empty() {
            return Err(BuyError::Configuration("API key is empty".to_string()));
        }
        if self.channel_id.trim().is_empty() {
            return Err(BuyError::Configuration("channel id is empty".to_string()));
        }
        Ok(())
    }

    /// Get authorization header value
    pub fn auth_header(&self) -> String {
        format!("Basic {}", STANDARD.encode(self.api_key.expose_secret()))
    }

    /// Attribution attached to every created checkout
    pub fn marketing_attribution(&self) -> MarketingAttribution {
        MarketingAttribution::app(&self.application_name)
    }

    /// Builder: set custom API base URL (for testing)
    pub fn with_api_base_url(mut self, url: impl Into<String>) -> Self {
        self.api_base_url = url.into().trim_end_matches('/').to_string();
        self
    }

    pub fn with_application_name(mut self, name: impl Into<String>) -> Self {
        self.application_name = name.into();
        self
    }

    pub fn with_web_return_to(mut self, url: impl Into<String>, label: impl Into<String>) -> Self {
        self.web_return_to_url = Some(url.into());
        self.web_return_to_label = Some(label.into());
        self
    }

    pub fn with_timeout_secs(mut self, secs: u64) -> Self {
        self.timeout_secs = secs;
        self
    }
}

fn required_var(name: &str) -> BuyResult<String> {
    env::var(name).map_err(|_| BuyError::Configuration(format!("{} not set", name)))
}
