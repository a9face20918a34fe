//! # Sample Configuration
//!
//! Storefront credentials plus the knobs of the sample's own polling loops.

use buy_core::CreditCard;
use buy_shopify::ShopifyConfig;
use std::path::Path;
use std::time::Duration;

const SHOP_CONFIG_PATH: &str = "config/shop.toml";

/// How often, and how many times, the sample asks the storefront again
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollSettings {
    pub interval: Duration,
    pub max_attempts: u32,
}

impl PollSettings {
    /// Load from `POLL_INTERVAL_MS` and `POLL_MAX_ATTEMPTS`
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            interval: std::env::var("POLL_INTERVAL_MS")
                .ok()
                .and_then(|ms| ms.parse().ok())
                .map(Duration::from_millis)
                .unwrap_or(defaults.interval),
            max_attempts: std::env::var("POLL_MAX_ATTEMPTS")
                .ok()
                .and_then(|n| n.parse().ok())
                .filter(|n| *n > 0)
                .unwrap_or(defaults.max_attempts),
        }
    }
}

impl Default for PollSettings {
    fn default() -> Self {
        Self {
            interval: Duration::from_millis(500),
            max_attempts: 20,
        }
    }
}

/// Everything the sample needs to run
#[derive(Debug, Clone)]
pub struct SampleConfig {
    pub shop: ShopifyConfig,
    pub poll: PollSettings,
    /// Test card to pay with, when `CARD_NUMBER` is set
    pub card: Option<CreditCard>,
}

impl SampleConfig {
    /// Load the shop from `SHOP_CONFIG` (or `config/shop.toml` when present),
    /// falling back to `SHOPIFY_*` environment variables
    pub fn load() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();

        let shop = match std::env::var("SHOP_CONFIG") {
            Ok(path) => ShopifyConfig::from_toml_file(path)?,
            Err(_) if Path::new(SHOP_CONFIG_PATH).exists() => {
                ShopifyConfig::from_toml_file(SHOP_CONFIG_PATH)?
            }
            Err(_) => ShopifyConfig::from_env()?,
        };

        Ok(Self {
            shop,
            poll: PollSettings::from_env(),
            card: card_from_env()?,
        })
    }
}

fn card_from_env() -> anyhow::Result<Option<CreditCard>> {
    let Ok(number) = std::env::var("CARD_NUMBER") else {
        return Ok(None);
    };

    let var = |name: &str| std::env::var(name).unwrap_or_default();
    let month = var("CARD_MONTH")
        .parse()
        .map_err(|_| anyhow::anyhow!("CARD_MONTH must be a number"))?;
    let year = var("CARD_YEAR")
        .parse()
        .map_err(|_| anyhow::anyhow!("CARD_YEAR must be a number"))?;

    let mut card = CreditCard::new(
        number,
        var("CARD_FIRST_NAME"),
        var("CARD_LAST_NAME"),
        month,
        year,
    );
    if let Ok(cvv) = std::env::var("CARD_CVV") {
        card = card.with_verification_value(cvv);
    }

    card.validate()?;
    Ok(Some(card))
}
