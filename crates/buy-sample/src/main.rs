//! # buy-sample
//!
//! Buys one product variant from a storefront, end to end.
//!
//! ## Usage
//!
//! ```bash
//! # Set environment variables (or write config/shop.toml)
//! export SHOPIFY_SHOP_DOMAIN=my-shop.myshopify.com
//! export SHOPIFY_API_KEY=...
//! export SHOPIFY_CHANNEL_ID=...
//!
//! # Optional test card; without one, paid checkouts are released again
//! export CARD_NUMBER=4242424242424242 CARD_MONTH=12 CARD_YEAR=2030
//!
//! # Run: variant id, quantity, and --release to only hold and release stock
//! buy-sample 39072856 2
//! ```

use anyhow::{bail, Context};
use buy_core::{Checkout, CheckoutFacade, CheckoutService};
use buy_sample::{
    complete_and_wait, select_shipping_rate, wait_for_shipping_rates, PollOutcome, SampleConfig,
};
use buy_shopify::ShopifyCheckoutClient;
use std::sync::Arc;
use tracing::{info, warn, Level};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

struct Args {
    variant_id: u64,
    quantity: u32,
    release_only: bool,
}

fn parse_args() -> anyhow::Result<Args> {
    let mut positional = Vec::new();
    let mut release_only = false;

    for arg in std::env::args().skip(1) {
        match arg.as_str() {
            "--release" => release_only = true,
            _ => positional.push(arg),
        }
    }

    let Some(variant) = positional.first() else {
        bail!("usage: buy-sample <variant-id> [quantity] [--release]");
    };
    let variant_id = variant
        .parse()
        .with_context(|| format!("invalid variant id {}", variant))?;
    let quantity = match positional.get(1) {
        Some(q) => q.parse().with_context(|| format!("invalid quantity {}", q))?,
        None => 1,
    };

    Ok(Args {
        variant_id,
        quantity,
        release_only,
    })
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(
            EnvFilter::builder()
                .with_default_directive(Level::INFO.into())
                .from_env_lossy(),
        )
        .init();

    let args = parse_args()?;
    let config = SampleConfig::load()?;

    info!("Shop: {}", config.shop.shop_domain);
    info!("Application: {}", config.shop.application_name);

    let client = ShopifyCheckoutClient::new(config.shop.clone())?;
    let facade = CheckoutFacade::new(Arc::new(client))?;
    info!("Provider: {}", facade.service().provider_name());

    // Create (async style)
    let checkout = facade
        .create_checkout(&Checkout::new().with_line_item(args.variant_id, args.quantity))
        .await?;
    let token = checkout.require_token()?.to_string();
    info!(checkout_token = %token, "Checkout created, {} due", checkout.amount_due());

    if args.release_only {
        facade.remove_product_reservations_from_checkout(&token).await?;
        info!("Reservations released");
        return Ok(());
    }

    // Rates (stream style), selection (callback style)
    let mut checkout = checkout;
    if checkout.requires_shipping.unwrap_or(false) {
        let rates = wait_for_shipping_rates(&facade, &token, &config.poll).await?;
        for rate in &rates {
            info!("  {} - {} ({})", rate.id, rate.title, rate.price);
        }
        let Some(first) = rates.into_iter().next() else {
            facade.remove_product_reservations_from_checkout(&token).await?;
            bail!("storefront offered no shipping rates");
        };
        checkout = select_shipping_rate(&facade, &token, first).await?;
        info!("Shipping selected, {} due", checkout.amount_due());
    }

    // Pay
    let payment = match (&config.card, checkout.amount_due().is_zero()) {
        (_, true) => None,
        (Some(card), false) => Some(facade.store_credit_card(card, &checkout).await?),
        (None, false) => {
            warn!(
                "No card configured; finish in the browser: {}",
                checkout.web_url.as_deref().unwrap_or("(no web url)")
            );
            facade.remove_product_reservations_from_checkout(&token).await?;
            return Ok(());
        }
    };

    match complete_and_wait(&facade, payment.as_ref(), &checkout, &config.poll).await? {
        PollOutcome::Ready { attempts } => {
            let done = facade.get_checkout(&token).await?;
            info!(
                "Order placed after {} checks: {}",
                attempts,
                done.order
                    .as_ref()
                    .and_then(|order| order.name.as_deref())
                    .unwrap_or("(unnamed)")
            );
        }
        PollOutcome::GaveUp { attempts } => {
            warn!("Still processing after {} checks, try again later", attempts);
        }
    }

    Ok(())
}
