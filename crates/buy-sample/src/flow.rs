//! # Checkout Flow
//!
//! The purchase walk-through the sample runs, one step per function so each
//! notification style shows up at least once.

use crate::state::PollSettings;
use buy_core::{
    BuyError, BuyResult, Checkout, CheckoutFacade, CheckoutService, PaymentToken, ShippingRate,
};
use futures::StreamExt;
use tokio::sync::oneshot;
use tokio::time::sleep;
use tracing::{debug, info, warn};

/// How a polling loop ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PollOutcome {
    Ready { attempts: u32 },
    GaveUp { attempts: u32 },
}

/// Ask the storefront for shipping rates until some come back, using the
/// cold stream style for every attempt
pub async fn wait_for_shipping_rates<S>(
    facade: &CheckoutFacade<S>,
    checkout_token: &str,
    poll: &PollSettings,
) -> BuyResult<Vec<ShippingRate>>
where
    S: CheckoutService + ?Sized + 'static,
{
    let call = facade.get_shipping_rates_stream(checkout_token.to_string());

    for attempt in 1..=poll.max_attempts {
        // Each subscription is a fresh request
        let mut stream = call.subscribe();
        let rates = match stream.next().await {
            Some(result) => result?,
            None => Vec::new(),
        };

        if !rates.is_empty() {
            info!(attempt, count = rates.len(), "Shipping rates ready");
            return Ok(rates);
        }
        debug!(attempt, "Shipping rates still calculating");
        sleep(poll.interval).await;
    }

    warn!("No shipping rates after {} attempts", poll.max_attempts);
    Ok(Vec::new())
}

/// Put `rate` on the checkout through the callback style
pub async fn select_shipping_rate<S>(
    facade: &CheckoutFacade<S>,
    checkout_token: &str,
    rate: ShippingRate,
) -> BuyResult<Checkout>
where
    S: CheckoutService + ?Sized + 'static,
{
    let (tx, rx) = oneshot::channel();
    let update = Checkout::with_token(checkout_token).with_shipping_rate(rate);

    let _task = facade.update_checkout_with_callback(update, move |result: BuyResult<Checkout>| {
        let _ = tx.send(result);
    });

    rx.await
        .map_err(|_| BuyError::Transport("update task ended without a result".to_string()))?
}

/// Complete the checkout, then poll completion status until it settles or
/// the attempt cap is reached
pub async fn complete_and_wait<S>(
    facade: &CheckoutFacade<S>,
    payment_token: Option<&PaymentToken>,
    checkout: &Checkout,
    poll: &PollSettings,
) -> BuyResult<PollOutcome>
where
    S: CheckoutService + ?Sized + 'static,
{
    let token = checkout.require_token()?;
    facade.complete_checkout(payment_token, checkout).await?;
    poll_completion(facade, token, poll).await
}

/// Poll completion status with a fixed interval and attempt cap
pub async fn poll_completion<S>(
    facade: &CheckoutFacade<S>,
    checkout_token: &str,
    poll: &PollSettings,
) -> BuyResult<PollOutcome>
where
    S: CheckoutService + ?Sized + 'static,
{
    for attempt in 1..=poll.max_attempts {
        if facade.get_checkout_completion_status(checkout_token).await? {
            info!(attempt, "Checkout completed");
            return Ok(PollOutcome::Ready { attempts: attempt });
        }
        debug!(attempt, "Checkout still processing");
        if attempt < poll.max_attempts {
            sleep(poll.interval).await;
        }
    }

    warn!("Checkout still processing after {} attempts", poll.max_attempts);
    Ok(PollOutcome::GaveUp {
        attempts: poll.max_attempts,
    })
}
