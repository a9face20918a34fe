//! # Checkout Facade
//!
//! Exposes every [`CheckoutService`] operation in three interchangeable
//! styles:
//!
//! - `async` methods that forward to the service,
//! - `*_with_callback` methods returning a [`CancellableTask`],
//! - `*_stream` methods returning a cold [`ColdCall`].
//!
//! Errors reach the caller unmodified whichever style is used.
//!
//! ## Example
//!
//! ```rust,ignore
//! use buy_core::{Checkout, CheckoutFacade};
//! use futures::StreamExt;
//!
//! let facade = CheckoutFacade::new(client)?;
//!
//! // Callback style
//! let task = facade.get_checkout_with_callback(token.clone(), |result| {
//!     println!("{:?}", result.map(|c| c.payment_due));
//! });
//!
//! // Stream style: nothing is sent until the stream is polled
//! let rates = facade.get_shipping_rates_stream(token);
//! let first = rates.subscribe().next().await;
//! ```

use crate::checkout::{Checkout, CreditCard, PaymentToken, ShippingRate};
use crate::error::{BuyError, BuyResult};
use crate::service::CheckoutService;
use crate::stream::ColdCall;
use crate::task::{Callback, CancellableTask};
use std::future::Future;
use std::sync::Arc;
use tokio::runtime::Handle;

/// Dual-style front end over a checkout backend
pub struct CheckoutFacade<S: ?Sized> {
    service: Arc<S>,
    runtime: Handle,
}

impl<S: ?Sized> Clone for CheckoutFacade<S> {
    fn clone(&self) -> Self {
        Self {
            service: Arc::clone(&self.service),
            runtime: self.runtime.clone(),
        }
    }
}

impl<S> CheckoutFacade<S>
where
    S: CheckoutService + ?Sized + 'static,
{
    /// Build a facade that spawns callback-style calls on the current runtime.
    ///
    /// Fails if called outside a tokio runtime.
    pub fn new(service: Arc<S>) -> BuyResult<Self> {
        let runtime = Handle::try_current().map_err(|e| {
            BuyError::Configuration(format!("no tokio runtime for callback tasks: {}", e))
        })?;
        Ok(Self::with_runtime(service, runtime))
    }

    /// Build a facade that spawns callback-style calls on `runtime`
    pub fn with_runtime(service: Arc<S>, runtime: Handle) -> Self {
        Self { service, runtime }
    }

    /// The wrapped backend
    pub fn service(&self) -> &Arc<S> {
        &self.service
    }

    fn dispatch<T, Fut, C>(&self, request: Fut, callback: C) -> CancellableTask
    where
        T: Send + 'static,
        Fut: Future<Output = BuyResult<T>> + Send + 'static,
        C: Callback<T>,
    {
        CancellableTask::spawn(&self.runtime, request, callback)
    }

    fn cold<T, F, Fut>(&self, request: F) -> ColdCall<T>
    where
        T: Send + 'static,
        F: Fn(Arc<S>) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = BuyResult<T>> + Send + 'static,
    {
        let service = Arc::clone(&self.service);
        ColdCall::new(move || request(Arc::clone(&service)))
    }

    // =========================================================================
    // create_checkout
    // =========================================================================

    pub async fn create_checkout(&self, checkout: &Checkout) -> BuyResult<Checkout> {
        self.service.create_checkout(checkout).await
    }

    pub fn create_checkout_with_callback(
        &self,
        checkout: Checkout,
        callback: impl Callback<Checkout>,
    ) -> CancellableTask {
        let service = Arc::clone(&self.service);
        self.dispatch(
            async move { service.create_checkout(&checkout).await },
            callback,
        )
    }

    pub fn create_checkout_stream(&self, checkout: Checkout) -> ColdCall<Checkout> {
        self.cold(move |service| {
            let checkout = checkout.clone();
            async move { service.create_checkout(&checkout).await }
        })
    }

    // =========================================================================
    // update_checkout
    // =========================================================================

    pub async fn update_checkout(&self, checkout: &Checkout) -> BuyResult<Checkout> {
        self.service.update_checkout(checkout).await
    }

    pub fn update_checkout_with_callback(
        &self,
        checkout: Checkout,
        callback: impl Callback<Checkout>,
    ) -> CancellableTask {
        let service = Arc::clone(&self.service);
        self.dispatch(
            async move { service.update_checkout(&checkout).await },
            callback,
        )
    }

    pub fn update_checkout_stream(&self, checkout: Checkout) -> ColdCall<Checkout> {
        self.cold(move |service| {
            let checkout = checkout.clone();
            async move { service.update_checkout(&checkout).await }
        })
    }

    // =========================================================================
    // complete_checkout
    // =========================================================================

    pub async fn complete_checkout(
        &self,
        payment_token: Option<&PaymentToken>,
        checkout: &Checkout,
    ) -> BuyResult<Checkout> {
        self.service.complete_checkout(payment_token, checkout).await
    }

    pub fn complete_checkout_with_callback(
        &self,
        payment_token: Option<PaymentToken>,
        checkout: Checkout,
        callback: impl Callback<Checkout>,
    ) -> CancellableTask {
        let service = Arc::clone(&self.service);
        self.dispatch(
            async move {
                service
                    .complete_checkout(payment_token.as_ref(), &checkout)
                    .await
            },
            callback,
        )
    }

    pub fn complete_checkout_stream(
        &self,
        payment_token: Option<PaymentToken>,
        checkout: Checkout,
    ) -> ColdCall<Checkout> {
        self.cold(move |service| {
            let payment_token = payment_token.clone();
            let checkout = checkout.clone();
            async move {
                service
                    .complete_checkout(payment_token.as_ref(), &checkout)
                    .await
            }
        })
    }

    // =========================================================================
    // get_checkout_completion_status
    // =========================================================================

    pub async fn get_checkout_completion_status(&self, checkout_token: &str) -> BuyResult<bool> {
        self.service
            .get_checkout_completion_status(checkout_token)
            .await
    }

    pub fn get_checkout_completion_status_with_callback(
        &self,
        checkout_token: String,
        callback: impl Callback<bool>,
    ) -> CancellableTask {
        let service = Arc::clone(&self.service);
        self.dispatch(
            async move {
                service
                    .get_checkout_completion_status(&checkout_token)
                    .await
            },
            callback,
        )
    }

    pub fn get_checkout_completion_status_stream(&self, checkout_token: String) -> ColdCall<bool> {
        self.cold(move |service| {
            let checkout_token = checkout_token.clone();
            async move {
                service
                    .get_checkout_completion_status(&checkout_token)
                    .await
            }
        })
    }

    // =========================================================================
    // get_checkout
    // =========================================================================

    pub async fn get_checkout(&self, checkout_token: &str) -> BuyResult<Checkout> {
        self.service.get_checkout(checkout_token).await
    }

    pub fn get_checkout_with_callback(
        &self,
        checkout_token: String,
        callback: impl Callback<Checkout>,
    ) -> CancellableTask {
        let service = Arc::clone(&self.service);
        self.dispatch(
            async move { service.get_checkout(&checkout_token).await },
            callback,
        )
    }

    pub fn get_checkout_stream(&self, checkout_token: String) -> ColdCall<Checkout> {
        self.cold(move |service| {
            let checkout_token = checkout_token.clone();
            async move { service.get_checkout(&checkout_token).await }
        })
    }

    // =========================================================================
    // get_shipping_rates
    // =========================================================================

    pub async fn get_shipping_rates(&self, checkout_token: &str) -> BuyResult<Vec<ShippingRate>> {
        self.service.get_shipping_rates(checkout_token).await
    }

    pub fn get_shipping_rates_with_callback(
        &self,
        checkout_token: String,
        callback: impl Callback<Vec<ShippingRate>>,
    ) -> CancellableTask {
        let service = Arc::clone(&self.service);
        self.dispatch(
            async move { service.get_shipping_rates(&checkout_token).await },
            callback,
        )
    }

    pub fn get_shipping_rates_stream(&self, checkout_token: String) -> ColdCall<Vec<ShippingRate>> {
        self.cold(move |service| {
            let checkout_token = checkout_token.clone();
            async move { service.get_shipping_rates(&checkout_token).await }
        })
    }

    // =========================================================================
    // store_credit_card
    // =========================================================================

    pub async fn store_credit_card(
        &self,
        card: &CreditCard,
        checkout: &Checkout,
    ) -> BuyResult<PaymentToken> {
        self.service.store_credit_card(card, checkout).await
    }

    pub fn store_credit_card_with_callback(
        &self,
        card: CreditCard,
        checkout: Checkout,
        callback: impl Callback<PaymentToken>,
    ) -> CancellableTask {
        let service = Arc::clone(&self.service);
        self.dispatch(
            async move { service.store_credit_card(&card, &checkout).await },
            callback,
        )
    }

    pub fn store_credit_card_stream(
        &self,
        card: CreditCard,
        checkout: Checkout,
    ) -> ColdCall<PaymentToken> {
        self.cold(move |service| {
            let card = card.clone();
            let checkout = checkout.clone();
            async move { service.store_credit_card(&card, &checkout).await }
        })
    }

    // =========================================================================
    // apply_gift_card / remove_gift_card
    // =========================================================================

    pub async fn apply_gift_card(&self, code: &str, checkout: &Checkout) -> BuyResult<Checkout> {
        self.service.apply_gift_card(code, checkout).await
    }

    pub fn apply_gift_card_with_callback(
        &self,
        code: String,
        checkout: Checkout,
        callback: impl Callback<Checkout>,
    ) -> CancellableTask {
        let service = Arc::clone(&self.service);
        self.dispatch(
            async move { service.apply_gift_card(&code, &checkout).await },
            callback,
        )
    }

    pub fn apply_gift_card_stream(&self, code: String, checkout: Checkout) -> ColdCall<Checkout> {
        self.cold(move |service| {
            let code = code.clone();
            let checkout = checkout.clone();
            async move { service.apply_gift_card(&code, &checkout).await }
        })
    }

    pub async fn remove_gift_card(
        &self,
        gift_card_id: u64,
        checkout: &Checkout,
    ) -> BuyResult<Checkout> {
        self.service.remove_gift_card(gift_card_id, checkout).await
    }

    pub fn remove_gift_card_with_callback(
        &self,
        gift_card_id: u64,
        checkout: Checkout,
        callback: impl Callback<Checkout>,
    ) -> CancellableTask {
        let service = Arc::clone(&self.service);
        self.dispatch(
            async move { service.remove_gift_card(gift_card_id, &checkout).await },
            callback,
        )
    }

    pub fn remove_gift_card_stream(
        &self,
        gift_card_id: u64,
        checkout: Checkout,
    ) -> ColdCall<Checkout> {
        self.cold(move |service| {
            let checkout = checkout.clone();
            async move { service.remove_gift_card(gift_card_id, &checkout).await }
        })
    }

    // =========================================================================
    // remove_product_reservations_from_checkout
    // =========================================================================

    pub async fn remove_product_reservations_from_checkout(
        &self,
        checkout_token: &str,
    ) -> BuyResult<Checkout> {
        self.service
            .remove_product_reservations_from_checkout(checkout_token)
            .await
    }

    pub fn remove_product_reservations_from_checkout_with_callback(
        &self,
        checkout_token: String,
        callback: impl Callback<Checkout>,
    ) -> CancellableTask {
        let service = Arc::clone(&self.service);
        self.dispatch(
            async move {
                service
                    .remove_product_reservations_from_checkout(&checkout_token)
                    .await
            },
            callback,
        )
    }

    pub fn remove_product_reservations_from_checkout_stream(
        &self,
        checkout_token: String,
    ) -> ColdCall<Checkout> {
        self.cold(move |service| {
            let checkout_token = checkout_token.clone();
            async move {
                service
                    .remove_product_reservations_from_checkout(&checkout_token)
                    .await
            }
        })
    }
}
