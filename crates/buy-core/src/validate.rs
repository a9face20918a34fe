//! Argument checks shared by every service implementation.
//!
//! These run before a request is built, so a failure here guarantees
//! nothing went over the wire.

use crate::checkout::{Checkout, PaymentToken};
use crate::error::{BuyError, BuyResult};
use rust_decimal::Decimal;

/// A checkout token must be present and not blank
pub fn require_token(token: &str) -> BuyResult<&str> {
    if token.trim().is_empty() {
        return Err(BuyError::invalid_argument("checkout token is empty"));
    }
    Ok(token)
}

/// Any other required string argument
pub fn require_non_empty<'a>(field: &str, value: &'a str) -> BuyResult<&'a str> {
    if value.trim().is_empty() {
        return Err(BuyError::invalid_argument(format!("{} is empty", field)));
    }
    Ok(value)
}

/// A checkout with money still owed cannot be completed without a payment token
pub fn require_payment(
    payment_token: Option<&PaymentToken>,
    checkout: &Checkout,
) -> BuyResult<()> {
    let due = checkout.amount_due();
    match payment_token {
        None if due > Decimal::ZERO => Err(BuyError::invalid_argument(format!(
            "payment token is required, {} is still due",
            due
        ))),
        Some(token) if token.payment_session_id.trim().is_empty() => Err(
            BuyError::invalid_argument("payment token has an empty session id"),
        ),
        _ => Ok(()),
    }
}
