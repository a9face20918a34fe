//! # buy-sample
//!
//! Sample host for buy-rs: walks one product variant through a storefront
//! checkout using each notification style of `CheckoutFacade`.

pub mod flow;
pub mod state;

pub use flow::{
    complete_and_wait, poll_completion, select_shipping_rate, wait_for_shipping_rates, PollOutcome,
};
pub use state::{PollSettings, SampleConfig};
