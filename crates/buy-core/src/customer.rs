//! # Customer Types
//!
//! Customer accounts and the access tokens that authenticate them.

use crate::checkout::Address;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use secrecy::SecretString;
use serde::{Deserialize, Serialize};

/// A storefront customer account
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Customer {
    pub id: u64,
    pub email: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub accepts_marketing: bool,
    /// Account state: "disabled", "invited", "enabled" or "declined"
    pub state: Option<String>,
    pub verified_email: bool,
    pub tax_exempt: bool,
    /// Comma separated tags
    pub tags: Option<String>,
    pub orders_count: u32,
    pub total_spent: Option<Decimal>,
    pub note: Option<String>,
    pub multipass_identifier: Option<String>,
    pub last_order_id: Option<u64>,
    pub last_order_name: Option<String>,
    pub addresses: Vec<Address>,
    pub default_address: Option<Address>,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
}

impl Customer {
    /// "First Last", skipping whichever part is missing
    pub fn full_name(&self) -> String {
        [self.first_name.as_deref(), self.last_name.as_deref()]
            .into_iter()
            .flatten()
            .filter(|part| !part.is_empty())
            .collect::<Vec<_>>()
            .join(" ")
    }

    pub fn tag_list(&self) -> Vec<&str> {
        self.tags
            .as_deref()
            .unwrap_or_default()
            .split(',')
            .map(str::trim)
            .filter(|tag| !tag.is_empty())
            .collect()
    }
}

/// Fields for registering a new customer
#[derive(Debug, Clone)]
pub struct NewCustomer {
    pub email: String,
    pub password: SecretString,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub accepts_marketing: bool,
}

impl NewCustomer {
    pub fn new(email: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            email: email.into(),
            password: SecretString::from(password.into()),
            first_name: None,
            last_name: None,
            accepts_marketing: false,
        }
    }

    pub fn with_name(mut self, first_name: impl Into<String>, last_name: impl Into<String>) -> Self {
        self.first_name = Some(first_name.into());
        self.last_name = Some(last_name.into());
        self
    }

    pub fn accepting_marketing(mut self) -> Self {
        self.accepts_marketing = true;
        self
    }
}

/// An authenticated customer session
#[derive(Debug, Clone)]
pub struct CustomerToken {
    pub customer_id: u64,
    pub access_token: SecretString,
    pub expires_at: Option<DateTime<Utc>>,
}

impl CustomerToken {
    pub fn is_expired(&self) -> bool {
        self.expires_at.map(|exp| exp <= Utc::now()).unwrap_or(false)
    }
}
