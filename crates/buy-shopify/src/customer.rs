//! Customer accounts: registration, login and logout against the storefront.

use crate::api::{ApiClient, RawResponse};
use crate::config::ShopifyConfig;
use crate::wire::{
    Credentials, CredentialsEnvelope, CustomerEnvelope, CustomerInput, CustomerResponse,
    CustomerTokenResponse,
};
use async_trait::async_trait;
use buy_core::validate::require_non_empty;
use buy_core::{BuyError, BuyResult, Customer, CustomerService, CustomerToken, NewCustomer};
use reqwest::{Method, RequestBuilder};
use secrecy::{ExposeSecret, SecretString};
use tracing::{info, instrument};

const CUSTOMER_TOKEN_HEADER: &str = "X-Shopify-Customer-Access-Token";

/// Storefront customer client
#[derive(Clone)]
pub struct ShopifyCustomerClient {
    api: ApiClient,
}

impl ShopifyCustomerClient {
    pub fn new(config: ShopifyConfig) -> BuyResult<Self> {
        Ok(Self::from_api(ApiClient::new(config)?))
    }

    pub(crate) fn from_api(api: ApiClient) -> Self {
        Self { api }
    }

    fn authorized(&self, method: Method, path: &str, token: &CustomerToken) -> RequestBuilder {
        self.api
            .request(method, path)
            .header(CUSTOMER_TOKEN_HEADER, token.access_token.expose_secret())
    }

    fn decode_customer(response: &RawResponse) -> BuyResult<Customer> {
        Ok(response.decode::<CustomerResponse>()?.customer)
    }
}

#[async_trait]
impl CustomerService for ShopifyCustomerClient {
    #[instrument(skip(self, customer))]
    async fn create_customer(&self, customer: &NewCustomer) -> BuyResult<Customer> {
        require_non_empty("email", &customer.email)?;
        require_non_empty("password", customer.password.expose_secret())?;

        let body = CustomerEnvelope {
            customer: CustomerInput::from(customer),
        };
        let response = self
            .api
            .execute(
                self.api
                    .request(Method::POST, "/api/customers.json")
                    .json(&body),
            )
            .await?;
        let created = Self::decode_customer(&response)?;

        info!(customer_id = created.id, "Created customer");
        Ok(created)
    }

    #[instrument(skip(self, password))]
    async fn login(&self, email: &str, password: &str) -> BuyResult<CustomerToken> {
        let email = require_non_empty("email", email)?;
        let password = require_non_empty("password", password)?;

        let body = CredentialsEnvelope {
            token: Credentials { email, password },
        };
        let response = self
            .api
            .execute(
                self.api
                    .request(Method::POST, "/api/customers/customer_token.json")
                    .json(&body),
            )
            .await?;
        let issued = response.decode::<CustomerTokenResponse>()?.customer_token;

        if issued.access_token.trim().is_empty() {
            return Err(BuyError::Decode(
                "storefront returned an empty customer access token".to_string(),
            ));
        }

        info!(customer_id = issued.customer_id, "Customer logged in");
        Ok(CustomerToken {
            customer_id: issued.customer_id,
            access_token: SecretString::from(issued.access_token),
            expires_at: issued.expires_at,
        })
    }

    #[instrument(skip(self, token), fields(customer_id = token.customer_id))]
    async fn get_customer(&self, token: &CustomerToken) -> BuyResult<Customer> {
        let path = format!("/api/customers/{}.json", token.customer_id);
        let response = self
            .api
            .execute(self.authorized(Method::GET, &path, token))
            .await?;
        Self::decode_customer(&response)
    }

    #[instrument(skip(self, token), fields(customer_id = token.customer_id))]
    async fn logout(&self, token: &CustomerToken) -> BuyResult<()> {
        let path = format!("/api/customers/{}/customer_token.json", token.customer_id);
        self.api
            .execute(self.authorized(Method::DELETE, &path, token))
            .await?;

        info!("Customer logged out");
        Ok(())
    }
}
