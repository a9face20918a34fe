//! Shared HTTP plumbing: one `reqwest::Client` per client instance, common
//! headers, and mapping of transport failures and rejected responses into
//! [`BuyError`].

use crate::config::ShopifyConfig;
use crate::wire::ErrorResponse;
use buy_core::{BuyError, BuyResult};
use reqwest::header::{ACCEPT, AUTHORIZATION};
use reqwest::{Client, Method, RequestBuilder, StatusCode};
use serde::de::DeserializeOwned;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, error};
use uuid::Uuid;

pub(crate) const PROVIDER: &str = "shopify";

const USER_AGENT: &str = concat!("buy-rs/", env!("CARGO_PKG_VERSION"));
const REQUEST_ID_HEADER: &str = "X-Request-Id";

/// Storefront HTTP client. Cheap to clone; clones share the connection pool.
#[derive(Clone)]
pub(crate) struct ApiClient {
    http: Client,
    config: Arc<ShopifyConfig>,
}

impl ApiClient {
    pub fn new(config: ShopifyConfig) -> BuyResult<Self> {
        config.validate()?;

        let http = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .user_agent(USER_AGENT)
            .build()
            .map_err(|e| BuyError::Configuration(format!("failed to create HTTP client: {}", e)))?;

        Ok(Self {
            http,
            config: Arc::new(config),
        })
    }

    pub fn config(&self) -> &ShopifyConfig {
        &self.config
    }

    /// Authenticated request against the storefront API
    pub fn request(&self, method: Method, path: &str) -> RequestBuilder {
        let url = format!("{}{}", self.config.api_base_url, path);
        self.http
            .request(method, url)
            .header(AUTHORIZATION, self.config.auth_header())
            .header(ACCEPT, "application/json")
            .header(REQUEST_ID_HEADER, Uuid::new_v4().to_string())
    }

    /// Unauthenticated request to an absolute URL outside the storefront API
    pub fn external_request(&self, method: Method, url: &str) -> RequestBuilder {
        self.http
            .request(method, url)
            .header(ACCEPT, "application/json")
            .header(REQUEST_ID_HEADER, Uuid::new_v4().to_string())
    }

    /// Send a request, read the body, and turn non-success statuses into errors
    pub async fn execute(&self, builder: RequestBuilder) -> BuyResult<RawResponse> {
        let response = builder
            .send()
            .await
            .map_err(|e| BuyError::Transport(e.to_string()))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| BuyError::Transport(e.to_string()))?;

        if !status.is_success() {
            error!(
                status = %status,
                body = %truncate(&body, 500),
                "Storefront API returned non-success status"
            );
            return Err(rejection(status, &body));
        }

        debug!(status = %status, bytes = body.len(), "Storefront API response");
        Ok(RawResponse { status, body })
    }
}

/// A successful response with its body read
pub(crate) struct RawResponse {
    pub status: StatusCode,
    pub body: String,
}

impl RawResponse {
    pub fn decode<T: DeserializeOwned>(&self) -> BuyResult<T> {
        serde_json::from_str(&self.body).map_err(|e| {
            error!(
                error = %e,
                body = %truncate(&self.body, 500),
                "Failed to parse storefront response"
            );
            BuyError::Decode(format!("failed to parse {} response: {}", PROVIDER, e))
        })
    }
}

/// Build the rejection error for a non-success response
pub(crate) fn rejection(status: StatusCode, body: &str) -> BuyError {
    let message = match serde_json::from_str::<ErrorResponse>(body) {
        Ok(parsed) => parsed.message(),
        Err(_) if body.trim().is_empty() => status
            .canonical_reason()
            .unwrap_or("no response body")
            .to_string(),
        Err(_) => format!("HTTP {}: {}", status.as_u16(), truncate(body, 200)),
    };

    BuyError::Rejected {
        status: status.as_u16(),
        message,
    }
}

/// Escape a caller-supplied value for use as one URL path segment
pub(crate) fn segment(value: &str) -> String {
    url::form_urlencoded::byte_serialize(value.as_bytes()).collect()
}

fn truncate(text: &str, max_chars: usize) -> String {
    text.chars().take(max_chars).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rejection_with_storefront_errors() {
        let err = rejection(
            StatusCode::UNPROCESSABLE_ENTITY,
            r#"{"errors": {"checkout": {"reservation_time": [{"code": "expired", "message": "has expired"}]}}}"#,
        );

        match err {
            BuyError::Rejected { status, message } => {
                assert_eq!(status, 422);
                assert_eq!(message, "checkout.reservation_time: has expired");
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[test]
    fn test_rejection_without_body() {
        let err = rejection(StatusCode::NOT_FOUND, "");
        assert_eq!(err.status_code(), Some(404));
        assert_eq!(err.to_string(), "Rejected by storefront [404]: Not Found");
    }

    #[test]
    fn test_rejection_with_html_body() {
        let err = rejection(StatusCode::BAD_GATEWAY, "<html>bad gateway</html>");
        assert!(err.to_string().contains("HTTP 502"));
    }

    #[test]
    fn test_segment_escapes_separators() {
        assert_eq!(segment("abc123"), "abc123");
        assert_eq!(segment("a/b"), "a%2Fb");
    }

    #[test]
    fn test_decode_error_kind() {
        let response = RawResponse {
            status: StatusCode::OK,
            body: "not json".to_string(),
        };
        let err = response.decode::<serde_json::Value>().unwrap_err();
        assert!(matches!(err, BuyError::Decode(_)));
    }
}
