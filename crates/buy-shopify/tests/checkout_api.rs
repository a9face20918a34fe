//! Storefront client against a mocked storefront.

use buy_core::{
    BuyError, BuyResult, Checkout, CheckoutFacade, CheckoutService, CreditCard, CustomerService,
    ErrorKind, PaymentToken,
};
use buy_shopify::{ShopifyCheckoutClient, ShopifyConfig};
use futures::StreamExt;
use rust_decimal::Decimal;
use serde_json::{json, Value};
use std::sync::Arc;
use tokio::sync::oneshot;
use wiremock::matchers::{body_json, header, header_exists, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn client_for(server: &MockServer) -> ShopifyCheckoutClient {
    let config = ShopifyConfig::new("demo.myshopify.com", "key123", "chan-1")
        .with_application_name("Demo App")
        .with_api_base_url(server.uri());
    ShopifyCheckoutClient::new(config).unwrap()
}

fn checkout_json(token: &str) -> Value {
    json!({
        "checkout": {
            "token": token,
            "email": "buyer@example.com",
            "line_items": [{"variant_id": 42, "quantity": 2, "title": "Mug", "price": "10.00"}],
            "total_price": "20.00",
            "payment_due": "20.00",
            "requires_shipping": true,
            "currency": "USD"
        }
    })
}

async fn request_bodies(server: &MockServer) -> Vec<Value> {
    server
        .received_requests()
        .await
        .unwrap_or_default()
        .iter()
        .map(|request| serde_json::from_slice(&request.body).unwrap_or(Value::Null))
        .collect()
}

#[tokio::test]
async fn create_returns_token_that_get_resolves() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/checkouts.json"))
        .and(header("Authorization", "Basic a2V5MTIz"))
        .and(header_exists("X-Request-Id"))
        .respond_with(ResponseTemplate::new(201).set_body_json(checkout_json("tok-1")))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/checkouts/tok-1.json"))
        .respond_with(ResponseTemplate::new(200).set_body_json(checkout_json("tok-1")))
        .expect(1)
        .mount(&server)
        .await;

    let client = client_for(&server);
    let created = client
        .create_checkout(&Checkout::new().with_line_item(42, 2))
        .await
        .unwrap();
    let fetched = client
        .get_checkout(created.token().unwrap())
        .await
        .unwrap();

    assert_eq!(created.token(), Some("tok-1"));
    assert_eq!(fetched.token, created.token);
    assert_eq!(fetched.amount_due(), Decimal::new(2000, 2));
    assert_eq!(fetched.item_count(), 2);

    let bodies = request_bodies(&server).await;
    let sent = &bodies[0]["checkout"];
    assert_eq!(sent["channel_id"], "chan-1");
    assert_eq!(sent["marketing_attribution"], json!({"medium": "rust_app", "source": "Demo App"}));
    assert_eq!(sent["line_items"], json!([{"variant_id": 42, "quantity": 2}]));
}

#[tokio::test]
async fn update_sends_only_mutable_fields() {
    let server = MockServer::start().await;
    Mock::given(method("PATCH"))
        .and(path("/api/checkouts/tok-1.json"))
        .respond_with(ResponseTemplate::new(200).set_body_json(checkout_json("tok-1")))
        .expect(1)
        .mount(&server)
        .await;

    let mut checkout = Checkout::with_token("tok-1").with_email("new@example.com");
    checkout.total_price = Some(Decimal::new(1, 0));
    checkout.payment_url = Some("https://vault.example.com/sessions".into());
    checkout.web_url = Some("https://demo.myshopify.com/web".into());

    client_for(&server).update_checkout(&checkout).await.unwrap();

    let bodies = request_bodies(&server).await;
    assert_eq!(bodies[0], json!({"checkout": {"email": "new@example.com"}}));
}

#[tokio::test]
async fn reservation_release_patches_reservation_time_only() {
    let server = MockServer::start().await;
    Mock::given(method("PATCH"))
        .and(path("/api/checkouts/tok-1.json"))
        .and(body_json(json!({"checkout": {"reservation_time": 0}})))
        .respond_with(ResponseTemplate::new(200).set_body_json(checkout_json("tok-1")))
        .expect(1)
        .mount(&server)
        .await;

    let released = client_for(&server)
        .remove_product_reservations_from_checkout("tok-1")
        .await
        .unwrap();
    assert_eq!(released.token(), Some("tok-1"));
}

#[tokio::test]
async fn complete_without_payment_is_refused_locally() {
    let server = MockServer::start().await;

    let mut checkout = Checkout::with_token("tok-1");
    checkout.payment_due = Some(Decimal::new(1500, 2));

    let err = client_for(&server)
        .complete_checkout(None, &checkout)
        .await
        .unwrap_err();

    assert_eq!(err.kind(), ErrorKind::InvalidArgument);
    assert!(server.received_requests().await.unwrap_or_default().is_empty());
}

#[tokio::test]
async fn complete_sends_payment_session_and_free_checkout_sends_none() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/checkouts/tok-1/complete.json"))
        .respond_with(ResponseTemplate::new(202).set_body_json(checkout_json("tok-1")))
        .expect(2)
        .mount(&server)
        .await;

    let client = client_for(&server);

    let mut owing = Checkout::with_token("tok-1");
    owing.payment_due = Some(Decimal::new(2000, 2));
    client
        .complete_checkout(Some(&PaymentToken::new("east-1")), &owing)
        .await
        .unwrap();

    let mut free = Checkout::with_token("tok-1");
    free.payment_due = Some(Decimal::ZERO);
    client.complete_checkout(None, &free).await.unwrap();

    let bodies = request_bodies(&server).await;
    assert_eq!(bodies[0], json!({"payment_session_id": "east-1"}));
    assert_eq!(bodies[1], json!({}));
}

#[tokio::test]
async fn completion_status_maps_200_and_202() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/checkouts/done/processing.json"))
        .respond_with(ResponseTemplate::new(200))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/checkouts/busy/processing.json"))
        .respond_with(ResponseTemplate::new(202))
        .mount(&server)
        .await;

    let client = client_for(&server);
    assert!(client.get_checkout_completion_status("done").await.unwrap());
    assert!(!client.get_checkout_completion_status("busy").await.unwrap());
}

#[tokio::test]
async fn shipping_rates_ready_and_pending() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/checkouts/ready/shipping_rates.json"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "shipping_rates": [
                {"id": "shopify-Standard-5.00", "title": "Standard", "price": "5.00"},
                {"id": "shopify-Express-15.00", "title": "Express", "price": "15.00"}
            ]
        })))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/checkouts/pending/shipping_rates.json"))
        .respond_with(ResponseTemplate::new(202))
        .mount(&server)
        .await;

    let client = client_for(&server);
    let rates = client.get_shipping_rates("ready").await.unwrap();
    assert_eq!(rates.len(), 2);
    assert_eq!(rates[0].id, "shopify-Standard-5.00");
    assert_eq!(rates[1].price, Decimal::new(1500, 2));

    assert!(client.get_shipping_rates("pending").await.unwrap().is_empty());
}

#[tokio::test]
async fn gift_card_apply_and_remove_track_payment_due() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/checkouts/tok-1/gift_cards.json"))
        .and(body_json(json!({"gift_card": {"code": "GIFT-ABCD"}})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "gift_card": {
                "id": 7,
                "last_characters": "abcd",
                "amount_used": "5.00",
                "balance": "0.00",
                "checkout": {"payment_due": "15.00"}
            }
        })))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("DELETE"))
        .and(path("/api/checkouts/tok-1/gift_cards/7.json"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "gift_card": {"id": 7, "checkout": {"payment_due": "20.00"}}
        })))
        .expect(1)
        .mount(&server)
        .await;

    let client = client_for(&server);
    let mut checkout = Checkout::with_token("tok-1");
    checkout.payment_due = Some(Decimal::new(2000, 2));

    let applied = client.apply_gift_card("GIFT-ABCD", &checkout).await.unwrap();
    assert_eq!(applied.gift_cards.len(), 1);
    assert_eq!(applied.amount_due(), Decimal::new(1500, 2));

    let removed = client.remove_gift_card(7, &applied).await.unwrap();
    assert!(removed.gift_cards.is_empty());
    assert_eq!(removed.amount_due(), Decimal::new(2000, 2));
}

#[tokio::test]
async fn store_credit_card_posts_to_vault_without_credentials() {
    let storefront = MockServer::start().await;
    let vault = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/sessions"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"id": "east-1"})))
        .expect(1)
        .mount(&vault)
        .await;

    let mut checkout = Checkout::with_token("tok-1");
    checkout.payment_url = Some(format!("{}/sessions", vault.uri()));
    let card = CreditCard::new("4242424242424242", "Ada", "Lovelace", 12, 2099)
        .with_verification_value("123");

    let token = client_for(&storefront)
        .store_credit_card(&card, &checkout)
        .await
        .unwrap();
    assert_eq!(token.payment_session_id, "east-1");

    let requests = vault.received_requests().await.unwrap_or_default();
    assert!(requests[0].headers.get("authorization").is_none());
    let body: Value = serde_json::from_slice(&requests[0].body).unwrap();
    assert_eq!(body["credit_card"]["number"], "4242424242424242");
    assert!(storefront.received_requests().await.unwrap_or_default().is_empty());
}

#[tokio::test]
async fn rejected_response_carries_status_and_message() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/checkouts/missing.json"))
        .respond_with(ResponseTemplate::new(404).set_body_json(json!({"errors": "Not Found"})))
        .mount(&server)
        .await;
    Mock::given(method("PATCH"))
        .and(path("/api/checkouts/tok-1.json"))
        .respond_with(ResponseTemplate::new(422).set_body_json(json!({
            "errors": {"checkout": {"email": [{"code": "invalid", "message": "is invalid"}]}}
        })))
        .mount(&server)
        .await;

    let client = client_for(&server);

    let err = client.get_checkout("missing").await.unwrap_err();
    assert!(err.is_not_found());
    assert_eq!(err.kind(), ErrorKind::RemoteRejection);

    let err = client
        .update_checkout(&Checkout::with_token("tok-1").with_email("nope"))
        .await
        .unwrap_err();
    match err {
        BuyError::Rejected { status, message } => {
            assert_eq!(status, 422);
            assert_eq!(message, "checkout.email: is invalid");
        }
        other => panic!("unexpected error: {:?}", other),
    }
}

#[tokio::test]
async fn unreachable_storefront_is_a_transport_error() {
    let config = ShopifyConfig::new("demo.myshopify.com", "key123", "chan-1")
        .with_api_base_url("http://127.0.0.1:1")
        .with_timeout_secs(2);
    let client = ShopifyCheckoutClient::new(config).unwrap();

    let err = client.get_checkout("tok-1").await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Transport);
}

#[tokio::test]
async fn customer_login_and_get_use_access_token() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/customers/customer_token.json"))
        .and(body_json(json!({"token": {"email": "ada@example.com", "password": "hunter22"}})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "customer_token": {"access_token": "cust-abc", "customer_id": 99}
        })))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/customers/99.json"))
        .and(header("X-Shopify-Customer-Access-Token", "cust-abc"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "customer": {"id": 99, "email": "ada@example.com", "first_name": "Ada"}
        })))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("DELETE"))
        .and(path("/api/customers/99/customer_token.json"))
        .and(header("X-Shopify-Customer-Access-Token", "cust-abc"))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&server)
        .await;

    let customers = client_for(&server).customers();
    let token = customers.login("ada@example.com", "hunter22").await.unwrap();
    assert_eq!(token.customer_id, 99);
    assert!(!token.is_expired());

    let customer = customers.get_customer(&token).await.unwrap();
    assert_eq!(customer.email.as_deref(), Some("ada@example.com"));

    customers.logout(&token).await.unwrap();
}

#[tokio::test]
async fn facade_styles_share_one_result() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/checkouts/tok-1.json"))
        .respond_with(ResponseTemplate::new(200).set_body_json(checkout_json("tok-1")))
        .mount(&server)
        .await;

    let facade = CheckoutFacade::new(Arc::new(client_for(&server))).unwrap();

    // Cold: building the stream sends nothing
    let call = facade.get_checkout_stream("tok-1".to_string());
    assert!(server.received_requests().await.unwrap_or_default().is_empty());

    let mut stream = call.subscribe();
    let streamed = stream.next().await.unwrap().unwrap();
    assert!(stream.next().await.is_none());

    let (tx, rx) = oneshot::channel();
    let task = facade.get_checkout_with_callback("tok-1".to_string(), move |result: BuyResult<Checkout>| {
        let _ = tx.send(result);
    });
    let called_back = rx.await.unwrap().unwrap();
    task.wait().await;

    let awaited = facade.get_checkout("tok-1").await.unwrap();

    assert_eq!(streamed, awaited);
    assert_eq!(called_back, awaited);
    assert_eq!(server.received_requests().await.unwrap_or_default().len(), 3);
}
