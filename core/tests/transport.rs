//! `MixPay` against the mock gateway over reqwest, plus the transport failure
//! paths: caller cancellation, client timeout, and refused connections.

use std::time::{Duration, Instant};

use mixpay::{
    CreateOneTimePaymentRequest, Decimal, Error, GetPaymentResultRequest, ListSettlementAssetsRequest,
    MixPay, PaymentStatus,
};
use tokio::net::TcpListener;

async fn start_mock_server() -> (String, mock_server::Db) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let db = mock_server::Db::default();
    tokio::spawn(mock_server::serve(listener, db.clone()));
    (format!("http://{addr}"), db)
}

/// Accepts connections and never answers them.
async fn start_silent_server() -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        let mut held = Vec::new();
        while let Ok((socket, _)) = listener.accept().await {
            held.push(socket);
        }
    });
    format!("http://{addr}")
}

fn client(base_url: &str) -> MixPay {
    MixPay::builder().base_url(base_url).build().unwrap()
}

#[tokio::test]
async fn create_then_settle_then_lookup() {
    let (base_url, db) = start_mock_server().await;
    let client = client(&base_url);

    let mut input = CreateOneTimePaymentRequest::new("payee-1", "usd", Decimal::new(5, 0), "usdt", "order-7");
    input.trace_id = Some("trace-7".to_string());
    input.return_to = Some("https://shop.example/ok".to_string());
    let created = client.create_one_time_payment(&input).await.unwrap();
    assert_eq!(created.payment_link(), format!("https://mixpay.me/code/{}", created.code));

    let result = client
        .get_payment_result(&GetPaymentResultRequest::by_trace_id("trace-7"))
        .await
        .unwrap();
    assert_eq!(result.status, PaymentStatus::Unpaid);
    assert!(!result.is_paid());
    assert_eq!(result.return_to, "https://shop.example/ok");

    assert!(mock_server::settle(&db, "trace-7", "tx-7").await);

    let result = client
        .get_payment_result(&GetPaymentResultRequest::by_order_id("order-7", "payee-1"))
        .await
        .unwrap();
    assert!(result.is_paid());
    assert_eq!(result.txid, "tx-7");
    assert_eq!(result.confirmations, 1);
    assert!(result.raw.contains("\"txid\":\"tx-7\""));
}

#[tokio::test]
async fn gateway_failure_is_api_error() {
    let (base_url, _db) = start_mock_server().await;
    let client = client(&base_url);

    let err = client
        .get_payment_result(&GetPaymentResultRequest::by_trace_id("unknown"))
        .await
        .unwrap_err();
    let api = err.as_api().expect("api error");
    assert_eq!(api.status_code, 404);
    assert_eq!(api.code, mock_server::CODE_NOT_FOUND);
    assert!(api.to_string().starts_with("statusCode: 404, raw: {"));
}

#[tokio::test]
async fn execute_returns_status_headers_and_exact_body() {
    let (base_url, _db) = start_mock_server().await;
    let client = client(&base_url);

    let response = client
        .execute(client.api().build_list_settlement_assets(None))
        .await
        .unwrap();
    assert_eq!(response.status, 200);
    let content_type = response
        .headers
        .iter()
        .find(|(name, _)| name == "content-type")
        .map(|(_, value)| value.as_str());
    assert_eq!(content_type, Some("application/json"));
    assert!(response.body.starts_with(b"{\"success\":true"));
}

#[tokio::test]
async fn concurrent_calls_share_one_client() {
    let (base_url, _db) = start_mock_server().await;
    let client = client(&base_url);
    let other_client = client.clone();
    let filter = ListSettlementAssetsRequest::default().with_quote("usd", Decimal::new(10, 0));

    let (all, filtered, other) = tokio::join!(
        client.list_settlement_assets(None),
        client.list_settlement_assets(Some(&filter)),
        other_client.list_settlement_assets(None),
    );
    assert_eq!(all.unwrap().len(), 2);
    assert!(filtered.unwrap().iter().all(|a| a.is_available));
    assert_eq!(other.unwrap().len(), 2);
}

#[tokio::test]
async fn caller_deadline_cancels_in_flight_request() {
    let base_url = start_silent_server().await;
    let client = client(&base_url);

    let started = Instant::now();
    let outcome = tokio::time::timeout(Duration::from_millis(200), client.list_settlement_assets(None)).await;
    assert!(outcome.is_err(), "request should have been cancelled");
    assert!(started.elapsed() < Duration::from_secs(2));
}

#[tokio::test]
async fn client_timeout_is_transport_error() {
    let base_url = start_silent_server().await;
    let client = MixPay::builder()
        .base_url(&base_url)
        .timeout(Duration::from_millis(200))
        .build()
        .unwrap();

    let err = client.list_settlement_assets(None).await.unwrap_err();
    match err {
        Error::Transport(e) => assert!(e.is_timeout(), "expected timeout, got {e}"),
        other => panic!("expected transport error, got {other:?}"),
    }
}

#[tokio::test]
async fn refused_connection_is_transport_error() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let client = client(&format!("http://{addr}"));
    let err = client
        .get_payment_result(&GetPaymentResultRequest::by_trace_id("t"))
        .await
        .unwrap_err();
    assert!(matches!(err, Error::Transport(_)));
    assert!(err.as_api().is_none());
}
