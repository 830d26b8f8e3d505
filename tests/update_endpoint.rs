// End-to-end tests for the HTTP surface against mocked CoinGecko/Telegram
// upstreams. The mocks are throwaway axum routers on ephemeral ports.
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use pulse_bot::config::PulseConfig;
use pulse_bot::http::{router, AppState};
use pulse_bot::retry::BackoffPolicy;
use pulse_bot::source::PriceSource;
use pulse_bot::telegram::TelegramClient;
use pulse_bot::UpdatePipeline;
use serde_json::{json, Value};
use std::net::SocketAddr;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;
use std::time::Duration;

const BOT_TOKEN: &str = "testtoken";
const CHAT_ID: &str = "-1000";

#[derive(Clone)]
struct TelegramMock {
    calls: Arc<AtomicU32>,
    fail_first: u32,
}

async fn spawn_server(app: Router) -> SocketAddr {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    addr
}

async fn spawn_price_mock(body: Value) -> SocketAddr {
    let app = Router::new().route(
        "/simple/price",
        get(move || {
            let body = body.clone();
            async move { Json(body) }
        }),
    );
    spawn_server(app).await
}

async fn handle_send(State(mock): State<TelegramMock>) -> Response {
    let call = mock.calls.fetch_add(1, Ordering::SeqCst) + 1;
    if call <= mock.fail_first {
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(json!({ "ok": false, "description": "Internal Server Error" })),
        )
            .into_response()
    } else {
        Json(json!({ "ok": true, "result": { "message_id": 42 } })).into_response()
    }
}

async fn spawn_telegram_mock(fail_first: u32) -> (SocketAddr, Arc<AtomicU32>) {
    let calls = Arc::new(AtomicU32::new(0));
    let mock = TelegramMock {
        calls: Arc::clone(&calls),
        fail_first,
    };
    let app = Router::new()
        .route(&format!("/bot{}/sendMessage", BOT_TOKEN), post(handle_send))
        .with_state(mock);
    (spawn_server(app).await, calls)
}

async fn spawn_app(price_addr: SocketAddr, telegram_addr: SocketAddr) -> SocketAddr {
    let mut config = PulseConfig::default();
    config.telegram.bot_token = Some(BOT_TOKEN.to_string());
    config.telegram.chat_id = Some(CHAT_ID.to_string());

    // Zero delay keeps retrying paths fast under the real clock
    let policy = BackoffPolicy::new(3, Duration::ZERO);
    let source = PriceSource::with_base_url(format!("http://{}", price_addr));
    let telegram =
        TelegramClient::with_base_url(format!("http://{}", telegram_addr), &config.telegram, policy);
    let pipeline = Arc::new(UpdatePipeline::new(source, telegram));

    spawn_server(router(AppState { pipeline, config })).await
}

fn full_price_body() -> Value {
    let quote = json!({ "usd": 50000.0, "usd_market_cap": 1.0e12 });
    json!({
        "bitcoin": quote,
        "ethereum": quote,
        "binancecoin": quote,
        "ripple": quote,
        "cardano": quote,
        "nodecoin": quote,
    })
}

#[tokio::test]
async fn root_reports_liveness() {
    let price_addr = spawn_price_mock(full_price_body()).await;
    let (telegram_addr, _) = spawn_telegram_mock(0).await;
    let app = spawn_app(price_addr, telegram_addr).await;

    let response = reqwest::get(format!("http://{}/", app)).await.unwrap();
    assert_eq!(response.status(), 200);
    assert_eq!(response.text().await.unwrap(), "Crypto Price Bot is running!");
}

#[tokio::test]
async fn test_endpoint_reports_presence_flags_only() {
    let price_addr = spawn_price_mock(full_price_body()).await;
    let (telegram_addr, _) = spawn_telegram_mock(0).await;
    let app = spawn_app(price_addr, telegram_addr).await;

    let body: Value = reqwest::get(format!("http://{}/api/test", app))
        .await
        .unwrap()
        .json()
        .await
        .unwrap();

    assert_eq!(body["environment"]["botToken"], json!(true));
    assert_eq!(body["environment"]["chatId"], json!(true));
    assert_eq!(body["environment"]["port"], json!(3000));
    // Never the secret values themselves
    assert!(!body.to_string().contains(BOT_TOKEN));
}

#[tokio::test]
async fn update_returns_prices_and_telegram_ack() {
    let price_addr = spawn_price_mock(full_price_body()).await;
    let (telegram_addr, calls) = spawn_telegram_mock(0).await;
    let app = spawn_app(price_addr, telegram_addr).await;

    let response = reqwest::get(format!("http://{}/api/update", app))
        .await
        .unwrap();
    assert_eq!(response.status(), 200);

    let body: Value = response.json().await.unwrap();
    assert_eq!(body["success"], json!(true));
    assert_eq!(body["prices"]["bitcoin"]["usd"], json!(50000.0));
    assert_eq!(body["prices"]["nodecoin"]["usd_market_cap"], json!(1.0e12));
    assert_eq!(body["telegramResponse"]["ok"], json!(true));
    assert_eq!(body["telegramResponse"]["result"]["message_id"], json!(42));

    let message = body["message"].as_str().unwrap();
    assert!(message.contains("*Bitcoin:* $50,000 | MC: $1.00T"));
    assert_eq!(calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn upstream_rate_limit_yields_429_without_delivery() {
    let price_addr = spawn_price_mock(json!({ "error": "rate limited" })).await;
    let (telegram_addr, calls) = spawn_telegram_mock(0).await;
    let app = spawn_app(price_addr, telegram_addr).await;

    let response = reqwest::get(format!("http://{}/api/update", app))
        .await
        .unwrap();
    assert_eq!(response.status(), 429);

    let body: Value = response.json().await.unwrap();
    assert_eq!(body["success"], json!(false));
    assert_eq!(body["error"], json!("rate limited"));
    assert_eq!(calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn exhausted_delivery_yields_500_with_diagnostics() {
    let price_addr = spawn_price_mock(full_price_body()).await;
    let (telegram_addr, calls) = spawn_telegram_mock(u32::MAX).await;
    let app = spawn_app(price_addr, telegram_addr).await;

    let response = reqwest::get(format!("http://{}/api/update", app))
        .await
        .unwrap();
    assert_eq!(response.status(), 500);

    let body: Value = response.json().await.unwrap();
    assert_eq!(body["success"], json!(false));
    assert!(body["error"]
        .as_str()
        .unwrap()
        .contains("Delivery failed after 3 attempts"));
    assert!(body["stack"].as_str().unwrap().contains("DeliveryFailed"));
    assert_eq!(body["botToken"], json!(true));
    assert_eq!(body["chatId"], json!(true));
    assert_eq!(calls.load(Ordering::SeqCst), 3);
}

#[tokio::test]
async fn unreachable_price_api_degrades_to_error_message() {
    // Bind-then-drop leaves a port nothing is listening on
    let dead = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let price_addr = dead.local_addr().unwrap();
    drop(dead);

    let (telegram_addr, calls) = spawn_telegram_mock(0).await;
    let app = spawn_app(price_addr, telegram_addr).await;

    let response = reqwest::get(format!("http://{}/api/update", app))
        .await
        .unwrap();
    assert_eq!(response.status(), 200);

    let body: Value = response.json().await.unwrap();
    assert_eq!(body["success"], json!(true));
    assert_eq!(body["prices"], json!(null));
    assert_eq!(body["message"], json!("❌ Error fetching prices"));
    assert_eq!(calls.load(Ordering::SeqCst), 1);
}
