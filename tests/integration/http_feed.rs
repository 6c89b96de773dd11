//! `HttpMarketFeed` against a loopback axum fixture.

use axum::{
    http::{HeaderMap, StatusCode},
    routing::get,
    Json, Router,
};
use secrecy::SecretString;
use serde_json::{json, Value};
use std::sync::Arc;
use std::time::Duration;

use tickerstrip::calendar::ExchangeCalendar;
use tickerstrip::config::StripSettings;
use tickerstrip::feed::http::HttpMarketFeed;
use tickerstrip::feed::MarketDataSource;
use tickerstrip::ticker::TickerStrip;
use tickerstrip::types::{InstrumentType, TickerError};

fn market_body() -> Value {
    json!({
        "indices": [
            { "code": "J203", "name": "All Share", "current_value": "81,234.50",
              "change": "-120.25", "change_percent": "-0.15" },
            { "code": "J200", "name": "Top 40", "current_value": 74210.1,
              "change": 88.0, "change_percent": 0.12 }
        ],
        "ticker_tape": [
            { "symbol": "NPN", "name": "Naspers", "current_price": "3250.00",
              "price_change": "12.5", "price_change_percent": "0.39", "exchange": "JSE" },
            { "symbol": "SBK", "name": "", "current_price": 210.4,
              "price_change": null, "price_change_percent": "" }
        ]
    })
}

async fn ticker() -> Json<Value> {
    Json(market_body())
}

async fn broken() -> StatusCode {
    StatusCode::INTERNAL_SERVER_ERROR
}

async fn garbage() -> &'static str {
    "<html>maintenance</html>"
}

async fn keyed(headers: HeaderMap) -> Result<Json<Value>, StatusCode> {
    match headers.get("authorization").and_then(|v| v.to_str().ok()) {
        Some("Api-Key s3cret") => Ok(Json(market_body())),
        _ => Err(StatusCode::UNAUTHORIZED),
    }
}

/// Serve the fixture on an ephemeral port and return its base URL.
async fn spawn_fixture() -> String {
    let app = Router::new()
        .route("/api/markets/ticker/", get(ticker))
        .route("/broken", get(broken))
        .route("/garbage", get(garbage))
        .route("/keyed", get(keyed));
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("http://{addr}")
}

fn feed(base: &str, path: &str, key: Option<&str>) -> HttpMarketFeed {
    HttpMarketFeed::new(
        base,
        path,
        Duration::from_secs(5),
        key.map(|k| SecretString::new(k.to_string())),
    )
    .unwrap()
}

#[tokio::test]
async fn decodes_string_and_numeric_fields() {
    let base = spawn_fixture().await;
    let snapshot = feed(&base, "/api/markets/ticker/", None)
        .fetch_snapshot()
        .await
        .unwrap();

    assert_eq!(snapshot.indices.len(), 2);
    assert_eq!(snapshot.indices[0].current_value, 81_234.5);
    assert_eq!(snapshot.indices[0].change, -120.25);
    assert_eq!(snapshot.ticker_tape[0].current_price, 3250.0);
    assert_eq!(snapshot.ticker_tape[1].price_change, 0.0);
    assert_eq!(snapshot.ticker_tape[1].price_change_percent, 0.0);
    assert_eq!(snapshot.ticker_tape[1].exchange, None);
}

#[tokio::test]
async fn server_error_maps_to_endpoint_error() {
    let base = spawn_fixture().await;
    let err = feed(&base, "/broken", None).fetch_snapshot().await.unwrap_err();
    match err.downcast_ref::<TickerError>() {
        Some(TickerError::Endpoint { status }) => assert_eq!(*status, 500),
        other => panic!("unexpected error: {other:?}"),
    }
}

#[tokio::test]
async fn non_json_body_maps_to_decode_error() {
    let base = spawn_fixture().await;
    let err = feed(&base, "/garbage", None).fetch_snapshot().await.unwrap_err();
    assert!(matches!(
        err.downcast_ref::<TickerError>(),
        Some(TickerError::Decode(_))
    ));
}

#[tokio::test]
async fn api_key_is_sent_when_configured() {
    let base = spawn_fixture().await;

    let err = feed(&base, "/keyed", None).fetch_snapshot().await.unwrap_err();
    assert!(matches!(
        err.downcast_ref::<TickerError>(),
        Some(TickerError::Endpoint { status: 401 })
    ));

    let snapshot = feed(&base, "/keyed", Some("s3cret"))
        .fetch_snapshot()
        .await
        .unwrap();
    assert_eq!(snapshot.ticker_tape.len(), 2);
}

#[tokio::test]
async fn strip_renders_fixture_data() {
    let base = spawn_fixture().await;
    let source = Arc::new(feed(&base, "/api/markets/ticker/", None));
    let strip = TickerStrip::mount(
        StripSettings::default(),
        source,
        Arc::new(ExchangeCalendar::jse()),
    );

    let mut items = Vec::new();
    for _ in 0..50 {
        tokio::time::sleep(Duration::from_millis(20)).await;
        let snap = strip.snapshot().await;
        if snap.last_fetched_at.is_some() {
            items = snap.items;
            break;
        }
    }
    strip.unmount().await;

    // 2 indices + 2 quotes + 4 fixed instruments.
    assert_eq!(items.len(), 8);
    assert_eq!(items[0].symbol(), "J203");
    assert_eq!(items[0].kind(), InstrumentType::Index);
    assert!(!items[0].is_up());
    assert_eq!(items[3].symbol(), "SBK");
    assert_eq!(items[3].name(), "SBK");
    assert!(items[3].is_up());
    assert_eq!(items[4].symbol(), "USD/ZAR");
}
