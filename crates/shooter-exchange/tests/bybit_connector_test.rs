//! Bybit 커넥터 통합 테스트 (mockito 서버).
//!
//! 검증 범위:
//! 1. 종목 정보/티커 응답에서 정밀도와 호가 파싱
//! 2. 서명된 잔고 조회 쿼리와 잔고 파싱
//! 3. 주문 본문의 TP/SL 필드와 `sign`
//! 4. `retCode != 0` 응답의 에러 매핑
//! 5. 계정 저장소를 통한 전체 주문 흐름과 dry-run

use std::sync::Arc;

use mockito::{Matcher, Mock, Server, ServerGuard};
use rust_decimal_macros::dec;
use serde_json::json;
use shooter_core::{
    Category, CredentialEncryptor, CredentialError, CoreError, EncryptedAccount,
    EncryptedAccountStore, OrderSpec, Side, TpSlSpec,
};
use shooter_exchange::{
    BybitClient, BybitConfig, ExchangeError, OrderShooter, SpotMarginOptions,
};

const API_KEY: &str = "test-key";
const API_SECRET: &str = "test-secret";
const SIGN_PATTERN: &str = r#""sign":"[0-9a-f]{64}""#;

// ============================================================================
// 헬퍼 함수
// ============================================================================

fn config(server: &ServerGuard) -> BybitConfig {
    BybitConfig::new().with_base_url(server.url())
}

fn client(server: &ServerGuard) -> BybitClient {
    BybitClient::new(config(server))
        .unwrap()
        .with_credentials(shooter_core::Credentials::new(API_KEY, API_SECRET))
}

fn shooter(server: &ServerGuard) -> OrderShooter {
    let encryptor = CredentialEncryptor::new(&CredentialEncryptor::generate_key()).unwrap();
    let account = EncryptedAccount::encrypt(&encryptor, API_KEY, API_SECRET).unwrap();

    let mut store = EncryptedAccountStore::new(Some(encryptor));
    store.insert("SOLNormal", account);

    OrderShooter::new(config(server), Arc::new(store))
}

fn ok_body(result: serde_json::Value) -> String {
    json!({ "retCode": 0, "retMsg": "OK", "result": result, "time": 1700000000000u64 }).to_string()
}

fn error_body(code: i64, msg: &str) -> String {
    json!({ "retCode": code, "retMsg": msg, "result": {} }).to_string()
}

fn query_for(category: &str, symbol: &str) -> Matcher {
    Matcher::AllOf(vec![
        Matcher::UrlEncoded("category".into(), category.into()),
        Matcher::UrlEncoded("symbol".into(), symbol.into()),
    ])
}

async fn mock_instrument(
    server: &mut ServerGuard,
    category: &str,
    symbol: &str,
    lot_size: serde_json::Value,
) -> Mock {
    server
        .mock("GET", "/v5/market/instruments-info")
        .match_query(query_for(category, symbol))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(ok_body(json!({
            "category": category,
            "list": [{
                "symbol": symbol,
                "priceFilter": { "tickSize": "0.010", "minPrice": "0.010" },
                "lotSizeFilter": lot_size,
            }]
        })))
        .create_async()
        .await
}

async fn mock_ticker(server: &mut ServerGuard, category: &str, symbol: &str, bid: &str, ask: &str) -> Mock {
    server
        .mock("GET", "/v5/market/tickers")
        .match_query(query_for(category, symbol))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(ok_body(json!({
            "category": category,
            "list": [{
                "symbol": symbol,
                "bid1Price": bid,
                "ask1Price": ask,
                "lastPrice": bid,
            }]
        })))
        .create_async()
        .await
}

// ============================================================================
// 시세 조회
// ============================================================================

#[tokio::test]
async fn test_linear_snapshot_parsing() {
    let mut server = Server::new_async().await;
    let instrument = mock_instrument(
        &mut server,
        "linear",
        "SOLUSDT",
        json!({ "qtyStep": "0.1", "minOrderQty": "0.1" }),
    )
    .await;
    let ticker = mock_ticker(&mut server, "linear", "SOLUSDT", "99.90", "100.10").await;

    let snapshot = client(&server)
        .fetch_market_snapshot(Category::Linear, "SOLUSDT")
        .await
        .unwrap();

    assert_eq!(snapshot.precision.price, 2);
    assert_eq!(snapshot.precision.quantity, 1);
    assert_eq!(snapshot.bid, dec!(99.90));
    assert_eq!(snapshot.ask, dec!(100.10));

    instrument.assert_async().await;
    ticker.assert_async().await;
}

#[tokio::test]
async fn test_spot_snapshot_uses_base_precision() {
    let mut server = Server::new_async().await;
    let _instrument = mock_instrument(
        &mut server,
        "spot",
        "SOLUSDC",
        json!({ "basePrecision": "0.001", "quotePrecision": "0.0000001" }),
    )
    .await;
    let _ticker = mock_ticker(&mut server, "spot", "SOLUSDC", "99.90", "100.10").await;

    let snapshot = client(&server)
        .fetch_market_snapshot(Category::Spot, "SOLUSDC")
        .await
        .unwrap();

    assert_eq!(snapshot.precision.quantity, 3);
}

#[tokio::test]
async fn test_ticker_error_maps_ret_code() {
    let mut server = Server::new_async().await;
    let _instrument = mock_instrument(&mut server, "linear", "SOLUSDT", json!({ "qtyStep": "0.1" })).await;
    let _ticker = server
        .mock("GET", "/v5/market/tickers")
        .match_query(Matcher::Any)
        .with_status(200)
        .with_body(error_body(10006, "Too many visits!"))
        .create_async()
        .await;

    let result = client(&server)
        .fetch_market_snapshot(Category::Linear, "SOLUSDT")
        .await;

    assert!(matches!(result, Err(ExchangeError::RateLimited)));
}

#[tokio::test]
async fn test_empty_instrument_list_is_invalid_parameter() {
    let mut server = Server::new_async().await;
    let _instrument = server
        .mock("GET", "/v5/market/instruments-info")
        .match_query(Matcher::Any)
        .with_status(200)
        .with_body(ok_body(json!({ "category": "linear", "list": [] })))
        .create_async()
        .await;

    let result = client(&server).fetch_precision(Category::Linear, "NOPEUSDT").await;

    assert!(matches!(result, Err(ExchangeError::InvalidParameter(_))));
}

// ============================================================================
// 잔고 조회
// ============================================================================

#[tokio::test]
async fn test_signed_balance_query() {
    let mut server = Server::new_async().await;
    let balance = server
        .mock("GET", "/v5/account/wallet-balance")
        .match_query(Matcher::AllOf(vec![
            Matcher::UrlEncoded("accountType".into(), "CONTRACT".into()),
            Matcher::UrlEncoded("coin".into(), "USDC".into()),
            Matcher::UrlEncoded("api_key".into(), API_KEY.into()),
            Matcher::Regex("timestamp=[0-9]{13}".into()),
            Matcher::Regex("sign=[0-9a-f]{64}".into()),
        ]))
        .with_status(200)
        .with_body(ok_body(json!({
            "list": [{
                "accountType": "CONTRACT",
                "totalAvailableBalance": "",
                "coin": [
                    { "coin": "USDT", "walletBalance": "5", "availableToWithdraw": "5" },
                    { "coin": "USDC", "walletBalance": "250.5", "availableToWithdraw": "" }
                ]
            }]
        })))
        .create_async()
        .await;

    let available = client(&server).fetch_available_balance("USDC").await.unwrap();

    assert_eq!(available, dec!(250.5));
    balance.assert_async().await;
}

#[tokio::test]
async fn test_balance_auth_error() {
    let mut server = Server::new_async().await;
    let _balance = server
        .mock("GET", "/v5/account/wallet-balance")
        .match_query(Matcher::Any)
        .with_status(200)
        .with_body(error_body(10003, "API key is invalid."))
        .create_async()
        .await;

    let result = client(&server).fetch_available_balance("USDC").await;

    assert!(matches!(result, Err(ExchangeError::Unauthorized(_))));
}

// ============================================================================
// 주문 흐름
// ============================================================================

#[tokio::test]
async fn test_futures_order_body() {
    let mut server = Server::new_async().await;
    let _instrument = mock_instrument(&mut server, "linear", "SOLUSDT", json!({ "qtyStep": "0.1" })).await;
    let _ticker = mock_ticker(&mut server, "linear", "SOLUSDT", "99.90", "100.10").await;
    let order = server
        .mock("POST", "/v5/order/create")
        .match_body(Matcher::AllOf(vec![
            Matcher::PartialJson(json!({
                "category": "linear",
                "symbol": "SOLUSDT",
                "side": "Buy",
                "orderType": "Limit",
                "qty": "0.5",
                "price": "100.00",
                "timeInForce": "GTC",
                "leverage": "10",
                "takeProfit": "102.00",
                "tpTriggerBy": "LastPrice",
                "stopLoss": "99.00",
                "slTriggerBy": "LastPrice",
                "api_key": API_KEY,
            })),
            Matcher::Regex(SIGN_PATTERN.into()),
        ]))
        .with_status(200)
        .with_body(ok_body(json!({ "orderId": "1321003749386327552", "orderLinkId": "" })))
        .expect(1)
        .create_async()
        .await;

    let spec = OrderSpec::new("SOLUSDT", Side::Buy)
        .with_quantity(dec!(0.5))
        .with_price(dec!(100))
        .with_take_profit(TpSlSpec::percentage(dec!(2)))
        .with_stop_loss(TpSlSpec::percentage(dec!(1)));

    let outcome = shooter(&server)
        .place_futures_order("SOLNormal", &spec, false)
        .await
        .unwrap();

    assert!(!outcome.is_dry_run());
    assert_eq!(outcome.ack.unwrap().order_id, "1321003749386327552");
    assert_eq!(outcome.plan.take_profit, Some(dec!(102.00)));
    order.assert_async().await;
}

#[tokio::test]
async fn test_dry_run_skips_submission() {
    let mut server = Server::new_async().await;
    let _instrument = mock_instrument(&mut server, "linear", "SOLUSDT", json!({ "qtyStep": "0.1" })).await;
    let _ticker = mock_ticker(&mut server, "linear", "SOLUSDT", "99.90", "100.10").await;
    let order = server
        .mock("POST", "/v5/order/create")
        .expect(0)
        .create_async()
        .await;

    let spec = OrderSpec::new("SOLUSDT", Side::Sell).with_quantity(dec!(1));
    let outcome = shooter(&server)
        .place_futures_order("SOLNormal", &spec, true)
        .await
        .unwrap();

    assert!(outcome.is_dry_run());
    assert_eq!(outcome.plan.price, dec!(99.90));
    order.assert_async().await;
}

#[tokio::test]
async fn test_spot_order_sized_from_balance() {
    let mut server = Server::new_async().await;
    let _instrument = mock_instrument(
        &mut server,
        "spot",
        "SOLUSDC",
        json!({ "basePrecision": "0.01" }),
    )
    .await;
    let _ticker = mock_ticker(&mut server, "spot", "SOLUSDC", "99.90", "100.10").await;
    let _balance = server
        .mock("GET", "/v5/account/wallet-balance")
        .match_query(Matcher::UrlEncoded("coin".into(), "USDC".into()))
        .with_status(200)
        .with_body(ok_body(json!({
            "list": [{
                "coin": [{ "coin": "USDC", "walletBalance": "100", "availableToWithdraw": "100" }]
            }]
        })))
        .create_async()
        .await;
    let order = server
        .mock("POST", "/v5/order/create")
        .match_body(Matcher::AllOf(vec![
            Matcher::PartialJson(json!({
                "category": "spot",
                "side": "Buy",
                "qty": "9.99",
                "price": "100.10",
                "isLeverage": "1",
                "marketUnit": "baseCoin",
                "tpslMode": "Full",
                "takeProfit": "102.10",
                "tpTriggerPrice": "100.10",
                "stopLoss": "99.10",
                "slOrderType": "Market",
            })),
            Matcher::Regex(SIGN_PATTERN.into()),
        ]))
        .with_status(200)
        .with_body(ok_body(json!({ "orderId": "spot-1", "orderLinkId": "" })))
        .expect(1)
        .create_async()
        .await;

    let spec = OrderSpec::new("SOLUSDC", Side::Buy)
        .with_take_profit(TpSlSpec::absolute(dec!(2)))
        .with_stop_loss(TpSlSpec::absolute(dec!(1)));

    let outcome = shooter(&server)
        .place_spot_margin_order("SOLNormal", &spec, &SpotMarginOptions::default(), false)
        .await
        .unwrap();

    assert_eq!(outcome.plan.quantity, dec!(9.99));
    order.assert_async().await;
}

#[tokio::test]
async fn test_order_rejection_maps_insufficient_balance() {
    let mut server = Server::new_async().await;
    let _instrument = mock_instrument(&mut server, "linear", "SOLUSDT", json!({ "qtyStep": "0.1" })).await;
    let _ticker = mock_ticker(&mut server, "linear", "SOLUSDT", "99.90", "100.10").await;
    let _order = server
        .mock("POST", "/v5/order/create")
        .with_status(200)
        .with_body(error_body(110007, "ab not enough for new order"))
        .create_async()
        .await;

    let spec = OrderSpec::new("SOLUSDT", Side::Buy).with_quantity(dec!(100));
    let result = shooter(&server)
        .place_futures_order("SOLNormal", &spec, false)
        .await;

    assert!(matches!(result, Err(ExchangeError::InsufficientBalance(_))));
}

#[tokio::test]
async fn test_unknown_account_fails_before_http() {
    let server = Server::new_async().await;

    let spec = OrderSpec::new("SOLUSDT", Side::Buy).with_quantity(dec!(1));
    let result = shooter(&server)
        .place_futures_order("Missing", &spec, false)
        .await;

    assert!(matches!(
        result,
        Err(ExchangeError::Core(CoreError::Credential(CredentialError::NotFound(_))))
    ));
}
