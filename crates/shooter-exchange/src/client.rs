//! Bybit v5 REST 클라이언트.
//!
//! 공개 시세 조회(종목 정보, 티커)와 서명 요청(잔고 조회, 주문 생성)을 제공합니다.
//! 서명 요청은 `api_key`, `timestamp`를 파라미터에 넣고 `SignedRequest`로 `sign`을 붙입니다.

use std::collections::BTreeMap;
use std::str::FromStr;

use reqwest::Client;
use rust_decimal::Decimal;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use shooter_core::{
    Category, Credentials, MarketSnapshot, PrecisionInfo, SignedRequest, DEFAULT_QTY_STEP,
};
use tracing::{debug, error};

use crate::config::BybitConfig;
use crate::error::{map_ret_code, ExchangeError, ExchangeResult};

// ============================================================================
// API 응답 타입
// ============================================================================

/// 공통 응답 봉투.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct BybitEnvelope {
    ret_code: i64,
    #[serde(default)]
    ret_msg: String,
    #[serde(default)]
    result: serde_json::Value,
}

#[derive(Debug, Deserialize)]
pub struct BybitList<T> {
    #[serde(default = "Vec::new")]
    pub list: Vec<T>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BybitInstrument {
    pub symbol: String,
    pub price_filter: BybitPriceFilter,
    pub lot_size_filter: BybitLotSizeFilter,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BybitPriceFilter {
    pub tick_size: String,
}

/// 선물은 `qtyStep`, 현물은 `basePrecision`으로 수량 단위를 제공합니다.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BybitLotSizeFilter {
    pub qty_step: Option<String>,
    pub base_precision: Option<String>,
    pub min_order_qty: Option<String>,
}

impl BybitLotSizeFilter {
    fn step(&self) -> &str {
        self.qty_step
            .as_deref()
            .or(self.base_precision.as_deref())
            .unwrap_or(DEFAULT_QTY_STEP)
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BybitTicker {
    pub symbol: String,
    pub bid1_price: String,
    pub ask1_price: String,
    pub last_price: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BybitWalletAccount {
    pub account_type: Option<String>,
    pub total_available_balance: Option<String>,
    #[serde(default)]
    pub coin: Vec<BybitCoinBalance>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BybitCoinBalance {
    pub coin: String,
    pub wallet_balance: Option<String>,
    pub available_to_withdraw: Option<String>,
}

/// 주문 생성 응답.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderAck {
    pub order_id: String,
    #[serde(default)]
    pub order_link_id: String,
}

/// 빈 문자열은 값 없음으로 취급.
fn parse_decimal(value: Option<&str>) -> Option<Decimal> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .and_then(|v| Decimal::from_str(v).ok())
}

fn parse_price(value: &str, field: &str) -> ExchangeResult<Decimal> {
    parse_decimal(Some(value))
        .ok_or_else(|| ExchangeError::ParseError(format!("{} 값이 올바르지 않습니다: '{}'", field, value)))
}

// ============================================================================
// Bybit 클라이언트
// ============================================================================

pub struct BybitClient {
    client: Client,
    config: BybitConfig,
    credentials: Option<Credentials>,
}

impl BybitClient {
    pub fn new(config: BybitConfig) -> ExchangeResult<Self> {
        let client = Client::builder()
            .timeout(config.timeout())
            .build()
            .map_err(|e| ExchangeError::NetworkError(e.to_string()))?;

        Ok(Self {
            client,
            config,
            credentials: None,
        })
    }

    /// 서명 요청에 사용할 자격증명 설정.
    pub fn with_credentials(mut self, credentials: Credentials) -> Self {
        self.credentials = Some(credentials);
        self
    }

    pub fn config(&self) -> &BybitConfig {
        &self.config
    }

    fn credentials(&self) -> ExchangeResult<&Credentials> {
        self.credentials
            .as_ref()
            .ok_or_else(|| ExchangeError::Unauthorized("자격증명이 설정되지 않았습니다".to_string()))
    }

    /// 현재 타임스탬프(밀리초).
    fn timestamp_ms() -> i64 {
        chrono::Utc::now().timestamp_millis()
    }

    /// 인증 파라미터를 추가하고 서명.
    pub fn authenticate(&self, mut params: BTreeMap<String, String>) -> ExchangeResult<SignedRequest> {
        let credentials = self.credentials()?;

        params.insert("api_key".to_string(), credentials.api_key().to_string());
        params.insert("timestamp".to_string(), Self::timestamp_ms().to_string());
        if let Some(recv_window) = self.config.recv_window {
            params.insert("recv_window".to_string(), recv_window.to_string());
        }

        Ok(SignedRequest::sign(params, credentials.api_secret())?)
    }

    /// 공개 API 요청 (인증 불필요).
    async fn public_get<T: DeserializeOwned>(
        &self,
        endpoint: &str,
        params: &[(&str, &str)],
    ) -> ExchangeResult<T> {
        let url = format!("{}{}", self.config.rest_base_url(), endpoint);
        debug!("GET {} {:?}", endpoint, params);

        let response = self
            .client
            .get(&url)
            .query(params)
            .send()
            .await
            .map_err(|e| ExchangeError::NetworkError(e.to_string()))?;

        Self::handle_response(response).await
    }

    /// 서명된 GET 요청.
    async fn signed_get<T: DeserializeOwned>(
        &self,
        endpoint: &str,
        params: BTreeMap<String, String>,
    ) -> ExchangeResult<T> {
        let url = format!("{}{}", self.config.rest_base_url(), endpoint);
        let signed = self.authenticate(params)?;
        debug!("GET (signed) {}", endpoint);

        let response = self
            .client
            .get(&url)
            .query(&signed.to_pairs())
            .send()
            .await
            .map_err(|e| ExchangeError::NetworkError(e.to_string()))?;

        Self::handle_response(response).await
    }

    /// 서명된 POST 요청 (JSON 본문).
    async fn signed_post<T: DeserializeOwned>(
        &self,
        endpoint: &str,
        params: BTreeMap<String, String>,
    ) -> ExchangeResult<T> {
        let url = format!("{}{}", self.config.rest_base_url(), endpoint);
        let signed = self.authenticate(params)?;
        debug!("POST (signed) {}", endpoint);

        let response = self
            .client
            .post(&url)
            .json(&signed)
            .send()
            .await
            .map_err(|e| ExchangeError::NetworkError(e.to_string()))?;

        Self::handle_response(response).await
    }

    /// API 응답 처리.
    async fn handle_response<T: DeserializeOwned>(response: reqwest::Response) -> ExchangeResult<T> {
        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| ExchangeError::NetworkError(e.to_string()))?;

        let envelope: BybitEnvelope = match serde_json::from_str(&body) {
            Ok(envelope) => envelope,
            Err(e) if status.is_success() => {
                error!("Failed to parse response: {} - Body: {}", e, body);
                return Err(ExchangeError::ParseError(e.to_string()));
            }
            Err(_) => {
                return Err(ExchangeError::ApiError {
                    code: i64::from(status.as_u16()),
                    message: body,
                })
            }
        };

        if envelope.ret_code != 0 {
            return Err(map_ret_code(envelope.ret_code, &envelope.ret_msg));
        }

        serde_json::from_value(envelope.result).map_err(|e| {
            error!("Failed to parse result: {} - Body: {}", e, body);
            ExchangeError::ParseError(e.to_string())
        })
    }
}

// ============================================================================
// 시세 조회
// ============================================================================

impl BybitClient {
    /// 종목 정보에서 가격/수량 정밀도 조회 (GET /v5/market/instruments-info).
    pub async fn fetch_precision(&self, category: Category, symbol: &str) -> ExchangeResult<PrecisionInfo> {
        let result: BybitList<BybitInstrument> = self
            .public_get(
                "/v5/market/instruments-info",
                &[("category", category.as_str()), ("symbol", symbol)],
            )
            .await?;

        let instrument = result
            .list
            .into_iter()
            .next()
            .ok_or_else(|| ExchangeError::InvalidParameter(format!("종목 정보 없음: {}", symbol)))?;

        let precision = PrecisionInfo::from_steps(
            &instrument.price_filter.tick_size,
            instrument.lot_size_filter.step(),
        )?;

        debug!(
            symbol = %instrument.symbol,
            tick_size = %instrument.price_filter.tick_size,
            price_precision = precision.price,
            qty_precision = precision.quantity,
            "종목 정밀도 조회"
        );
        Ok(precision)
    }

    /// 최우선 매수/매도 호가 조회 (GET /v5/market/tickers).
    pub async fn fetch_best_prices(&self, category: Category, symbol: &str) -> ExchangeResult<(Decimal, Decimal)> {
        let result: BybitList<BybitTicker> = self
            .public_get(
                "/v5/market/tickers",
                &[("category", category.as_str()), ("symbol", symbol)],
            )
            .await?;

        let ticker = result
            .list
            .into_iter()
            .next()
            .ok_or_else(|| ExchangeError::InvalidParameter(format!("티커 없음: {}", symbol)))?;

        let bid = parse_price(&ticker.bid1_price, "bid1Price")?;
        let ask = parse_price(&ticker.ask1_price, "ask1Price")?;
        Ok((bid, ask))
    }

    /// 종목 정밀도와 호가를 동시에 조회.
    pub async fn fetch_market_snapshot(
        &self,
        category: Category,
        symbol: &str,
    ) -> ExchangeResult<MarketSnapshot> {
        let (precision, (bid, ask)) = tokio::try_join!(
            self.fetch_precision(category, symbol),
            self.fetch_best_prices(category, symbol),
        )?;

        Ok(MarketSnapshot::new(precision, bid, ask))
    }
}

// ============================================================================
// 계좌/주문
// ============================================================================

impl BybitClient {
    /// 코인 가용 잔고 조회 (GET /v5/account/wallet-balance, accountType=CONTRACT).
    pub async fn fetch_available_balance(&self, coin: &str) -> ExchangeResult<Decimal> {
        let mut params = BTreeMap::new();
        params.insert("accountType".to_string(), "CONTRACT".to_string());
        params.insert("coin".to_string(), coin.to_string());

        let result: BybitList<BybitWalletAccount> =
            self.signed_get("/v5/account/wallet-balance", params).await?;

        let account = result
            .list
            .into_iter()
            .next()
            .ok_or_else(|| ExchangeError::ParseError("지갑 잔고 목록이 비어 있습니다".to_string()))?;

        let coin_balance = account
            .coin
            .iter()
            .find(|c| c.coin.eq_ignore_ascii_case(coin))
            .and_then(|c| {
                parse_decimal(c.available_to_withdraw.as_deref())
                    .or_else(|| parse_decimal(c.wallet_balance.as_deref()))
            });

        coin_balance
            .or_else(|| parse_decimal(account.total_available_balance.as_deref()))
            .ok_or_else(|| ExchangeError::ParseError(format!("{} 잔고를 찾을 수 없습니다", coin)))
    }

    /// 주문 생성 (POST /v5/order/create).
    ///
    /// `params`에는 주문 필드만 넣습니다. 인증 파라미터와 서명은 여기서 추가됩니다.
    pub async fn place_order(&self, params: BTreeMap<String, String>) -> ExchangeResult<OrderAck> {
        self.signed_post("/v5/order/create", params).await
    }
}

// ============================================================================
// 테스트
// ============================================================================
