//! 주문 명세 타입.
//!
//! CLI/설정에서 들어오는 문자열 값은 모두 `FromStr`로 파싱되며,
//! 지원하지 않는 값은 `CoreError::InvalidArgument`로 거부합니다.

use std::fmt;
use std::str::FromStr;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::CoreError;

// =============================================================================
// 주문 방향
// =============================================================================

/// 주문 방향 (매수/매도).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Side {
    /// 매수 (롱)
    Buy,
    /// 매도 (숏)
    Sell,
}

impl Side {
    /// 거래소 표기 ("Buy" / "Sell").
    pub fn as_str(&self) -> &'static str {
        match self {
            Side::Buy => "Buy",
            Side::Sell => "Sell",
        }
    }

    /// 반대 방향.
    pub fn opposite(&self) -> Self {
        match self {
            Side::Buy => Side::Sell,
            Side::Sell => Side::Buy,
        }
    }
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Side {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "buy" => Ok(Side::Buy),
            "sell" => Ok(Side::Sell),
            other => Err(CoreError::InvalidArgument(format!(
                "지원하지 않는 주문 방향: {} (buy, sell)",
                other
            ))),
        }
    }
}

// =============================================================================
// 상품 카테고리
// =============================================================================

/// 거래소 상품 카테고리.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    /// USDT 무기한 선물
    Linear,
    /// 현물 (마진 포함)
    Spot,
}

impl Category {
    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Linear => "linear",
            Category::Spot => "spot",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// =============================================================================
// 가격 옵션
// =============================================================================

/// 지정가 산출 시 기준이 되는 호가.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PriceReference {
    /// 매수 1호가
    Bid,
    /// 매도 1호가
    Ask,
}

impl FromStr for PriceReference {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "bid" => Ok(PriceReference::Bid),
            "ask" => Ok(PriceReference::Ask),
            other => Err(CoreError::InvalidArgument(format!(
                "지원하지 않는 기준 호가: {} (bid, ask)",
                other
            ))),
        }
    }
}

/// 지정가 변동 폭 유형.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VarianceType {
    /// 기준가 대비 퍼센트
    Percentage,
    /// 고정 금액
    Dollar,
}

impl FromStr for VarianceType {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "percentage" => Ok(VarianceType::Percentage),
            "dollar" => Ok(VarianceType::Dollar),
            other => Err(CoreError::InvalidArgument(format!(
                "지원하지 않는 변동 유형: {} (percentage, dollar)",
                other
            ))),
        }
    }
}

/// 호가 기준 메이커 지정가 옵션.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PriceOption {
    /// 기준 호가
    pub reference: PriceReference,
    /// 가격 이동 방향 (buy: 아래로, sell: 위로)
    pub direction: Side,
    /// 변동 값
    pub variance: Decimal,
    /// 변동 유형
    pub variance_type: VarianceType,
}

// =============================================================================
// TP/SL
// =============================================================================

/// TP/SL 값 유형.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TpSlType {
    /// 기준가 대비 퍼센트
    Percentage,
    /// 기준가 대비 절대 금액
    Absolute,
}

impl FromStr for TpSlType {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "percentage" => Ok(TpSlType::Percentage),
            "absolute" => Ok(TpSlType::Absolute),
            other => Err(CoreError::InvalidArgument(format!(
                "지원하지 않는 TP/SL 유형: {} (percentage, absolute)",
                other
            ))),
        }
    }
}

/// 익절/손절 명세.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TpSlSpec {
    pub kind: TpSlType,
    pub value: Decimal,
}

impl TpSlSpec {
    pub fn new(kind: TpSlType, value: Decimal) -> Self {
        Self { kind, value }
    }

    pub fn percentage(value: Decimal) -> Self {
        Self::new(TpSlType::Percentage, value)
    }

    pub fn absolute(value: Decimal) -> Self {
        Self::new(TpSlType::Absolute, value)
    }

    /// 유형 문자열과 값으로 생성.
    ///
    /// 둘 다 없으면 `None`, 한쪽만 있으면 에러를 반환합니다.
    pub fn from_parts(kind: Option<&str>, value: Option<Decimal>) -> Result<Option<Self>, CoreError> {
        match (kind, value) {
            (Some(kind), Some(value)) => Ok(Some(Self::new(kind.parse()?, value))),
            (None, None) => Ok(None),
            (Some(kind), None) => Err(CoreError::InvalidArgument(format!(
                "TP/SL 유형 {} 에 값이 없습니다",
                kind
            ))),
            (None, Some(value)) => Err(CoreError::InvalidArgument(format!(
                "TP/SL 값 {} 에 유형이 없습니다",
                value
            ))),
        }
    }
}

// =============================================================================
// 주문 명세
// =============================================================================

/// 단일 레버리지 지정가 주문 명세.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderSpec {
    /// 심볼 (예: "SOLUSDT")
    pub symbol: String,
    /// 주문 방향
    pub side: Side,
    /// 주문 수량 (현물 마진 주문은 생략 시 잔고 기반으로 계산)
    pub quantity: Option<Decimal>,
    /// 레버리지 배수
    pub leverage: u32,
    /// 명시적 지정가
    pub price: Option<Decimal>,
    /// 호가 기준 지정가 옵션 (`price`가 없을 때만 사용)
    pub price_option: Option<PriceOption>,
    /// 익절 명세
    pub take_profit: Option<TpSlSpec>,
    /// 손절 명세
    pub stop_loss: Option<TpSlSpec>,
    /// TP/SL 트리거 기준 (예: "LastPrice", "MarkPrice")
    pub trigger_by: String,
}

impl OrderSpec {
    /// 기본값으로 새 주문 명세 생성 (레버리지 10배, LastPrice 트리거).
    pub fn new(symbol: impl Into<String>, side: Side) -> Self {
        Self {
            symbol: symbol.into(),
            side,
            quantity: None,
            leverage: 10,
            price: None,
            price_option: None,
            take_profit: None,
            stop_loss: None,
            trigger_by: "LastPrice".to_string(),
        }
    }

    pub fn with_quantity(mut self, quantity: Decimal) -> Self {
        self.quantity = Some(quantity);
        self
    }

    pub fn with_leverage(mut self, leverage: u32) -> Self {
        self.leverage = leverage;
        self
    }

    pub fn with_price(mut self, price: Decimal) -> Self {
        self.price = Some(price);
        self
    }

    pub fn with_price_option(mut self, option: PriceOption) -> Self {
        self.price_option = Some(option);
        self
    }

    pub fn with_take_profit(mut self, spec: TpSlSpec) -> Self {
        self.take_profit = Some(spec);
        self
    }

    pub fn with_stop_loss(mut self, spec: TpSlSpec) -> Self {
        self.stop_loss = Some(spec);
        self
    }

    pub fn with_trigger_by(mut self, trigger_by: impl Into<String>) -> Self {
        self.trigger_by = trigger_by.into();
        self
    }
}

// =============================================================================
// 테스트
// =============================================================================
