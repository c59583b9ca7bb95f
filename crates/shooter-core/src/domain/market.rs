//! 거래소 중립 시세/정밀도 타입.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::domain::{PriceReference, Side};
use crate::error::CoreResult;
use crate::pricing::resolve_precision;

/// 가격/수량 소수 자릿수.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PrecisionInfo {
    /// 가격 소수 자릿수 (호가 단위에서 도출)
    pub price: u32,
    /// 수량 소수 자릿수 (수량 단위에서 도출)
    pub quantity: u32,
}

impl PrecisionInfo {
    pub fn new(price: u32, quantity: u32) -> Self {
        Self { price, quantity }
    }

    /// 거래소가 제공한 호가 단위/수량 단위 문자열에서 생성.
    pub fn from_steps(tick_size: &str, qty_step: &str) -> CoreResult<Self> {
        Ok(Self {
            price: resolve_precision(tick_size)?,
            quantity: resolve_precision(qty_step)?,
        })
    }
}

/// 최우선 호가 + 정밀도 스냅샷.
///
/// 종목 정보와 티커를 동시에 조회한 결과를 합친 값입니다.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MarketSnapshot {
    pub precision: PrecisionInfo,
    /// 매수 1호가
    pub bid: Decimal,
    /// 매도 1호가
    pub ask: Decimal,
}

impl MarketSnapshot {
    pub fn new(precision: PrecisionInfo, bid: Decimal, ask: Decimal) -> Self {
        Self {
            precision,
            bid,
            ask,
        }
    }

    /// 기준 호가 가격.
    pub fn reference_price(&self, reference: PriceReference) -> Decimal {
        match reference {
            PriceReference::Bid => self.bid,
            PriceReference::Ask => self.ask,
        }
    }

    /// 즉시 체결 가능한 쪽 호가 (매수는 매도 1호가, 매도는 매수 1호가).
    pub fn touch_price(&self, side: Side) -> Decimal {
        match side {
            Side::Buy => self.ask,
            Side::Sell => self.bid,
        }
    }

    /// 호가 스프레드.
    pub fn spread(&self) -> Decimal {
        self.ask - self.bid
    }
}
