//! 주문 계획 및 요청 파라미터 구성.
//!
//! 시세 스냅샷과 주문 명세로부터 지정가, TP/SL, 수량을 확정하고
//! `/v5/order/create`에 보낼 파라미터 맵을 만듭니다. 인증 파라미터(`api_key`,
//! `timestamp`, `sign`)는 [`BybitClient`](crate::BybitClient)가 추가합니다.

use std::collections::BTreeMap;

use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};
use shooter_core::{derive_tp_sl, resolve_entry_price, Category, MarketSnapshot, OrderSpec, Side};

use crate::error::{ExchangeError, ExchangeResult};

// ============================================================================
// 현물 마진 옵션
// ============================================================================

/// 현물 마진 주문 전용 옵션.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpotMarginOptions {
    /// TP/SL 모드 (기본 "Full")
    pub tpsl_mode: String,
    /// 손절 주문 유형 (기본 "Market")
    pub sl_order_type: String,
    /// 수량 단위 (기본 "baseCoin")
    pub market_unit: String,
    /// 잔고 기반 수량 계산에 사용할 코인 (기본 "USDC")
    pub quote_coin: String,
}

impl Default for SpotMarginOptions {
    fn default() -> Self {
        Self {
            tpsl_mode: "Full".to_string(),
            sl_order_type: "Market".to_string(),
            market_unit: "baseCoin".to_string(),
            quote_coin: "USDC".to_string(),
        }
    }
}

// ============================================================================
// 주문 계획
// ============================================================================

/// 제출 직전의 확정된 주문.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OrderPlan {
    pub category: Category,
    pub symbol: String,
    pub side: Side,
    pub quantity: Decimal,
    pub price: Decimal,
    pub take_profit: Option<Decimal>,
    pub stop_loss: Option<Decimal>,
    /// 주문 시점 최우선 매수 호가
    pub bid: Decimal,
    /// 주문 시점 최우선 매도 호가
    pub ask: Decimal,
    params: BTreeMap<String, String>,
}

impl OrderPlan {
    /// 서명 전 주문 파라미터.
    pub fn params(&self) -> &BTreeMap<String, String> {
        &self.params
    }

    pub fn into_params(self) -> BTreeMap<String, String> {
        self.params
    }
}

/// 사용자 지정 수량을 수량 정밀도에 맞춰 반올림.
pub fn round_quantity(quantity: Decimal, qty_precision: u32) -> ExchangeResult<Decimal> {
    let rounded = quantity.round_dp_with_strategy(qty_precision, RoundingStrategy::MidpointNearestEven);
    if rounded <= Decimal::ZERO {
        return Err(ExchangeError::InvalidParameter(format!(
            "주문 수량은 0보다 커야 합니다: {}",
            quantity
        )));
    }
    Ok(rounded)
}

/// 정밀도 자릿수까지 0을 채운 요청 문자열.
fn to_wire(value: Decimal, precision: u32) -> String {
    let mut value = value;
    value.rescale(precision);
    value.to_string()
}

/// 양 시장 공통 필드로 계획 생성.
fn base_plan(
    category: Category,
    spec: &OrderSpec,
    snapshot: &MarketSnapshot,
    price: Decimal,
    quantity: Decimal,
) -> OrderPlan {
    let tp_sl = derive_tp_sl(
        price,
        spec.side,
        spec.take_profit,
        spec.stop_loss,
        snapshot.precision.price,
    );

    let mut params = BTreeMap::new();
    params.insert("category".to_string(), category.as_str().to_string());
    params.insert("symbol".to_string(), spec.symbol.clone());
    params.insert("side".to_string(), spec.side.as_str().to_string());
    params.insert("orderType".to_string(), "Limit".to_string());
    params.insert("qty".to_string(), to_wire(quantity, snapshot.precision.quantity));
    params.insert("price".to_string(), to_wire(price, snapshot.precision.price));
    params.insert("timeInForce".to_string(), "GTC".to_string());
    params.insert("leverage".to_string(), spec.leverage.to_string());

    OrderPlan {
        category,
        symbol: spec.symbol.clone(),
        side: spec.side,
        quantity,
        price,
        take_profit: tp_sl.take_profit,
        stop_loss: tp_sl.stop_loss,
        bid: snapshot.bid,
        ask: snapshot.ask,
        params,
    }
}

/// 선물(linear) 주문 계획.
///
/// 수량은 필수이며 TP/SL은 `trigger_by` 기준으로 트리거됩니다.
pub fn plan_futures_order(spec: &OrderSpec, snapshot: &MarketSnapshot) -> ExchangeResult<OrderPlan> {
    let quantity = spec
        .quantity
        .ok_or_else(|| ExchangeError::InvalidParameter("선물 주문에는 수량이 필요합니다".to_string()))?;
    let quantity = round_quantity(quantity, snapshot.precision.quantity)?;
    let price = resolve_entry_price(spec.price, spec.price_option.as_ref(), spec.side, snapshot);

    let precision = snapshot.precision.price;
    let mut plan = base_plan(Category::Linear, spec, snapshot, price, quantity);
    if let Some(tp) = plan.take_profit {
        plan.params.insert("takeProfit".to_string(), to_wire(tp, precision));
        plan.params.insert("tpTriggerBy".to_string(), spec.trigger_by.clone());
    }
    if let Some(sl) = plan.stop_loss {
        plan.params.insert("stopLoss".to_string(), to_wire(sl, precision));
        plan.params.insert("slTriggerBy".to_string(), spec.trigger_by.clone());
    }

    Ok(plan)
}

/// 현물 마진 주문 계획.
///
/// `quantity`는 호출자가 확정한 값입니다 (명시 수량 반올림 또는 잔고 기반 계산).
/// 익절 트리거 가격은 지정가와 같습니다.
pub fn plan_spot_margin_order(
    spec: &OrderSpec,
    snapshot: &MarketSnapshot,
    price: Decimal,
    quantity: Decimal,
    options: &SpotMarginOptions,
) -> OrderPlan {
    let precision = snapshot.precision.price;
    let mut plan = base_plan(Category::Spot, spec, snapshot, price, quantity);
    plan.params.insert("isLeverage".to_string(), "1".to_string());
    plan.params.insert("marketUnit".to_string(), options.market_unit.clone());
    plan.params.insert("tpslMode".to_string(), options.tpsl_mode.clone());

    if let Some(tp) = plan.take_profit {
        plan.params.insert("takeProfit".to_string(), to_wire(tp, precision));
        plan.params.insert("tpTriggerPrice".to_string(), to_wire(price, precision));
    }
    if let Some(sl) = plan.stop_loss {
        plan.params.insert("stopLoss".to_string(), to_wire(sl, precision));
        plan.params.insert("slOrderType".to_string(), options.sl_order_type.clone());
    }

    plan
}

// ============================================================================
// 테스트
// ============================================================================
