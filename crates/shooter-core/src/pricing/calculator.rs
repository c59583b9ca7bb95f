//! TP/SL 및 메이커 지정가 계산.
//!
//! 모든 계산은 `Decimal` 고정소수점으로 수행하며,
//! 반올림은 은행가 반올림(round-half-to-even)을 사용합니다.

use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};

use crate::domain::{MarketSnapshot, PriceOption, Side, TpSlSpec, TpSlType, VarianceType};

/// 계산된 익절/손절 가격. 명세가 없으면 `None`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TpSlPrices {
    pub take_profit: Option<Decimal>,
    pub stop_loss: Option<Decimal>,
}

fn round_price(value: Decimal, precision: u32) -> Decimal {
    value.round_dp_with_strategy(precision, RoundingStrategy::MidpointNearestEven)
}

fn percent(value: Decimal) -> Decimal {
    value / Decimal::ONE_HUNDRED
}

/// 기준가에서 `up` 방향(true: 위, false: 아래)으로 명세만큼 이동한 가격.
fn shift(reference: Decimal, spec: &TpSlSpec, up: bool) -> Decimal {
    match (spec.kind, up) {
        (TpSlType::Percentage, true) => reference * (Decimal::ONE + percent(spec.value)),
        (TpSlType::Percentage, false) => reference * (Decimal::ONE - percent(spec.value)),
        (TpSlType::Absolute, true) => reference + spec.value,
        (TpSlType::Absolute, false) => reference - spec.value,
    }
}

/// 기준가와 방향으로 TP/SL 가격 계산.
///
/// - 매수: TP는 기준가 위, SL은 기준가 아래
/// - 매도: TP는 기준가 아래, SL은 기준가 위
pub fn derive_tp_sl(
    reference: Decimal,
    side: Side,
    take_profit: Option<TpSlSpec>,
    stop_loss: Option<TpSlSpec>,
    precision: u32,
) -> TpSlPrices {
    let tp_up = side == Side::Buy;

    TpSlPrices {
        take_profit: take_profit
            .map(|spec| round_price(shift(reference, &spec, tp_up), precision)),
        stop_loss: stop_loss.map(|spec| round_price(shift(reference, &spec, !tp_up), precision)),
    }
}

/// 호가가 책에 남도록(메이커) 기준가에서 변동 폭만큼 이동한 지정가.
///
/// 매수 방향은 기준가 아래로, 매도 방향은 위로 이동합니다.
/// `Percentage`의 `variance`는 퍼센트 값입니다 (1 = 1%).
pub fn derive_limit_price(
    base: Decimal,
    direction: Side,
    variance: Decimal,
    variance_type: VarianceType,
    precision: u32,
) -> Decimal {
    let price = match (variance_type, direction) {
        (VarianceType::Percentage, Side::Buy) => base * (Decimal::ONE - percent(variance)),
        (VarianceType::Percentage, Side::Sell) => base * (Decimal::ONE + percent(variance)),
        (VarianceType::Dollar, Side::Buy) => base - variance,
        (VarianceType::Dollar, Side::Sell) => base + variance,
    };

    round_price(price, precision)
}

/// 주문 지정가 결정.
///
/// 우선순위: 명시 가격 → 호가 기준 옵션 → 주문 방향의 반대편 최우선 호가.
pub fn resolve_entry_price(
    explicit: Option<Decimal>,
    price_option: Option<&PriceOption>,
    side: Side,
    snapshot: &MarketSnapshot,
) -> Decimal {
    let precision = snapshot.precision.price;

    if let Some(price) = explicit {
        return round_price(price, precision);
    }

    match price_option {
        Some(option) => derive_limit_price(
            snapshot.reference_price(option.reference),
            option.direction,
            option.variance,
            option.variance_type,
            precision,
        ),
        None => snapshot.touch_price(side),
    }
}

// =============================================================================
// 테스트
// =============================================================================
