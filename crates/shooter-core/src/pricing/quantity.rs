//! 잔고 기반 주문 수량 계산.

use rust_decimal::{Decimal, RoundingStrategy};

use crate::error::{CoreError, CoreResult};

/// 계산된 수량이 이 값보다 작으면 주문하지 않습니다.
pub const DEFAULT_MIN_QTY: Decimal = Decimal::from_parts(1, 0, 0, false, 4);

/// 가용 잔고 × 레버리지로 살 수 있는 수량.
///
/// 잔고를 초과하지 않도록 수량 자릿수에서 버림합니다.
pub fn derive_quantity(
    balance: Decimal,
    leverage: u32,
    price: Decimal,
    qty_precision: u32,
    min_qty: Decimal,
) -> CoreResult<Decimal> {
    if balance <= Decimal::ZERO {
        return Err(CoreError::InvalidArgument(format!(
            "가용 잔고가 없습니다: {}",
            balance
        )));
    }
    if leverage == 0 {
        return Err(CoreError::InvalidArgument(
            "레버리지는 1 이상이어야 합니다".to_string(),
        ));
    }
    if price <= Decimal::ZERO {
        return Err(CoreError::InvalidArgument(format!(
            "주문 가격은 0보다 커야 합니다: {}",
            price
        )));
    }

    let notional = balance * Decimal::from(leverage);
    let quantity = (notional / price).round_dp_with_strategy(qty_precision, RoundingStrategy::ToZero);

    if quantity < min_qty {
        return Err(CoreError::InvalidArgument(format!(
            "주문 수량 {} 이 최소 수량 {} 보다 작습니다",
            quantity, min_qty
        )));
    }

    Ok(quantity)
}
