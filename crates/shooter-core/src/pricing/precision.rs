//! 호가/수량 단위에서 소수 자릿수 도출.

use std::str::FromStr;

use rust_decimal::Decimal;

use crate::error::{CoreError, CoreResult};

/// 거래소가 `qtyStep`을 제공하지 않을 때 사용하는 기본 수량 단위.
pub const DEFAULT_QTY_STEP: &str = "0.0001";

/// 단위 문자열의 소수 자릿수.
///
/// 끝자리 0을 제거한 뒤 소수점 아래 자릿수를 셉니다.
/// 정수로 정규화되는 값(`"1.0000"`, `"5"`)은 0입니다.
pub fn resolve_precision(step: &str) -> CoreResult<u32> {
    let trimmed = step.trim();
    let value = Decimal::from_str(trimmed)
        .map_err(|e| CoreError::Parse(format!("단위 문자열 '{}': {}", step, e)))?;

    if value.is_sign_negative() {
        return Err(CoreError::Parse(format!(
            "단위 문자열은 음수일 수 없습니다: {}",
            step
        )));
    }

    Ok(value.normalize().scale())
}
