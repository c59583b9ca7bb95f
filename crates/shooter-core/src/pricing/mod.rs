//! 가격/수량 계산.

mod calculator;
mod precision;
mod quantity;

pub use calculator::{derive_limit_price, derive_tp_sl, resolve_entry_price, TpSlPrices};
pub use precision::{resolve_precision, DEFAULT_QTY_STEP};
pub use quantity::{derive_quantity, DEFAULT_MIN_QTY};
