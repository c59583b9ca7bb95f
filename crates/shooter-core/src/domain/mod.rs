//! 주문 도메인 타입.

mod market;
mod order;

pub use market::{MarketSnapshot, PrecisionInfo};
pub use order::{
    Category, OrderSpec, PriceOption, PriceReference, Side, TpSlSpec, TpSlType, VarianceType,
};
