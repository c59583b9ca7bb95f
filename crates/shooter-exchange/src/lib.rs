//! Bybit v5 REST 커넥터와 주문 실행기.
//!
//! - `BybitClient`: 시세 조회, 잔고 조회, 서명된 주문 제출
//! - `order`: 선물/현물 마진 주문 파라미터 구성
//! - `OrderShooter`: 계정 자격증명 조회부터 주문 제출까지의 단일 주문 흐름
//!
//! 주문 시점 호가는 [`TRADE_LOG_TARGET`] tracing 대상으로 기록됩니다.

pub mod client;
pub mod config;
pub mod error;
pub mod order;
pub mod shooter;

/// 주문 시점 호가 기록용 tracing target.
pub const TRADE_LOG_TARGET: &str = "trade_log";

pub use client::{BybitClient, OrderAck};
pub use config::BybitConfig;
pub use error::{map_ret_code, ExchangeError, ExchangeResult};
pub use order::{plan_futures_order, plan_spot_margin_order, OrderPlan, SpotMarginOptions};
pub use shooter::{record_trade_prices, OrderOutcome, OrderShooter};
