//! 주문 실행기.
//!
//! 계정 자격증명 조회 → 시세 스냅샷 조회 → 주문 계획 → 호가 기록 → 제출 순서로
//! 단일 주문을 처리합니다. 재시도나 주문 상태 추적은 하지 않습니다.

use std::sync::Arc;

use rust_decimal::Decimal;
use shooter_core::{
    derive_quantity, resolve_entry_price, Category, CredentialProvider, OrderSpec, Side,
    DEFAULT_MIN_QTY,
};
use tracing::{error, info, warn};

use crate::client::{BybitClient, OrderAck};
use crate::config::BybitConfig;
use crate::error::{ExchangeError, ExchangeResult};
use crate::order::{plan_futures_order, plan_spot_margin_order, round_quantity, OrderPlan, SpotMarginOptions};
use crate::TRADE_LOG_TARGET;

/// 주문 처리 결과.
#[derive(Debug, Clone)]
pub struct OrderOutcome {
    pub plan: OrderPlan,
    /// 거래소 접수 응답. dry-run이면 `None`
    pub ack: Option<OrderAck>,
}

impl OrderOutcome {
    pub fn is_dry_run(&self) -> bool {
        self.ack.is_none()
    }
}

/// 주문 시점의 호가를 거래 로그 대상에 기록.
pub fn record_trade_prices(symbol: &str, bid: Decimal, ask: Decimal, side: Side) {
    info!(
        target: TRADE_LOG_TARGET,
        symbol,
        side = side.as_str(),
        bid = %bid,
        ask = %ask,
        "Trade executed for {}: Side={}, Bid Price={}, Ask Price={}",
        symbol,
        side,
        bid,
        ask
    );
}

/// 계정별 자격증명으로 Bybit 주문을 제출하는 실행기.
pub struct OrderShooter {
    config: BybitConfig,
    credentials: Arc<dyn CredentialProvider>,
}

impl OrderShooter {
    pub fn new(config: BybitConfig, credentials: Arc<dyn CredentialProvider>) -> Self {
        Self { config, credentials }
    }

    fn client_for(&self, account: &str) -> ExchangeResult<BybitClient> {
        let credentials = self.credentials.get(account)?;
        Ok(BybitClient::new(self.config.clone())?.with_credentials(credentials))
    }

    /// 선물(linear) 레버리지 지정가 주문.
    pub async fn place_futures_order(
        &self,
        account: &str,
        spec: &OrderSpec,
        dry_run: bool,
    ) -> ExchangeResult<OrderOutcome> {
        info!(
            account,
            symbol = %spec.symbol,
            side = %spec.side,
            leverage = spec.leverage,
            "선물 주문 준비"
        );

        let client = self.client_for(account)?;
        let snapshot = client.fetch_market_snapshot(Category::Linear, &spec.symbol).await?;
        let plan = plan_futures_order(spec, &snapshot)?;

        self.submit(&client, plan, dry_run).await
    }

    /// 현물 마진 레버리지 지정가 주문.
    ///
    /// 수량이 없으면 `quote_coin` 잔고 × 레버리지 ÷ 지정가로 계산합니다.
    pub async fn place_spot_margin_order(
        &self,
        account: &str,
        spec: &OrderSpec,
        options: &SpotMarginOptions,
        dry_run: bool,
    ) -> ExchangeResult<OrderOutcome> {
        info!(
            account,
            symbol = %spec.symbol,
            side = %spec.side,
            leverage = spec.leverage,
            "현물 마진 주문 준비"
        );

        let client = self.client_for(account)?;
        let snapshot = client.fetch_market_snapshot(Category::Spot, &spec.symbol).await?;
        let price = resolve_entry_price(spec.price, spec.price_option.as_ref(), spec.side, &snapshot);

        let quantity = match spec.quantity {
            Some(quantity) => round_quantity(quantity, snapshot.precision.quantity)?,
            None => {
                let balance = client.fetch_available_balance(&options.quote_coin).await?;
                if balance <= Decimal::ZERO {
                    warn!(coin = %options.quote_coin, balance = %balance, "가용 잔고 없음");
                    return Err(ExchangeError::InsufficientBalance(format!(
                        "{} 가용 잔고: {}",
                        options.quote_coin, balance
                    )));
                }
                derive_quantity(
                    balance,
                    spec.leverage,
                    price,
                    snapshot.precision.quantity,
                    DEFAULT_MIN_QTY,
                )?
            }
        };

        let plan = plan_spot_margin_order(spec, &snapshot, price, quantity, options);
        self.submit(&client, plan, dry_run).await
    }

    async fn submit(
        &self,
        client: &BybitClient,
        plan: OrderPlan,
        dry_run: bool,
    ) -> ExchangeResult<OrderOutcome> {
        record_trade_prices(&plan.symbol, plan.bid, plan.ask, plan.side);

        info!(
            category = %plan.category,
            symbol = %plan.symbol,
            side = %plan.side,
            qty = %plan.quantity,
            price = %plan.price,
            take_profit = ?plan.take_profit,
            stop_loss = ?plan.stop_loss,
            dry_run,
            "주문 계획 확정"
        );

        if dry_run {
            return Ok(OrderOutcome { plan, ack: None });
        }

        match client.place_order(plan.params().clone()).await {
            Ok(ack) => {
                info!(order_id = %ack.order_id, symbol = %plan.symbol, "✅ 주문 접수");
                Ok(OrderOutcome {
                    plan,
                    ack: Some(ack),
                })
            }
            Err(e) => {
                error!(symbol = %plan.symbol, error = %e, "주문 실패");
                Err(e)
            }
        }
    }
}
