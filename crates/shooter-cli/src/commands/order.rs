//! 선물/현물 마진 주문 명령.
//!
//! # 사용 예시
//!
//! ```bash
//! # 매도 1호가로 SOLUSDT 0.5개 매수, 익절 2% / 손절 1%
//! shooter futures -a SOLNormal -s SOLUSDT --side buy --qty 0.5 \
//!     --tp-type percentage --tp-value 2 --sl-type percentage --sl-value 1
//!
//! # 매수 1호가보다 0.1% 낮은 가격으로 지정가
//! shooter futures -a SOLNormal -s SOLUSDT --side buy --qty 0.5 \
//!     --price-ref bid --price-direction buy --variance 0.1
//!
//! # USDC 잔고 기준 수량으로 현물 마진 주문 (제출하지 않고 계획만 출력)
//! shooter spot -a SOLNormal -s SOLUSDC --side buy --leverage 5 --dry-run
//! ```

use std::sync::Arc;

use anyhow::{bail, Context, Result};
use clap::Args;
use rust_decimal::Decimal;
use shooter_core::{
    CredentialEncryptor, EncryptedAccountStore, OrderSpec, PriceOption, Side, TpSlSpec,
};
use shooter_exchange::{BybitConfig, OrderOutcome, OrderShooter, SpotMarginOptions};
use tracing::{info, warn};

/// 기본 계정 파일 경로.
pub const DEFAULT_ACCOUNTS_FILE: &str = "config/accounts.toml";

/// 두 시장 공통 주문 인자.
#[derive(Debug, Clone, Args)]
pub struct OrderArgs {
    /// 계정 이름 (계정 파일의 `[accounts.<이름>]`)
    #[arg(short, long)]
    pub account: String,

    /// 심볼 (예: SOLUSDT)
    #[arg(short, long)]
    pub symbol: String,

    /// 주문 방향 (buy, sell)
    #[arg(long, default_value = "Buy")]
    pub side: String,

    /// 레버리지 배수
    #[arg(short, long, default_value_t = 10)]
    pub leverage: u32,

    /// 명시적 지정가
    #[arg(long, conflicts_with = "price_ref")]
    pub price: Option<Decimal>,

    /// 지정가 기준 호가 (bid, ask)
    #[arg(long, requires = "variance")]
    pub price_ref: Option<String>,

    /// 지정가 이동 방향 (buy: 아래로, sell: 위로). 생략 시 주문 방향
    #[arg(long, requires = "price_ref")]
    pub price_direction: Option<String>,

    /// 기준 호가 대비 변동 값
    #[arg(long, requires = "price_ref")]
    pub variance: Option<Decimal>,

    /// 변동 유형 (percentage, dollar)
    #[arg(long, default_value = "percentage")]
    pub variance_type: String,

    /// 익절 유형 (percentage, absolute)
    #[arg(long, requires = "tp_value")]
    pub tp_type: Option<String>,

    /// 익절 값
    #[arg(long, requires = "tp_type")]
    pub tp_value: Option<Decimal>,

    /// 손절 유형 (percentage, absolute)
    #[arg(long, requires = "sl_value")]
    pub sl_type: Option<String>,

    /// 손절 값
    #[arg(long, requires = "sl_type")]
    pub sl_value: Option<Decimal>,

    /// TP/SL 트리거 기준 (LastPrice, MarkPrice, IndexPrice)
    #[arg(long, default_value = "LastPrice")]
    pub trigger_by: String,

    /// 주문 계획만 출력하고 제출하지 않음
    #[arg(long)]
    pub dry_run: bool,
}

/// 현물 마진 전용 인자.
#[derive(Debug, Clone, Args)]
pub struct SpotArgs {
    /// TP/SL 모드
    #[arg(long, default_value = "Full")]
    pub tpsl_mode: String,

    /// 손절 주문 유형
    #[arg(long, default_value = "Market")]
    pub sl_order_type: String,

    /// 수량 단위
    #[arg(long, default_value = "baseCoin")]
    pub market_unit: String,

    /// 수량 계산용 잔고 코인
    #[arg(long, default_value = "USDC")]
    pub quote_coin: String,
}

impl From<SpotArgs> for SpotMarginOptions {
    fn from(args: SpotArgs) -> Self {
        Self {
            tpsl_mode: args.tpsl_mode,
            sl_order_type: args.sl_order_type,
            market_unit: args.market_unit,
            quote_coin: args.quote_coin,
        }
    }
}

impl OrderArgs {
    /// 인자를 주문 명세로 변환.
    pub fn to_spec(&self, quantity: Option<Decimal>) -> Result<OrderSpec> {
        let side: Side = self.side.parse()?;
        if self.leverage == 0 {
            bail!("레버리지는 1 이상이어야 합니다");
        }

        let mut spec = OrderSpec::new(self.symbol.trim().to_uppercase(), side)
            .with_leverage(self.leverage)
            .with_trigger_by(self.trigger_by.clone());

        if let Some(quantity) = quantity {
            spec = spec.with_quantity(quantity);
        }
        if let Some(price) = self.price {
            spec = spec.with_price(price);
        }
        if let Some(option) = self.price_option(side)? {
            spec = spec.with_price_option(option);
        }
        if let Some(tp) = TpSlSpec::from_parts(self.tp_type.as_deref(), self.tp_value)? {
            spec = spec.with_take_profit(tp);
        }
        if let Some(sl) = TpSlSpec::from_parts(self.sl_type.as_deref(), self.sl_value)? {
            spec = spec.with_stop_loss(sl);
        }

        Ok(spec)
    }

    fn price_option(&self, side: Side) -> Result<Option<PriceOption>> {
        let Some(reference) = self.price_ref.as_deref() else {
            return Ok(None);
        };

        let variance = self
            .variance
            .context("--price-ref 사용 시 --variance가 필요합니다")?;
        let direction = match self.price_direction.as_deref() {
            Some(direction) => direction.parse()?,
            None => side,
        };

        Ok(Some(PriceOption {
            reference: reference.parse()?,
            direction,
            variance,
            variance_type: self.variance_type.parse()?,
        }))
    }
}

/// 환경 변수 설정으로 주문 실행기 생성.
///
/// - `ENCRYPTION_MASTER_KEY`: 계정 복호화 마스터 키
/// - `SHOOTER_ACCOUNTS_FILE`: 계정 파일 (기본 `config/accounts.toml`)
pub fn build_shooter() -> Result<OrderShooter> {
    let master = match std::env::var("ENCRYPTION_MASTER_KEY") {
        Ok(key) => Some(CredentialEncryptor::new(&key).context("ENCRYPTION_MASTER_KEY가 올바르지 않습니다")?),
        Err(_) => {
            warn!("ENCRYPTION_MASTER_KEY 미설정: 계정 전용 키만 사용합니다");
            None
        }
    };

    let accounts_file =
        std::env::var("SHOOTER_ACCOUNTS_FILE").unwrap_or_else(|_| DEFAULT_ACCOUNTS_FILE.to_string());
    let store = EncryptedAccountStore::load(&accounts_file, master)
        .with_context(|| format!("계정 파일 로드 실패: {}", accounts_file))?;

    Ok(OrderShooter::new(BybitConfig::from_env(), Arc::new(store)))
}

fn report(outcome: &OrderOutcome) {
    let plan = &outcome.plan;
    match &outcome.ack {
        Some(ack) => info!(
            "✅ 주문 완료: {} {} {} @ {} (order_id={})",
            plan.symbol, plan.side, plan.quantity, plan.price, ack.order_id
        ),
        None => info!(
            "주문 계획 (dry-run): {} {} {} @ {} TP={:?} SL={:?}",
            plan.symbol, plan.side, plan.quantity, plan.price, plan.take_profit, plan.stop_loss
        ),
    }
}

/// 선물 주문 명령.
pub async fn run_futures(args: OrderArgs, quantity: Decimal) -> Result<()> {
    let spec = args.to_spec(Some(quantity))?;
    let shooter = build_shooter()?;

    let outcome = shooter
        .place_futures_order(&args.account, &spec, args.dry_run)
        .await
        .context("선물 주문 실패")?;

    report(&outcome);
    Ok(())
}

/// 현물 마진 주문 명령.
pub async fn run_spot(args: OrderArgs, quantity: Option<Decimal>, spot: SpotArgs) -> Result<()> {
    let spec = args.to_spec(quantity)?;
    let shooter = build_shooter()?;
    let options = SpotMarginOptions::from(spot);

    let outcome = shooter
        .place_spot_margin_order(&args.account, &spec, &options, args.dry_run)
        .await
        .context("현물 마진 주문 실패")?;

    report(&outcome);
    Ok(())
}
