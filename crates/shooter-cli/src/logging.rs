//! tracing 구독자 초기화.
//!
//! - 콘솔: `RUST_LOG` 필터 (기본 `info`), `SHOOTER_LOG_FORMAT=json`이면 JSON 출력
//! - 거래 로그: `trade_log` target 이벤트만 파일에 추가 기록

use std::fs::OpenOptions;
use std::path::Path;
use std::sync::Mutex;

use anyhow::{Context, Result};
use shooter_exchange::TRADE_LOG_TARGET;
use tracing_subscriber::filter::filter_fn;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter, Layer};

/// 기본 거래 로그 파일.
pub const DEFAULT_TRADE_LOG: &str = "futures_trade_log.txt";

fn json_requested() -> bool {
    std::env::var("SHOOTER_LOG_FORMAT")
        .map(|v| v.eq_ignore_ascii_case("json"))
        .unwrap_or(false)
}

/// 거래 로그 경로 (`SHOOTER_TRADE_LOG`, 기본 `futures_trade_log.txt`).
pub fn trade_log_path() -> String {
    std::env::var("SHOOTER_TRADE_LOG")
        .ok()
        .filter(|v| !v.trim().is_empty())
        .unwrap_or_else(|| DEFAULT_TRADE_LOG.to_string())
}

/// 구독자 초기화. `trade_log`가 있으면 거래 로그 파일 레이어를 추가합니다.
pub fn init(trade_log: Option<&Path>) -> Result<()> {
    let trade_layer = match trade_log {
        Some(path) => {
            let file = OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)
                .with_context(|| format!("거래 로그 파일을 열 수 없습니다: {}", path.display()))?;

            Some(
                fmt::layer()
                    .with_writer(Mutex::new(file))
                    .with_ansi(false)
                    .with_target(false)
                    .with_filter(filter_fn(|meta| meta.target() == TRADE_LOG_TARGET)),
            )
        }
        None => None,
    };

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let (console, console_json) = if json_requested() {
        (None, Some(fmt::layer().json().with_filter(filter)))
    } else {
        (Some(fmt::layer().with_filter(filter)), None)
    };

    tracing_subscriber::registry()
        .with(console)
        .with(console_json)
        .with(trade_layer)
        .try_init()
        .context("tracing 초기화 실패")?;

    Ok(())
}
