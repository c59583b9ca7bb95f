//! Bybit 레버리지 지정가 주문 CLI.
//!
//! # 사용 예시
//!
//! ```bash
//! # 선물 주문 (기본 수량 0.1, 레버리지 10배)
//! shooter futures -a SOLNormal -s SOLUSDT --side buy --tp-type percentage --tp-value 2
//!
//! # 현물 마진 주문 (USDC 잔고 기준 수량)
//! shooter spot -a SOLNormal -s SOLUSDC --side sell --sl-type absolute --sl-value 1.5
//!
//! # 자격증명 암호화
//! shooter generate-key
//! shooter encrypt --value "<api secret>"
//! ```

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use rust_decimal::Decimal;
use tracing::error;

mod commands;
mod logging;

use commands::{
    encrypt::{run_encrypt, run_generate_key},
    order::{run_futures, run_spot, OrderArgs, SpotArgs},
};

#[derive(Parser)]
#[command(name = "shooter")]
#[command(about = "Bybit 레버리지 지정가 주문 + TP/SL 발사기", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// 선물(linear) 지정가 주문
    Futures {
        #[command(flatten)]
        order: OrderArgs,

        /// 주문 수량
        #[arg(short, long, default_value = "0.1")]
        qty: Decimal,
    },

    /// 현물 마진 지정가 주문
    Spot {
        #[command(flatten)]
        order: OrderArgs,

        /// 주문 수량 (생략 시 잔고 × 레버리지 ÷ 지정가)
        #[arg(short, long)]
        qty: Option<Decimal>,

        #[command(flatten)]
        spot: SpotArgs,
    },

    /// 마스터 키로 자격증명 값 암호화
    Encrypt {
        /// 암호화할 평문 (API 키 또는 시크릿)
        #[arg(long, env = "SHOOTER_ENCRYPT_VALUE", hide_env_values = true)]
        value: String,
    },

    /// 새 AES-256 마스터 키 생성
    GenerateKey,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // .env 파일 로드 (없어도 에러 안남)
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    let trade_log = match &cli.command {
        Commands::Futures { .. } | Commands::Spot { .. } => Some(PathBuf::from(logging::trade_log_path())),
        Commands::Encrypt { .. } | Commands::GenerateKey => None,
    };
    logging::init(trade_log.as_deref())?;

    let result = match cli.command {
        Commands::Futures { order, qty } => run_futures(order, qty).await,
        Commands::Spot { order, qty, spot } => run_spot(order, qty, spot).await,
        Commands::Encrypt { value } => run_encrypt(&value),
        Commands::GenerateKey => {
            run_generate_key();
            Ok(())
        }
    };

    if let Err(e) = &result {
        error!("{:#}", e);
    }
    result
}
