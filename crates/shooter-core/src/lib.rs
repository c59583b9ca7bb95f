//! 주문 가격 계산 및 요청 서명 코어.
//!
//! 이 crate는 다음을 제공합니다:
//! - 주문 도메인 타입 (`OrderSpec`, `Side`, `TpSlSpec` 등)
//! - 호가/수량 단위에서 소수 자릿수 도출 (`resolve_precision`)
//! - TP/SL 및 메이커 지정가 계산 (`derive_tp_sl`, `derive_limit_price`)
//! - 잔고 기반 주문 수량 계산 (`derive_quantity`)
//! - HMAC-SHA256 요청 서명 (`SignedRequest`)
//! - API 자격증명 암복호화 (`CredentialEncryptor`, `EncryptedAccountStore`)
//!
//! 네트워크 I/O는 포함하지 않습니다. 거래소 호출은 `shooter-exchange`에서 담당합니다.
//!
//! # 예제
//!
//! ```rust,ignore
//! use shooter_core::{derive_tp_sl, Side, TpSlSpec};
//! use rust_decimal_macros::dec;
//!
//! let prices = derive_tp_sl(
//!     dec!(100),
//!     Side::Buy,
//!     Some(TpSlSpec::percentage(dec!(2))),
//!     Some(TpSlSpec::percentage(dec!(1))),
//!     2,
//! );
//! assert_eq!(prices.take_profit, Some(dec!(102.00)));
//! ```

pub mod credentials;
pub mod crypto;
pub mod domain;
pub mod error;
pub mod pricing;
pub mod signing;

// 주요 타입 재내보내기
pub use credentials::{CredentialProvider, Credentials, EncryptedAccount, EncryptedAccountStore};
pub use crypto::{CredentialEncryptor, EncryptedValue};
pub use domain::{
    Category, MarketSnapshot, OrderSpec, PrecisionInfo, PriceOption, PriceReference, Side,
    TpSlSpec, TpSlType, VarianceType,
};
pub use error::{CoreError, CoreResult, CredentialError};
pub use pricing::{
    derive_limit_price, derive_quantity, derive_tp_sl, resolve_entry_price, resolve_precision,
    TpSlPrices, DEFAULT_MIN_QTY, DEFAULT_QTY_STEP,
};
pub use signing::{generate_signature, SignedRequest, SIGN_KEY};
