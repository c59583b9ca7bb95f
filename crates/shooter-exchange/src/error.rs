//! 거래소 에러 타입.

use shooter_core::{CoreError, CredentialError};
use thiserror::Error;

/// Bybit 커넥터 에러.
#[derive(Debug, Error)]
pub enum ExchangeError {
    /// 네트워크 에러 (연결 실패, 타임아웃 등)
    #[error("네트워크 에러: {0}")]
    NetworkError(String),

    /// 인증 실패 (잘못된 API 키, 서명 오류, 권한 없음)
    #[error("인증 실패: {0}")]
    Unauthorized(String),

    /// 요청 한도 초과
    #[error("요청 한도 초과")]
    RateLimited,

    /// 요청 타임스탬프가 허용 범위를 벗어남
    #[error("타임스탬프 에러: {0}")]
    TimestampError(String),

    /// 잔고 부족
    #[error("잔고 부족: {0}")]
    InsufficientBalance(String),

    /// 잘못된 요청 파라미터
    #[error("잘못된 파라미터: {0}")]
    InvalidParameter(String),

    /// 응답 파싱 실패
    #[error("파싱 에러: {0}")]
    ParseError(String),

    /// 기타 API 에러
    #[error("API 에러 [{code}]: {message}")]
    ApiError { code: i64, message: String },

    /// 코어 계산/자격증명 에러
    #[error(transparent)]
    Core(#[from] CoreError),
}

impl From<CredentialError> for ExchangeError {
    fn from(err: CredentialError) -> Self {
        Self::Core(CoreError::Credential(err))
    }
}

/// Result 타입 별칭
pub type ExchangeResult<T> = std::result::Result<T, ExchangeError>;

/// Bybit `retCode`를 ExchangeError로 매핑.
pub fn map_ret_code(code: i64, msg: &str) -> ExchangeError {
    match code {
        10001 => ExchangeError::InvalidParameter(msg.to_string()),
        10002 => ExchangeError::TimestampError(msg.to_string()),
        10003 | 10004 | 10005 | 10007 | 33004 => ExchangeError::Unauthorized(msg.to_string()),
        10006 | 10018 => ExchangeError::RateLimited,
        110004 | 110007 | 110012 | 110045 | 170131 => {
            ExchangeError::InsufficientBalance(msg.to_string())
        }
        _ => ExchangeError::ApiError {
            code,
            message: msg.to_string(),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ret_code_mapping() {
        assert!(matches!(
            map_ret_code(10004, "error sign!"),
            ExchangeError::Unauthorized(_)
        ));
        assert!(matches!(map_ret_code(10006, "too many"), ExchangeError::RateLimited));
        assert!(matches!(
            map_ret_code(110007, "ab not enough for new order"),
            ExchangeError::InsufficientBalance(_)
        ));
        assert!(matches!(
            map_ret_code(10002, "invalid request, please check your server timestamp"),
            ExchangeError::TimestampError(_)
        ));
        assert!(matches!(
            map_ret_code(99999, "unknown"),
            ExchangeError::ApiError { code: 99999, .. }
        ));
    }

    #[test]
    fn test_credential_error_conversion() {
        let err: ExchangeError = CredentialError::NotFound("acct".to_string()).into();
        assert!(matches!(
            err,
            ExchangeError::Core(CoreError::Credential(CredentialError::NotFound(_)))
        ));
        assert!(err.to_string().contains("acct"));
    }
}
