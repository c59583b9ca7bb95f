//! 에러 타입 정의.

use thiserror::Error;

/// 자격증명 조회/복호화 에러.
#[derive(Debug, Error)]
pub enum CredentialError {
    /// 계정을 찾을 수 없음
    #[error("계정을 찾을 수 없습니다: {0}")]
    NotFound(String),

    /// 복호화 실패 (잘못된 키, 손상된 암호문 등)
    #[error("복호화 실패: {0}")]
    DecryptionFailed(String),

    /// 암호화 키 형식 오류
    #[error("잘못된 암호화 키: {0}")]
    InvalidKey(String),

    /// 계정 파일 설정 오류
    #[error("계정 설정 에러: {0}")]
    Config(String),
}

/// 코어 계산 에러.
#[derive(Debug, Error)]
pub enum CoreError {
    /// 숫자 문자열 파싱 실패
    #[error("파싱 에러: {0}")]
    Parse(String),

    /// 지원하지 않는 값 (사이드, 변동 유형 등)
    #[error("잘못된 인자: {0}")]
    InvalidArgument(String),

    /// 자격증명 에러
    #[error(transparent)]
    Credential(#[from] CredentialError),
}

/// Result 타입 별칭
pub type CoreResult<T> = std::result::Result<T, CoreError>;
