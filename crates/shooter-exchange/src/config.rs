//! Bybit 클라이언트 설정.

use std::time::Duration;

const MAINNET_URL: &str = "https://api.bybit.com";
const TESTNET_URL: &str = "https://api-testnet.bybit.com";

/// Bybit REST 설정.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BybitConfig {
    /// 테스트넷 사용
    pub testnet: bool,
    /// 기본 URL 재정의 (테스트/프록시용)
    pub base_url: Option<String>,
    /// 요청 타임아웃 (초)
    pub timeout_secs: u64,
    /// 수신 윈도우 (밀리초). 지정 시 서명 파라미터에 `recv_window` 포함
    pub recv_window: Option<u64>,
}

impl Default for BybitConfig {
    fn default() -> Self {
        Self {
            testnet: false,
            base_url: None,
            timeout_secs: 10,
            recv_window: None,
        }
    }
}

impl BybitConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// 테스트넷 사용.
    pub fn with_testnet(mut self, testnet: bool) -> Self {
        self.testnet = testnet;
        self
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = Some(base_url.into());
        self
    }

    pub fn with_timeout_secs(mut self, timeout_secs: u64) -> Self {
        self.timeout_secs = timeout_secs;
        self
    }

    pub fn with_recv_window(mut self, recv_window: u64) -> Self {
        self.recv_window = Some(recv_window);
        self
    }

    /// 환경 변수에서 생성.
    ///
    /// - `BYBIT_TESTNET`: "true"면 테스트넷
    /// - `BYBIT_BASE_URL`: 기본 URL 재정의
    /// - `BYBIT_TIMEOUT_SECS`: 요청 타임아웃 (기본 10초)
    /// - `BYBIT_RECV_WINDOW`: 수신 윈도우 (밀리초)
    pub fn from_env() -> Self {
        let testnet = std::env::var("BYBIT_TESTNET")
            .map(|v| v.to_lowercase() == "true")
            .unwrap_or(false);

        let base_url = std::env::var("BYBIT_BASE_URL")
            .ok()
            .filter(|v| !v.trim().is_empty());

        let timeout_secs = std::env::var("BYBIT_TIMEOUT_SECS")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(10);

        let recv_window = std::env::var("BYBIT_RECV_WINDOW")
            .ok()
            .and_then(|v| v.parse().ok());

        Self {
            testnet,
            base_url,
            timeout_secs,
            recv_window,
        }
    }

    /// REST API 기본 URL 반환.
    pub fn rest_base_url(&self) -> &str {
        match &self.base_url {
            Some(url) => url.trim_end_matches('/'),
            None if self.testnet => TESTNET_URL,
            None => MAINNET_URL,
        }
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}
