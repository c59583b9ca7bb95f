//! HMAC-SHA256 요청 서명.
//!
//! 파라미터를 키 순서(바이트 순)로 정렬해 `key=value`를 `&`로 연결한 문자열을
//! API 시크릿으로 HMAC-SHA256 서명하고, 소문자 hex 다이제스트를 `sign` 필드로 붙입니다.
//!
//! ```rust,ignore
//! let mut params = BTreeMap::new();
//! params.insert("symbol".to_string(), "SOLUSDT".to_string());
//! let request = SignedRequest::sign(params, secret)?;
//! client.post(url).json(&request).send().await?;
//! ```

use std::collections::BTreeMap;

use hmac::{Hmac, Mac};
use serde::ser::{Serialize, SerializeMap, Serializer};
use sha2::Sha256;

use crate::error::{CoreError, CoreResult};

type HmacSha256 = Hmac<Sha256>;

/// 서명 필드 이름.
pub const SIGN_KEY: &str = "sign";

/// 정렬된 파라미터에서 서명 대상 문자열 생성.
fn build_payload(params: &BTreeMap<String, String>) -> String {
    params
        .iter()
        .map(|(k, v)| format!("{}={}", k, v))
        .collect::<Vec<_>>()
        .join("&")
}

/// 파라미터 서명 다이제스트 계산.
pub fn generate_signature(secret: &str, params: &BTreeMap<String, String>) -> CoreResult<String> {
    let mut mac = HmacSha256::new_from_slice(secret.as_bytes())
        .map_err(|e| CoreError::InvalidArgument(format!("HMAC 키 생성 실패: {}", e)))?;
    mac.update(build_payload(params).as_bytes());
    Ok(hex::encode(mac.finalize().into_bytes()))
}

/// 서명이 완료된 요청 파라미터.
///
/// 생성 후에는 변경할 수 없습니다.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignedRequest {
    params: BTreeMap<String, String>,
    signature: String,
}

impl SignedRequest {
    /// 파라미터에 서명을 붙입니다.
    ///
    /// 파라미터에 이미 `sign` 키가 있으면 거부합니다.
    pub fn sign(params: BTreeMap<String, String>, secret: &str) -> CoreResult<Self> {
        if params.contains_key(SIGN_KEY) {
            return Err(CoreError::InvalidArgument(
                "서명 전 파라미터에 sign 키가 포함되어 있습니다".to_string(),
            ));
        }

        let signature = generate_signature(secret, &params)?;
        Ok(Self { params, signature })
    }

    /// 서명 대상 파라미터 (sign 제외).
    pub fn params(&self) -> &BTreeMap<String, String> {
        &self.params
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        if key == SIGN_KEY {
            return Some(&self.signature);
        }
        self.params.get(key).map(String::as_str)
    }

    pub fn signature(&self) -> &str {
        &self.signature
    }

    /// 쿼리 스트링용 (키, 값) 목록. 서명은 마지막에 위치합니다.
    pub fn to_pairs(&self) -> Vec<(&str, &str)> {
        self.params
            .iter()
            .map(|(k, v)| (k.as_str(), v.as_str()))
            .chain(std::iter::once((SIGN_KEY, self.signature.as_str())))
            .collect()
    }
}

impl Serialize for SignedRequest {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.params.len() + 1))?;
        for (k, v) in &self.params {
            map.serialize_entry(k, v)?;
        }
        map.serialize_entry(SIGN_KEY, &self.signature)?;
        map.end()
    }
}

// =============================================================================
// 테스트
// =============================================================================
