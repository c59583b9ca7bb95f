//! API 자격증명 암호화 (AES-256-GCM).
//!
//! 마스터 키는 base64로 인코딩된 32바이트 값입니다 (`ENCRYPTION_MASTER_KEY`).
//! 암호문과 nonce는 계정 파일에 base64 문자열로 저장됩니다.

use std::fmt;

use aes_gcm::aead::{Aead, AeadCore, KeyInit, OsRng};
use aes_gcm::{Aes256Gcm, Nonce};
use base64::{engine::general_purpose::STANDARD, Engine as _};
use serde::{de::DeserializeOwned, Serialize};

use crate::error::CredentialError;

const KEY_LEN: usize = 32;
const NONCE_LEN: usize = 12;

/// 암호화된 값 (base64 암호문 + base64 nonce).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncryptedValue {
    pub ciphertext: String,
    pub nonce: String,
}

/// AES-256-GCM 자격증명 암복호화기.
#[derive(Clone)]
pub struct CredentialEncryptor {
    cipher: Aes256Gcm,
}

impl fmt::Debug for CredentialEncryptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CredentialEncryptor")
            .field("key", &"***REDACTED***")
            .finish()
    }
}

impl CredentialEncryptor {
    /// base64 마스터 키로 생성.
    pub fn new(master_key: &str) -> Result<Self, CredentialError> {
        let key = STANDARD
            .decode(master_key.trim())
            .map_err(|e| CredentialError::InvalidKey(format!("base64 디코딩 실패: {}", e)))?;

        if key.len() != KEY_LEN {
            return Err(CredentialError::InvalidKey(format!(
                "키 길이는 {}바이트여야 합니다 (현재 {}바이트)",
                KEY_LEN,
                key.len()
            )));
        }

        let cipher = Aes256Gcm::new_from_slice(&key)
            .map_err(|e| CredentialError::InvalidKey(e.to_string()))?;
        Ok(Self { cipher })
    }

    /// 새 무작위 마스터 키 (base64).
    pub fn generate_key() -> String {
        STANDARD.encode(Aes256Gcm::generate_key(OsRng))
    }

    /// 바이트 암호화. 매 호출마다 새 nonce를 생성합니다.
    pub fn encrypt(&self, plaintext: &[u8]) -> Result<(Vec<u8>, Vec<u8>), CredentialError> {
        let nonce = Aes256Gcm::generate_nonce(&mut OsRng);
        let ciphertext = self
            .cipher
            .encrypt(&nonce, plaintext)
            .map_err(|e| CredentialError::DecryptionFailed(format!("암호화 실패: {}", e)))?;
        Ok((ciphertext, nonce.to_vec()))
    }

    /// 바이트 복호화.
    pub fn decrypt(&self, ciphertext: &[u8], nonce: &[u8]) -> Result<Vec<u8>, CredentialError> {
        if nonce.len() != NONCE_LEN {
            return Err(CredentialError::DecryptionFailed(format!(
                "nonce 길이는 {}바이트여야 합니다 (현재 {}바이트)",
                NONCE_LEN,
                nonce.len()
            )));
        }

        self.cipher
            .decrypt(Nonce::from_slice(nonce), ciphertext)
            .map_err(|_| {
                CredentialError::DecryptionFailed("키가 다르거나 암호문이 손상되었습니다".to_string())
            })
    }

    /// 문자열을 암호화해 base64로 반환.
    pub fn encrypt_string(&self, plaintext: &str) -> Result<EncryptedValue, CredentialError> {
        let (ciphertext, nonce) = self.encrypt(plaintext.as_bytes())?;
        Ok(EncryptedValue {
            ciphertext: STANDARD.encode(ciphertext),
            nonce: STANDARD.encode(nonce),
        })
    }

    /// base64 암호문/nonce를 복호화해 문자열로 반환.
    pub fn decrypt_string(&self, ciphertext: &str, nonce: &str) -> Result<String, CredentialError> {
        let ciphertext = decode_base64(ciphertext, "암호문")?;
        let nonce = decode_base64(nonce, "nonce")?;
        let plaintext = self.decrypt(&ciphertext, &nonce)?;

        String::from_utf8(plaintext)
            .map_err(|e| CredentialError::DecryptionFailed(format!("UTF-8 변환 실패: {}", e)))
    }

    /// 직렬화 가능한 값을 JSON으로 암호화.
    pub fn encrypt_json<T: Serialize>(&self, value: &T) -> Result<(Vec<u8>, Vec<u8>), CredentialError> {
        let json = serde_json::to_vec(value)
            .map_err(|e| CredentialError::Config(format!("JSON 직렬화 실패: {}", e)))?;
        self.encrypt(&json)
    }

    /// JSON 암호문을 복호화해 역직렬화.
    pub fn decrypt_json<T: DeserializeOwned>(
        &self,
        ciphertext: &[u8],
        nonce: &[u8],
    ) -> Result<T, CredentialError> {
        let plaintext = self.decrypt(ciphertext, nonce)?;
        serde_json::from_slice(&plaintext)
            .map_err(|e| CredentialError::DecryptionFailed(format!("JSON 파싱 실패: {}", e)))
    }
}

fn decode_base64(value: &str, what: &str) -> Result<Vec<u8>, CredentialError> {
    STANDARD
        .decode(value.trim())
        .map_err(|e| CredentialError::DecryptionFailed(format!("{} base64 디코딩 실패: {}", what, e)))
}

// =============================================================================
// 테스트
// =============================================================================
