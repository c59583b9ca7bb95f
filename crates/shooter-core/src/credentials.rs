//! 계정별 API 자격증명 제공.
//!
//! 계정 파일(TOML)에는 AES-256-GCM으로 암호화된 API 키/시크릿이 저장됩니다.
//!
//! ```toml
//! [accounts.SOLNormal]
//! api_key = "<base64 암호문>"
//! api_key_nonce = "<base64 nonce>"
//! api_secret = "<base64 암호문>"
//! api_secret_nonce = "<base64 nonce>"
//! # encryption_key = "<계정 전용 base64 키>"  # 없으면 마스터 키 사용
//! ```

use std::collections::BTreeMap;
use std::fmt;
use std::path::Path;

use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::crypto::CredentialEncryptor;
use crate::error::CredentialError;

// =============================================================================
// 자격증명
// =============================================================================

/// 복호화된 API 키/시크릿.
pub struct Credentials {
    api_key: String,
    api_secret: SecretString,
}

impl Credentials {
    pub fn new(api_key: impl Into<String>, api_secret: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            api_secret: SecretString::from(api_secret.into()),
        }
    }

    pub fn api_key(&self) -> &str {
        &self.api_key
    }

    pub fn api_secret(&self) -> &str {
        self.api_secret.expose_secret()
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let masked_key = if self.api_key.len() > 8 {
            format!(
                "{}...{}",
                &self.api_key[..4],
                &self.api_key[self.api_key.len() - 4..]
            )
        } else {
            "***REDACTED***".to_string()
        };

        f.debug_struct("Credentials")
            .field("api_key", &masked_key)
            .field("api_secret", &"***REDACTED***")
            .finish()
    }
}

/// 계정 이름으로 자격증명을 조회하는 추상화.
pub trait CredentialProvider: Send + Sync {
    /// 계정 자격증명 조회.
    ///
    /// 계정이 없으면 `NotFound`, 복호화에 실패하면 `DecryptionFailed`.
    fn get(&self, account: &str) -> Result<Credentials, CredentialError>;
}

// =============================================================================
// 암호화 계정 저장소
// =============================================================================

/// 계정 파일의 한 항목.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EncryptedAccount {
    pub api_key: String,
    pub api_key_nonce: String,
    pub api_secret: String,
    pub api_secret_nonce: String,
    /// 계정 전용 키 (없으면 마스터 키)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub encryption_key: Option<String>,
}

impl EncryptedAccount {
    /// 평문 키/시크릿을 암호화해 계정 항목 생성.
    pub fn encrypt(
        encryptor: &CredentialEncryptor,
        api_key: &str,
        api_secret: &str,
    ) -> Result<Self, CredentialError> {
        let key = encryptor.encrypt_string(api_key)?;
        let secret = encryptor.encrypt_string(api_secret)?;

        Ok(Self {
            api_key: key.ciphertext,
            api_key_nonce: key.nonce,
            api_secret: secret.ciphertext,
            api_secret_nonce: secret.nonce,
            encryption_key: None,
        })
    }

    fn decrypt(&self, encryptor: &CredentialEncryptor) -> Result<Credentials, CredentialError> {
        let api_key = encryptor.decrypt_string(&self.api_key, &self.api_key_nonce)?;
        let api_secret = encryptor.decrypt_string(&self.api_secret, &self.api_secret_nonce)?;
        Ok(Credentials::new(api_key, api_secret))
    }
}

#[derive(Debug, Default, Serialize, Deserialize)]
struct AccountsFile {
    #[serde(default)]
    accounts: BTreeMap<String, EncryptedAccount>,
}

/// TOML 계정 파일 기반 `CredentialProvider`.
#[derive(Debug, Default)]
pub struct EncryptedAccountStore {
    accounts: BTreeMap<String, EncryptedAccount>,
    master: Option<CredentialEncryptor>,
}

impl EncryptedAccountStore {
    pub fn new(master: Option<CredentialEncryptor>) -> Self {
        Self {
            accounts: BTreeMap::new(),
            master,
        }
    }

    /// TOML 문자열에서 로드.
    pub fn from_toml_str(
        content: &str,
        master: Option<CredentialEncryptor>,
    ) -> Result<Self, CredentialError> {
        let file: AccountsFile = toml::from_str(content)
            .map_err(|e| CredentialError::Config(format!("계정 파일 파싱 실패: {}", e)))?;

        debug!(accounts = file.accounts.len(), "계정 파일 로드");

        Ok(Self {
            accounts: file.accounts,
            master,
        })
    }

    /// 파일 경로에서 로드.
    pub fn load(
        path: impl AsRef<Path>,
        master: Option<CredentialEncryptor>,
    ) -> Result<Self, CredentialError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| {
            CredentialError::Config(format!("계정 파일 읽기 실패 ({}): {}", path.display(), e))
        })?;
        Self::from_toml_str(&content, master)
    }

    pub fn insert(&mut self, name: impl Into<String>, account: EncryptedAccount) {
        self.accounts.insert(name.into(), account);
    }

    pub fn account_names(&self) -> impl Iterator<Item = &str> {
        self.accounts.keys().map(String::as_str)
    }

    /// TOML 문자열로 직렬화.
    pub fn to_toml_string(&self) -> Result<String, CredentialError> {
        let file = AccountsFile {
            accounts: self.accounts.clone(),
        };
        toml::to_string_pretty(&file)
            .map_err(|e| CredentialError::Config(format!("계정 파일 직렬화 실패: {}", e)))
    }
}

impl CredentialProvider for EncryptedAccountStore {
    fn get(&self, account: &str) -> Result<Credentials, CredentialError> {
        let entry = self
            .accounts
            .get(account)
            .ok_or_else(|| CredentialError::NotFound(account.to_string()))?;

        let credentials = match &entry.encryption_key {
            Some(key) => entry.decrypt(&CredentialEncryptor::new(key)?),
            None => {
                let master = self.master.as_ref().ok_or_else(|| {
                    CredentialError::Config(format!(
                        "계정 {} 에 전용 키가 없고 마스터 키도 설정되지 않았습니다",
                        account
                    ))
                })?;
                entry.decrypt(master)
            }
        };

        if let Err(e) = &credentials {
            warn!(account, error = %e, "자격증명 복호화 실패");
        }
        credentials
    }
}

// =============================================================================
// 테스트
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn master() -> CredentialEncryptor {
        CredentialEncryptor::new(&CredentialEncryptor::generate_key()).unwrap()
    }

    #[test]
    fn test_get_decrypts_account() {
        let master = master();
        let mut store = EncryptedAccountStore::new(Some(master.clone()));
        store.insert(
            "SOLNormal",
            EncryptedAccount::encrypt(&master, "key-123", "secret-456").unwrap(),
        );

        let credentials = store.get("SOLNormal").unwrap();
        assert_eq!(credentials.api_key(), "key-123");
        assert_eq!(credentials.api_secret(), "secret-456");
    }

    #[test]
    fn test_unknown_account() {
        let store = EncryptedAccountStore::new(Some(master()));
        assert!(matches!(
            store.get("missing"),
            Err(CredentialError::NotFound(name)) if name == "missing"
        ));
    }

    #[test]
    fn test_wrong_master_key() {
        let writer = master();
        let mut store = EncryptedAccountStore::new(Some(master()));
        store.insert(
            "acct",
            EncryptedAccount::encrypt(&writer, "k", "s").unwrap(),
        );

        assert!(matches!(
            store.get("acct"),
            Err(CredentialError::DecryptionFailed(_))
        ));
    }

    #[test]
    fn test_per_account_key_overrides_master() {
        let key = CredentialEncryptor::generate_key();
        let account_encryptor = CredentialEncryptor::new(&key).unwrap();
        let mut account = EncryptedAccount::encrypt(&account_encryptor, "k", "s").unwrap();
        account.encryption_key = Some(key);

        let mut store = EncryptedAccountStore::new(None);
        store.insert("acct", account);

        assert_eq!(store.get("acct").unwrap().api_secret(), "s");
    }

    #[test]
    fn test_missing_master_key() {
        let mut store = EncryptedAccountStore::new(None);
        store.insert(
            "acct",
            EncryptedAccount::encrypt(&master(), "k", "s").unwrap(),
        );
        assert!(matches!(store.get("acct"), Err(CredentialError::Config(_))));
    }

    #[test]
    fn test_toml_roundtrip() {
        let master = master();
        let mut store = EncryptedAccountStore::new(Some(master.clone()));
        store.insert("a", EncryptedAccount::encrypt(&master, "ka", "sa").unwrap());
        store.insert("b", EncryptedAccount::encrypt(&master, "kb", "sb").unwrap());

        let toml = store.to_toml_string().unwrap();
        assert!(toml.contains("[accounts.a]"));

        let reloaded = EncryptedAccountStore::from_toml_str(&toml, Some(master)).unwrap();
        assert_eq!(reloaded.account_names().collect::<Vec<_>>(), vec!["a", "b"]);
        assert_eq!(reloaded.get("b").unwrap().api_key(), "kb");
    }

    #[test]
    fn test_load_from_file() {
        let master = master();
        let mut store = EncryptedAccountStore::new(None);
        store.insert("acct", EncryptedAccount::encrypt(&master, "k", "s").unwrap());

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("accounts.toml");
        std::fs::write(&path, store.to_toml_string().unwrap()).unwrap();

        let loaded = EncryptedAccountStore::load(&path, Some(master)).unwrap();
        assert_eq!(loaded.get("acct").unwrap().api_key(), "k");

        assert!(matches!(
            EncryptedAccountStore::load(dir.path().join("nope.toml"), None),
            Err(CredentialError::Config(_))
        ));
    }

    #[test]
    fn test_credentials_debug_is_masked() {
        let credentials = Credentials::new("ABCDEFGHIJKL", "super-secret");
        let debug = format!("{:?}", credentials);
        assert!(debug.contains("ABCD...IJKL"));
        assert!(!debug.contains("super-secret"));
    }
}
