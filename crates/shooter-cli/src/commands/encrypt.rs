//! 자격증명 암호화 명령.
//!
//! ```bash
//! # 새 마스터 키 생성 (.env의 ENCRYPTION_MASTER_KEY로 저장)
//! shooter generate-key
//!
//! # API 키/시크릿 암호화 (계정 파일에 ciphertext/nonce를 붙여넣기)
//! shooter encrypt --value "<api key>"
//! ```

use anyhow::{Context, Result};
use shooter_core::{CredentialEncryptor, EncryptedValue};

fn master_encryptor() -> Result<CredentialEncryptor> {
    let key = std::env::var("ENCRYPTION_MASTER_KEY")
        .context("ENCRYPTION_MASTER_KEY 환경 변수가 필요합니다")?;
    CredentialEncryptor::new(&key).context("ENCRYPTION_MASTER_KEY가 올바르지 않습니다")
}

/// 평문을 암호화.
pub fn encrypt_value(encryptor: &CredentialEncryptor, value: &str) -> Result<EncryptedValue> {
    if value.is_empty() {
        anyhow::bail!("암호화할 값이 비어 있습니다");
    }
    Ok(encryptor.encrypt_string(value)?)
}

pub fn run_encrypt(value: &str) -> Result<()> {
    let encrypted = encrypt_value(&master_encryptor()?, value)?;

    println!("ciphertext = \"{}\"", encrypted.ciphertext);
    println!("nonce = \"{}\"", encrypted.nonce);
    Ok(())
}

pub fn run_generate_key() {
    println!("ENCRYPTION_MASTER_KEY={}", CredentialEncryptor::generate_key());
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_encrypt_value_round_trip() {
        let encryptor = CredentialEncryptor::new(&CredentialEncryptor::generate_key()).unwrap();
        let encrypted = encrypt_value(&encryptor, "my-api-key").unwrap();

        assert_ne!(encrypted.ciphertext, "my-api-key");
        assert_eq!(
            encryptor
                .decrypt_string(&encrypted.ciphertext, &encrypted.nonce)
                .unwrap(),
            "my-api-key"
        );
    }

    #[test]
    fn test_empty_value_rejected() {
        let encryptor = CredentialEncryptor::new(&CredentialEncryptor::generate_key()).unwrap();
        assert!(encrypt_value(&encryptor, "").is_err());
    }
}
