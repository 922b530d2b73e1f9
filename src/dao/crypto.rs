use aes_gcm::{
    aead::{Aead, KeyInit},
    Aes256Gcm, Nonce, Key
};
use sha2::{Sha256, Digest};
use base64::{Engine as _, engine::general_purpose};
use once_cell::sync::OnceCell;
use rand::Rng;
use anyhow::{Result, anyhow};

/// Secret used when `LLM_ADMIN_SECRET` is not configured. Development only.
pub const DEV_SECRET: &str = "llm-admin-development-secret";

static ENCRYPTION_KEY: OnceCell<[u8; 32]> = OnceCell::new();

/// 从配置的密钥字符串派生 AES-256 密钥（SHA-256）
pub fn derive_key(secret: &str) -> [u8; 32] {
    let digest = Sha256::digest(secret.as_bytes());
    digest.into()
}

/// 设置进程级加密密钥，只有第一次调用生效
///
/// # Returns
/// * `true` - 本次调用设置了密钥
/// * `false` - 密钥之前已经设置过
pub fn init_encryption_key(secret: &str) -> bool {
    ENCRYPTION_KEY.set(derive_key(secret)).is_ok()
}

fn encryption_key() -> &'static [u8; 32] {
    ENCRYPTION_KEY.get_or_init(|| derive_key(DEV_SECRET))
}

/// 使用AES-256-GCM加密API密钥
///
/// # Returns
/// * `Ok(String)` - Base64编码的加密数据(包含nonce)
/// * `Err(anyhow::Error)` - 加密失败
pub fn encrypt_api_key(api_key: &str) -> Result<String> {
    let key = Key::<Aes256Gcm>::from_slice(encryption_key());
    let cipher = Aes256Gcm::new(key);

    let mut nonce_bytes = [0u8; 12];
    rand::thread_rng().fill(&mut nonce_bytes);
    let nonce = Nonce::from_slice(&nonce_bytes);

    let ciphertext = cipher
        .encrypt(nonce, api_key.as_bytes())
        .map_err(|e| anyhow!("Encryption failed: {}", e))?;

    // nonce || ciphertext
    let mut encrypted_data = nonce_bytes.to_vec();
    encrypted_data.extend_from_slice(&ciphertext);

    Ok(general_purpose::STANDARD.encode(&encrypted_data))
}

/// 使用AES-256-GCM解密API密钥
pub fn decrypt_api_key(encrypted_data: &str) -> Result<String> {
    let encrypted_bytes = general_purpose::STANDARD
        .decode(encrypted_data)
        .map_err(|e| anyhow!("Base64 decode failed: {}", e))?;

    if encrypted_bytes.len() < 12 {
        return Err(anyhow!("Invalid encrypted data: too short"));
    }

    let (nonce_bytes, ciphertext) = encrypted_bytes.split_at(12);
    let nonce = Nonce::from_slice(nonce_bytes);

    let key = Key::<Aes256Gcm>::from_slice(encryption_key());
    let cipher = Aes256Gcm::new(key);

    let plaintext = cipher
        .decrypt(nonce, ciphertext)
        .map_err(|e| anyhow!("Decryption failed: {}", e))?;

    String::from_utf8(plaintext)
        .map_err(|e| anyhow!("UTF-8 conversion failed: {}", e))
}

/// Decrypts an optional stored key; `None` and empty strings stay `None`.
pub fn decrypt_optional(encrypted: Option<&str>) -> Result<Option<String>> {
    match encrypted {
        Some(value) if !value.is_empty() => decrypt_api_key(value).map(Some),
        _ => Ok(None),
    }
}

/// Encrypts an optional raw key; `None` stays `None`.
pub fn encrypt_optional(raw: Option<&str>) -> Result<Option<String>> {
    raw.map(encrypt_api_key).transpose()
}
