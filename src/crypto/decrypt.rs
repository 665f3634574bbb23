use aes::cipher::{block_padding::Pkcs7, BlockDecryptMut, KeyInit};
use base64::{engine::general_purpose::STANDARD as BASE64, Engine};

use crate::error::WxPayError;

type Aes256EcbDec = ecb::Decryptor<aes::Aes256>;

const BLOCK_SIZE: usize = 16;

/// Derive the callback decryption key: lowercase hex MD5 of the API key.
///
/// The 32 ASCII characters are used directly as the AES-256 key.
pub fn derive_key(api_key: &str) -> String {
    format!("{:x}", md5::compute(api_key.as_bytes()))
}

/// Decrypt the `req_info` field of a refund callback using AES-256-ECB.
///
/// - `api_key`: merchant API key; the cipher key is [`derive_key`] of it
/// - `ciphertext_base64`: `req_info` as received (base64-encoded, PKCS#7 padded)
///
/// Returns the decrypted plaintext as a UTF-8 string.
pub fn decrypt_aes_256_ecb(api_key: &str, ciphertext_base64: &str) -> Result<String, WxPayError> {
    let ciphertext = BASE64
        .decode(ciphertext_base64.trim())
        .map_err(|e| WxPayError::DecryptError(format!("base64 decode: {e}")))?;

    if ciphertext.is_empty() || ciphertext.len() % BLOCK_SIZE != 0 {
        return Err(WxPayError::DecryptError(format!(
            "ciphertext length must be a positive multiple of {BLOCK_SIZE}, got {}",
            ciphertext.len()
        )));
    }

    let key = derive_key(api_key);
    let cipher = Aes256EcbDec::new_from_slice(key.as_bytes())
        .map_err(|e| WxPayError::DecryptError(format!("create cipher: {e}")))?;

    let plaintext = cipher
        .decrypt_padded_vec_mut::<Pkcs7>(&ciphertext)
        .map_err(|e| WxPayError::DecryptError(format!("decrypt: {e}")))?;

    String::from_utf8(plaintext)
        .map_err(|e| WxPayError::DecryptError(format!("utf8 decode: {e}")))
}

#[cfg(test)]
pub(crate) fn encrypt_aes_256_ecb(api_key: &str, plaintext: &str) -> String {
    use aes::cipher::BlockEncryptMut;

    let key = derive_key(api_key);
    let cipher = ecb::Encryptor::<aes::Aes256>::new_from_slice(key.as_bytes()).unwrap();
    BASE64.encode(cipher.encrypt_padded_vec_mut::<Pkcs7>(plaintext.as_bytes()))
}
