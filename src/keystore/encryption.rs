use josekit::jwe::{JweHeader, PBES2_HS256_A128KW};

use crate::errors::AdminError;

/// Compact JWE token holding one operator key
pub type EncryptedKeystore = String;

/// `cty` header marking tokens written by this tool
const KEY_CONTENT_TYPE: &str = "attestation-admin-key+v1";

/// Encrypt a 32-byte key with PBES2-HS256+A128KW key wrapping and A256GCM content encryption
pub fn encrypt_key(
    private_key: &[u8; 32],
    passphrase: &str,
) -> Result<EncryptedKeystore, AdminError> {
    if passphrase.is_empty() {
        return Err(AdminError::Crypto("Passphrase cannot be empty".to_string()));
    }

    let mut header = JweHeader::new();
    header.set_algorithm("PBES2-HS256+A128KW");
    header.set_content_encryption("A256GCM");
    header.set_content_type(KEY_CONTENT_TYPE);

    let encrypter = PBES2_HS256_A128KW
        .encrypter_from_bytes(passphrase.as_bytes())
        .map_err(|e| AdminError::Crypto(format!("Failed to create encrypter: {e}")))?;

    josekit::jwe::serialize_compact(private_key, &header, &encrypter)
        .map_err(|e| AdminError::Crypto(format!("Encryption failed: {e}")))
}

/// Decrypt a key written by [`encrypt_key`]
pub fn decrypt_key(jwe_token: &str, passphrase: &str) -> Result<[u8; 32], AdminError> {
    let decrypter = PBES2_HS256_A128KW
        .decrypter_from_bytes(passphrase.as_bytes())
        .map_err(|e| AdminError::Crypto(format!("Failed to create decrypter: {e}")))?;

    let (decrypted, header) = josekit::jwe::deserialize_compact(jwe_token, &decrypter)
        .map_err(|e| AdminError::Crypto(format!("Decryption failed: {e}")))?;

    if let Some(content_type) = header.content_type() {
        if content_type != KEY_CONTENT_TYPE {
            return Err(AdminError::InvalidKey(format!(
                "Unexpected keystore content type: {content_type}"
            )));
        }
    }

    decrypted.as_slice().try_into().map_err(|_| {
        AdminError::InvalidKey(format!(
            "Invalid decrypted key length: expected 32 bytes, got {}",
            decrypted.len()
        ))
    })
}
