use async_trait::async_trait;
use std::fs;
use std::path::Path;
use tracing::{info, warn};

use crate::errors::AdminError;
use crate::keystore::backends::{BackendUtils, KeystoreBackend};
use crate::keystore::encryption::{decrypt_key, encrypt_key};
use crate::keystore::key_material::KeyMaterial;

/// Software-based keystore backend using a JWE-encrypted file
#[derive(Debug)]
pub struct SoftwareBackend {
    keystore_path: String,
    key_material: Option<KeyMaterial>,
}

impl SoftwareBackend {
    /// Create a new software backend
    pub fn new(keystore_path: String) -> Self {
        Self {
            keystore_path,
            key_material: None,
        }
    }

    /// Create and save new encrypted keystore
    pub async fn create_keystore(
        keystore_path: &str,
        private_key: &str,
        passphrase: &str,
    ) -> Result<(), AdminError> {
        let key_material = BackendUtils::parse_private_key(private_key)?;
        let jwe_token = encrypt_key(key_material.raw_bytes(), passphrase)?;

        fs::write(keystore_path, &jwe_token)
            .map_err(|e| AdminError::Config(format!("Failed to write keystore: {e}")))?;

        BackendUtils::set_secure_file_permissions(keystore_path)?;

        info!("Created encrypted keystore at: {}", keystore_path);
        Ok(())
    }

    /// Load encrypted software key
    fn load_software_key(&mut self, passphrase: &str) -> Result<(), AdminError> {
        let jwe_token = fs::read_to_string(&self.keystore_path)
            .map_err(|e| AdminError::Config(format!("Failed to read keystore: {e}")))?;

        let decrypted_key = decrypt_key(jwe_token.trim(), passphrase)?;
        self.key_material = Some(KeyMaterial::from_bytes(decrypted_key));

        info!("Loaded encrypted keystore from: {}", self.keystore_path);
        Ok(())
    }
}

#[async_trait]
impl KeystoreBackend for SoftwareBackend {
    async fn init(&mut self, passphrase: Option<&str>) -> Result<(), AdminError> {
        let passphrase = passphrase.ok_or_else(|| {
            AdminError::Config("Passphrase required for encrypted keystore".to_string())
        })?;

        if !Path::new(&self.keystore_path).exists() {
            return Err(AdminError::Config(format!(
                "Keystore file {} does not exist. Use 'init' command to create it.",
                self.keystore_path
            )));
        }

        self.load_software_key(passphrase)
    }

    async fn store_key(&self, _key_material: &KeyMaterial) -> Result<(), AdminError> {
        // Keys are created via the init command
        Err(AdminError::Config(
            "Software backend does not support runtime key storage. Use 'init' command to create keystore.".to_string()
        ))
    }

    async fn load_key(&self) -> Result<KeyMaterial, AdminError> {
        self.key_material
            .clone()
            .ok_or_else(|| AdminError::Config("Keystore not initialized".to_string()))
    }

    fn is_available(&self) -> bool {
        Path::new(&self.keystore_path).exists()
    }

    fn backend_type(&self) -> &'static str {
        "software"
    }

    fn validate_config(&self) -> Result<(), AdminError> {
        if !Path::new(&self.keystore_path).exists() {
            warn!("Keystore file does not exist: {}", self.keystore_path);
            return Ok(()); // fails at init
        }

        BackendUtils::check_path_readable(&self.keystore_path)
    }

    async fn delete_key(&self) -> Result<(), AdminError> {
        fs::remove_file(&self.keystore_path)
            .map_err(|e| AdminError::Config(format!("Failed to delete keystore file: {e}")))?;
        info!("✅ Software keystore file deleted: {}", self.keystore_path);
        Ok(())
    }
}
