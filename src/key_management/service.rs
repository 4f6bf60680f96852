use anyhow::Result;
use tracing::{info, warn};

use crate::keystore::backends::BackendUtils;
use crate::keystore::{BackendConfig, Keystore};
use crate::utils::prompt_for_passphrase_with_confirmation;

const SUPPORTED_BACKENDS: &str = "software, os_keyring";

/// Key management across keystore backends
pub struct KeyManagementService;

impl KeyManagementService {
    /// Store an operator key (hex, or base58 for ed25519 chains)
    pub async fn add_key(
        backend_type: &str,
        key_name: &str,
        private_key: &str,
        keystore_path: Option<String>,
        passphrase: Option<String>,
    ) -> Result<()> {
        info!("Adding key '{}' to {} backend", key_name, backend_type);

        // Reject malformed keys before prompting for anything
        let key_material = BackendUtils::parse_private_key(private_key)?;

        match backend_type {
            "software" => {
                let path = Self::require_path(keystore_path)?;
                let passphrase = Self::new_passphrase(
                    passphrase,
                    &format!("Enter passphrase for keystore '{key_name}': "),
                )?;

                Keystore::create_keystore(&path, private_key, &passphrase).await?;
                info!("✅ Key '{}' written to software keystore: {}", key_name, path);
            }
            "os_keyring" => {
                let keystore = Keystore::new(BackendConfig::OsKeyring {
                    key_name: key_name.to_string(),
                })?;
                keystore.validate_config()?;
                keystore.store_key(&key_material).await?;
                info!("✅ Key '{}' added to OS keyring", key_name);
            }
            "environment" => {
                return Err(anyhow::anyhow!(
                    "Environment backend does not support key addition. Set the environment variable manually."
                ))
            }
            other => {
                return Err(anyhow::anyhow!(
                    "Unknown backend: {other}. Supported backends: {SUPPORTED_BACKENDS}"
                ))
            }
        }

        Ok(())
    }

    pub async fn delete_key(
        backend_type: &str,
        key_name: &str,
        keystore_path: Option<String>,
        confirm: bool,
    ) -> Result<()> {
        if !confirm {
            return Err(anyhow::anyhow!(
                "Key deletion requires confirmation. Use --confirm flag."
            ));
        }

        info!("🗑️  Deleting key '{}' from {} backend", key_name, backend_type);

        match backend_type {
            "software" => {
                let path = Self::require_path(keystore_path)?;
                std::fs::remove_file(&path)?;
                info!("✅ Software keystore file deleted: {}", path);
            }
            "os_keyring" => {
                let mut keystore = Keystore::new(BackendConfig::OsKeyring {
                    key_name: key_name.to_string(),
                })?;
                keystore.validate_config()?;
                keystore.init(None).await?;
                keystore.delete_key().await?;
                info!("✅ Key '{}' deleted from OS keyring", key_name);
            }
            "environment" => {
                return Err(anyhow::anyhow!(
                    "Environment backend does not support key deletion"
                ))
            }
            other => {
                return Err(anyhow::anyhow!(
                    "Unknown backend: {other}. Supported backends: {SUPPORTED_BACKENDS}"
                ))
            }
        }

        Ok(())
    }

    fn require_path(keystore_path: Option<String>) -> Result<String> {
        keystore_path.ok_or_else(|| {
            anyhow::anyhow!("Keystore path is required for software backend (use --keystore-path)")
        })
    }

    fn new_passphrase(provided: Option<String>, prompt: &str) -> Result<String> {
        match provided {
            Some(provided) => {
                warn!("⚠️  SECURITY WARNING: Passphrase provided via CLI argument");
                warn!("⚠️  Consider omitting --passphrase to use secure prompting instead");
                if provided.is_empty() {
                    return Err(anyhow::anyhow!("Passphrase cannot be empty"));
                }
                Ok(provided)
            }
            None => prompt_for_passphrase_with_confirmation(prompt)?
                .into_string()
                .map_err(|e| anyhow::anyhow!("Invalid UTF-8 in passphrase: {e}")),
        }
    }
}
