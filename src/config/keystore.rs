use super::types::WalletKeyConfig;
use crate::errors::AdminError;
use crate::keystore::{BackendConfig, Keystore};
use crate::utils::get_passphrase_securely;

impl WalletKeyConfig {
    /// Whether loading this key needs a passphrase
    pub fn needs_passphrase(&self) -> bool {
        self.backend == "software"
    }

    /// Get passphrase for keystore operations, prompting when `interactive` and none is configured
    pub fn keystore_passphrase(&self, interactive: bool) -> Result<Option<String>, AdminError> {
        if !self.needs_passphrase() {
            return Ok(None);
        }

        if self.passphrase.is_none() && !interactive {
            return Err(AdminError::WalletNotConnected(
                "keystore passphrase is not configured; connect this wallet at startup".to_string(),
            ));
        }

        let passphrase =
            get_passphrase_securely(self.passphrase.clone(), "Enter keystore passphrase: ")
                .map_err(|e| AdminError::Config(format!("Failed to get passphrase: {e}")))?;
        let passphrase = passphrase
            .into_string()
            .map_err(|e| AdminError::Config(format!("Invalid UTF-8 in passphrase: {e}")))?;
        Ok(Some(passphrase))
    }

    /// Create keystore from configuration
    pub fn create_keystore(&self) -> Result<Keystore, AdminError> {
        Keystore::new(self.backend_config()?)
    }

    /// Create backend configuration from config settings
    pub fn backend_config(&self) -> Result<BackendConfig, AdminError> {
        match self.backend.as_str() {
            "software" => {
                let path = self
                    .path
                    .as_ref()
                    .ok_or_else(|| AdminError::Config("Keystore path not set".to_string()))?;
                Ok(BackendConfig::Software {
                    keystore_path: path.clone(),
                })
            }
            "environment" => {
                let env_var = self.env_var.as_ref().ok_or_else(|| {
                    AdminError::Config("Environment variable not set".to_string())
                })?;
                Ok(BackendConfig::Environment {
                    var_name: env_var.clone(),
                })
            }
            "os_keyring" => {
                let key_name = self.key_name.as_ref().ok_or_else(|| {
                    AdminError::Config("Key name not set for OS keyring backend".to_string())
                })?;
                Ok(BackendConfig::OsKeyring {
                    key_name: key_name.clone(),
                })
            }
            other => Err(AdminError::Config(format!(
                "Unknown keystore backend: {other}. Supported backends: software, environment, os_keyring"
            ))),
        }
    }
}
