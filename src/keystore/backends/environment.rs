use async_trait::async_trait;
use tracing::warn;

use crate::errors::AdminError;
use crate::keystore::backends::{BackendUtils, KeystoreBackend};
use crate::keystore::key_material::KeyMaterial;

/// Environment variable keystore backend (for development only)
#[derive(Debug)]
pub struct EnvironmentBackend {
    var_name: String,
    key_material: Option<KeyMaterial>,
}

impl EnvironmentBackend {
    /// Create a new environment backend
    pub fn new(var_name: String) -> Self {
        Self {
            var_name,
            key_material: None,
        }
    }

    /// Load key from environment variable
    fn load_environment_key(&mut self) -> Result<(), AdminError> {
        warn!(
            "⚠️  SECURITY WARNING: Loading operator key from environment variable {}",
            self.var_name
        );
        warn!("⚠️  Environment variables can be visible to other processes and may be logged");

        let encoded = std::env::var(&self.var_name).map_err(|_| {
            AdminError::Config(format!("Environment variable {} not set", self.var_name))
        })?;

        self.key_material = Some(BackendUtils::parse_private_key(&encoded)?);
        Ok(())
    }
}

#[async_trait]
impl KeystoreBackend for EnvironmentBackend {
    async fn init(&mut self, _passphrase: Option<&str>) -> Result<(), AdminError> {
        self.load_environment_key()
    }

    async fn store_key(&self, _key_material: &KeyMaterial) -> Result<(), AdminError> {
        Err(AdminError::Config(
            "Environment backend does not support key storage".to_string(),
        ))
    }

    async fn load_key(&self) -> Result<KeyMaterial, AdminError> {
        self.key_material
            .clone()
            .ok_or_else(|| AdminError::Config("Keystore not initialized".to_string()))
    }

    fn is_available(&self) -> bool {
        std::env::var(&self.var_name).is_ok()
    }

    fn backend_type(&self) -> &'static str {
        "environment"
    }

    fn validate_config(&self) -> Result<(), AdminError> {
        if !self.is_available() {
            warn!("Environment variable {} is not set", self.var_name);
        }

        BackendUtils::log_security_warnings("environment");

        Ok(())
    }
}
