use tracing::info;

use crate::errors::AdminError;
use crate::keystore::backends::{
    BackendConfig, EnvironmentBackend, KeystoreBackend, OsKeyringBackend, SoftwareBackend,
};
use crate::keystore::key_material::KeyMaterial;

/// Operator keystore over a pluggable backend
#[derive(Debug)]
pub struct Keystore {
    backend: Box<dyn KeystoreBackend>,
}

impl Keystore {
    /// Create a new keystore with the specified backend
    pub fn new(config: BackendConfig) -> Result<Self, AdminError> {
        let backend: Box<dyn KeystoreBackend> = match config {
            BackendConfig::Software { keystore_path } => {
                Box::new(SoftwareBackend::new(keystore_path))
            }
            BackendConfig::Environment { var_name } => Box::new(EnvironmentBackend::new(var_name)),
            BackendConfig::OsKeyring { key_name } => Box::new(OsKeyringBackend::new(key_name)),
        };

        info!("Created keystore with backend: {}", backend.backend_type());

        Ok(Self { backend })
    }

    /// Initialize keystore and load keys
    pub async fn init(&mut self, passphrase: Option<&str>) -> Result<(), AdminError> {
        info!(
            "Initializing keystore backend: {}",
            self.backend.backend_type()
        );

        self.backend.validate_config()?;
        self.backend.init(passphrase).await?;

        info!("✅ Keystore initialized successfully");
        Ok(())
    }

    /// Loaded key material (only available after init)
    pub async fn key_material(&self) -> Result<KeyMaterial, AdminError> {
        self.backend.load_key().await
    }

    /// Store a new key (if supported by backend)
    pub async fn store_key(&self, key_material: &KeyMaterial) -> Result<(), AdminError> {
        self.backend.store_key(key_material).await
    }

    /// Check if the keystore is available and properly configured
    pub fn is_available(&self) -> bool {
        self.backend.is_available()
    }

    /// Get the backend type as a string
    pub fn backend_type(&self) -> &'static str {
        self.backend.backend_type()
    }

    /// Create and save new encrypted keystore (software backend only)
    pub async fn create_keystore(
        keystore_path: &str,
        private_key: &str,
        passphrase: &str,
    ) -> Result<(), AdminError> {
        SoftwareBackend::create_keystore(keystore_path, private_key, passphrase).await
    }

    /// Validate keystore configuration without initializing
    pub fn validate_config(&self) -> Result<(), AdminError> {
        self.backend.validate_config()
    }

    /// Delete key from storage (if supported by backend)
    pub async fn delete_key(&self) -> Result<(), AdminError> {
        info!("Deleting key from {} backend", self.backend.backend_type());
        self.backend.delete_key().await
    }
}
