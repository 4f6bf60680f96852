use async_trait::async_trait;

use crate::errors::AdminError;
use crate::keystore::key_material::KeyMaterial;

/// Trait for keystore backends that provide secure key storage and retrieval
#[async_trait]
pub trait KeystoreBackend: Send + Sync + std::fmt::Debug {
    /// Initialize the backend, with a passphrase where the backend is encrypted
    async fn init(&mut self, passphrase: Option<&str>) -> Result<(), AdminError>;

    /// Store key material securely
    async fn store_key(&self, key_material: &KeyMaterial) -> Result<(), AdminError>;

    /// Load key material from secure storage
    async fn load_key(&self) -> Result<KeyMaterial, AdminError>;

    /// Check if the backend is available and properly configured
    fn is_available(&self) -> bool;

    /// Get a human-readable description of the backend
    fn backend_type(&self) -> &'static str;

    /// Validate backend-specific configuration
    fn validate_config(&self) -> Result<(), AdminError> {
        Ok(())
    }

    /// Delete key from secure storage (if supported)
    async fn delete_key(&self) -> Result<(), AdminError> {
        Err(AdminError::Config(format!(
            "{} backend does not support key deletion",
            self.backend_type()
        )))
    }
}

/// Backend configuration enum
#[derive(Debug, Clone)]
pub enum BackendConfig {
    /// Software-based encrypted storage
    Software { keystore_path: String },
    /// Environment variable (less secure, for development)
    Environment { var_name: String },
    /// OS keyring integration
    OsKeyring { key_name: String },
}

impl BackendConfig {
    /// Get the backend type as a string
    pub fn backend_type(&self) -> &'static str {
        match self {
            BackendConfig::Software { .. } => "software",
            BackendConfig::Environment { .. } => "environment",
            BackendConfig::OsKeyring { .. } => "os_keyring",
        }
    }
}

// Backend implementations
pub mod environment;
pub mod os_keyring;
pub mod software;
pub mod utils;

// Re-exports for convenience
pub use environment::EnvironmentBackend;
pub use os_keyring::OsKeyringBackend;
pub use software::SoftwareBackend;
pub use utils::BackendUtils;
