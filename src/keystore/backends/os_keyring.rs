use async_trait::async_trait;
use tracing::{info, warn};

use crate::errors::AdminError;
use crate::keystore::backends::{BackendUtils, KeystoreBackend};
use crate::keystore::key_material::KeyMaterial;

/// Keyring service all operator keys are stored under
pub const KEYRING_SERVICE: &str = "attestation-admin";

/// OS Keyring backend for secure system-level key storage
#[derive(Debug)]
pub struct OsKeyringBackend {
    key_name: String,
    key_material: Option<KeyMaterial>,
}

impl OsKeyringBackend {
    pub fn new(key_name: String) -> Self {
        Self {
            key_name,
            key_material: None,
        }
    }

    #[cfg(any(target_os = "linux", target_os = "macos"))]
    fn entry(&self) -> Result<keyring::Entry, AdminError> {
        keyring::Entry::new(KEYRING_SERVICE, &self.key_name)
            .map_err(|e| AdminError::Config(format!("Failed to create keyring entry: {e}")))
    }

    /// Store key in OS keyring
    fn store_key_in_keyring(&self, private_key_hex: &str) -> Result<(), AdminError> {
        #[cfg(any(target_os = "linux", target_os = "macos"))]
        {
            info!(
                "Creating keyring entry for service: '{}', account: '{}'",
                KEYRING_SERVICE, self.key_name
            );
            let entry = self.entry()?;
            entry.set_password(private_key_hex).map_err(|e| {
                AdminError::Config(format!("Failed to store key in keyring: {e}"))
            })?;

            // Read back to catch keyrings that silently drop writes
            match entry.get_password() {
                Ok(retrieved) if retrieved == private_key_hex => {
                    info!("✅ Stored operator key '{}' in OS keyring", self.key_name);
                }
                Ok(_) => warn!("⚠️  Key verification failed: retrieved key doesn't match stored key"),
                Err(e) => warn!("⚠️  Key verification failed: {}", e),
            }
            Ok(())
        }

        #[cfg(not(any(target_os = "linux", target_os = "macos")))]
        {
            let _ = private_key_hex;
            Err(AdminError::Config(
                "OS keyring backend is only supported on Linux and macOS".to_string(),
            ))
        }
    }

    /// Load key from OS keyring
    fn load_key_from_keyring(&mut self) -> Result<(), AdminError> {
        #[cfg(any(target_os = "linux", target_os = "macos"))]
        {
            let encoded = self.entry()?.get_password().map_err(|e| {
                AdminError::Config(format!("Failed to load key from keyring: {e}"))
            })?;

            self.key_material = Some(BackendUtils::parse_private_key(&encoded)?);
            info!("Loaded operator key '{}' from OS keyring", self.key_name);
            Ok(())
        }

        #[cfg(not(any(target_os = "linux", target_os = "macos")))]
        {
            Err(AdminError::Config(
                "OS keyring backend is only supported on Linux and macOS".to_string(),
            ))
        }
    }

    fn key_exists_in_keyring(&self) -> bool {
        #[cfg(any(target_os = "linux", target_os = "macos"))]
        {
            self.entry()
                .map(|entry| entry.get_password().is_ok())
                .unwrap_or(false)
        }

        #[cfg(not(any(target_os = "linux", target_os = "macos")))]
        {
            false
        }
    }

    fn delete_key_from_keyring(&self) -> Result<(), AdminError> {
        #[cfg(any(target_os = "linux", target_os = "macos"))]
        {
            let entry = self.entry()?;
            if let Err(e) = entry.get_password() {
                warn!("⚠️  Key not found in keyring: {}", e);
                return Err(AdminError::NotFound(format!(
                    "Key '{}' not found in keyring: {e}",
                    self.key_name
                )));
            }

            entry.delete_credential().map_err(|e| {
                AdminError::Config(format!("Failed to delete key from keyring: {e}"))
            })?;

            info!("✅ Deleted operator key '{}' from OS keyring", self.key_name);
            Ok(())
        }

        #[cfg(not(any(target_os = "linux", target_os = "macos")))]
        {
            Err(AdminError::Config(
                "OS keyring backend is only supported on Linux and macOS".to_string(),
            ))
        }
    }

    fn check_keyring_availability() -> Result<(), AdminError> {
        #[cfg(target_os = "linux")]
        {
            if std::env::var("XDG_RUNTIME_DIR").is_err()
                && std::env::var("DBUS_SESSION_BUS_ADDRESS").is_err()
            {
                warn!("⚠️  No desktop session detected. OS keyring may not be available.");
            }
            Ok(())
        }

        #[cfg(target_os = "macos")]
        {
            Ok(())
        }

        #[cfg(not(any(target_os = "linux", target_os = "macos")))]
        {
            Err(AdminError::Config(
                "OS keyring backend is only supported on Linux and macOS".to_string(),
            ))
        }
    }
}

#[async_trait]
impl KeystoreBackend for OsKeyringBackend {
    async fn init(&mut self, _passphrase: Option<&str>) -> Result<(), AdminError> {
        Self::check_keyring_availability()?;

        // Missing keys are tolerated so that delete works without a load
        if self.key_exists_in_keyring() {
            self.load_key_from_keyring()?;
        }

        Ok(())
    }

    async fn store_key(&self, key_material: &KeyMaterial) -> Result<(), AdminError> {
        Self::check_keyring_availability()?;
        self.store_key_in_keyring(&key_material.to_hex())
    }

    async fn load_key(&self) -> Result<KeyMaterial, AdminError> {
        self.key_material.clone().ok_or_else(|| {
            AdminError::Config(format!(
                "Key '{}' is not present in the OS keyring",
                self.key_name
            ))
        })
    }

    fn is_available(&self) -> bool {
        Self::check_keyring_availability().is_ok() && self.key_exists_in_keyring()
    }

    fn backend_type(&self) -> &'static str {
        "os_keyring"
    }

    fn validate_config(&self) -> Result<(), AdminError> {
        Self::check_keyring_availability()?;

        if self.key_name.is_empty() {
            return Err(AdminError::Config("Key name cannot be empty".to_string()));
        }

        info!("Keyring service: '{}', key: '{}'", KEYRING_SERVICE, self.key_name);
        Ok(())
    }

    async fn delete_key(&self) -> Result<(), AdminError> {
        Self::check_keyring_availability()?;
        self.delete_key_from_keyring()
    }
}
