use std::fs;
use tracing::warn;

use crate::errors::AdminError;
use crate::keystore::key_material::KeyMaterial;

/// Common utilities for keystore backends
pub struct BackendUtils;

impl BackendUtils {
    /// Parse a private key from any supported encoding
    pub fn parse_private_key(encoded: &str) -> Result<KeyMaterial, AdminError> {
        if encoded.trim().is_empty() {
            return Err(AdminError::InvalidKey(
                "Private key cannot be empty".to_string(),
            ));
        }
        KeyMaterial::from_encoded(encoded)
    }

    /// Set restrictive file permissions (Unix only)
    pub fn set_secure_file_permissions(path: &str) -> Result<(), AdminError> {
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            let mut perms = fs::metadata(path)
                .map_err(|e| AdminError::Config(format!("Failed to get file metadata: {e}")))?
                .permissions();
            perms.set_mode(0o600); // rw-------
            fs::set_permissions(path, perms)
                .map_err(|e| AdminError::Config(format!("Failed to set file permissions: {e}")))?;
        }
        Ok(())
    }

    /// Check if a path exists and is readable
    pub fn check_path_readable(path: &str) -> Result<(), AdminError> {
        fs::metadata(path)
            .map_err(|e| AdminError::Config(format!("Cannot access path {path}: {e}")))?;
        Ok(())
    }

    /// Log security warnings for less secure backends
    pub fn log_security_warnings(backend_type: &str) {
        if backend_type == "environment" {
            warn!("⚠️  SECURITY WARNING: Environment backend configured");
            warn!("⚠️  Private keys stored in environment variables are less secure");
            warn!("⚠️  Consider using 'software' backend with encrypted keystore for production");
        }
    }
}
