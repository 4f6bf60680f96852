use tracing::warn;

use super::types::{Config, WalletKeyConfig};
use crate::errors::AdminError;
use crate::networks::NetworkRegistry;

impl Config {
    /// Validate the configuration settings for serving the admin API
    pub fn validate(&self) -> Result<(), AdminError> {
        self.validate_for_commands()?;

        // Validate TLS configuration
        self.validate_tls()?;

        // Validate server configuration
        self.validate_server()?;

        // Validate security configuration
        self.validate_security()?;

        Ok(())
    }

    /// Validate the parts of the configuration one-shot commands depend on
    pub fn validate_for_commands(&self) -> Result<(), AdminError> {
        self.validate_wallets()?;
        self.validate_chains()?;
        self.registry()?;
        Ok(())
    }

    /// Built-in network table with this deployment's overrides applied
    pub fn registry(&self) -> Result<NetworkRegistry, AdminError> {
        NetworkRegistry::builtin().with_overrides(&self.networks)
    }

    fn validate_wallets(&self) -> Result<(), AdminError> {
        let wallets = [
            ("evm", &self.wallets.evm),
            ("near", &self.wallets.near),
            ("solana", &self.wallets.solana),
        ];

        for (family, wallet) in wallets {
            if let Some(wallet) = wallet {
                validate_wallet_key(family, wallet)?;
            }
        }

        if let Some(near) = &self.wallets.near {
            match near.account_id.as_deref() {
                Some(account_id) => crate::chains::near::validate_account_id(account_id)?,
                None => {
                    return Err(AdminError::Config(
                        "wallets.near.account_id is required for the NEAR wallet".to_string(),
                    ))
                }
            }
        }

        if let Some(address) = &self.ton.wallet_address {
            crate::chains::ton::parse_address(address)
                .map_err(|e| AdminError::Config(format!("ton.wallet_address: {e}")))?;
        }

        Ok(())
    }

    fn validate_chains(&self) -> Result<(), AdminError> {
        if self.evm.confirmation_timeout_secs == 0 {
            return Err(AdminError::Config(
                "evm.confirmation_timeout_secs must be greater than zero".to_string(),
            ));
        }
        if self.near.gas == 0 {
            return Err(AdminError::Config("near.gas must be greater than zero".to_string()));
        }
        let (create_arg, update_arg) = (self.near.create_fee_arg.trim(), self.near.update_fee_arg.trim());
        if create_arg.is_empty() || update_arg.is_empty() || create_arg == update_arg {
            return Err(AdminError::Config(
                "near.create_fee_arg and near.update_fee_arg must be distinct, non-empty names"
                    .to_string(),
            ));
        }
        if self.solana.confirmation_attempts == 0 {
            return Err(AdminError::Config(
                "solana.confirmation_attempts must be greater than zero".to_string(),
            ));
        }
        if self.ton.api_url.trim().is_empty() {
            return Err(AdminError::Config("ton.api_url cannot be empty".to_string()));
        }
        Ok(())
    }

    /// Validate TLS configuration
    fn validate_tls(&self) -> Result<(), AdminError> {
        if self.tls.enabled {
            if self.tls.cert_file.is_none() || self.tls.key_file.is_none() {
                return Err(AdminError::Config(
                    "TLS certificate and key files are required when TLS is enabled".to_string(),
                ));
            }

            if let Some(cert_file) = &self.tls.cert_file {
                if !std::path::Path::new(cert_file).exists() {
                    return Err(AdminError::Config(format!(
                        "TLS certificate file not found: {cert_file}"
                    )));
                }
            }

            if let Some(key_file) = &self.tls.key_file {
                if !std::path::Path::new(key_file).exists() {
                    return Err(AdminError::Config(format!(
                        "TLS key file not found: {key_file}"
                    )));
                }
            }
        }

        Ok(())
    }

    /// Validate server configuration
    fn validate_server(&self) -> Result<(), AdminError> {
        if self.server.port == 0 {
            return Err(AdminError::Config(
                "Invalid port number: must be between 1 and 65535".to_string(),
            ));
        }

        self.server
            .address
            .parse::<std::net::IpAddr>()
            .map_err(|e| AdminError::Config(format!("Invalid bind address: {e}")))?;

        Ok(())
    }

    /// Validate security configuration and log warnings
    fn validate_security(&self) -> Result<(), AdminError> {
        if self.server.address == "0.0.0.0" && !self.tls.enabled {
            warn!("⚠️  SECURITY WARNING: Server binding to 0.0.0.0 without TLS");
            warn!("⚠️  This exposes the admin API to all network interfaces unencrypted");
            warn!("⚠️  Consider enabling TLS or binding to a specific interface");
        }

        if let Some(token) = &self.security.api_token {
            if token.len() < 16 {
                warn!("⚠️  SECURITY WARNING: API token is shorter than 16 characters");
            }
        }

        let restricted =
            !self.security.allowed_ips.is_empty() || self.security.api_token.is_some();

        if !restricted {
            warn!("⚠️  SECURITY WARNING: No IP allowlist or API token configured");
            warn!("⚠️  Anyone who can reach the API can change fees and withdraw funds");
        }

        // Writes move funds; require at least one of auditing or access restriction
        if !self.audit.enabled && !restricted {
            return Err(AdminError::Config(
                "Either audit logging must be enabled OR access restrictions (allowed_ips or api_token) must be configured (or both)".to_string(),
            ));
        }

        Ok(())
    }
}

fn validate_wallet_key(family: &str, wallet: &WalletKeyConfig) -> Result<(), AdminError> {
    match wallet.backend.as_str() {
        "software" => {
            if wallet.path.is_none() {
                return Err(AdminError::Config(format!(
                    "wallets.{family}: keystore path is required for software backend"
                )));
            }
        }
        "environment" => {
            if wallet.env_var.is_none() {
                return Err(AdminError::Config(format!(
                    "wallets.{family}: environment variable name is required for environment backend"
                )));
            }
            warn!("⚠️  SECURITY WARNING: wallets.{family} uses the environment backend");
            warn!("⚠️  Consider using 'software' backend with encrypted keystore for production");
        }
        "os_keyring" => {
            if wallet.key_name.is_none() {
                return Err(AdminError::Config(format!(
                    "wallets.{family}: key name is required for OS keyring backend"
                )));
            }

            #[cfg(target_env = "musl")]
            {
                return Err(AdminError::Config(
                    "OS keyring backend is not available on MUSL targets due to D-Bus limitations. Use software or environment backend instead.".to_string(),
                ));
            }

            #[cfg(not(any(target_os = "linux", target_os = "macos")))]
            {
                return Err(AdminError::Config(
                    "OS keyring backend is only supported on Linux and macOS".to_string(),
                ));
            }
        }
        other => {
            tracing::debug!(
                "Unknown keystore backend: {}. Supported backends: software, environment, os_keyring",
                other
            );
            return Err(AdminError::Config(format!(
                "wallets.{family}: unknown keystore backend '{other}'"
            )));
        }
    }

    Ok(())
}
