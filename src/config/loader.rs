use anyhow::Result;
use std::fs;

use super::types::*;
use crate::cli::StartArgs;
use crate::errors::AdminError;

const DEFAULT_ADDRESS: &str = "127.0.0.1";
const DEFAULT_PORT: u16 = 3000;

impl Config {
    /// Load configuration from CLI arguments and optional config file
    pub fn load(cli: StartArgs) -> Result<Self> {
        let file_config = match &cli.config {
            Some(path) => Some(Self::load_from_file(path)?),
            None => None,
        };

        // Start with CLI values
        let cli_config = Self {
            server: ServerConfig {
                address: cli.address.clone(),
                port: cli.port,
            },
            tls: TlsConfig {
                enabled: cli.tls,
                cert_file: cli.tls_cert,
                key_file: cli.tls_key,
            },
            security: SecurityConfig {
                allowed_ips: Vec::new(),
                trusted_proxies: Vec::new(),
                api_token: cli.api_token,
            },
            logging: LoggingConfig {
                level: cli
                    .log_level
                    .unwrap_or_else(|| LoggingConfig::default().level),
            },
            ..Self::default()
        };

        Ok(match file_config {
            Some(file_config) => Self::merge_configurations(cli_config, file_config),
            None => cli_config,
        })
    }

    /// Load the file configuration for one-shot commands, or defaults without a file
    pub fn load_optional(config_path: Option<&str>) -> Result<Self, AdminError> {
        match config_path {
            Some(path) => Self::load_from_file(path),
            None => Ok(Self::default()),
        }
    }

    /// Load configuration from a TOML file
    pub fn load_from_file(config_path: &str) -> Result<Self, AdminError> {
        let config_content = fs::read_to_string(config_path).map_err(|e| {
            AdminError::Config(format!("Failed to read config file {config_path}: {e}"))
        })?;

        Self::from_toml(&config_content)
    }

    pub fn from_toml(content: &str) -> Result<Self, AdminError> {
        toml::from_str(content)
            .map_err(|e| AdminError::Config(format!("Failed to parse config file: {e}")))
    }

    /// Merge CLI and file configurations with proper precedence
    fn merge_configurations(mut cli_config: Self, file_config: Self) -> Self {
        // Config file values override CLI defaults, but explicit CLI args override config file
        if cli_config.server.address == DEFAULT_ADDRESS {
            cli_config.server.address = file_config.server.address;
        }
        if cli_config.server.port == DEFAULT_PORT {
            cli_config.server.port = file_config.server.port;
        }

        if !cli_config.tls.enabled && file_config.tls.enabled {
            cli_config.tls = file_config.tls;
        }

        if cli_config.security.api_token.is_none() {
            cli_config.security.api_token = file_config.security.api_token;
        }
        cli_config.security.allowed_ips = file_config.security.allowed_ips;
        cli_config.security.trusted_proxies = file_config.security.trusted_proxies;

        if cli_config.logging.level == LoggingConfig::default().level {
            cli_config.logging = file_config.logging;
        }

        // Everything else only comes from the config file
        cli_config.audit = file_config.audit;
        cli_config.wallets = file_config.wallets;
        cli_config.evm = file_config.evm;
        cli_config.near = file_config.near;
        cli_config.solana = file_config.solana;
        cli_config.ton = file_config.ton;
        cli_config.networks = file_config.networks;

        cli_config
    }
}
