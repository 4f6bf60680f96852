use clap::{Args, Parser, Subcommand};

use crate::chains::FeeKind;

#[derive(Parser)]
#[command(name = "attestation-admin")]
#[command(about = "Admin console for attestation contract fees across EVM, NEAR, Solana and TON")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// When no subcommand is provided, these args are used for 'start'
    #[command(flatten)]
    pub start_args: StartArgs,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Serve the admin API
    Start(StartArgs),
    /// List supported networks
    Networks(ConfigArgs),
    /// Show current fees and collected balance of a network
    Status(StatusArgs),
    /// Update the create or update attestation fee
    SetFee(SetFeeArgs),
    /// Withdraw collected fees
    Withdraw(WithdrawArgs),
    /// Initialize and create encrypted keystore file
    Init(InitArgs),
    /// Key management commands
    Keys {
        #[command(subcommand)]
        command: KeysCommands,
    },
}

#[derive(Subcommand)]
pub enum KeysCommands {
    /// Add an operator key to the OS keyring
    Add(AddKeyArgs),
    /// Delete an operator key
    Delete(DeleteKeyArgs),
}

#[derive(Args)]
pub struct StartArgs {
    /// Configuration file path
    #[arg(short, long, env = "ADMIN_CONFIG")]
    pub config: Option<String>,

    /// Server bind address
    #[arg(long, env = "ADMIN_ADDRESS", default_value = "127.0.0.1")]
    pub address: String,

    /// Server port
    #[arg(short, long, env = "ADMIN_PORT", default_value = "3000")]
    pub port: u16,

    /// Bearer token required on API requests
    #[arg(long, env = "ADMIN_API_TOKEN")]
    pub api_token: Option<String>,

    /// Enable TLS
    #[arg(long, env = "ADMIN_TLS")]
    pub tls: bool,

    /// TLS certificate file path
    #[arg(long, env = "ADMIN_TLS_CERT")]
    pub tls_cert: Option<String>,

    /// TLS private key file path
    #[arg(long, env = "ADMIN_TLS_KEY")]
    pub tls_key: Option<String>,

    /// Log level
    #[arg(long, env = "RUST_LOG")]
    pub log_level: Option<String>,
}

#[derive(Args, Clone)]
pub struct ConfigArgs {
    /// Configuration file path
    #[arg(short, long, env = "ADMIN_CONFIG")]
    pub config: Option<String>,
}

#[derive(Args)]
pub struct StatusArgs {
    #[command(flatten)]
    pub config: ConfigArgs,

    /// Network id, e.g. "base" or "near"
    pub network: String,
}

#[derive(Args)]
pub struct SetFeeArgs {
    #[command(flatten)]
    pub config: ConfigArgs,

    /// Network id, e.g. "base" or "near"
    pub network: String,

    /// Which fee to change
    #[arg(long, value_enum)]
    pub kind: FeeKind,

    /// New fee as a decimal amount of the native currency
    #[arg(long)]
    pub fee: String,

    /// Account to connect for wallets that are not key-backed (TON)
    #[arg(long)]
    pub account: Option<String>,
}

#[derive(Args)]
pub struct WithdrawArgs {
    #[command(flatten)]
    pub config: ConfigArgs,

    /// Network id, e.g. "base" or "near"
    pub network: String,

    /// Destination address
    #[arg(long)]
    pub to: String,

    /// Amount as a decimal; defaults to the full collected balance
    #[arg(long)]
    pub amount: Option<String>,

    /// Account to connect for wallets that are not key-backed (TON)
    #[arg(long)]
    pub account: Option<String>,
}

#[derive(Args)]
pub struct InitArgs {
    /// Output path for encrypted keystore
    #[arg(short, long)]
    pub output: String,

    /// Private key to encrypt (hex for EVM, hex or base58 for NEAR/Solana)
    #[arg(long)]
    pub private_key: String,

    /// Passphrase for encryption (will be prompted securely if not provided)
    /// Setting this via CLI argument is NOT recommended for security
    #[arg(long)]
    pub passphrase: Option<String>,
}

#[derive(Args)]
pub struct AddKeyArgs {
    /// Key name (like "evm-admin", "near-admin")
    pub key_name: String,

    /// Private key (hex for EVM, hex or base58 for NEAR/Solana)
    #[arg(long)]
    pub private_key: String,

    /// Keystore backend: "software", "os_keyring"
    #[arg(long, default_value = "os_keyring")]
    pub backend: String,

    /// Path for software keystore (required for software backend)
    #[arg(long)]
    pub keystore_path: Option<String>,

    /// Passphrase for encrypted keystore (will be prompted securely)
    /// Setting this via CLI argument is NOT recommended for security
    #[arg(long)]
    pub passphrase: Option<String>,
}

#[derive(Args)]
pub struct DeleteKeyArgs {
    /// Key name to delete
    pub key_name: String,

    /// Keystore backend: "software", "os_keyring"
    #[arg(long, default_value = "os_keyring")]
    pub backend: String,

    /// Path for software keystore (required for software backend)
    #[arg(long)]
    pub keystore_path: Option<String>,

    /// Confirm deletion (safety check)
    #[arg(long)]
    pub confirm: bool,
}
