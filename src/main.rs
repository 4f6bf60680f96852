use anyhow::Result;
use clap::Parser;
use tracing::{info, warn};

use attestation_admin::key_management::{add_key, delete_key, init_keystore};
use attestation_admin::services::AdminService;
use attestation_admin::{
    AppState, Cli, Commands, Config, ConfigArgs, KeysCommands, Server, SetFeeArgs, StartArgs,
    StatusArgs, WithdrawArgs,
};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Some(Commands::Start(args)) => start_server(args).await,
        Some(Commands::Networks(args)) => list_networks(args),
        Some(Commands::Status(args)) => show_status(args).await,
        Some(Commands::SetFee(args)) => set_fee(args).await,
        Some(Commands::Withdraw(args)) => withdraw(args).await,
        Some(Commands::Init(args)) => {
            init_logging("info")?;
            init_keystore(args).await?;
            warn!("⚠️  Keep your passphrase secure - it cannot be recovered!");
            Ok(())
        }
        Some(Commands::Keys { command }) => {
            init_logging("info")?;
            match command {
                KeysCommands::Add(args) => add_key(args).await,
                KeysCommands::Delete(args) => delete_key(args).await,
            }
        }
        None => start_server(cli.start_args).await,
    }
}

fn init_logging(level: &str) -> Result<()> {
    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(level)
        .compact()
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;
    Ok(())
}

async fn start_server(args: StartArgs) -> Result<()> {
    let config = Config::load(args)?;
    init_logging(&config.logging.level)?;

    info!("Starting attestation admin v{}", env!("CARGO_PKG_VERSION"));
    config.validate()?;

    info!("📊 Configuration loaded:");
    info!("  Server: {}:{}", config.server.address, config.server.port);
    for (family, source) in [
        ("evm", &config.wallets.evm),
        ("near", &config.wallets.near),
        ("solana", &config.wallets.solana),
    ] {
        match source {
            Some(source) => info!("  {} wallet: {} backend", family, source.backend),
            None => info!("  {} wallet: not configured", family),
        }
    }

    if !config.security.allowed_ips.is_empty() {
        info!("🔒 Allowed IPs: [{}]", config.security.allowed_ips.join(", "));
    } else {
        warn!("⚠️  No IP restrictions configured - all IPs allowed!");
    }

    if !config.security.trusted_proxies.is_empty() {
        info!(
            "🔁 Forwarding headers trusted from: [{}]",
            config.security.trusted_proxies.join(", ")
        );
    }

    if config.security.api_token.is_some() {
        info!("🔒 Bearer token required on every request");
    } else {
        warn!("⚠️  No API token configured - any allowed client can submit writes!");
    }

    if config.audit.enabled {
        info!("📝 Audit logging enabled: {}", config.audit.log_path);
    } else {
        warn!("⚠️  Audit logging disabled");
    }

    if !config.tls.enabled {
        warn!("⚠️  TLS disabled - communications are not encrypted! This is not recommended for production.");
    }

    let server = Server::new(config)?;
    // Passphrases can only be prompted for before the server takes over the terminal
    server.state().sessions.connect_configured(true).await;
    server.serve().await?;

    Ok(())
}

/// Shared setup for one-shot commands
fn command_state(args: &ConfigArgs) -> Result<AppState> {
    let config = Config::load_optional(args.config.as_deref())?;
    init_logging(&config.logging.level)?;
    config.validate_for_commands()?;
    Ok(AppState::new(config)?)
}

/// Connect only the wallet the command's network needs, prompting if required
async fn connect_wallet(state: &AppState, network: &str, account: Option<String>) -> Result<()> {
    let family = state.registry.lookup(network)?.family();
    let account = state.sessions.connect(family, account, true).await?;
    info!("Using {} account {}", family, account);
    Ok(())
}

fn list_networks(args: ConfigArgs) -> Result<()> {
    let config = Config::load_optional(args.config.as_deref())?;
    let registry = config.registry()?;

    println!("{:<12} {:<22} {:<7} {:<7} FEE CONTRACT", "ID", "NAME", "FAMILY", "SYMBOL");
    for descriptor in registry.all() {
        println!(
            "{:<12} {:<22} {:<7} {:<7} {}",
            descriptor.id.as_str(),
            descriptor.name,
            descriptor.family().as_str(),
            descriptor.native_currency.symbol,
            descriptor.fee_contract().unwrap_or("-"),
        );
    }
    Ok(())
}

async fn show_status(args: StatusArgs) -> Result<()> {
    let state = command_state(&args.config)?;
    let controller = state.controller(&args.network)?;

    controller.load().await?;
    println!("{}", serde_json::to_string_pretty(&controller.snapshot().await)?);
    Ok(())
}

async fn set_fee(args: SetFeeArgs) -> Result<()> {
    let state = command_state(&args.config)?;
    let controller = state.controller(&args.network)?;
    connect_wallet(&state, &args.network, args.account).await?;

    controller.load().await?;
    let receipt = AdminService::update_fee(
        &controller,
        state.audit_logger.as_ref(),
        args.kind,
        &args.fee,
        "cli",
    )
    .await?;

    println!("{}", serde_json::to_string_pretty(&receipt)?);
    println!("{}", serde_json::to_string_pretty(&controller.snapshot().await)?);
    Ok(())
}

async fn withdraw(args: WithdrawArgs) -> Result<()> {
    let state = command_state(&args.config)?;
    let controller = state.controller(&args.network)?;
    connect_wallet(&state, &args.network, args.account).await?;

    controller.load().await?;
    let receipt = AdminService::withdraw(
        &controller,
        state.audit_logger.as_ref(),
        &args.to,
        args.amount.as_deref(),
        "cli",
    )
    .await?;

    println!("{}", serde_json::to_string_pretty(&receipt)?);
    println!("{}", serde_json::to_string_pretty(&controller.snapshot().await)?);
    Ok(())
}
