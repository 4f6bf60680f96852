//! `init` and `keys` subcommands: manage operator keys in keystore backends.

pub mod service;

pub use service::KeyManagementService;

use anyhow::Result;

use crate::cli::{AddKeyArgs, DeleteKeyArgs, InitArgs};

/// Create an encrypted software keystore file
pub async fn init_keystore(args: InitArgs) -> Result<()> {
    KeyManagementService::add_key(
        "software",
        &args.output,
        &args.private_key,
        Some(args.output.clone()),
        args.passphrase,
    )
    .await
}

pub async fn add_key(args: AddKeyArgs) -> Result<()> {
    KeyManagementService::add_key(
        &args.backend,
        &args.key_name,
        &args.private_key,
        args.keystore_path,
        args.passphrase,
    )
    .await
}

pub async fn delete_key(args: DeleteKeyArgs) -> Result<()> {
    KeyManagementService::delete_key(
        &args.backend,
        &args.key_name,
        args.keystore_path,
        args.confirm,
    )
    .await
}
