use anyhow::Result;
use rpassword::prompt_password;
use tracing::{info, warn};

use super::SecureString;

/// Prompt for a passphrase on the terminal
pub fn prompt_for_passphrase(prompt_message: &str) -> Result<SecureString> {
    let passphrase = SecureString::new(prompt_password(prompt_message)?);

    if passphrase.is_empty() {
        return Err(anyhow::anyhow!("Passphrase cannot be empty"));
    }

    if passphrase.len() < 8 {
        warn!("⚠️  Short passphrase detected. Consider using a longer, more secure passphrase.");
    }

    Ok(passphrase)
}

/// Use the passphrase given on the command line or config file, or prompt for one
pub fn get_passphrase_securely(
    configured: Option<String>,
    prompt_message: &str,
) -> Result<SecureString> {
    match configured {
        Some(passphrase) => {
            warn!("⚠️  Passphrase provided via CLI argument or configuration file");
            warn!("⚠️  It may be visible in process lists, shell history or backups");

            let passphrase = SecureString::new(passphrase);
            if passphrase.is_empty() {
                return Err(anyhow::anyhow!("Provided passphrase cannot be empty"));
            }

            Ok(passphrase)
        }
        None => prompt_for_passphrase(prompt_message),
    }
}

/// Prompt twice for a new keystore passphrase
pub fn prompt_for_passphrase_with_confirmation(prompt_message: &str) -> Result<SecureString> {
    warn!("🔐 Creating new encrypted keystore - passphrase confirmation required");

    let passphrase = prompt_for_passphrase(prompt_message)?;
    let confirmation = SecureString::new(prompt_password("Confirm passphrase: ")?);

    if !passphrase.secure_eq(&confirmation) {
        return Err(anyhow::anyhow!("Passphrases do not match"));
    }

    info!("✅ Passphrase confirmed");
    Ok(passphrase)
}
