//! Attestation program accounts and instructions.

use borsh::BorshDeserialize;
use sha2::{Digest, Sha256};
use solana_sdk::instruction::{AccountMeta, Instruction};
use solana_sdk::program_pack::Pack;
use solana_sdk::pubkey::Pubkey;
use spl_associated_token_account::get_associated_token_address_with_program_id;
use spl_associated_token_account::instruction::create_associated_token_account;
use spl_token_interface::instruction as token_instruction;
use spl_token_interface::native_mint;
use spl_token_interface::state::Account as TokenAccount;

use crate::constants::solana::*;
use crate::errors::AdminError;

pub fn parse_pubkey(address: &str) -> Result<Pubkey, AdminError> {
    address
        .trim()
        .parse()
        .map_err(|e| AdminError::InvalidAddress(format!("{address}: {e}")))
}

pub fn state_address(program_id: &Pubkey) -> Pubkey {
    Pubkey::find_program_address(&[STATE_SEED], program_id).0
}

/// Wrapped-SOL token account of `owner`
pub fn fee_token_account(owner: &Pubkey) -> Pubkey {
    get_associated_token_address_with_program_id(owner, &native_mint::ID, &spl_token_interface::ID)
}

/// First 8 bytes of `sha256("<namespace>:<name>")`
pub fn discriminator(namespace: &str, name: &str) -> [u8; 8] {
    let hash = Sha256::digest(format!("{namespace}:{name}").as_bytes());
    let mut out = [0u8; 8];
    out.copy_from_slice(&hash[..8]);
    out
}

/// `set_create_attestation_fee` / `set_update_attestation_fee`
pub fn set_fee_instruction(
    program_id: &Pubkey,
    authority: &Pubkey,
    create: bool,
    fee: u64,
) -> Instruction {
    let name = if create { SET_CREATE_FEE_IX } else { SET_UPDATE_FEE_IX };
    let mut data = discriminator("global", name).to_vec();
    data.extend_from_slice(&fee.to_le_bytes());

    Instruction::new_with_bytes(
        *program_id,
        &data,
        vec![
            AccountMeta::new(*authority, true),
            AccountMeta::new(state_address(program_id), false),
        ],
    )
}

/// Close the authority's wSOL account into `destination`, then recreate it
pub fn sweep_instructions(
    authority: &Pubkey,
    destination: &Pubkey,
) -> Result<[Instruction; 2], AdminError> {
    let fee_account = fee_token_account(authority);
    let close = token_instruction::close_account(
        &spl_token_interface::ID,
        &fee_account,
        destination,
        authority,
        &[],
    )
    .map_err(|e| AdminError::Internal(format!("close account instruction: {e}")))?;
    let recreate = create_associated_token_account(
        authority,
        authority,
        &native_mint::ID,
        &spl_token_interface::ID,
    );
    Ok([close, recreate])
}

/// On-chain `State` account, after the 8-byte discriminator
#[derive(Debug, Clone, PartialEq, Eq, BorshDeserialize)]
pub struct ProgramState {
    pub version: u16,
    pub bump: u8,
    pub authority: [u8; 32],
    pub verifying_address: [u8; 64],
    pub fee_mint: [u8; 32],
    pub create_attestation_fee: u64,
    pub update_attestation_fee: u64,
    pub updated_at: i64,
}

impl ProgramState {
    pub fn decode(data: &[u8]) -> Result<Self, AdminError> {
        if data.len() < 8 || data[..8] != discriminator("account", STATE_ACCOUNT) {
            return Err(AdminError::ReadError(
                "state account has an unexpected discriminator".to_string(),
            ));
        }
        let mut body = &data[8..];
        ProgramState::deserialize(&mut body)
            .map_err(|e| AdminError::ReadError(format!("state account is malformed: {e}")))
    }

    pub fn authority(&self) -> Pubkey {
        Pubkey::new_from_array(self.authority)
    }
}

/// `amount` of an initialized SPL token account
pub fn token_account_amount(data: &[u8]) -> Result<u64, AdminError> {
    TokenAccount::unpack(data)
        .map(|account| account.amount)
        .map_err(|e| AdminError::ReadError(format!("token account: {e}")))
}
