//! Conversion between human decimal strings and chain-native integer amounts.
//!
//! Amounts are fixed-point: `"0.02"` with 18 decimals is `20000000000000000`.
//! Formatting truncates toward zero when a precision is requested.

use ethers::types::U256;
use ethers::utils::{format_units, parse_units};

use crate::errors::AdminError;

/// Digits in `u128::MAX`
const U128_DIGITS: usize = 39;

/// Parse a human decimal string into the smallest unit for `decimals`.
///
/// Only plain non-negative decimals are accepted: no sign, exponent or digit
/// separators, and no significant digits beyond `decimals`.
pub fn parse_token_amount(value: &str, decimals: u32) -> Result<u128, AdminError> {
    let value = value.trim();
    if value.is_empty() {
        return Err(AdminError::InvalidAmount("amount cannot be empty".to_string()));
    }

    let (whole, fraction) = value.split_once('.').unwrap_or((value, ""));
    if whole.is_empty() && fraction.is_empty() {
        return Err(AdminError::InvalidAmount(format!("not a number: {value}")));
    }
    if !whole.chars().all(|c| c.is_ascii_digit()) || !fraction.chars().all(|c| c.is_ascii_digit())
    {
        return Err(AdminError::InvalidAmount(format!(
            "not a non-negative decimal: {value}"
        )));
    }

    let fraction = fraction.trim_end_matches('0');
    if fraction.len() > decimals as usize {
        return Err(AdminError::InvalidAmount(format!(
            "{value} has more than {decimals} fractional digits"
        )));
    }

    let whole = whole.trim_start_matches('0');
    if whole.len() + decimals as usize > U128_DIGITS {
        return Err(AdminError::InvalidAmount(format!("{value} is out of range")));
    }

    let whole = if whole.is_empty() { "0" } else { whole };
    let normalized = if fraction.is_empty() {
        whole.to_string()
    } else {
        format!("{whole}.{fraction}")
    };

    let parsed: U256 = parse_units(&normalized, decimals)
        .map_err(|e| AdminError::InvalidAmount(format!("{value}: {e}")))?
        .into();
    if parsed.bits() > 128 {
        return Err(AdminError::InvalidAmount(format!("{value} is out of range")));
    }
    Ok(parsed.as_u128())
}

/// Format a smallest-unit amount as a decimal string.
///
/// Without `precision` the shortest exact representation is returned. With
/// `precision` the fractional part is truncated or zero-padded to exactly that
/// many digits.
pub fn format_token_amount(raw: u128, decimals: u32, precision: Option<usize>) -> String {
    // format_units only rejects more than 77 decimals
    let formatted = format_units(U256::from(raw), decimals).unwrap_or_else(|_| raw.to_string());
    let (whole, fraction) = formatted.split_once('.').unwrap_or((&formatted, ""));

    let fraction = match precision {
        Some(precision) if precision <= fraction.len() => fraction[..precision].to_string(),
        Some(precision) => format!("{fraction:0<precision$}"),
        None => fraction.trim_end_matches('0').to_string(),
    };

    if fraction.is_empty() {
        whole.to_string()
    } else {
        format!("{whole}.{fraction}")
    }
}

/// Parse a raw integer amount as returned by an RPC (decimal or `0x` hex).
pub fn parse_raw_amount(value: &str) -> Result<u128, AdminError> {
    let value = value.trim();
    let parsed = match value.strip_prefix("0x").or_else(|| value.strip_prefix("0X")) {
        Some(hex) if hex.is_empty() => Ok(0),
        Some(hex) => u128::from_str_radix(hex, 16),
        None => value.parse::<u128>(),
    };
    parsed.map_err(|e| AdminError::ReadError(format!("invalid integer amount '{value}': {e}")))
}
