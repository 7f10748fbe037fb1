use crate::{PnLError, Result};
use regex::Regex;
use tracing::debug;

/// Base58 alphabet, 32 to 44 characters.
const ADDRESS_PATTERN: &str = r"^[1-9A-HJ-NP-Za-km-z]{32,44}$";

/// Validate a wallet address and return it trimmed.
pub fn validate_address(address: &str) -> Result<String> {
    let trimmed = address.trim();
    if trimmed.is_empty() {
        return Err(PnLError::InvalidAddress(
            "Wallet address is required".to_string(),
        ));
    }

    let re = Regex::new(ADDRESS_PATTERN)
        .map_err(|e| PnLError::Configuration(format!("Regex error: {}", e)))?;

    if !re.is_match(trimmed) {
        debug!("Rejected wallet address: {}", trimmed);
        return Err(PnLError::InvalidAddress(
            "Invalid Solana wallet address".to_string(),
        ));
    }

    Ok(trimmed.to_string())
}

pub fn is_valid_address(address: &str) -> bool {
    validate_address(address).is_ok()
}
