//! Conversion between display units (SOL) and base units (lamports).

use crate::errors::WalletError;

/// Number of base units in one display unit.
pub const LAMPORTS_PER_SOL: u64 = 1_000_000_000;

/// Converts base units to display units.
pub fn lamports_to_sol(lamports: u64) -> f64 {
    lamports as f64 / LAMPORTS_PER_SOL as f64
}

/// Converts a display amount to base units, rounding to the nearest lamport.
///
/// Fails with [`WalletError::InvalidAmount`] for non-finite or non-positive
/// amounts, for amounts that round to zero lamports, and for amounts that do
/// not fit in a `u64`.
pub fn sol_to_lamports(sol: f64) -> Result<u64, WalletError> {
    if !sol.is_finite() || sol <= 0.0 {
        return Err(WalletError::InvalidAmount(format!(
            "amount must be a positive number, got {}",
            sol
        )));
    }

    let lamports = (sol * LAMPORTS_PER_SOL as f64).round();
    if lamports < 1.0 {
        return Err(WalletError::InvalidAmount(format!(
            "{} is smaller than one lamport",
            sol
        )));
    }
    // u64::MAX is not representable as f64; the cast rounds up to 2^64
    if lamports >= u64::MAX as f64 {
        return Err(WalletError::InvalidAmount(format!("{} is too large", sol)));
    }

    Ok(lamports as u64)
}

/// Parses a user-supplied display amount.
pub fn parse_amount(input: &str) -> Result<f64, WalletError> {
    input
        .trim()
        .parse::<f64>()
        .map_err(|e| WalletError::InvalidAmount(format!("'{}': {}", input, e)))
}
