//! Fee arithmetic: satoshi conversion and size-based fee estimation

use crate::constants::SATOSHIS_PER_BTC;
use crate::error::{EscrowError, Result};

/// Convert a BTC amount (as the node reports it) to satoshis.
pub fn to_satoshis(btc: f64) -> Result<u64> {
    if !btc.is_finite() || btc < 0.0 {
        return Err(EscrowError::InvalidInput(format!(
            "invalid BTC amount: {}",
            btc
        )));
    }
    Ok((btc * SATOSHIS_PER_BTC as f64).round() as u64)
}

/// Fee for a transaction of `size_bytes`, at `rate_btc_per_kb` as returned
/// by `estimatesmartfee`. Computed as ceil(size_kB × rate) in satoshis, so
/// the fee never rounds down below the estimator's rate.
///
/// The size is measured on the unsigned transaction; the signed form is a
/// little larger. Accepted approximation, kept for compatibility with the
/// workflow this replaces.
pub fn fee_for_size(size_bytes: usize, rate_btc_per_kb: f64) -> Result<u64> {
    if !rate_btc_per_kb.is_finite() || rate_btc_per_kb < 0.0 {
        return Err(EscrowError::InvalidInput(format!(
            "invalid fee rate: {}",
            rate_btc_per_kb
        )));
    }
    let rate_sat_per_kb = rate_btc_per_kb * SATOSHIS_PER_BTC as f64;
    let fee = (size_bytes as f64 / 1024.0) * rate_sat_per_kb;
    Ok(fee.ceil() as u64)
}
