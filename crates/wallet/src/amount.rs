//! Conversions between decimal amounts and atomic units.
//!
//! Amounts are kept as strings end to end so no precision is lost to floats.

use crate::WalletError;

/// Returns the number of decimals of a known asset.
pub fn asset_decimals(asset_id: &str) -> Result<u32, WalletError> {
    match asset_id {
        "eth" | "weth" => Ok(18),
        "gwei" => Ok(9),
        "wei" => Ok(0),
        "usdc" => Ok(6),
        _ => Err(WalletError::UnsupportedAsset(asset_id.to_owned())),
    }
}

/// Converts a positive decimal amount like `"0.01"` into atomic units.
pub fn to_atomic(amount: &str, decimals: u32) -> Result<String, WalletError> {
    let invalid = || WalletError::InvalidAmount(amount.to_owned());
    let trimmed = amount.trim();
    let (whole, frac) = trimmed.split_once('.').unwrap_or((trimmed, ""));
    let is_digits = |s: &str| s.bytes().all(|b| b.is_ascii_digit());
    if (whole.is_empty() && frac.is_empty())
        || !is_digits(whole)
        || !is_digits(frac)
    {
        return Err(invalid());
    }

    let frac = frac.trim_end_matches('0');
    if frac.len() > decimals as usize {
        return Err(invalid());
    }

    let mut atomic = String::with_capacity(whole.len() + decimals as usize);
    atomic.push_str(whole);
    atomic.push_str(frac);
    atomic.extend(std::iter::repeat_n('0', decimals as usize - frac.len()));
    let atomic = atomic.trim_start_matches('0');
    if atomic.is_empty() {
        return Err(invalid());
    }
    Ok(atomic.to_owned())
}

/// Converts atomic units back into a decimal amount, without trailing zeros.
pub fn from_atomic(atomic: &str, decimals: u32) -> Result<String, WalletError> {
    if atomic.is_empty() || !atomic.bytes().all(|b| b.is_ascii_digit()) {
        return Err(WalletError::InvalidResponse(format!(
            "bad atomic amount `{atomic}`"
        )));
    }
    let decimals = decimals as usize;
    let atomic = atomic.trim_start_matches('0');
    let padded = format!("{atomic:0>width$}", width = decimals + 1);
    let (whole, frac) = padded.split_at(padded.len() - decimals);
    let frac = frac.trim_end_matches('0');
    if frac.is_empty() {
        Ok(whole.to_owned())
    } else {
        Ok(format!("{whole}.{frac}"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_to_atomic() {
        assert_eq!(to_atomic("1", 18).unwrap(), "1000000000000000000");
        assert_eq!(to_atomic("0.01", 18).unwrap(), "10000000000000000");
        assert_eq!(to_atomic("2.50", 6).unwrap(), "2500000");
        assert_eq!(to_atomic(".5", 6).unwrap(), "500000");
        assert_eq!(to_atomic(" 15 ", 0).unwrap(), "15");
    }

    #[test]
    fn test_to_atomic_rejects() {
        for amount in ["", ".", "0", "0.000", "-1", "1e3", "1.2.3", "abc"] {
            assert!(to_atomic(amount, 18).is_err(), "{amount:?}");
        }
        // More precision than the asset supports.
        assert!(to_atomic("0.0000001", 6).is_err());
    }

    #[test]
    fn test_from_atomic() {
        assert_eq!(from_atomic("1000000000000000000", 18).unwrap(), "1");
        assert_eq!(from_atomic("10000000000000000", 18).unwrap(), "0.01");
        assert_eq!(from_atomic("2500000", 6).unwrap(), "2.5");
        assert_eq!(from_atomic("0", 6).unwrap(), "0");
        assert_eq!(from_atomic("42", 0).unwrap(), "42");
        assert!(from_atomic("-1", 6).is_err());
    }

    #[test]
    fn test_asset_decimals() {
        assert_eq!(asset_decimals("usdc").unwrap(), 6);
        assert_eq!(asset_decimals("eth").unwrap(), 18);
        assert!(asset_decimals("doge").is_err());
    }
}
