//! Wallet balances shown on the account settings screen.

use crate::error::{Result, WaypointError};
use async_trait::async_trait;
use std::fmt;
use std::str::FromStr;

const WEI_PER_ETHER: u128 = 1_000_000_000_000_000_000;
const ETHER_DECIMALS: usize = 18;

/// A balance in wei, the smallest ether unit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default)]
pub struct WeiBalance(u128);

impl WeiBalance {
    pub fn new(wei: u128) -> Self {
        Self(wei)
    }

    pub fn wei(self) -> u128 {
        self.0
    }

    /// Exact ether amount with trailing zeros trimmed, e.g. `"1.5"`.
    pub fn to_ether_string(self) -> String {
        let whole = self.0 / WEI_PER_ETHER;
        let fraction = self.0 % WEI_PER_ETHER;
        if fraction == 0 {
            return whole.to_string();
        }
        let digits = format!("{fraction:0width$}", width = ETHER_DECIMALS);
        format!("{whole}.{}", digits.trim_end_matches('0'))
    }
}

impl FromStr for WeiBalance {
    type Err = WaypointError;

    fn from_str(s: &str) -> Result<Self> {
        s.trim()
            .parse::<u128>()
            .map(Self)
            .map_err(|e| WaypointError::validation(format!("invalid wei amount '{s}': {e}")))
    }
}

impl fmt::Display for WeiBalance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ETH", self.to_ether_string())
    }
}

/// Checks that an address looks like `0x` followed by 40 hex digits.
pub fn validate_address(address: &str) -> Result<()> {
    let hex = address
        .strip_prefix("0x")
        .or_else(|| address.strip_prefix("0X"))
        .ok_or_else(|| WaypointError::validation(format!("address '{address}' must start with 0x")))?;
    if hex.len() != 40 || !hex.chars().all(|c| c.is_ascii_hexdigit()) {
        return Err(WaypointError::validation(format!(
            "address '{address}' must have 40 hex digits"
        )));
    }
    Ok(())
}

/// Public explorer page for an address.
pub fn explorer_url(address: &str) -> String {
    format!("https://etherscan.io/address/{address}")
}

/// Looks up the balance held by a public address.
#[async_trait]
pub trait WalletBalanceService: Send + Sync {
    async fn balance(&self, address: &str) -> Result<WeiBalance>;
}
