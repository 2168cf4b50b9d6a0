//! Token descriptors and native asset handling

use alloy::primitives::{address, Address, U256};
use serde::{Deserialize, Serialize};

/// Placeholder address for the chain's native coin. It has no contract, so it
/// must never reach a factory or router call.
pub const NATIVE_SENTINEL: Address = address!("EeeeeEeeeEeEeeEeEeEeeEEEeeeeEeeeeeeeEEeE");

/// Immutable token descriptor
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TokenInfo {
    pub address: Address,
    pub symbol: String,
    pub name: String,
    pub decimals: u8,
}

impl TokenInfo {
    pub fn new(address: Address, symbol: impl Into<String>, name: impl Into<String>, decimals: u8) -> Self {
        Self {
            address,
            symbol: symbol.into(),
            name: name.into(),
            decimals,
        }
    }

    /// Native coin descriptor (always 18 decimals on EVM chains)
    pub fn native(symbol: impl Into<String>) -> Self {
        let symbol = symbol.into();
        Self {
            address: NATIVE_SENTINEL,
            name: symbol.clone(),
            symbol,
            decimals: 18,
        }
    }

    pub fn is_native(&self) -> bool {
        self.address == NATIVE_SENTINEL
    }

    /// Address to use for pair lookups and router paths
    pub fn lookup_address(&self, wrapped_native: Address) -> Address {
        normalize_address(self.address, wrapped_native)
    }

    /// One whole token in raw units (10^decimals)
    pub fn unit(&self) -> U256 {
        U256::from(10u64).pow(U256::from(self.decimals))
    }
}

impl std::fmt::Display for TokenInfo {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} ({})", self.symbol, self.address)
    }
}

pub fn normalize_address(address: Address, wrapped_native: Address) -> Address {
    if address == NATIVE_SENTINEL {
        wrapped_native
    } else {
        address
    }
}

/// Token path as router-ready addresses
pub fn normalize_path(path: &[TokenInfo], wrapped_native: Address) -> Vec<Address> {
    path.iter()
        .map(|t| t.lookup_address(wrapped_native))
        .collect()
}
