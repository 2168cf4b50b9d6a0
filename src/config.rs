//! Router configuration
//!
//! Everything comes from the environment (a `.env` file is loaded by the
//! binary first). Only the contract addresses are mandatory.

use alloy::primitives::Address;
use eyre::{eyre, Result, WrapErr};
use rust_decimal::Decimal;

use crate::routing::RoutingConfig;
use crate::token::TokenInfo;

pub mod defaults {
    use rust_decimal::Decimal;
    use rust_decimal_macros::dec;

    pub const RPC_URL: &str = "http://127.0.0.1:8545";
    pub const NATIVE_SYMBOL: &str = "ETH";
    pub const SLIPPAGE_PERCENT: Decimal = dec!(0.5);

    pub const PRIMARY_LABEL: &str = "primary";
    pub const SECONDARY_LABEL: &str = "secondary";
}

pub mod env_keys {
    pub const RPC_URL: &str = "RPC_URL";
    pub const PRIMARY_ROUTER: &str = "PRIMARY_ROUTER";
    pub const PRIMARY_FACTORY: &str = "PRIMARY_FACTORY";
    pub const SECONDARY_ROUTER: &str = "SECONDARY_ROUTER";
    pub const SECONDARY_FACTORY: &str = "SECONDARY_FACTORY";
    pub const WRAPPED_NATIVE: &str = "WRAPPED_NATIVE";
    pub const NATIVE_SYMBOL: &str = "NATIVE_SYMBOL";
    pub const BRIDGE_TOKENS: &str = "BRIDGE_TOKENS";
    pub const DEFAULT_SLIPPAGE_PERCENT: &str = "DEFAULT_SLIPPAGE_PERCENT";
}

/// Factory-backed router; its pairs are priced from reserves
#[derive(Debug, Clone)]
pub struct PrimaryEndpoint {
    pub label: String,
    pub router: Address,
    pub factory: Address,
}

/// Quote-only router; a factory is used for reserves when known
#[derive(Debug, Clone)]
pub struct SecondaryEndpoint {
    pub label: String,
    pub router: Address,
    pub factory: Option<Address>,
}

#[derive(Debug, Clone)]
pub struct RouterConfig {
    pub rpc_url: String,
    pub primary: PrimaryEndpoint,
    pub secondary: SecondaryEndpoint,
    pub wrapped_native: TokenInfo,
    pub native_symbol: String,
    /// Intermediate tokens in priority order (wrapped-native is implied first)
    pub bridge_tokens: Vec<TokenInfo>,
    pub default_slippage_percent: Decimal,
}

impl RouterConfig {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from any key lookup; empty values count as unset
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());
        let required = |key: &str| get(key).ok_or_else(|| eyre!("{} must be set", key));

        let native_symbol = get(env_keys::NATIVE_SYMBOL).unwrap_or_else(|| defaults::NATIVE_SYMBOL.to_string());
        let wrapped_symbol = format!("W{}", native_symbol);
        let wrapped_native = TokenInfo::new(
            parse_address(env_keys::WRAPPED_NATIVE, &required(env_keys::WRAPPED_NATIVE)?)?,
            wrapped_symbol,
            format!("Wrapped {}", native_symbol),
            18,
        );

        let secondary_factory = match get(env_keys::SECONDARY_FACTORY) {
            Some(value) => Some(parse_address(env_keys::SECONDARY_FACTORY, &value)?),
            None => None,
        };

        let bridge_tokens = match get(env_keys::BRIDGE_TOKENS) {
            Some(value) => parse_bridge_tokens(&value)?,
            None => Vec::new(),
        };

        let default_slippage_percent = match get(env_keys::DEFAULT_SLIPPAGE_PERCENT) {
            Some(value) => parse_slippage(&value)?,
            None => defaults::SLIPPAGE_PERCENT,
        };

        Ok(Self {
            rpc_url: get(env_keys::RPC_URL).unwrap_or_else(|| defaults::RPC_URL.to_string()),
            primary: PrimaryEndpoint {
                label: defaults::PRIMARY_LABEL.to_string(),
                router: parse_address(env_keys::PRIMARY_ROUTER, &required(env_keys::PRIMARY_ROUTER)?)?,
                factory: parse_address(env_keys::PRIMARY_FACTORY, &required(env_keys::PRIMARY_FACTORY)?)?,
            },
            secondary: SecondaryEndpoint {
                label: defaults::SECONDARY_LABEL.to_string(),
                router: parse_address(env_keys::SECONDARY_ROUTER, &required(env_keys::SECONDARY_ROUTER)?)?,
                factory: secondary_factory,
            },
            wrapped_native,
            native_symbol,
            bridge_tokens,
            default_slippage_percent,
        })
    }

    pub fn routing(&self) -> RoutingConfig {
        RoutingConfig::new(self.wrapped_native.clone(), self.bridge_tokens.clone())
    }

    pub fn native_token(&self) -> TokenInfo {
        TokenInfo::native(self.native_symbol.clone())
    }

    /// Router a trade has to be sent to
    pub fn router_address(&self, is_secondary_router: bool) -> Address {
        if is_secondary_router {
            self.secondary.router
        } else {
            self.primary.router
        }
    }

    /// A configured token (wrapped-native or bridge) by address
    pub fn known_token(&self, address: Address) -> Option<&TokenInfo> {
        std::iter::once(&self.wrapped_native)
            .chain(self.bridge_tokens.iter())
            .find(|t| t.address == address)
    }
}

fn parse_address(key: &str, value: &str) -> Result<Address> {
    value
        .parse::<Address>()
        .wrap_err_with(|| format!("{} is not a valid address: {}", key, value))
}

fn parse_slippage(value: &str) -> Result<Decimal> {
    let slippage: Decimal = value
        .parse()
        .wrap_err_with(|| format!("invalid slippage percent: {}", value))?;
    if slippage < Decimal::ZERO || slippage > Decimal::ONE_HUNDRED {
        return Err(eyre!("slippage percent must be within 0..=100, got {}", slippage));
    }
    Ok(slippage)
}

/// Parse `SYMBOL:0xaddress:decimals` entries separated by commas. Order is
/// kept; it is the bridge search priority.
pub fn parse_bridge_tokens(value: &str) -> Result<Vec<TokenInfo>> {
    value
        .split(',')
        .map(str::trim)
        .filter(|entry| !entry.is_empty())
        .map(|entry| {
            let parts: Vec<&str> = entry.split(':').map(str::trim).collect();
            let [symbol, address, decimals] = parts.as_slice() else {
                return Err(eyre!("bridge token entry must be SYMBOL:ADDRESS:DECIMALS, got {}", entry));
            };
            let address = parse_address(env_keys::BRIDGE_TOKENS, address)?;
            let decimals: u8 = decimals
                .parse()
                .wrap_err_with(|| format!("invalid decimals for {}: {}", symbol, decimals))?;
            Ok(TokenInfo::new(address, *symbol, *symbol, decimals))
        })
        .collect()
}

#[cfg(test)]
pub(crate) fn test_config() -> RouterConfig {
    RouterConfig {
        rpc_url: defaults::RPC_URL.to_string(),
        primary: PrimaryEndpoint {
            label: defaults::PRIMARY_LABEL.to_string(),
            router: Address::repeat_byte(0xa1),
            factory: Address::repeat_byte(0xfa),
        },
        secondary: SecondaryEndpoint {
            label: defaults::SECONDARY_LABEL.to_string(),
            router: Address::repeat_byte(0x5e),
            factory: None,
        },
        wrapped_native: TokenInfo::new(Address::repeat_byte(0x77), "WETH", "Wrapped ETH", 18),
        native_symbol: defaults::NATIVE_SYMBOL.to_string(),
        bridge_tokens: vec![
            TokenInfo::new(Address::repeat_byte(0x55), "USDC", "USDC", 6),
            TokenInfo::new(Address::repeat_byte(0xda), "DAI", "DAI", 18),
        ],
        default_slippage_percent: defaults::SLIPPAGE_PERCENT,
    }
}
