pub mod factory_router;
pub mod quote_router;
pub mod rpc;
pub mod synthetic;

#[cfg(test)]
pub(crate) mod mock;

use alloy::primitives::{Address, U256};
use async_trait::async_trait;
use serde::Serialize;

use crate::error::{Result, RouteError};
use crate::token::TokenInfo;

pub use factory_router::FactoryRouter;
pub use quote_router::QuoteRouter;
pub use rpc::RpcReader;

/// Read-only on-chain views the engine depends on
#[async_trait]
pub trait ChainReader: Send + Sync {
    /// Factory `getPair`; `Address::ZERO` when no pair is registered
    async fn get_pair(&self, factory: Address, token_a: Address, token_b: Address) -> Result<Address>;

    /// Pair `getReserves` as `(reserve0, reserve1)`
    async fn get_reserves(&self, pair: Address) -> Result<(U256, U256)>;

    async fn token0(&self, pair: Address) -> Result<Address>;

    async fn token1(&self, pair: Address) -> Result<Address>;

    /// Router `getAmountsOut`
    async fn get_amounts_out(&self, router: Address, amount_in: U256, path: &[Address]) -> Result<Vec<U256>>;
}

/// A liquidity pair as reported by the pair contract
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PairInfo {
    pub address: Address,
    pub token0: Address,
    pub token1: Address,
    pub reserve0: U256,
    pub reserve1: U256,
}

impl PairInfo {
    /// Reserves oriented as `(reserve_in, reserve_out)` for a swap selling
    /// `token_in`. Matched by address, never by argument order.
    pub fn reserves_for(&self, token_in: Address) -> Option<(U256, U256)> {
        if token_in == self.token0 {
            Some((self.reserve0, self.reserve1))
        } else if token_in == self.token1 {
            Some((self.reserve1, self.reserve0))
        } else {
            None
        }
    }

    pub fn has_liquidity(&self) -> bool {
        !self.reserve0.is_zero() && !self.reserve1.is_zero()
    }
}

/// Reserves for one directed leg of a route
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LegReserves {
    pub reserve_in: U256,
    pub reserve_out: U256,
    /// Reconstructed from quote samples; only good for impact estimation
    pub synthetic: bool,
}

impl LegReserves {
    pub fn as_tuple(&self) -> (U256, U256) {
        (self.reserve_in, self.reserve_out)
    }
}

/// One router the route finder can price through.
///
/// Tokens passed in are lookup tokens: the native sentinel has already been
/// swapped for the wrapped-native address.
#[async_trait]
pub trait QuoteSource: Send + Sync {
    fn label(&self) -> &str;

    /// Routes through this source are flagged as secondary-router trades
    fn is_secondary(&self) -> bool;

    /// Whether the constant-product formula over this source's reserves
    /// gives the on-chain output. When false, `try_quote` is authoritative.
    fn reserves_authoritative(&self) -> bool;

    async fn pair_exists(&self, token_in: &TokenInfo, token_out: &TokenInfo) -> Result<bool>;

    /// Reserves for a direct `token_in -> token_out` leg, `None` if the
    /// source has no usable pair.
    async fn try_direct_pair(&self, token_in: &TokenInfo, token_out: &TokenInfo) -> Result<Option<LegReserves>>;

    /// The router's own output for `amount_in` along `path`, `None` if the
    /// source does not quote or the path has no liquidity.
    async fn try_quote(&self, amount_in: U256, path: &[Address]) -> Result<Option<U256>>;
}

/// Check whether `factory` has a pair registered for the two tokens
pub async fn pair_exists<R: ChainReader + ?Sized>(
    reader: &R,
    factory: Address,
    token_a: Address,
    token_b: Address,
) -> Result<bool> {
    let pair = reader.get_pair(factory, token_a, token_b).await?;
    Ok(pair != Address::ZERO)
}

/// Resolve the pair through `factory` and read its ordering and reserves
pub async fn fetch_pair_data<R: ChainReader + ?Sized>(
    reader: &R,
    factory: Address,
    token_a: Address,
    token_b: Address,
) -> Result<PairInfo> {
    let pair = reader.get_pair(factory, token_a, token_b).await?;
    if pair == Address::ZERO {
        return Err(RouteError::PairNotFound { token_a, token_b });
    }

    let (token0, token1, (reserve0, reserve1)) = tokio::try_join!(
        reader.token0(pair),
        reader.token1(pair),
        reader.get_reserves(pair),
    )?;

    tracing::debug!(
        "Pair {} ({} / {}): reserves {} / {}",
        pair,
        token0,
        token1,
        reserve0,
        reserve1
    );

    Ok(PairInfo {
        address: pair,
        token0,
        token1,
        reserve0,
        reserve1,
    })
}
