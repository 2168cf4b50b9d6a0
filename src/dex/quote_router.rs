use std::sync::Arc;

use alloy::primitives::{Address, U256};
use async_trait::async_trait;

use super::synthetic::synthesize_reserves;
use super::{fetch_pair_data, ChainReader, LegReserves, QuoteSource};
use crate::error::{Result, RouteError};
use crate::token::TokenInfo;

/// Sample sizes, in whole tokens, used to rebuild reserves
pub const SMALL_SAMPLE_UNITS: u64 = 1;
pub const LARGE_SAMPLE_UNITS: u64 = 1_000;

/// Router priced through its own `getAmountsOut`.
///
/// Reserves come from the factory when one is configured and knows the
/// pair; otherwise they are synthesized from two quote samples.
pub struct QuoteRouter<R> {
    label: String,
    router: Address,
    factory: Option<Address>,
    reader: Arc<R>,
}

impl<R: ChainReader> QuoteRouter<R> {
    pub fn new(label: impl Into<String>, router: Address, factory: Option<Address>, reader: Arc<R>) -> Self {
        Self {
            label: label.into(),
            router,
            factory,
            reader,
        }
    }

    pub fn router(&self) -> Address {
        self.router
    }

    /// A reverted `getAmountsOut` is how these routers report a missing
    /// pool, so errors read as "no quote" rather than failures.
    async fn quote(&self, amount_in: U256, path: &[Address]) -> Option<U256> {
        match self.reader.get_amounts_out(self.router, amount_in, path).await {
            Ok(amounts) => amounts.last().copied().filter(|out| !out.is_zero()),
            Err(e) => {
                tracing::debug!("{}: getAmountsOut {:?} failed: {}", self.label, path, e);
                None
            }
        }
    }

    fn unavailable(&self, reason: impl Into<String>) -> RouteError {
        RouteError::QuoteSourceUnavailable {
            router: self.label.clone(),
            reason: reason.into(),
        }
    }

    async fn factory_reserves(&self, factory: Address, token_in: &TokenInfo, token_out: &TokenInfo) -> Option<LegReserves> {
        match fetch_pair_data(self.reader.as_ref(), factory, token_in.address, token_out.address).await {
            Ok(pair) if pair.has_liquidity() => {
                pair.reserves_for(token_in.address)
                    .map(|(reserve_in, reserve_out)| LegReserves {
                        reserve_in,
                        reserve_out,
                        synthetic: false,
                    })
            }
            Ok(_) => None,
            Err(e) => {
                tracing::debug!("{}: factory lookup unavailable, synthesizing reserves: {}", self.label, e);
                None
            }
        }
    }

    /// Rebuild reserves from quotes at 1 and 1000 whole units of `token_in`
    async fn synthetic_reserves(&self, token_in: &TokenInfo, token_out: &TokenInfo) -> Result<LegReserves> {
        let path = [token_in.address, token_out.address];
        let small_in = token_in.unit() * U256::from(SMALL_SAMPLE_UNITS);
        let large_in = token_in.unit() * U256::from(LARGE_SAMPLE_UNITS);

        let (small_out, large_out) = tokio::join!(
            self.quote(small_in, &path),
            self.quote(large_in, &path),
        );

        let (small_out, large_out) = match (small_out, large_out) {
            (Some(small), Some(large)) => (small, large),
            _ => {
                return Err(self.unavailable(format!(
                    "quote sampling failed for {} -> {}",
                    token_in.symbol, token_out.symbol
                )))
            }
        };

        let (reserve_in, reserve_out) = synthesize_reserves(small_in, small_out, large_in, large_out)
            .ok_or_else(|| self.unavailable("quote samples do not fit a constant-product curve"))?;

        tracing::debug!(
            "{}: synthetic reserves for {} -> {}: {} / {}",
            self.label,
            token_in.symbol,
            token_out.symbol,
            reserve_in,
            reserve_out
        );

        Ok(LegReserves {
            reserve_in,
            reserve_out,
            synthetic: true,
        })
    }
}

#[async_trait]
impl<R: ChainReader + 'static> QuoteSource for QuoteRouter<R> {
    fn label(&self) -> &str {
        &self.label
    }

    fn is_secondary(&self) -> bool {
        true
    }

    fn reserves_authoritative(&self) -> bool {
        false
    }

    async fn pair_exists(&self, token_in: &TokenInfo, token_out: &TokenInfo) -> Result<bool> {
        if let Some(factory) = self.factory {
            if let Ok(true) = super::pair_exists(self.reader.as_ref(), factory, token_in.address, token_out.address).await {
                return Ok(true);
            }
        }
        let quoted = self.quote(token_in.unit(), &[token_in.address, token_out.address]).await;
        Ok(quoted.is_some())
    }

    async fn try_direct_pair(&self, token_in: &TokenInfo, token_out: &TokenInfo) -> Result<Option<LegReserves>> {
        if let Some(factory) = self.factory {
            if let Some(reserves) = self.factory_reserves(factory, token_in, token_out).await {
                return Ok(Some(reserves));
            }
        }
        self.synthetic_reserves(token_in, token_out).await.map(Some)
    }

    async fn try_quote(&self, amount_in: U256, path: &[Address]) -> Result<Option<U256>> {
        Ok(self.quote(amount_in, path).await)
    }
}
