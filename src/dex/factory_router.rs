use std::sync::Arc;

use alloy::primitives::{Address, U256};
use async_trait::async_trait;

use super::{fetch_pair_data, pair_exists, ChainReader, LegReserves, PairInfo, QuoteSource};
use crate::error::{Result, RouteError};
use crate::token::TokenInfo;

/// Router whose factory exposes `getPair`; pair reserves are authoritative
pub struct FactoryRouter<R> {
    label: String,
    factory: Address,
    reader: Arc<R>,
}

impl<R: ChainReader> FactoryRouter<R> {
    pub fn new(label: impl Into<String>, factory: Address, reader: Arc<R>) -> Self {
        Self {
            label: label.into(),
            factory,
            reader,
        }
    }

    pub fn factory(&self) -> Address {
        self.factory
    }

    pub async fn fetch_pair_data(&self, token_a: Address, token_b: Address) -> Result<PairInfo> {
        fetch_pair_data(self.reader.as_ref(), self.factory, token_a, token_b).await
    }
}

#[async_trait]
impl<R: ChainReader + 'static> QuoteSource for FactoryRouter<R> {
    fn label(&self) -> &str {
        &self.label
    }

    fn is_secondary(&self) -> bool {
        false
    }

    fn reserves_authoritative(&self) -> bool {
        true
    }

    async fn pair_exists(&self, token_in: &TokenInfo, token_out: &TokenInfo) -> Result<bool> {
        pair_exists(self.reader.as_ref(), self.factory, token_in.address, token_out.address).await
    }

    async fn try_direct_pair(&self, token_in: &TokenInfo, token_out: &TokenInfo) -> Result<Option<LegReserves>> {
        let pair = match self.fetch_pair_data(token_in.address, token_out.address).await {
            Ok(pair) => pair,
            Err(RouteError::PairNotFound { .. }) => return Ok(None),
            Err(e) => return Err(e),
        };

        if !pair.has_liquidity() {
            tracing::debug!(
                "{}: pair {} for {} / {} has empty reserves",
                self.label,
                pair.address,
                token_in.symbol,
                token_out.symbol
            );
            return Ok(None);
        }

        Ok(pair
            .reserves_for(token_in.address)
            .map(|(reserve_in, reserve_out)| LegReserves {
                reserve_in,
                reserve_out,
                synthetic: false,
            }))
    }

    async fn try_quote(&self, _amount_in: U256, _path: &[Address]) -> Result<Option<U256>> {
        Ok(None)
    }
}
