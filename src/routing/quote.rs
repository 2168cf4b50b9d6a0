use std::sync::Arc;

use alloy::primitives::U256;
use rust_decimal::Decimal;
use serde::Serialize;
use tracing::info;

use super::finder::RouteFinder;
use super::trade::{build_trade_with, TradeInfo};
use crate::amm::{minimum_amount_out, validate_slippage};
use crate::config::RouterConfig;
use crate::dex::{ChainReader, FactoryRouter, QuoteRouter, QuoteSource};
use crate::error::{Result, RouteError};
use crate::token::TokenInfo;

/// What a caller needs to build the swap transaction
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SwapQuote {
    pub trade: TradeInfo,
    pub slippage_percent: Decimal,
    pub minimum_amount_out: U256,
}

pub struct Quoter {
    finder: RouteFinder,
}

impl Quoter {
    pub fn new(finder: RouteFinder) -> Self {
        Self { finder }
    }

    pub fn finder(&self) -> &RouteFinder {
        &self.finder
    }

    /// Route and price a trade
    pub async fn best_trade(&self, token_in: &TokenInfo, token_out: &TokenInfo, amount_in: U256) -> Result<TradeInfo> {
        if amount_in.is_zero() {
            return Err(RouteError::InsufficientInputAmount);
        }

        let route = self.finder.find_route(token_in, token_out, amount_in).await;
        if !route.exists {
            return Err(RouteError::NoRouteFound);
        }

        let config = self.finder.config();
        build_trade_with(&route, amount_in, config.wrapped_native.address, config.multi_hop_premium)
    }

    /// Route, price and apply slippage protection. Slippage is checked
    /// before any chain traffic.
    pub async fn quote(
        &self,
        token_in: &TokenInfo,
        token_out: &TokenInfo,
        amount_in: U256,
        slippage_percent: Decimal,
    ) -> Result<SwapQuote> {
        validate_slippage(slippage_percent)?;

        let trade = self.best_trade(token_in, token_out, amount_in).await?;
        let minimum_amount_out = minimum_amount_out(trade.output_amount, slippage_percent)?;

        info!(
            "Quote {} {} -> {} {} (min {}, impact {}%)",
            trade.input_amount,
            token_in.symbol,
            trade.output_amount,
            token_out.symbol,
            minimum_amount_out,
            trade.price_impact
        );

        Ok(SwapQuote {
            trade,
            slippage_percent,
            minimum_amount_out,
        })
    }
}

/// Wire the primary factory router and the secondary quote router over one
/// chain reader
pub fn build_quoter<R: ChainReader + 'static>(reader: Arc<R>, config: &RouterConfig) -> Quoter {
    let sources: Vec<Arc<dyn QuoteSource>> = vec![
        Arc::new(FactoryRouter::new(
            config.primary.label.clone(),
            config.primary.factory,
            reader.clone(),
        )),
        Arc::new(QuoteRouter::new(
            config.secondary.label.clone(),
            config.secondary.router,
            config.secondary.factory,
            reader,
        )),
    ];

    Quoter::new(RouteFinder::new(sources, config.routing()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::test_config;
    use crate::dex::mock::MockChain;
    use rust_decimal_macros::dec;

    #[tokio::test]
    async fn test_quote_applies_slippage() {
        let config = test_config();
        let (a, b) = (config.bridge_tokens[0].clone(), config.bridge_tokens[1].clone());
        let mut chain = MockChain::new();
        chain.add_pair(config.primary.factory, a.address, 1_000_000, b.address, 2_000_000);
        let quoter = build_quoter(Arc::new(chain), &config);

        let quote = quoter.quote(&a, &b, U256::from(1_000u64), dec!(0.5)).await.unwrap();

        assert_eq!(quote.trade.output_amount, U256::from(1_992u64));
        // 1992 * 99.5% = 1982.04
        assert_eq!(quote.minimum_amount_out, U256::from(1_982u64));
        assert_eq!(quote.slippage_percent, dec!(0.5));
        assert!(!quote.trade.is_secondary_router);
    }

    #[tokio::test]
    async fn test_invalid_slippage_checked_before_lookups() {
        let config = test_config();
        let (a, b) = (config.bridge_tokens[0].clone(), config.bridge_tokens[1].clone());
        let chain = Arc::new(MockChain::new());
        let quoter = build_quoter(chain.clone(), &config);

        let err = quoter.quote(&a, &b, U256::from(1_000u64), dec!(100.5)).await.unwrap_err();

        assert_eq!(err, RouteError::InvalidSlippage(dec!(100.5)));
        assert!(chain.calls().is_empty());
    }

    #[tokio::test]
    async fn test_missing_route_is_an_error() {
        let config = test_config();
        let (a, b) = (config.bridge_tokens[0].clone(), config.bridge_tokens[1].clone());
        let quoter = build_quoter(Arc::new(MockChain::new()), &config);

        assert_eq!(
            quoter.best_trade(&a, &b, U256::from(1_000u64)).await,
            Err(RouteError::NoRouteFound)
        );
        assert_eq!(
            quoter.best_trade(&a, &b, U256::ZERO).await,
            Err(RouteError::InsufficientInputAmount)
        );
    }
}
