//! Route Finder
//!
//! Searches a fixed, priority-ordered candidate space and returns the first
//! viable route:
//! 1. direct pair on reserve-priced (primary) sources
//! 2. direct quote on quote-priced (secondary) sources
//! 3. native-asset shortcut through the wrapped-native pair
//! 4. one intermediate hop through each bridge token, in configured order
//!
//! Candidates are not compared on price. Whatever is found first in this
//! order is returned.

use std::collections::HashSet;
use std::sync::Arc;

use alloy::primitives::{Address, U256};
use futures::future::join_all;
use rust_decimal::Decimal;
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::amm::{calculate_price_impact, get_amount_out, MULTI_HOP_PREMIUM_PERCENT};
use crate::dex::{LegReserves, QuoteSource};
use crate::error::{Result, RouteError};
use crate::token::TokenInfo;

/// Token lists the finder searches through
#[derive(Debug, Clone)]
pub struct RoutingConfig {
    pub wrapped_native: TokenInfo,
    /// Intermediate tokens in priority order; wrapped-native is always tried first
    pub bridge_tokens: Vec<TokenInfo>,
    /// Percentage points added per hop beyond the first
    pub multi_hop_premium: Decimal,
}

impl RoutingConfig {
    pub fn new(wrapped_native: TokenInfo, bridge_tokens: Vec<TokenInfo>) -> Self {
        Self {
            wrapped_native,
            bridge_tokens,
            multi_hop_premium: MULTI_HOP_PREMIUM_PERCENT,
        }
    }
}

/// A route candidate
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Route {
    pub exists: bool,
    /// Tokens as the caller supplied them (native sentinel kept)
    pub path: Vec<TokenInfo>,
    /// `(reserve_in, reserve_out)` per hop
    pub reserves: Vec<(U256, U256)>,
    pub is_secondary_router: bool,
    pub output_amount: Option<U256>,
    pub price_impact: Option<Decimal>,
    /// Source label per hop
    pub routers: Vec<String>,
}

impl Route {
    pub fn none() -> Self {
        Self {
            exists: false,
            path: Vec::new(),
            reserves: Vec::new(),
            is_secondary_router: false,
            output_amount: None,
            price_impact: None,
            routers: Vec::new(),
        }
    }

    pub fn hop_count(&self) -> usize {
        self.reserves.len()
    }

    pub fn token_path(&self) -> String {
        self.path
            .iter()
            .map(|t| t.symbol.as_str())
            .collect::<Vec<_>>()
            .join(" -> ")
    }
}

/// One priced hop
#[derive(Debug, Clone)]
struct PricedLeg {
    source: usize,
    reserves: LegReserves,
    amount_out: U256,
    price_impact: Decimal,
}

/// Finds a trade path across the configured quote sources
pub struct RouteFinder {
    sources: Vec<Arc<dyn QuoteSource>>,
    config: RoutingConfig,
}

impl RouteFinder {
    /// `sources` are in priority order, primary first
    pub fn new(sources: Vec<Arc<dyn QuoteSource>>, config: RoutingConfig) -> Self {
        Self { sources, config }
    }

    pub fn config(&self) -> &RoutingConfig {
        &self.config
    }

    pub fn sources(&self) -> &[Arc<dyn QuoteSource>] {
        &self.sources
    }

    /// Token as used for lookups: native sentinel replaced by wrapped-native
    fn lookup_token(&self, token: &TokenInfo) -> TokenInfo {
        if token.is_native() {
            TokenInfo {
                address: self.config.wrapped_native.address,
                ..token.clone()
            }
        } else {
            token.clone()
        }
    }

    /// Find the first viable route for selling `amount_in` of `token_a` for
    /// `token_b`. Never fails: sub-query errors are logged and skipped, and
    /// an exhausted search returns [`Route::none`].
    pub async fn find_route(&self, token_a: &TokenInfo, token_b: &TokenInfo, amount_in: U256) -> Route {
        let key_a = self.lookup_token(token_a);
        let key_b = self.lookup_token(token_b);

        if amount_in.is_zero() || key_a.address == key_b.address {
            debug!("Nothing to route for {} -> {} (amount {})", token_a.symbol, token_b.symbol, amount_in);
            return Route::none();
        }

        // Direct lookups already issued in this request
        let mut attempted: HashSet<(usize, Address, Address)> = HashSet::new();

        // Steps 1 and 2: reserve-priced sources first, then quote-priced ones
        let direct_order = self
            .source_indices()
            .filter(|&i| self.sources[i].reserves_authoritative())
            .chain(self.source_indices().filter(|&i| !self.sources[i].reserves_authoritative()))
            .collect::<Vec<_>>();

        for idx in direct_order {
            match self.try_direct(idx, token_a, token_b, &key_a, &key_b, amount_in).await {
                Ok(Some(route)) => return route,
                Ok(None) => {
                    attempted.insert((idx, key_a.address, key_b.address));
                }
                Err(e) => warn!(
                    "{}: direct lookup {} / {} failed: {}",
                    self.sources[idx].label(),
                    key_a.symbol,
                    key_b.symbol,
                    e
                ),
            }
        }

        // Step 3
        if let Some(route) = self
            .native_shortcut(token_a, token_b, amount_in, &attempted)
            .await
        {
            return route;
        }

        // Step 4
        for bridge in self.bridge_candidates(&key_a, &key_b) {
            match self.try_bridge(token_a, token_b, &key_a, &key_b, &bridge, amount_in).await {
                Ok(Some(route)) => {
                    info!(
                        "Route found: {} via {} (impact {}%)",
                        route.token_path(),
                        route.routers.join(" + "),
                        route.price_impact.unwrap_or_default()
                    );
                    return route;
                }
                Ok(None) => debug!("No route via {}", bridge.symbol),
                Err(e) => warn!("Bridge candidate {} failed: {}", bridge.symbol, e),
            }
        }

        info!("No route found for {} -> {}", token_a.symbol, token_b.symbol);
        Route::none()
    }

    fn source_indices(&self) -> std::ops::Range<usize> {
        0..self.sources.len()
    }

    async fn try_direct(
        &self,
        idx: usize,
        token_a: &TokenInfo,
        token_b: &TokenInfo,
        key_a: &TokenInfo,
        key_b: &TokenInfo,
        amount_in: U256,
    ) -> Result<Option<Route>> {
        let label = self.sources[idx].label();
        match self.price_direct(idx, key_a, key_b, amount_in).await? {
            Some(leg) => {
                let route = self.assemble(vec![token_a.clone(), token_b.clone()], vec![leg]);
                info!(
                    "Route found: {} direct on {} (impact {}%)",
                    route.token_path(),
                    label,
                    route.price_impact.unwrap_or_default()
                );
                Ok(Some(route))
            }
            None => {
                debug!("{}: no direct pair {} / {}", label, key_a.symbol, key_b.symbol);
                Ok(None)
            }
        }
    }

    /// Price a direct leg. Reserve-priced sources are read for reserves;
    /// quote-priced sources are probed with the real amount first and only
    /// then asked for (possibly synthetic) reserves to estimate impact.
    async fn price_direct(
        &self,
        idx: usize,
        key_in: &TokenInfo,
        key_out: &TokenInfo,
        amount_in: U256,
    ) -> Result<Option<PricedLeg>> {
        let source = &self.sources[idx];

        if source.reserves_authoritative() {
            return match source.try_direct_pair(key_in, key_out).await? {
                Some(reserves) => self.priced(idx, reserves, amount_in, None),
                None => Ok(None),
            };
        }

        let quoted = match source.try_quote(amount_in, &[key_in.address, key_out.address]).await? {
            Some(out) => out,
            None => return Ok(None),
        };
        let reserves = source
            .try_direct_pair(key_in, key_out)
            .await?
            .ok_or_else(|| RouteError::QuoteSourceUnavailable {
                router: source.label().to_string(),
                reason: format!("no reserves behind quote for {} -> {}", key_in.symbol, key_out.symbol),
            })?;
        self.priced(idx, reserves, amount_in, Some(quoted))
    }

    /// Price a leg whose reserves are already known. Quote-priced sources
    /// still get the final say on the output amount.
    async fn price_leg(
        &self,
        idx: usize,
        reserves: LegReserves,
        key_in: &TokenInfo,
        key_out: &TokenInfo,
        amount_in: U256,
    ) -> Result<Option<PricedLeg>> {
        let source = &self.sources[idx];
        if source.reserves_authoritative() {
            return self.priced(idx, reserves, amount_in, None);
        }
        match source.try_quote(amount_in, &[key_in.address, key_out.address]).await? {
            Some(quoted) => self.priced(idx, reserves, amount_in, Some(quoted)),
            None => Ok(None),
        }
    }

    /// A leg whose output truncates to zero has no usable liquidity for
    /// this amount; the pair would revert the swap.
    fn priced(
        &self,
        idx: usize,
        reserves: LegReserves,
        amount_in: U256,
        quoted: Option<U256>,
    ) -> Result<Option<PricedLeg>> {
        let amount_out = match quoted {
            Some(out) => out,
            None => get_amount_out(amount_in, reserves.reserve_in, reserves.reserve_out)?,
        };
        if amount_out.is_zero() {
            debug!("{}: output for {} rounds to zero", self.sources[idx].label(), amount_in);
            return Ok(None);
        }
        let price_impact =
            calculate_price_impact(amount_in, amount_out, reserves.reserve_in, reserves.reserve_out)?;

        Ok(Some(PricedLeg {
            source: idx,
            reserves,
            amount_out,
            price_impact,
        }))
    }

    fn assemble(&self, path: Vec<TokenInfo>, legs: Vec<PricedLeg>) -> Route {
        let extra_hops = Decimal::from(legs.len().saturating_sub(1) as u64);
        let price_impact = legs.iter().map(|l| l.price_impact).sum::<Decimal>()
            + self.config.multi_hop_premium * extra_hops;

        Route {
            exists: true,
            path,
            reserves: legs.iter().map(|l| l.reserves.as_tuple()).collect(),
            is_secondary_router: legs.iter().any(|l| self.sources[l.source].is_secondary()),
            output_amount: legs.last().map(|l| l.amount_out),
            price_impact: Some(price_impact),
            routers: legs
                .iter()
                .map(|l| self.sources[l.source].label().to_string())
                .collect(),
        }
    }

    /// Native coin against anything but its own wrapped token goes straight
    /// to the wrapped-native pair before the bridge search. Lookups that
    /// already came back empty in the direct steps are not repeated; ones
    /// that failed get a second attempt.
    async fn native_shortcut(
        &self,
        token_a: &TokenInfo,
        token_b: &TokenInfo,
        amount_in: U256,
        attempted: &HashSet<(usize, Address, Address)>,
    ) -> Option<Route> {
        let wrapped = &self.config.wrapped_native;
        let other = match (token_a.is_native(), token_b.is_native()) {
            (true, false) => token_b,
            (false, true) => token_a,
            _ => return None,
        };
        if other.address == wrapped.address {
            return None;
        }

        let key_a = self.lookup_token(token_a);
        let key_b = self.lookup_token(token_b);

        for idx in self.source_indices() {
            let label = self.sources[idx].label();
            if attempted.contains(&(idx, key_a.address, key_b.address)) {
                debug!("{}: native shortcut {} / {} already tried", label, key_a.symbol, key_b.symbol);
                continue;
            }
            match self.try_direct(idx, token_a, token_b, &key_a, &key_b, amount_in).await {
                Ok(Some(route)) => return Some(route),
                Ok(None) => {}
                Err(e) => warn!("{}: native shortcut {} / {} failed: {}", label, key_a.symbol, key_b.symbol, e),
            }
        }
        None
    }

    /// Wrapped-native first, then the configured list; never an endpoint
    /// of the trade itself.
    fn bridge_candidates(&self, key_a: &TokenInfo, key_b: &TokenInfo) -> Vec<TokenInfo> {
        let mut seen = HashSet::new();
        std::iter::once(&self.config.wrapped_native)
            .chain(self.config.bridge_tokens.iter())
            .map(|t| self.lookup_token(t))
            .filter(|t| t.address != key_a.address && t.address != key_b.address)
            .filter(|t| seen.insert(t.address))
            .collect()
    }

    /// Reserves for one leg from the first source, in priority order, that
    /// both lists the pair and can price it. A listed pair without usable
    /// reserves falls through to the next source.
    async fn leg_reserves(
        &self,
        candidates: &[usize],
        key_in: &TokenInfo,
        key_out: &TokenInfo,
    ) -> Option<(usize, LegReserves)> {
        for &idx in candidates {
            let label = self.sources[idx].label();
            match self.sources[idx].try_direct_pair(key_in, key_out).await {
                Ok(Some(reserves)) => return Some((idx, reserves)),
                Ok(None) => debug!("{}: {} / {} listed but has no liquidity", label, key_in.symbol, key_out.symbol),
                Err(e) => debug!("{}: {} / {} reserves failed: {}", label, key_in.symbol, key_out.symbol, e),
            }
        }
        None
    }

    /// Two-hop route through `bridge`. Each leg is served by the first
    /// source that has it with liquidity; the legs may sit on different
    /// sources.
    async fn try_bridge(
        &self,
        token_a: &TokenInfo,
        token_b: &TokenInfo,
        key_a: &TokenInfo,
        key_b: &TokenInfo,
        bridge: &TokenInfo,
        amount_in: U256,
    ) -> Result<Option<Route>> {
        let checks = self.sources.iter().map(|source| async move {
            tokio::join!(source.pair_exists(key_a, bridge), source.pair_exists(bridge, key_b))
        });
        let checks = join_all(checks).await;

        let mut first_sources = Vec::new();
        let mut second_sources = Vec::new();
        for (idx, (first, second)) in checks.into_iter().enumerate() {
            let label = self.sources[idx].label();
            match first {
                Ok(true) => first_sources.push(idx),
                Ok(false) => {}
                Err(e) => debug!("{}: {} / {} existence check failed: {}", label, key_a.symbol, bridge.symbol, e),
            }
            match second {
                Ok(true) => second_sources.push(idx),
                Ok(false) => {}
                Err(e) => debug!("{}: {} / {} existence check failed: {}", label, bridge.symbol, key_b.symbol, e),
            }
        }
        if first_sources.is_empty() || second_sources.is_empty() {
            return Ok(None);
        }

        let (first_leg, second_leg) = tokio::join!(
            self.leg_reserves(&first_sources, key_a, bridge),
            self.leg_reserves(&second_sources, bridge, key_b),
        );
        let ((first_idx, first_reserves), (second_idx, second_reserves)) = match (first_leg, second_leg) {
            (Some(first), Some(second)) => (first, second),
            _ => return Ok(None),
        };

        let first = match self.price_leg(first_idx, first_reserves, key_a, bridge, amount_in).await? {
            Some(leg) => leg,
            None => return Ok(None),
        };
        let second = match self
            .price_leg(second_idx, second_reserves, bridge, key_b, first.amount_out)
            .await?
        {
            Some(leg) => leg,
            None => return Ok(None),
        };

        Ok(Some(self.assemble(
            vec![token_a.clone(), bridge.clone(), token_b.clone()],
            vec![first, second],
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dex::mock::MockChain;
    use crate::dex::{FactoryRouter, QuoteRouter};
    use crate::token::NATIVE_SENTINEL;

    const FACTORY: Address = Address::repeat_byte(0xfa);
    const ROUTER: Address = Address::repeat_byte(0x5e);
    const E18: u128 = 1_000_000_000_000_000_000;

    fn token(byte: u8, symbol: &str) -> TokenInfo {
        TokenInfo::new(Address::repeat_byte(byte), symbol, symbol, 18)
    }

    fn wrapped() -> TokenInfo {
        token(0x77, "WETH")
    }

    fn usdc() -> TokenInfo {
        token(0x55, "USDC")
    }

    fn finder(chain: MockChain) -> (RouteFinder, Arc<MockChain>) {
        let chain = Arc::new(chain);
        let sources: Vec<Arc<dyn QuoteSource>> = vec![
            Arc::new(FactoryRouter::new("primary", FACTORY, chain.clone())),
            Arc::new(QuoteRouter::new("secondary", ROUTER, None, chain.clone())),
        ];
        let config = RoutingConfig::new(wrapped(), vec![usdc()]);
        (RouteFinder::new(sources, config), chain)
    }

    fn u(v: u128) -> U256 {
        U256::from(v)
    }

    #[tokio::test]
    async fn test_direct_primary_route() {
        let (a, b) = (token(0x0a, "AAA"), token(0x0b, "BBB"));
        let mut chain = MockChain::new();
        chain.add_pair(FACTORY, a.address, 1_000_000, b.address, 2_000_000);
        let (finder, _) = finder(chain);

        let route = finder.find_route(&a, &b, u(1_000)).await;

        assert!(route.exists);
        assert_eq!(route.path, vec![a, b]);
        assert_eq!(route.reserves, vec![(u(1_000_000), u(2_000_000))]);
        assert_eq!(route.output_amount, Some(u(1_992)));
        assert!(!route.is_secondary_router);
        assert_eq!(route.routers, vec!["primary".to_string()]);
        let impact = route.price_impact.unwrap();
        assert!(impact > Decimal::new(9, 2) && impact < Decimal::new(11, 2), "impact {}", impact);
    }

    #[tokio::test]
    async fn test_direct_secondary_route_skips_bridge_search() {
        let (a, b) = (token(0x0a, "AAA"), token(0x0b, "BBB"));
        let mut chain = MockChain::new();
        chain.add_router_pool(ROUTER, a.address, 1_000_000 * E18, b.address, 2_000_000 * E18);
        let (finder, chain) = finder(chain);

        let amount = u(50 * E18);
        let route = finder.find_route(&a, &b, amount).await;

        assert!(route.exists);
        assert!(route.is_secondary_router);
        assert_eq!(route.path.len(), 2);
        assert_eq!(route.routers, vec!["secondary".to_string()]);
        let expected = get_amount_out(amount, u(1_000_000 * E18), u(2_000_000 * E18)).unwrap();
        assert_eq!(route.output_amount, Some(expected));
        assert!(route.price_impact.unwrap() < Decimal::ONE);

        // Only the primary direct lookup touched a factory
        assert_eq!(chain.count_calls("getPair"), 1);
    }

    #[tokio::test]
    async fn test_wrapped_native_bridge_route() {
        let (a, b, w) = (token(0x0a, "AAA"), token(0x0b, "BBB"), wrapped());
        let mut chain = MockChain::new();
        chain.add_pair(FACTORY, a.address, 1_000_000, w.address, 2_000_000);
        chain.add_pair(FACTORY, w.address, 2_000_000, b.address, 4_000_000);
        let (finder, _) = finder(chain);

        let amount = u(1_000);
        let route = finder.find_route(&a, &b, amount).await;

        let first_out = get_amount_out(amount, u(1_000_000), u(2_000_000)).unwrap();
        let second_out = get_amount_out(first_out, u(2_000_000), u(4_000_000)).unwrap();
        let expected_impact = calculate_price_impact(amount, first_out, u(1_000_000), u(2_000_000)).unwrap()
            + calculate_price_impact(first_out, second_out, u(2_000_000), u(4_000_000)).unwrap()
            + MULTI_HOP_PREMIUM_PERCENT;

        assert!(route.exists);
        assert_eq!(route.path, vec![a, w, b]);
        assert_eq!(route.hop_count(), 2);
        assert_eq!(route.output_amount, Some(second_out));
        assert_eq!(route.price_impact, Some(expected_impact));
        assert!(!route.is_secondary_router);
    }

    #[tokio::test]
    async fn test_no_route() {
        let (a, b) = (token(0x0a, "AAA"), token(0x0b, "BBB"));
        let (finder, _) = finder(MockChain::new());

        assert_eq!(finder.find_route(&a, &b, u(1_000)).await, Route::none());
        assert_eq!(finder.find_route(&a, &a, u(1_000)).await, Route::none());
        assert_eq!(finder.find_route(&a, &b, U256::ZERO).await, Route::none());
    }

    #[tokio::test]
    async fn test_native_sentinel_uses_wrapped_lookups() {
        let (native, b, w) = (TokenInfo::native("ETH"), token(0x0b, "BBB"), wrapped());
        let mut chain = MockChain::new();
        chain.add_pair(FACTORY, w.address, 1_000_000, b.address, 3_000_000);
        let (finder, chain) = finder(chain);

        let route = finder.find_route(&native, &b, u(1_000)).await;

        assert!(route.exists);
        assert_eq!(route.path[0].address, NATIVE_SENTINEL);
        assert_eq!(route.path.len(), 2);
        let sentinel = NATIVE_SENTINEL.to_string();
        assert!(chain.calls().iter().all(|c| !c.contains(&sentinel)));
        assert!(chain.calls().iter().any(|c| c.contains(&w.address.to_string())));
    }

    #[tokio::test]
    async fn test_native_shortcut_does_not_repeat_empty_lookups() {
        let (native, b) = (TokenInfo::native("ETH"), token(0x0b, "BBB"));
        let (finder, chain) = finder(MockChain::new());

        let route = finder.find_route(&native, &b, u(1_000)).await;

        assert!(!route.exists);
        // One direct lookup on the primary factory; the bridge search skips
        // wrapped-native (it is the input) and asks for USDC legs once
        let direct_lookups = chain
            .calls()
            .iter()
            .filter(|c| c.starts_with("getPair") && !c.contains(&usdc().address.to_string()))
            .count();
        assert_eq!(direct_lookups, 1);
    }

    #[tokio::test]
    async fn test_first_viable_route_wins() {
        let (a, b, w) = (token(0x0a, "AAA"), token(0x0b, "BBB"), wrapped());
        let mut chain = MockChain::new();
        // Shallow direct pair, deep bridge: the bridge would pay more
        chain.add_pair(FACTORY, a.address, 10_000, b.address, 10_000);
        chain.add_pair(FACTORY, a.address, 1_000_000_000, w.address, 1_000_000_000);
        chain.add_pair(FACTORY, w.address, 1_000_000_000, b.address, 1_000_000_000);
        let (finder, _) = finder(chain);

        let route = finder.find_route(&a, &b, u(1_000)).await;

        assert_eq!(route.path.len(), 2);
        assert_eq!(route.output_amount, Some(u(906)));
    }

    #[tokio::test]
    async fn test_failing_bridge_candidate_is_skipped() {
        let (a, b, w, usdc) = (token(0x0a, "AAA"), token(0x0b, "BBB"), wrapped(), usdc());
        let mut chain = MockChain::new();
        chain.add_pair(FACTORY, a.address, 1_000_000, w.address, 1_000_000);
        chain.add_pair(FACTORY, w.address, 1_000_000, b.address, 1_000_000);
        chain.add_pair(FACTORY, a.address, 1_000_000, usdc.address, 1_000_000);
        chain.add_pair(FACTORY, usdc.address, 1_000_000, b.address, 1_000_000);
        chain.fail_token(w.address);
        let (finder, _) = finder(chain);

        let route = finder.find_route(&a, &b, u(1_000)).await;

        assert!(route.exists);
        assert_eq!(route.path, vec![a, usdc, b]);
    }

    #[tokio::test]
    async fn test_bridge_legs_on_different_sources() {
        let (a, b, w) = (token(0x0a, "AAA"), token(0x0b, "BBB"), wrapped());
        let mut chain = MockChain::new();
        chain.add_pair(FACTORY, a.address, 1_000_000 * E18, w.address, 1_000_000 * E18);
        chain.add_router_pool(ROUTER, w.address, 1_000_000 * E18, b.address, 2_000_000 * E18);
        let (finder, _) = finder(chain);

        let amount = u(10 * E18);
        let route = finder.find_route(&a, &b, amount).await;

        let first_out = get_amount_out(amount, u(1_000_000 * E18), u(1_000_000 * E18)).unwrap();
        let second_out = get_amount_out(first_out, u(1_000_000 * E18), u(2_000_000 * E18)).unwrap();

        assert!(route.exists);
        assert_eq!(route.path, vec![a, w, b]);
        assert_eq!(route.routers, vec!["primary".to_string(), "secondary".to_string()]);
        assert!(route.is_secondary_router);
        assert_eq!(route.output_amount, Some(second_out));
        assert!(route.price_impact.unwrap() > MULTI_HOP_PREMIUM_PERCENT);
    }

    #[tokio::test]
    async fn test_zero_output_is_not_a_route() {
        let (a, b) = (token(0x0a, "AAA"), token(0x0b, "BBB"));
        let mut chain = MockChain::new();
        chain.add_pair(FACTORY, a.address, 1_000_000 * E18, b.address, 1_000);
        let (finder, _) = finder(chain);

        // 1 * 997 * 1000 / (1e24 * 1000 + 997) truncates to zero
        assert_eq!(get_amount_out(u(1), u(1_000_000 * E18), u(1_000)).unwrap(), U256::ZERO);
        assert_eq!(finder.find_route(&a, &b, u(1)).await, Route::none());
    }

    #[tokio::test]
    async fn test_bridge_leg_falls_through_to_next_source() {
        let (a, b, w) = (token(0x0a, "AAA"), token(0x0b, "BBB"), wrapped());
        let mut chain = MockChain::new();
        // Registered on the primary factory but empty
        chain.add_pair(FACTORY, a.address, 0, w.address, 0);
        chain.add_router_pool(ROUTER, a.address, 1_000_000 * E18, w.address, 1_000_000 * E18);
        chain.add_pair(FACTORY, w.address, 1_000_000 * E18, b.address, 2_000_000 * E18);
        let (finder, _) = finder(chain);

        let amount = u(E18);
        let route = finder.find_route(&a, &b, amount).await;

        let first_out = get_amount_out(amount, u(1_000_000 * E18), u(1_000_000 * E18)).unwrap();
        let second_out = get_amount_out(first_out, u(1_000_000 * E18), u(2_000_000 * E18)).unwrap();

        assert!(route.exists);
        assert_eq!(route.path, vec![a, w, b]);
        assert_eq!(route.routers, vec!["secondary".to_string(), "primary".to_string()]);
        assert!(route.is_secondary_router);
        assert_eq!(route.output_amount, Some(second_out));
    }
}
