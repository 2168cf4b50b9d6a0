//! In-memory chain used by the unit tests

use std::collections::{HashMap, HashSet};
use std::sync::Mutex;

use alloy::primitives::{Address, U256};
use async_trait::async_trait;

use super::ChainReader;
use crate::amm::get_amount_out;
use crate::error::{Result, RouteError};

#[derive(Debug, Clone, Copy)]
struct MockPair {
    token0: Address,
    token1: Address,
    reserve0: U256,
    reserve1: U256,
}

impl MockPair {
    fn oriented(&self, token_in: Address) -> Option<(U256, U256)> {
        if token_in == self.token0 {
            Some((self.reserve0, self.reserve1))
        } else if token_in == self.token1 {
            Some((self.reserve1, self.reserve0))
        } else {
            None
        }
    }
}

fn sorted(a: Address, b: Address) -> (Address, Address) {
    if a < b {
        (a, b)
    } else {
        (b, a)
    }
}

/// Factories, pairs and quote-only routers backed by plain maps.
///
/// Routers quote with the same 997/1000 formula the pairs use, so a router
/// pool behaves like a real constant-product pair that simply isn't
/// discoverable through a factory.
#[derive(Default)]
pub struct MockChain {
    factories: HashMap<(Address, Address, Address), Address>,
    pairs: HashMap<Address, MockPair>,
    router_pools: HashMap<(Address, Address, Address), MockPair>,
    failing_tokens: HashSet<Address>,
    next_pair: u8,
    calls: Mutex<Vec<String>>,
}

impl MockChain {
    pub fn new() -> Self {
        Self::default()
    }

    fn new_pair(&mut self, token_a: Address, reserve_a: u128, token_b: Address, reserve_b: u128) -> MockPair {
        let (token0, token1) = sorted(token_a, token_b);
        let (reserve0, reserve1) = if token0 == token_a {
            (reserve_a, reserve_b)
        } else {
            (reserve_b, reserve_a)
        };
        MockPair {
            token0,
            token1,
            reserve0: U256::from(reserve0),
            reserve1: U256::from(reserve1),
        }
    }

    /// Register a factory pair; returns its address
    pub fn add_pair(
        &mut self,
        factory: Address,
        token_a: Address,
        reserve_a: u128,
        token_b: Address,
        reserve_b: u128,
    ) -> Address {
        self.next_pair += 1;
        let address = Address::with_last_byte(self.next_pair);
        let pair = self.new_pair(token_a, reserve_a, token_b, reserve_b);
        self.factories.insert((factory, pair.token0, pair.token1), address);
        self.pairs.insert(address, pair);
        address
    }

    /// Give a quote-only router liquidity for a token pair
    pub fn add_router_pool(
        &mut self,
        router: Address,
        token_a: Address,
        reserve_a: u128,
        token_b: Address,
        reserve_b: u128,
    ) {
        let pair = self.new_pair(token_a, reserve_a, token_b, reserve_b);
        self.router_pools.insert((router, pair.token0, pair.token1), pair);
    }

    /// Every call that touches `token` fails with an RPC error
    pub fn fail_token(&mut self, token: Address) {
        self.failing_tokens.insert(token);
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().map(|c| c.clone()).unwrap_or_default()
    }

    pub fn count_calls(&self, prefix: &str) -> usize {
        self.calls().iter().filter(|c| c.starts_with(prefix)).count()
    }

    fn record(&self, call: String) {
        if let Ok(mut calls) = self.calls.lock() {
            calls.push(call);
        }
    }

    fn check_tokens(&self, tokens: &[Address]) -> Result<()> {
        match tokens.iter().find(|t| self.failing_tokens.contains(*t)) {
            Some(token) => Err(RouteError::Rpc(format!("connection reset while reading {}", token))),
            None => Ok(()),
        }
    }

    fn pair(&self, pair: Address) -> Result<&MockPair> {
        self.pairs
            .get(&pair)
            .ok_or_else(|| RouteError::Rpc(format!("no contract at {}", pair)))
    }
}

#[async_trait]
impl ChainReader for MockChain {
    async fn get_pair(&self, factory: Address, token_a: Address, token_b: Address) -> Result<Address> {
        self.record(format!("getPair {} {} {}", factory, token_a, token_b));
        self.check_tokens(&[token_a, token_b])?;
        let (token0, token1) = sorted(token_a, token_b);
        Ok(self
            .factories
            .get(&(factory, token0, token1))
            .copied()
            .unwrap_or(Address::ZERO))
    }

    async fn get_reserves(&self, pair: Address) -> Result<(U256, U256)> {
        self.record(format!("getReserves {}", pair));
        let pair = self.pair(pair)?;
        self.check_tokens(&[pair.token0, pair.token1])?;
        Ok((pair.reserve0, pair.reserve1))
    }

    async fn token0(&self, pair: Address) -> Result<Address> {
        self.record(format!("token0 {}", pair));
        Ok(self.pair(pair)?.token0)
    }

    async fn token1(&self, pair: Address) -> Result<Address> {
        self.record(format!("token1 {}", pair));
        Ok(self.pair(pair)?.token1)
    }

    async fn get_amounts_out(&self, router: Address, amount_in: U256, path: &[Address]) -> Result<Vec<U256>> {
        self.record(format!("getAmountsOut {} {} {:?}", router, amount_in, path));
        self.check_tokens(path)?;
        if path.len() < 2 {
            return Err(RouteError::Rpc("execution reverted: INVALID_PATH".to_string()));
        }

        let mut amounts = vec![amount_in];
        for hop in path.windows(2) {
            let (token0, token1) = sorted(hop[0], hop[1]);
            let pool = self
                .router_pools
                .get(&(router, token0, token1))
                .ok_or_else(|| RouteError::Rpc("execution reverted".to_string()))?;
            let (reserve_in, reserve_out) = pool
                .oriented(hop[0])
                .ok_or_else(|| RouteError::Rpc("execution reverted".to_string()))?;
            let last = amounts[amounts.len() - 1];
            let out = get_amount_out(last, reserve_in, reserve_out)
                .map_err(|e| RouteError::Rpc(format!("execution reverted: {}", e)))?;
            amounts.push(out);
        }
        Ok(amounts)
    }
}
