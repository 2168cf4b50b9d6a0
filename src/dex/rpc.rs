use alloy::{
    primitives::{Address, U256},
    providers::Provider,
    sol,
};
use async_trait::async_trait;

use super::ChainReader;
use crate::error::{Result, RouteError};
use crate::token::TokenInfo;

// Uniswap V2 style factory
sol! {
    #[sol(rpc)]
    interface IUniswapV2Factory {
        function getPair(address tokenA, address tokenB) external view returns (address pair);
    }
}

// Uniswap V2 style pair
sol! {
    #[sol(rpc)]
    interface IUniswapV2Pair {
        function getReserves() external view returns (
            uint112 reserve0,
            uint112 reserve1,
            uint32 blockTimestampLast
        );
        function token0() external view returns (address);
        function token1() external view returns (address);
    }
}

// Uniswap V2 style router (quote view only)
sol! {
    #[sol(rpc)]
    interface IUniswapV2Router {
        function getAmountsOut(uint256 amountIn, address[] calldata path)
            external
            view
            returns (uint256[] memory amounts);
    }
}

sol! {
    #[sol(rpc)]
    interface IERC20Metadata {
        function name() external view returns (string);
        function symbol() external view returns (string);
        function decimals() external view returns (uint8);
    }
}

/// `ChainReader` over an alloy provider
pub struct RpcReader<P> {
    provider: P,
}

impl<P: Provider + Clone> RpcReader<P> {
    pub fn new(provider: P) -> Self {
        Self { provider }
    }

    /// ERC-20 metadata for building a `TokenInfo`
    pub async fn token_info(&self, address: Address) -> Result<TokenInfo> {
        let token = IERC20Metadata::new(address, &self.provider);

        let (name, symbol, decimals) = tokio::try_join!(
            async { token.name().call().await },
            async { token.symbol().call().await },
            async { token.decimals().call().await },
        )
        .map_err(RouteError::rpc)?;

        Ok(TokenInfo::new(address, symbol, name, decimals))
    }
}

#[async_trait]
impl<P: Provider + Clone + Send + Sync> ChainReader for RpcReader<P> {
    async fn get_pair(&self, factory: Address, token_a: Address, token_b: Address) -> Result<Address> {
        let factory = IUniswapV2Factory::new(factory, &self.provider);
        factory
            .getPair(token_a, token_b)
            .call()
            .await
            .map_err(RouteError::rpc)
    }

    async fn get_reserves(&self, pair: Address) -> Result<(U256, U256)> {
        let pair = IUniswapV2Pair::new(pair, &self.provider);
        let reserves = pair.getReserves().call().await.map_err(RouteError::rpc)?;
        Ok((U256::from(reserves.reserve0), U256::from(reserves.reserve1)))
    }

    async fn token0(&self, pair: Address) -> Result<Address> {
        let pair = IUniswapV2Pair::new(pair, &self.provider);
        pair.token0().call().await.map_err(RouteError::rpc)
    }

    async fn token1(&self, pair: Address) -> Result<Address> {
        let pair = IUniswapV2Pair::new(pair, &self.provider);
        pair.token1().call().await.map_err(RouteError::rpc)
    }

    async fn get_amounts_out(&self, router: Address, amount_in: U256, path: &[Address]) -> Result<Vec<U256>> {
        let router = IUniswapV2Router::new(router, &self.provider);
        router
            .getAmountsOut(amount_in, path.to_vec())
            .call()
            .await
            .map_err(RouteError::rpc)
    }
}
