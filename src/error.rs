//! Error taxonomy for quoting and routing

use alloy::primitives::Address;
use rust_decimal::Decimal;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, RouteError>;

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum RouteError {
    #[error("insufficient input amount")]
    InsufficientInputAmount,

    #[error("insufficient output amount")]
    InsufficientOutputAmount,

    #[error("insufficient liquidity")]
    InsufficientLiquidity,

    #[error("no pair registered for {token_a} / {token_b}")]
    PairNotFound { token_a: Address, token_b: Address },

    #[error("no route found")]
    NoRouteFound,

    #[error("quote source {router} unavailable: {reason}")]
    QuoteSourceUnavailable { router: String, reason: String },

    #[error("invalid amount: {0}")]
    InvalidAmount(String),

    #[error("invalid path: {0}")]
    InvalidPath(String),

    #[error("slippage must be between 0 and 100 percent, got {0}")]
    InvalidSlippage(Decimal),

    #[error("arithmetic overflow")]
    Overflow,

    #[error("rpc error: {0}")]
    Rpc(String),
}

impl RouteError {
    /// Whether re-issuing the same quote could succeed.
    ///
    /// Liquidity and path errors are properties of the pools themselves;
    /// RPC and quote sampling failures are not.
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            RouteError::Rpc(_) | RouteError::QuoteSourceUnavailable { .. }
        )
    }

    pub(crate) fn rpc(err: impl std::fmt::Display) -> Self {
        RouteError::Rpc(err.to_string())
    }
}
