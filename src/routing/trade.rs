use alloy::primitives::{Address, U256};
use rust_decimal::Decimal;
use serde::Serialize;

use super::finder::Route;
use crate::amm::{
    calculate_price_impact, get_amount_out, pow10, ratio_to_decimal, wide, MULTI_HOP_PREMIUM_PERCENT,
};
use crate::error::{Result, RouteError};
use crate::token::{normalize_path, TokenInfo};

/// Fully priced trade, ready for display or transaction construction
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TradeInfo {
    pub input_amount: U256,
    pub output_amount: U256,
    /// Output per input in whole-token units
    pub execution_price: Decimal,
    /// Percent, never negative
    pub price_impact: Decimal,
    /// Router-ready addresses (native sentinel replaced by wrapped-native)
    pub path: Vec<Address>,
    /// Tokens as requested, for display
    pub tokens: Vec<TokenInfo>,
    pub is_secondary_router: bool,
}

impl TradeInfo {
    pub fn token_in(&self) -> Option<&TokenInfo> {
        self.tokens.first()
    }

    pub fn token_out(&self) -> Option<&TokenInfo> {
        self.tokens.last()
    }
}

/// Build a trade with the standard multi-hop premium
pub fn build_trade(route: &Route, amount_in: U256, wrapped_native: Address) -> Result<TradeInfo> {
    build_trade_with(route, amount_in, wrapped_native, MULTI_HOP_PREMIUM_PERCENT)
}

/// Turn a route into a [`TradeInfo`].
///
/// Output and impact the finder already computed are reused as-is (they may
/// come from a router quote that the reserves alone can't reproduce).
/// Missing values are recomputed hop by hop from the route's reserves.
pub fn build_trade_with(
    route: &Route,
    amount_in: U256,
    wrapped_native: Address,
    multi_hop_premium: Decimal,
) -> Result<TradeInfo> {
    validate_route(route)?;
    if amount_in.is_zero() {
        return Err(RouteError::InsufficientInputAmount);
    }

    let (output_amount, price_impact) = match (route.output_amount, route.price_impact) {
        (Some(output), Some(impact)) => (output, impact),
        (output, impact) => {
            let (computed_output, computed_impact) = walk_hops(&route.reserves, amount_in, multi_hop_premium)?;
            (output.unwrap_or(computed_output), impact.unwrap_or(computed_impact))
        }
    };

    if output_amount.is_zero() {
        return Err(RouteError::InsufficientOutputAmount);
    }

    let token_in = &route.path[0];
    let token_out = &route.path[route.path.len() - 1];
    let execution_price = execution_price(amount_in, output_amount, token_in.decimals, token_out.decimals)?;

    Ok(TradeInfo {
        input_amount: amount_in,
        output_amount,
        execution_price,
        price_impact: price_impact.max(Decimal::ZERO),
        path: normalize_path(&route.path, wrapped_native),
        tokens: route.path.clone(),
        is_secondary_router: route.is_secondary_router,
    })
}

fn validate_route(route: &Route) -> Result<()> {
    if !route.exists {
        return Err(RouteError::NoRouteFound);
    }
    if route.path.len() < 2 {
        return Err(RouteError::InvalidPath(format!(
            "path needs at least two tokens, got {}",
            route.path.len()
        )));
    }
    if route.path.len() - 1 != route.reserves.len() {
        return Err(RouteError::InvalidPath(format!(
            "{} tokens but {} reserve pairs",
            route.path.len(),
            route.reserves.len()
        )));
    }
    Ok(())
}

/// Chain the swap math across every hop; impact is summed per hop plus the
/// premium for each hop after the first.
fn walk_hops(reserves: &[(U256, U256)], amount_in: U256, multi_hop_premium: Decimal) -> Result<(U256, Decimal)> {
    let mut amount = amount_in;
    let mut impact = Decimal::ZERO;

    for &(reserve_in, reserve_out) in reserves {
        let out = get_amount_out(amount, reserve_in, reserve_out)?;
        impact += calculate_price_impact(amount, out, reserve_in, reserve_out)?;
        amount = out;
    }

    let extra_hops = reserves.len().saturating_sub(1) as u64;
    Ok((amount, impact + multi_hop_premium * Decimal::from(extra_hops)))
}

/// `(amount_out / 10^decimals_out) / (amount_in / 10^decimals_in)`
fn execution_price(amount_in: U256, amount_out: U256, decimals_in: u8, decimals_out: u8) -> Result<Decimal> {
    let num = wide(amount_out)
        .checked_mul(pow10(decimals_in as u32))
        .ok_or(RouteError::Overflow)?;
    let den = wide(amount_in)
        .checked_mul(pow10(decimals_out as u32))
        .ok_or(RouteError::Overflow)?;
    ratio_to_decimal(num, den)
}
